use std::f64::consts::PI;

use crate::model::{
    vehicle_info::VehicleId,
    waypoint::{ResampledRoute, Waypoint},
};

use super::error::SimError;

type Vec3 = [f64; 3];

fn to_unit(w: Waypoint) -> Vec3 {
    let (lat, lon) = (w.lat.to_radians(), w.lon.to_radians());
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

fn from_unit(v: Vec3) -> Waypoint {
    let lat = v[2].atan2((v[0] * v[0] + v[1] * v[1]).sqrt());
    let lon = v[1].atan2(v[0]);
    Waypoint::new(lon.to_degrees(), lat.to_degrees())
}

fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross_norm(a: Vec3, b: Vec3) -> f64 {
    let c = [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ];
    dot(c, c).sqrt()
}

pub fn central_angle(a: Waypoint, b: Waypoint) -> f64 {
    let (ua, ub) = (to_unit(a), to_unit(b));
    cross_norm(ua, ub).atan2(dot(ua, ub))
}

pub fn interpolate(a: Waypoint, b: Waypoint, fraction: f64) -> Waypoint {
    if a == b || fraction <= 0.0 {
        return a;
    }
    if fraction >= 1.0 {
        return b;
    }

    let (ua, ub) = (to_unit(a), to_unit(b));
    let omega = cross_norm(ua, ub).atan2(dot(ua, ub));
    if omega < 1e-12 {
        return a;
    }
    if PI - omega < 1e-9 {
        // antipodal: the arc is not unique, fall back to a straight blend
        return Waypoint::new(
            a.lon + (b.lon - a.lon) * fraction,
            a.lat + (b.lat - a.lat) * fraction,
        );
    }

    let sin_omega = omega.sin();
    let wa = ((1.0 - fraction) * omega).sin() / sin_omega;
    let wb = (fraction * omega).sin() / sin_omega;
    from_unit([
        wa * ua[0] + wb * ub[0],
        wa * ua[1] + wb * ub[1],
        wa * ua[2] + wb * ub[2],
    ])
}

pub fn bearing(from: Waypoint, to: Waypoint) -> Option<f64> {
    if from == to {
        return None;
    }
    let (lat1, lat2) = (from.lat.to_radians(), to.lat.to_radians());
    let dlon = (to.lon - from.lon).to_radians();
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let degrees = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    Some(if degrees >= 360.0 { 0.0 } else { degrees })
}

/// Resamples `route` so that every tick has exactly one position.
///
/// The result has `(route.len() - 1) * steps_per_interval + 1` points. Each
/// segment contributes its start point followed by `steps_per_interval - 1`
/// arc points; the last waypoint closes the sequence. Identical consecutive
/// waypoints yield repeated points.
pub fn resample(
    route: &[Waypoint],
    steps_per_interval: u32,
    vehicle_id: Option<VehicleId>,
) -> Result<ResampledRoute, SimError> {
    if route.len() < 2 || !route.iter().all(Waypoint::is_finite) {
        return Err(SimError::invalid_route(vehicle_id, route.len()));
    }
    if steps_per_interval == 0 {
        return Err(SimError::InvalidConfig {
            reason: "steps per interval must be positive".to_string(),
        });
    }

    let steps = steps_per_interval as usize;
    let mut points = Vec::with_capacity((route.len() - 1) * steps + 1);
    for segment in route.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        points.push(a);
        for step in 1..steps {
            points.push(interpolate(a, b, step as f64 / steps as f64));
        }
    }
    if let Some(last) = route.last() {
        points.push(*last);
    }

    Ok(ResampledRoute::new(points))
}
