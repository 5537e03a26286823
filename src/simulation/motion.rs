use crate::{
    define_map,
    model::{vehicle_info::VehicleId, waypoint::ResampledRoute},
};

use super::{
    clock::Tick,
    handler::vehicle_marker_data,
    registry::{EntityRegistry, VehicleState},
    render::{pickup_line_id, vehicle_marker_id, RenderData, RenderIntent, RenderTarget},
    resample::bearing,
};

define_map!(VehicleId, ResampledRoute, ResampledRouteMap);

#[derive(Debug, Clone)]
pub struct MotionEngine {
    routes: ResampledRouteMap,
    steps_per_interval: u32,
}

impl MotionEngine {
    pub fn new(routes: ResampledRouteMap, steps_per_interval: u32) -> Self {
        Self {
            routes,
            steps_per_interval: steps_per_interval.max(1),
        }
    }

    pub fn route(&self, id: VehicleId) -> Option<&ResampledRoute> {
        self.routes.get(&id)
    }

    pub fn routes(&self) -> &ResampledRouteMap {
        &self.routes
    }

    pub fn total_ticks(&self) -> Tick {
        self.routes
            .values()
            .map(|route| route.len().saturating_sub(1) as Tick)
            .max()
            .unwrap_or(0)
    }

    /// Places every vehicle at its position for `tick` and shrinks live
    /// pickup routes by one point. Headings are refreshed on interval
    /// boundaries only.
    pub fn step(&self, tick: Tick, registry: &mut EntityRegistry, intents: &mut Vec<RenderIntent>) {
        let boundary = tick % Tick::from(self.steps_per_interval) == 0;
        for vehicle in registry.vehicles_mut() {
            let Some(route) = self.routes.get(&vehicle.id()) else {
                continue;
            };

            let moved = Self::place(vehicle, route, tick);
            let turned = boundary && Self::turn(vehicle, route, tick);
            if moved || turned {
                intents.push(RenderIntent::update(
                    RenderTarget::Marker,
                    vehicle_marker_id(vehicle.id()),
                    vehicle_marker_data(vehicle),
                ));
            }

            if vehicle.pop_pickup_point() {
                intents.push(RenderIntent::update(
                    RenderTarget::Line,
                    pickup_line_id(vehicle.id()),
                    RenderData::Line {
                        coordinates: vehicle.pickup_route().unwrap_or_default().to_vec(),
                    },
                ));
            }
        }
    }

    fn place(vehicle: &mut VehicleState, route: &ResampledRoute, tick: Tick) -> bool {
        let Some(position) = usize::try_from(tick).ok().and_then(|t| route.get(t)) else {
            return false;
        };
        let moved = position != vehicle.position();
        vehicle.set_position(position);
        moved
    }

    fn turn(vehicle: &mut VehicleState, route: &ResampledRoute, tick: Tick) -> bool {
        let Ok(t) = usize::try_from(tick) else {
            return false;
        };
        let (from, to) = if t + 1 < route.len() {
            (t, t + 1)
        } else if t > 0 && t < route.len() {
            (t - 1, t)
        } else {
            return false;
        };
        let (Some(a), Some(b)) = (route.get(from), route.get(to)) else {
            return false;
        };
        match bearing(a, b) {
            Some(heading) if vehicle.heading() != Some(heading) => {
                vehicle.set_heading(heading);
                true
            }
            _ => false,
        }
    }
}
