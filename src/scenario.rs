use rand::Rng;

use crate::{
    config::SimConfig,
    model::{
        action::{
            Action, Cancel, DropOff, OrderReceived, PassengerAppear, PickUp, RangeUpdate,
            TimelineEvent,
        },
        passenger::PassengerId,
        vehicle_info::{VehicleId, VehicleInfo},
        waypoint::{Route, Waypoint},
    },
    simulation::clock::Interval,
};

pub const HONG_KONG: Waypoint = Waypoint::new(114.1694, 22.3193);

#[derive(Debug, Clone)]
pub struct Scenario {
    pub vehicles: Vec<VehicleInfo>,
    pub events: Vec<TimelineEvent>,
}

fn random_route<R: Rng>(rng: &mut R, waypoints: usize) -> Route {
    let mut current = Waypoint::new(
        HONG_KONG.lon + rng.random_range(-0.05..0.05),
        HONG_KONG.lat + rng.random_range(-0.05..0.05),
    );
    let mut route = Vec::with_capacity(waypoints);
    route.push(current);
    while route.len() < waypoints {
        // vehicles sometimes wait in place for an interval
        if !rng.random_bool(0.1) {
            current = Waypoint::new(
                current.lon + rng.random_range(-0.004..0.004),
                current.lat + rng.random_range(-0.004..0.004),
            );
        }
        route.push(current);
    }
    route
}

pub fn demo<R: Rng>(rng: &mut R, fleet: usize, waypoints: usize, config: &SimConfig) -> Scenario {
    let waypoints = waypoints.max(2);
    let vehicles: Vec<_> = (0..fleet)
        .map(|i| VehicleInfo::new(VehicleId(i as u64 + 1), random_route(rng, waypoints)))
        .collect();

    let last_interval = (waypoints - 1) as Interval;
    let mut free_from: Vec<Interval> = vec![0; vehicles.len()];
    let mut events = Vec::new();
    let time_of = |interval: Interval| interval * Interval::from(config.time_interval);

    for trip in 0..fleet * 3 {
        let passenger_id = PassengerId(trip as u64 + 1);
        let appear = rng.random_range(0..last_interval.max(2) / 2);

        // pick the vehicle that frees up first
        let Some((slot, &free)) = free_from.iter().enumerate().min_by_key(|(_, f)| **f) else {
            break;
        };
        let vehicle = &vehicles[slot];
        let order = (appear + 1).max(free);
        let pickup = order + rng.random_range(2..5);
        let dropoff = pickup + rng.random_range(2..6);
        let cancelled = rng.random_bool(0.2);
        if dropoff >= last_interval && !cancelled {
            continue;
        }

        let meeting_point = vehicle.route[(pickup as usize).min(waypoints - 1)];
        events.push(TimelineEvent::new(
            appear,
            Action::PassengerAppear(PassengerAppear {
                passenger_id,
                coordinates: meeting_point,
                range: 0.3,
            }),
        ));

        if cancelled {
            events.push(TimelineEvent::new(
                appear + 2,
                Action::Cancel(Cancel { passenger_id }),
            ));
            continue;
        }

        if rng.random_bool(0.3) && appear + 1 < order {
            events.push(TimelineEvent::new(
                appear + 1,
                Action::RangeUpdate(RangeUpdate {
                    passenger_id,
                    coordinates: None,
                    new_range: 0.6,
                }),
            ));
        }
        events.push(TimelineEvent::new(
            order,
            Action::OrderReceived(OrderReceived {
                passenger_id,
                vehicle_id: vehicle.id,
                pick_up_time: time_of(pickup),
            }),
        ));
        events.push(TimelineEvent::new(
            pickup,
            Action::PickUp(PickUp {
                passenger_id,
                vehicle_id: vehicle.id,
            }),
        ));
        events.push(TimelineEvent::new(
            dropoff,
            Action::DropOff(DropOff {
                vehicle_id: vehicle.id,
            }),
        ));
        free_from[slot] = dropoff + 1;
    }

    events.sort_by_key(|e| e.trigger_interval);
    Scenario { vehicles, events }
}
