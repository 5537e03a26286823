use std::sync::{Arc, Mutex};

use fleet_anim::{
    config::SimConfig,
    model::{
        action::{Action, DropOff, OrderReceived, PassengerAppear, PickUp, TimelineEvent},
        passenger::PassengerId,
        vehicle_info::{VehicleId, VehicleInfo},
        waypoint::{Route, Waypoint},
    },
    scene::SceneMirror,
    simulation::{
        animation::AnimationLoop,
        callback::SimulationCallback,
        clock::Tick,
        error::SimError,
        registry::{Selection, VehicleStatus},
        render::{
            passenger_image_id, passenger_marker_id, pickup_line_id, RenderIntent, RenderTarget,
        },
    },
};

fn straight_route(waypoints: usize) -> Route {
    (0..waypoints)
        .map(|i| Waypoint::new(114.16 + i as f64 * 0.002, 22.31))
        .collect()
}

fn appear(passenger: u64, interval: u64) -> TimelineEvent {
    TimelineEvent::new(
        interval,
        Action::PassengerAppear(PassengerAppear {
            passenger_id: PassengerId(passenger),
            coordinates: Waypoint::new(114.17, 22.31),
            range: 0.3,
        }),
    )
}

fn order(passenger: u64, driver: u64, interval: u64, pick_up_time: u64) -> TimelineEvent {
    TimelineEvent::new(
        interval,
        Action::OrderReceived(OrderReceived {
            passenger_id: PassengerId(passenger),
            vehicle_id: VehicleId(driver),
            pick_up_time,
        }),
    )
}

fn run_to_end(animation: &mut AnimationLoop, scene: &mut SceneMirror) {
    loop {
        let more = animation.run_frame();
        scene.apply_all(&animation.drain_intents());
        if !more {
            break;
        }
    }
}

#[derive(Clone, Default)]
struct Recorder {
    events: Arc<Mutex<Vec<(Tick, String)>>>,
    rejected: Arc<Mutex<Vec<SimError>>>,
    intents: Arc<Mutex<usize>>,
}

impl SimulationCallback for Recorder {
    fn visit_event(&mut self, event: &TimelineEvent, tick: Tick) {
        self.events
            .lock()
            .unwrap()
            .push((tick, event.action.action_type().to_string()));
    }

    fn visit_rejected(&mut self, _event: &TimelineEvent, error: &SimError, _tick: Tick) {
        self.rejected.lock().unwrap().push(error.clone());
    }

    fn visit_intents(&mut self, _tick: Tick, intents: &[RenderIntent]) {
        *self.intents.lock().unwrap() += intents.len();
    }
}

#[test]
fn full_trip_leaves_nothing_behind() {
    let config = SimConfig::new(3, 1).unwrap();
    let vehicles = vec![VehicleInfo::new(VehicleId(1), straight_route(10))];
    let events = vec![
        appear(1, 0),
        order(1, 1, 1, 4),
        TimelineEvent::new(
            4,
            Action::PickUp(PickUp {
                passenger_id: PassengerId(1),
                vehicle_id: VehicleId(1),
            }),
        ),
        TimelineEvent::new(
            6,
            Action::DropOff(DropOff {
                vehicle_id: VehicleId(1),
            }),
        ),
    ];
    let mut animation = AnimationLoop::new(config, vehicles, events, vec![]).unwrap();
    let mut scene = SceneMirror::new();
    run_to_end(&mut animation, &mut scene);

    let stats = animation.stats();
    assert_eq!(stats.frames, 27);
    assert_eq!(stats.dispatched, 4);
    assert_eq!(stats.rejected, 0);

    let registry = animation.registry();
    assert!(registry.passenger(PassengerId(1)).is_none());
    let vehicle = registry.vehicle(VehicleId(1)).unwrap();
    assert_eq!(vehicle.status(), VehicleStatus::Idle);
    assert_eq!(vehicle.pickup_route(), None);

    let passenger = PassengerId(1);
    assert!(!scene.contains(RenderTarget::Marker, &passenger_marker_id(passenger)));
    assert!(!scene.contains(RenderTarget::Image, &passenger_image_id(passenger)));
    assert!(!scene.contains(RenderTarget::Line, &pickup_line_id(VehicleId(1))));
    assert_eq!(scene.anomalies(), 0);
    // the vehicle marker and the three status icons remain
    assert_eq!(scene.len(), 4);
}

#[test]
fn order_at_interval_five_slices_route_to_pickup() {
    let config = SimConfig::new(1, 1).unwrap();
    let route = straight_route(15);
    let vehicles = vec![VehicleInfo::new(VehicleId(1), route.clone())];
    let events = vec![order(1, 1, 5, 10)];
    let mut animation = AnimationLoop::new(config, vehicles, events, vec![]).unwrap();

    for _ in 0..5 {
        assert!(animation.run_frame());
        let vehicle = animation.registry().vehicle(VehicleId(1)).unwrap();
        assert_eq!(vehicle.status(), VehicleStatus::Idle);
    }
    assert!(animation.run_frame());
    assert_eq!(animation.clock().tick(), 5);

    let vehicle = animation.registry().vehicle(VehicleId(1)).unwrap();
    assert_eq!(vehicle.status(), VehicleStatus::DrivingToPickup);
    let expected: Vec<_> = route[5..10].iter().rev().copied().collect();
    assert_eq!(vehicle.pickup_route(), Some(&expected[..]));

    // the next frame moves the vehicle on and trims the nearest point
    assert!(animation.run_frame());
    let vehicle = animation.registry().vehicle(VehicleId(1)).unwrap();
    assert_eq!(vehicle.position(), route[6]);
    assert_eq!(vehicle.pickup_route(), Some(&expected[..4]));
}

#[test]
fn position_matches_route_on_every_tick() {
    let config = SimConfig::new(4, 1).unwrap();
    let vehicles = vec![
        VehicleInfo::new(VehicleId(1), straight_route(6)),
        VehicleInfo::new(
            VehicleId(2),
            vec![
                Waypoint::new(114.2, 22.3),
                Waypoint::new(114.2, 22.3),
                Waypoint::new(114.21, 22.32),
            ],
        ),
    ];
    let mut animation = AnimationLoop::new(config, vehicles, vec![], vec![]).unwrap();
    assert_eq!(animation.clock().total_ticks(), 20);

    loop {
        let more = animation.run_frame();
        let tick = animation.clock().tick() as usize;
        for id in [VehicleId(1), VehicleId(2)] {
            let route = animation.route(id).unwrap();
            let vehicle = animation.registry().vehicle(id).unwrap();
            let expected = route.get(tick.min(route.len() - 1)).unwrap();
            assert_eq!(vehicle.position(), expected, "vehicle {id} at tick {tick}");
            if let Some(heading) = vehicle.heading() {
                assert!((0.0..360.0).contains(&heading));
            }
        }
        if !more {
            break;
        }
    }
    assert_eq!(animation.clock().tick(), 19);
    assert!(!animation.run_frame());
    assert_eq!(animation.clock().tick(), 19);
}

#[test]
fn rejected_actions_do_not_stop_the_loop() {
    let config = SimConfig::new(2, 10).unwrap();
    let vehicles = vec![
        VehicleInfo::new(VehicleId(1), straight_route(8)),
        VehicleInfo::new(VehicleId(2), vec![Waypoint::new(114.0, 22.0)]),
    ];
    let events = vec![
        // pickup at timestamp 10 is interval 1, already past at interval 3
        order(1, 1, 3, 10),
        order(1, 2, 3, 60),
        TimelineEvent::new(
            4,
            Action::PickUp(PickUp {
                passenger_id: PassengerId(1),
                vehicle_id: VehicleId(1),
            }),
        ),
        appear(5, 5),
    ];
    let recorder = Recorder::default();
    let mut animation =
        AnimationLoop::new(config, vehicles, events, vec![Box::new(recorder.clone())]).unwrap();
    assert_eq!(animation.registry().vehicle_count(), 1);
    let stats = animation.run();

    assert_eq!(stats.rejected, 3);
    assert_eq!(stats.dispatched, 1);
    let rejected = recorder.rejected.lock().unwrap().clone();
    assert!(matches!(
        rejected[0],
        SimError::TemporalOrdering {
            pickup_tick: 2,
            current_tick: 6,
            ..
        }
    ));
    assert!(matches!(rejected[1], SimError::MissingEntity(_)));
    assert!(matches!(rejected[2], SimError::MissingEntity(_)));

    let events = recorder.events.lock().unwrap().clone();
    let ticks: Vec<_> = events.iter().map(|(tick, _)| *tick).collect();
    assert_eq!(ticks, vec![6, 6, 8, 10]);
    assert!(*recorder.intents.lock().unwrap() > 0);
    assert!(animation.drain_intents().is_empty());

    let vehicle = animation.registry().vehicle(VehicleId(1)).unwrap();
    assert_eq!(vehicle.status(), VehicleStatus::Idle);
    assert!(animation.registry().passenger(PassengerId(5)).is_some());
}

#[test]
fn run_hands_every_intent_to_callbacks_then_drops_it() {
    let config = SimConfig::new(2, 1).unwrap();
    let vehicles = vec![VehicleInfo::new(VehicleId(1), straight_route(4))];

    let mut stepped =
        AnimationLoop::new(config, vehicles.clone(), vec![appear(1, 1)], vec![]).unwrap();
    let mut expected = 0;
    loop {
        let more = stepped.run_frame();
        expected += stepped.drain_intents().len();
        if !more {
            break;
        }
    }

    let recorder = Recorder::default();
    let mut animation = AnimationLoop::new(
        config,
        vehicles,
        vec![appear(1, 1)],
        vec![Box::new(recorder.clone())],
    )
    .unwrap();
    animation.run();
    assert_eq!(*recorder.intents.lock().unwrap(), expected);
    assert!(animation.drain_intents().is_empty());
}

#[test]
fn fork_runs_ahead_independently() {
    let config = SimConfig::new(2, 1).unwrap();
    let vehicles = vec![VehicleInfo::new(VehicleId(1), straight_route(5))];
    let mut animation = AnimationLoop::new(config, vehicles, vec![appear(1, 2)], vec![]).unwrap();
    animation.run_frame();
    let snapshot = animation.snapshot();

    let mut fork = animation.fork();
    fork.run();
    assert!(fork.registry().passenger(PassengerId(1)).is_some());
    assert!(fork.clock().is_terminal());

    assert_eq!(animation.clock().tick(), 0);
    assert!(animation.registry().passenger(PassengerId(1)).is_none());
    assert_eq!(
        snapshot.vehicle(VehicleId(1)).unwrap(),
        animation.registry().vehicle(VehicleId(1)).unwrap()
    );
}

#[test]
fn selection_of_known_entities_only() {
    let config = SimConfig::new(1, 1).unwrap();
    let vehicles = vec![VehicleInfo::new(VehicleId(3), straight_route(3))];
    let mut animation = AnimationLoop::new(config, vehicles, vec![appear(8, 0)], vec![]).unwrap();
    assert!(!animation.select(Selection::Passenger(PassengerId(8))));
    animation.run_frame();
    assert!(animation.select(Selection::Passenger(PassengerId(8))));
    assert!(animation.select(Selection::Vehicle(VehicleId(3))));
    assert!(!animation.select(Selection::Vehicle(VehicleId(4))));
    assert_eq!(animation.registry().selected_vehicle(), Some(VehicleId(3)));
    assert_eq!(animation.registry().selected_passenger(), Some(PassengerId(8)));
}

#[test]
fn loads_timeline_in_original_format() {
    let config = SimConfig::new(2, 5).unwrap();
    let json = r#"{
        "0": [{"actionType": "passengerAppearAction",
               "data": [{"passengerid": 1, "passengerCoordinates": [114.17, 22.31], "range": 0.2}]}],
        "5": [{"actionType": "orderReceivedAction",
               "data": [{"passengerid": 1, "driverid": 1, "pickUpTime": "15"}]},
              {"actionType": "honkAction", "data": []}]
    }"#;
    let events = TimelineEvent::from_json_str(json, config.time_interval).unwrap();
    assert_eq!(events.len(), 2);

    let vehicles = vec![VehicleInfo::new(VehicleId(1), straight_route(6))];
    let mut animation = AnimationLoop::new(config, vehicles, events, vec![]).unwrap();
    let stats = animation.run();
    assert_eq!(stats.dispatched, 2);
    let vehicle = animation.registry().vehicle(VehicleId(1)).unwrap();
    assert_eq!(vehicle.status(), VehicleStatus::DrivingToPickup);
}
