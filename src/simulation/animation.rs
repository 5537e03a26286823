use derivative::Derivative;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{
    config::SimConfig,
    model::{
        action::TimelineEvent,
        vehicle_info::{VehicleId, VehicleInfo},
        waypoint::ResampledRoute,
    },
};

use super::{
    callback::SimulationCallback,
    clock::{Clock, Tick},
    error::{EntityRef, SimError},
    handler::{vehicle_marker_data, EventHandler},
    motion::{MotionEngine, ResampledRouteMap},
    registry::{EntityRegistry, Selection, VehicleState, VehicleStatus},
    render::{status_icon_intent, vehicle_marker_id, RenderIntent, RenderTarget},
    resample::resample,
    timeline::TimelineDispatcher,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub frames: u64,
    pub dispatched: u64,
    pub rejected: u64,
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct AnimationLoop {
    config: SimConfig,
    clock: Clock,
    motion: MotionEngine,
    timeline: TimelineDispatcher<TimelineEvent>,
    handler: EventHandler,
    registry: EntityRegistry,

    #[derivative(Debug = "ignore")]
    intents: Vec<RenderIntent>,
    delivered: usize,
    stats: RunStats,
    #[derivative(Debug = "ignore")]
    callbacks: Vec<Box<dyn SimulationCallback>>,
}

impl AnimationLoop {
    pub fn new(
        config: SimConfig,
        vehicles: Vec<VehicleInfo>,
        events: Vec<TimelineEvent>,
        callbacks: Vec<Box<dyn SimulationCallback>>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let steps = config.steps_per_interval;

        let mut routes = ResampledRouteMap::default();
        let mut registry = EntityRegistry::new();
        let mut intents: Vec<RenderIntent> =
            VehicleStatus::ALL.into_iter().map(status_icon_intent).collect();

        for vehicle in vehicles {
            let resampled = match resample(&vehicle.route, steps, Some(vehicle.id)) {
                Ok(resampled) => resampled,
                Err(err) => {
                    error!("{err}, vehicle skipped");
                    continue;
                }
            };
            let Some(start) = resampled.get(0) else {
                continue;
            };
            let state = VehicleState::new(vehicle.id, start);
            let marker = vehicle_marker_data(&state);
            if registry.insert_vehicle(state).is_err() {
                let err = SimError::DuplicateEntity(EntityRef::Vehicle(vehicle.id));
                warn!("{err}, vehicle skipped");
                continue;
            }
            intents.push(RenderIntent::add(
                RenderTarget::Marker,
                vehicle_marker_id(vehicle.id),
                marker,
            ));
            routes.insert(vehicle.id, resampled);
        }

        let motion = MotionEngine::new(routes, steps);
        let clock = Clock::new(motion.total_ticks(), steps);
        let timeline: TimelineDispatcher<_> = events.into_iter().collect();
        info!(
            vehicles = registry.vehicle_count(),
            events = timeline.pending(),
            total_ticks = clock.total_ticks(),
            steps_per_interval = steps,
            "animation ready"
        );

        Ok(Self {
            config,
            clock,
            motion,
            timeline,
            handler: EventHandler::new(steps, config.time_interval),
            registry,
            intents,
            delivered: 0,
            stats: RunStats::default(),
            callbacks,
        })
    }

    /// Runs one frame and returns whether another frame should follow.
    pub fn run_frame(&mut self) -> bool {
        if self.clock.is_terminal() {
            return false;
        }

        let tick = self.clock.advance();
        self.stats.frames += 1;
        self.motion.step(tick, &mut self.registry, &mut self.intents);

        if self.clock.is_boundary() {
            let interval = self.clock.current_interval();
            debug!("{} / {}", interval, self.clock.total_intervals());
            for event in self.timeline.resolve(interval) {
                self.dispatch(&event, tick);
            }
        }

        self.notify_intents(tick);

        let more = !self.clock.is_terminal();
        if !more {
            self.finish();
        }
        more
    }

    /// Runs frames until the animation ends. Intents are dropped once the
    /// callbacks have seen them.
    pub fn run(&mut self) -> RunStats {
        loop {
            let more = self.run_frame();
            self.intents.clear();
            self.delivered = 0;
            if !more {
                return self.stats;
            }
        }
    }

    fn dispatch(&mut self, event: &TimelineEvent, tick: Tick) {
        self.callbacks
            .iter_mut()
            .for_each(|cb| cb.visit_event(event, tick));
        let result = self.handler.apply(
            &event.action,
            tick,
            self.motion.routes(),
            &mut self.registry,
            &mut self.intents,
        );
        match result {
            Ok(()) => self.stats.dispatched += 1,
            Err(err) => {
                warn!(
                    tick,
                    interval = event.trigger_interval,
                    action = %event.action.action_type(),
                    "{err}, action dropped"
                );
                self.stats.rejected += 1;
                self.callbacks
                    .iter_mut()
                    .for_each(|cb| cb.visit_rejected(event, &err, tick));
            }
        }
    }

    fn notify_intents(&mut self, tick: Tick) {
        let fresh = &self.intents[self.delivered..];
        if !fresh.is_empty() {
            self.callbacks
                .iter_mut()
                .for_each(|cb| cb.visit_intents(tick, fresh));
        }
        self.delivered = self.intents.len();
    }

    fn finish(&self) {
        let missed = self.timeline.missed().count();
        let pending = self.timeline.pending() - missed;
        if missed > 0 {
            warn!(missed, "events scheduled on intervals that were never resolved");
        }
        if pending > 0 {
            warn!(pending, "events scheduled after the end of the animation");
        }
        info!(
            frames = self.stats.frames,
            dispatched = self.stats.dispatched,
            rejected = self.stats.rejected,
            "animation finished"
        );
    }

    pub fn select(&mut self, selection: Selection) -> bool {
        let selected = self.registry.select(selection);
        if !selected {
            let entity = match selection {
                Selection::Vehicle(id) => EntityRef::Vehicle(id),
                Selection::Passenger(id) => EntityRef::Passenger(id),
            };
            warn!("{}, selection ignored", SimError::MissingEntity(entity));
        }
        selected
    }

    pub fn drain_intents(&mut self) -> Vec<RenderIntent> {
        self.delivered = 0;
        std::mem::take(&mut self.intents)
    }

    pub fn fork(&self) -> Self {
        self.clone()
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> EntityRegistry {
        self.registry.snapshot()
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn route(&self, id: VehicleId) -> Option<&ResampledRoute> {
        self.motion.route(id)
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }
}
