use dyn_clone::DynClone;

use crate::model::action::TimelineEvent;

use super::{clock::Tick, error::SimError, render::RenderIntent};

pub trait SimulationCallback: DynClone {
    fn visit_event(&mut self, _event: &TimelineEvent, _tick: Tick) {}
    fn visit_rejected(&mut self, _event: &TimelineEvent, _error: &SimError, _tick: Tick) {}
    fn visit_intents(&mut self, _tick: Tick, _intents: &[RenderIntent]) {}
}

dyn_clone::clone_trait_object!(SimulationCallback);
