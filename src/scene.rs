use tracing::debug;

use crate::{
    model::MapType,
    simulation::render::{RenderData, RenderIntent, RenderOp, RenderTarget},
};

#[derive(Debug, Clone, Default)]
pub struct SceneMirror {
    live: MapType<(RenderTarget, String), RenderData>,
    anomalies: usize,
}

impl SceneMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one intent. Returns `false` for an intent a real renderer
    /// would reject: adding an element that exists, or updating/removing one
    /// that does not.
    pub fn apply(&mut self, intent: &RenderIntent) -> bool {
        let key = (intent.target, intent.id.clone());
        let clean = match intent.op {
            RenderOp::Add => self.live.insert(key, intent.data.clone()).is_none(),
            RenderOp::Update => match self.live.get_mut(&key) {
                Some(data) => {
                    *data = intent.data.clone();
                    true
                }
                None => false,
            },
            RenderOp::Remove => self.live.remove(&key).is_some(),
        };
        if !clean {
            self.anomalies += 1;
            debug!(op = ?intent.op, target = ?intent.target, id = %intent.id, "inconsistent render intent");
        }
        clean
    }

    pub fn apply_all<'a>(&mut self, intents: impl IntoIterator<Item = &'a RenderIntent>) {
        for intent in intents {
            self.apply(intent);
        }
    }

    pub fn get(&self, target: RenderTarget, id: &str) -> Option<&RenderData> {
        self.live.get(&(target, id.to_string()))
    }

    pub fn contains(&self, target: RenderTarget, id: &str) -> bool {
        self.get(target, id).is_some()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn count(&self, target: RenderTarget) -> usize {
        self.live.keys().filter(|(t, _)| *t == target).count()
    }

    pub fn anomalies(&self) -> usize {
        self.anomalies
    }
}
