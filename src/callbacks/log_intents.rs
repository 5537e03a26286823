use std::path::PathBuf;

use serde::Serialize;
use tracing::error;

use crate::{
    callbacks::dump_json,
    model::action::TimelineEvent,
    simulation::{
        callback::SimulationCallback, clock::Tick, error::SimError, render::RenderIntent,
    },
};

pub struct LogIntentsCallback {
    name: String,
    rejected: usize,
}

#[derive(Serialize)]
struct Rejection<'a> {
    event: &'a TimelineEvent,
    error: String,
}

impl LogIntentsCallback {
    pub fn new(name: String) -> Self {
        Self { name, rejected: 0 }
    }

    pub fn get_file(&self, tick: Tick, filename: &str) -> PathBuf {
        let mut dir = PathBuf::new();
        dir.push("logs");
        dir.push(&self.name);
        dir.push(format!("{}", tick));
        dir.push(filename);
        dir
    }
}

impl Clone for LogIntentsCallback {
    fn clone(&self) -> Self {
        Self {
            name: format!("{}_cloned", self.name),
            rejected: self.rejected,
        }
    }
}

impl SimulationCallback for LogIntentsCallback {
    fn visit_rejected(&mut self, event: &TimelineEvent, err: &SimError, tick: Tick) {
        let file = self.get_file(tick, &format!("rejected_{}.json", self.rejected));
        let rejection = Rejection {
            event,
            error: err.to_string(),
        };
        if let Err(err) = dump_json(file, &rejection) {
            error!("failed to write rejected action JSON file: {}", err);
        }
        self.rejected += 1;
    }

    fn visit_intents(&mut self, tick: Tick, intents: &[RenderIntent]) {
        if let Err(err) = dump_json(self.get_file(tick, "render_intents.json"), intents) {
            error!("failed to write render intents JSON file: {}", err);
        }
    }
}
