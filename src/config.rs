use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::simulation::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimConfig {
    #[serde(alias = "carMovingStepsPerTimeInterval")]
    pub steps_per_interval: u32,
    pub time_interval: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            steps_per_interval: 10,
            time_interval: 1,
        }
    }
}

impl SimConfig {
    pub fn new(steps_per_interval: u32, time_interval: u32) -> Result<Self, SimError> {
        let config = Self {
            steps_per_interval,
            time_interval,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.steps_per_interval == 0 {
            return Err(SimError::InvalidConfig {
                reason: "stepsPerInterval must be positive".to_string(),
            });
        }
        if self.time_interval == 0 {
            return Err(SimError::InvalidConfig {
                reason: "timeInterval must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read config {}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&text)
            .with_context(|| format!("unable to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
}
