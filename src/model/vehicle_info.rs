use std::{
    fmt::{Debug, Display},
    path::Path,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use super::{read_json, waypoint::Route};

#[derive(Clone, Copy, Deserialize, Serialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct VehicleId(pub u64);

impl Debug for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.0, f)
    }
}

impl Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleInfo {
    pub id: VehicleId,
    pub route: Route,
}

impl VehicleInfo {
    pub fn new(id: VehicleId, route: Route) -> Self {
        Self { id, route }
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Vec<VehicleInfo>> {
        let path = path.as_ref();
        read_json(path).with_context(|| format!("unable to load drivers from {}", path.display()))
    }
}
