use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Waypoint {
    pub lon: f64,
    pub lat: f64,
}

impl Waypoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

impl From<[f64; 2]> for Waypoint {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Waypoint> for [f64; 2] {
    fn from(value: Waypoint) -> Self {
        [value.lon, value.lat]
    }
}

impl Debug for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lon, self.lat)
    }
}

impl Display for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lon, self.lat)
    }
}

pub type Route = Vec<Waypoint>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResampledRoute {
    points: Vec<Waypoint>,
}

impl ResampledRoute {
    pub(crate) fn new(points: Vec<Waypoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Waypoint> {
        self.points.get(index).copied()
    }

    /// Points `[start, end)` in reverse order, clamped to the route length.
    pub fn reversed_slice(&self, start: usize, end: usize) -> Vec<Waypoint> {
        let end = end.min(self.points.len());
        if start >= end {
            return Vec::new();
        }
        self.points[start..end].iter().rev().copied().collect()
    }
}
