use serde::Serialize;

use crate::model::{passenger::PassengerId, vehicle_info::VehicleId, waypoint::Waypoint};

use super::registry::VehicleStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderOp {
    Add,
    Update,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderTarget {
    Marker,
    Line,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderData {
    None,
    StatusIcon { icon: &'static str },
    PulsingDot { radius: f64 },
    VehicleMarker {
        position: Waypoint,
        heading: Option<f64>,
        icon: &'static str,
    },
    PassengerMarker { position: Waypoint, image: String },
    Line { coordinates: Vec<Waypoint> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderIntent {
    pub op: RenderOp,
    pub target: RenderTarget,
    pub id: String,
    pub data: RenderData,
}

impl RenderIntent {
    pub fn add(target: RenderTarget, id: String, data: RenderData) -> Self {
        Self {
            op: RenderOp::Add,
            target,
            id,
            data,
        }
    }

    pub fn update(target: RenderTarget, id: String, data: RenderData) -> Self {
        Self {
            op: RenderOp::Update,
            target,
            id,
            data,
        }
    }

    pub fn remove(target: RenderTarget, id: String) -> Self {
        Self {
            op: RenderOp::Remove,
            target,
            id,
            data: RenderData::None,
        }
    }
}

pub fn vehicle_marker_id(id: VehicleId) -> String {
    format!("driver-{id}")
}

pub fn pickup_line_id(id: VehicleId) -> String {
    format!("driver-{id}-pickup-route")
}

pub fn passenger_marker_id(id: PassengerId) -> String {
    format!("passenger-{id}")
}

pub fn passenger_image_id(id: PassengerId) -> String {
    format!("passenger-{id}-dot")
}

pub fn status_icon_intent(status: VehicleStatus) -> RenderIntent {
    RenderIntent::add(
        RenderTarget::Image,
        status.icon().to_string(),
        RenderData::StatusIcon {
            icon: status.icon(),
        },
    )
}
