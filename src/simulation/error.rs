use std::error::Error;
use std::fmt;

use crate::model::{passenger::PassengerId, vehicle_info::VehicleId};

use super::clock::Tick;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Vehicle(VehicleId),
    Passenger(PassengerId),
    PickupRoute(VehicleId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vehicle(id) => write!(f, "vehicle {id}"),
            Self::Passenger(id) => write!(f, "passenger {id}"),
            Self::PickupRoute(id) => write!(f, "pickup route of vehicle {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    InvalidRoute {
        vehicle_id: Option<VehicleId>,
        waypoints: usize,
    },
    /// An order whose pickup lies before the current tick.
    TemporalOrdering {
        vehicle_id: VehicleId,
        pickup_tick: Tick,
        current_tick: Tick,
    },
    MissingEntity(EntityRef),
    DuplicateEntity(EntityRef),
    UnknownAction { action_type: String },
    InvalidConfig { reason: String },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRoute {
                vehicle_id: Some(id),
                waypoints,
            } => write!(
                f,
                "invalid route for vehicle {id}: {waypoints} waypoints, need at least 2 finite ones"
            ),
            Self::InvalidRoute {
                vehicle_id: None,
                waypoints,
            } => write!(
                f,
                "invalid route: {waypoints} waypoints, need at least 2 finite ones"
            ),
            Self::TemporalOrdering {
                vehicle_id,
                pickup_tick,
                current_tick,
            } => write!(
                f,
                "pick-up time is before current time for vehicle {vehicle_id} \
                 (pickup tick {pickup_tick} < current tick {current_tick})"
            ),
            Self::MissingEntity(entity) => write!(f, "no such {entity}"),
            Self::DuplicateEntity(entity) => write!(f, "{entity} already exists"),
            Self::UnknownAction { action_type } => write!(f, "no such action type {action_type:?}"),
            Self::InvalidConfig { reason } => write!(f, "invalid configuration: {reason}"),
        }
    }
}

impl Error for SimError {}

impl SimError {
    pub(crate) fn invalid_route(vehicle_id: Option<VehicleId>, waypoints: usize) -> Self {
        Self::InvalidRoute {
            vehicle_id,
            waypoints,
        }
    }

    pub(crate) fn missing_vehicle(id: VehicleId) -> Self {
        Self::MissingEntity(EntityRef::Vehicle(id))
    }

    pub(crate) fn missing_passenger(id: PassengerId) -> Self {
        Self::MissingEntity(EntityRef::Passenger(id))
    }
}
