use serde::Serialize;

use crate::model::{
    passenger::PassengerId, vehicle_info::VehicleId, waypoint::Waypoint, MapType,
};

#[derive(Debug, Clone)]
pub struct Arena<K, V> {
    slots: Vec<Option<(K, V)>>,
    index: MapType<K, usize>,
    free: Vec<usize>,
}

impl<K: Ord + Copy, V> Arena<K, V> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: MapType::new(),
            free: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: K, value: V) -> Result<usize, V> {
        if self.index.contains_key(&key) {
            return Err(value);
        }
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some((key, value));
                slot
            }
            None => {
                self.slots.push(Some((key, value)));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, slot);
        Ok(slot)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        self.free.push(slot);
        self.slots[slot].take().map(|(_, v)| v)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.slots[slot].as_ref().map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let slot = *self.index.get(key)?;
        self.slots[slot].as_mut().map(|(_, v)| v)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots.iter().flatten().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.slots.iter_mut().flatten().map(|(k, v)| (&*k, v))
    }
}

impl<K: Ord + Copy, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VehicleStatus {
    Idle,
    DrivingToPickup,
    DrivingToDropoff,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 3] = [
        VehicleStatus::Idle,
        VehicleStatus::DrivingToPickup,
        VehicleStatus::DrivingToDropoff,
    ];

    pub fn icon(&self) -> &'static str {
        match self {
            VehicleStatus::Idle => "car-green",
            VehicleStatus::DrivingToPickup => "car-yellow",
            VehicleStatus::DrivingToDropoff => "car-red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleState {
    id: VehicleId,
    position: Waypoint,
    heading: Option<f64>,
    status: VehicleStatus,
    pickup_route: Option<Vec<Waypoint>>,
}

impl VehicleState {
    pub fn new(id: VehicleId, position: Waypoint) -> Self {
        Self {
            id,
            position,
            heading: None,
            status: VehicleStatus::Idle,
            pickup_route: None,
        }
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn position(&self) -> Waypoint {
        self.position
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    pub fn status(&self) -> VehicleStatus {
        self.status
    }

    /// Remaining line to the pickup point, nearest point last.
    pub fn pickup_route(&self) -> Option<&[Waypoint]> {
        self.pickup_route.as_deref()
    }

    pub(super) fn set_position(&mut self, position: Waypoint) {
        self.position = position;
    }

    pub(super) fn set_heading(&mut self, heading: f64) {
        self.heading = Some(heading);
    }

    pub(super) fn set_status(&mut self, status: VehicleStatus) {
        self.status = status;
    }

    pub(super) fn set_pickup_route(&mut self, route: Vec<Waypoint>) {
        self.pickup_route = Some(route);
    }

    pub(super) fn take_pickup_route(&mut self) -> Option<Vec<Waypoint>> {
        self.pickup_route.take()
    }

    /// Drops the point nearest to the vehicle. Returns whether a point was
    /// removed; an exhausted route is left as is.
    pub(super) fn pop_pickup_point(&mut self) -> bool {
        match self.pickup_route.as_mut() {
            Some(route) if !route.is_empty() => {
                route.pop();
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PassengerLifecycle {
    Visible,
    Matched,
    PickedUp,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassengerState {
    pub id: PassengerId,
    pub position: Waypoint,
    pub radius: f64,
    pub lifecycle: PassengerLifecycle,
}

impl PassengerState {
    pub fn new(id: PassengerId, position: Waypoint, radius: f64) -> Self {
        Self {
            id,
            position,
            radius,
            lifecycle: PassengerLifecycle::Visible,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Selection {
    Vehicle(VehicleId),
    Passenger(PassengerId),
}

#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    vehicles: Arena<VehicleId, VehicleState>,
    passengers: Arena<PassengerId, PassengerState>,
    selected_vehicle: Option<VehicleId>,
    selected_passenger: Option<PassengerId>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> EntityRegistry {
        self.clone()
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&VehicleState> {
        self.vehicles.get(&id)
    }

    pub(super) fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut VehicleState> {
        self.vehicles.get_mut(&id)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &VehicleState> {
        self.vehicles.iter().map(|(_, v)| v)
    }

    pub(super) fn vehicles_mut(&mut self) -> impl Iterator<Item = &mut VehicleState> {
        self.vehicles.iter_mut().map(|(_, v)| v)
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub(super) fn insert_vehicle(&mut self, state: VehicleState) -> Result<usize, VehicleState> {
        self.vehicles.insert(state.id, state)
    }

    pub fn passenger(&self, id: PassengerId) -> Option<&PassengerState> {
        self.passengers.get(&id)
    }

    pub(super) fn passenger_mut(&mut self, id: PassengerId) -> Option<&mut PassengerState> {
        self.passengers.get_mut(&id)
    }

    pub fn passengers(&self) -> impl Iterator<Item = &PassengerState> {
        self.passengers.iter().map(|(_, p)| p)
    }

    pub fn passenger_count(&self) -> usize {
        self.passengers.len()
    }

    pub(super) fn insert_passenger(
        &mut self,
        state: PassengerState,
    ) -> Result<usize, PassengerState> {
        self.passengers.insert(state.id, state)
    }

    pub(super) fn remove_passenger(&mut self, id: PassengerId) -> Option<PassengerState> {
        let removed = self.passengers.remove(&id);
        if removed.is_some() && self.selected_passenger == Some(id) {
            self.selected_passenger = None;
        }
        removed
    }

    pub fn select(&mut self, selection: Selection) -> bool {
        match selection {
            Selection::Vehicle(id) if self.vehicles.contains(&id) => {
                self.selected_vehicle = Some(id);
                true
            }
            Selection::Passenger(id) if self.passengers.contains(&id) => {
                self.selected_passenger = Some(id);
                true
            }
            _ => false,
        }
    }

    pub fn selected_vehicle(&self) -> Option<VehicleId> {
        self.selected_vehicle
    }

    pub fn selected_passenger(&self) -> Option<PassengerId> {
        self.selected_passenger
    }
}
