use tracing::debug;

use crate::model::{
    action::{Action, DropOff, OrderReceived, PassengerAppear, PickUp, RangeUpdate},
    passenger::PassengerId,
};

use super::{
    clock::Tick,
    error::{EntityRef, SimError},
    motion::ResampledRouteMap,
    registry::{EntityRegistry, PassengerLifecycle, PassengerState, VehicleState, VehicleStatus},
    render::{
        passenger_image_id, passenger_marker_id, pickup_line_id, vehicle_marker_id, RenderData,
        RenderIntent, RenderTarget,
    },
};

#[derive(Debug, Clone, Copy)]
pub struct EventHandler {
    steps_per_interval: u32,
    time_interval: u32,
}

impl EventHandler {
    pub fn new(steps_per_interval: u32, time_interval: u32) -> Self {
        Self {
            steps_per_interval: steps_per_interval.max(1),
            time_interval: time_interval.max(1),
        }
    }

    pub fn tick_of(&self, time: u64) -> Tick {
        time.saturating_mul(Tick::from(self.steps_per_interval)) / Tick::from(self.time_interval)
    }

    pub fn apply(
        &self,
        action: &Action,
        tick: Tick,
        routes: &ResampledRouteMap,
        registry: &mut EntityRegistry,
        intents: &mut Vec<RenderIntent>,
    ) -> Result<(), SimError> {
        debug!(tick, action = %action.action_type(), "{action:?}");
        match action {
            Action::PassengerAppear(data) => Self::passenger_appear(data, registry, intents),
            Action::RangeUpdate(data) => Self::range_update(data, registry, intents),
            Action::OrderReceived(data) => {
                self.order_received(data, tick, routes, registry, intents)
            }
            Action::PickUp(data) => Self::pick_up(data, registry, intents),
            Action::DropOff(data) => Self::drop_off(data, registry, intents),
            Action::Cancel(data) => {
                Self::cancel(data.passenger_id, PassengerLifecycle::Cancelled, registry, intents);
                Ok(())
            }
        }
    }

    fn passenger_appear(
        data: &PassengerAppear,
        registry: &mut EntityRegistry,
        intents: &mut Vec<RenderIntent>,
    ) -> Result<(), SimError> {
        let state = PassengerState::new(data.passenger_id, data.coordinates, data.range);
        if registry.insert_passenger(state).is_err() {
            return Err(SimError::DuplicateEntity(EntityRef::Passenger(
                data.passenger_id,
            )));
        }
        Self::add_passenger_visuals(data.passenger_id, registry, intents);
        Ok(())
    }

    fn range_update(
        data: &RangeUpdate,
        registry: &mut EntityRegistry,
        intents: &mut Vec<RenderIntent>,
    ) -> Result<(), SimError> {
        let passenger = registry
            .passenger_mut(data.passenger_id)
            .filter(|p| p.lifecycle == PassengerLifecycle::Visible)
            .ok_or_else(|| SimError::missing_passenger(data.passenger_id))?;
        passenger.radius = data.new_range;
        if let Some(position) = data.coordinates {
            passenger.position = position;
        }
        Self::remove_passenger_visuals(data.passenger_id, intents);
        Self::add_passenger_visuals(data.passenger_id, registry, intents);
        Ok(())
    }

    fn order_received(
        &self,
        data: &OrderReceived,
        tick: Tick,
        routes: &ResampledRouteMap,
        registry: &mut EntityRegistry,
        intents: &mut Vec<RenderIntent>,
    ) -> Result<(), SimError> {
        let route = routes
            .get(&data.vehicle_id)
            .ok_or_else(|| SimError::missing_vehicle(data.vehicle_id))?;
        let pickup_tick = self.tick_of(data.pick_up_time);
        if pickup_tick < tick {
            return Err(SimError::TemporalOrdering {
                vehicle_id: data.vehicle_id,
                pickup_tick,
                current_tick: tick,
            });
        }
        let vehicle = registry
            .vehicle_mut(data.vehicle_id)
            .ok_or_else(|| SimError::missing_vehicle(data.vehicle_id))?;

        let arc = route.reversed_slice(
            usize::try_from(tick).unwrap_or(usize::MAX),
            usize::try_from(pickup_tick).unwrap_or(usize::MAX),
        );
        if vehicle.take_pickup_route().is_some() {
            intents.push(RenderIntent::remove(
                RenderTarget::Line,
                pickup_line_id(data.vehicle_id),
            ));
        }
        intents.push(RenderIntent::add(
            RenderTarget::Line,
            pickup_line_id(data.vehicle_id),
            RenderData::Line {
                coordinates: arc.clone(),
            },
        ));
        vehicle.set_pickup_route(arc);
        Self::set_status(vehicle, VehicleStatus::DrivingToPickup, intents);

        match registry.passenger_mut(data.passenger_id) {
            Some(passenger) => passenger.lifecycle = PassengerLifecycle::Matched,
            None => debug!(passenger = %data.passenger_id, "order for a passenger not on the map"),
        }
        Ok(())
    }

    fn pick_up(
        data: &PickUp,
        registry: &mut EntityRegistry,
        intents: &mut Vec<RenderIntent>,
    ) -> Result<(), SimError> {
        let vehicle = registry
            .vehicle_mut(data.vehicle_id)
            .ok_or_else(|| SimError::missing_vehicle(data.vehicle_id))?;
        if vehicle.take_pickup_route().is_none() {
            return Err(SimError::MissingEntity(EntityRef::PickupRoute(
                data.vehicle_id,
            )));
        }
        intents.push(RenderIntent::remove(
            RenderTarget::Line,
            pickup_line_id(data.vehicle_id),
        ));
        Self::set_status(vehicle, VehicleStatus::DrivingToDropoff, intents);

        if !Self::cancel(data.passenger_id, PassengerLifecycle::PickedUp, registry, intents) {
            debug!(passenger = %data.passenger_id, "picked up a passenger not on the map");
        }
        Ok(())
    }

    fn drop_off(
        data: &DropOff,
        registry: &mut EntityRegistry,
        intents: &mut Vec<RenderIntent>,
    ) -> Result<(), SimError> {
        let vehicle = registry
            .vehicle_mut(data.vehicle_id)
            .ok_or_else(|| SimError::missing_vehicle(data.vehicle_id))?;
        Self::set_status(vehicle, VehicleStatus::Idle, intents);
        Ok(())
    }

    /// Takes a passenger off the map, ending in `lifecycle`. Returns whether
    /// the passenger existed; an unknown id is a silent no-op.
    fn cancel(
        passenger_id: PassengerId,
        lifecycle: PassengerLifecycle,
        registry: &mut EntityRegistry,
        intents: &mut Vec<RenderIntent>,
    ) -> bool {
        let Some(mut passenger) = registry.remove_passenger(passenger_id) else {
            return false;
        };
        passenger.lifecycle = lifecycle;
        debug!(passenger = %passenger_id, lifecycle = ?passenger.lifecycle, "passenger removed");
        Self::remove_passenger_visuals(passenger_id, intents);
        true
    }

    fn add_passenger_visuals(
        passenger_id: PassengerId,
        registry: &EntityRegistry,
        intents: &mut Vec<RenderIntent>,
    ) {
        let Some(passenger) = registry.passenger(passenger_id) else {
            return;
        };
        intents.push(RenderIntent::add(
            RenderTarget::Image,
            passenger_image_id(passenger_id),
            RenderData::PulsingDot {
                radius: passenger.radius,
            },
        ));
        intents.push(RenderIntent::add(
            RenderTarget::Marker,
            passenger_marker_id(passenger_id),
            RenderData::PassengerMarker {
                position: passenger.position,
                image: passenger_image_id(passenger_id),
            },
        ));
    }

    fn remove_passenger_visuals(passenger_id: PassengerId, intents: &mut Vec<RenderIntent>) {
        intents.push(RenderIntent::remove(
            RenderTarget::Marker,
            passenger_marker_id(passenger_id),
        ));
        intents.push(RenderIntent::remove(
            RenderTarget::Image,
            passenger_image_id(passenger_id),
        ));
    }

    fn set_status(
        vehicle: &mut VehicleState,
        status: VehicleStatus,
        intents: &mut Vec<RenderIntent>,
    ) {
        vehicle.set_status(status);
        intents.push(vehicle_marker_intent(vehicle));
    }
}

pub(crate) fn vehicle_marker_data(vehicle: &VehicleState) -> RenderData {
    RenderData::VehicleMarker {
        position: vehicle.position(),
        heading: vehicle.heading(),
        icon: vehicle.status().icon(),
    }
}

fn vehicle_marker_intent(vehicle: &VehicleState) -> RenderIntent {
    RenderIntent::update(
        RenderTarget::Marker,
        vehicle_marker_id(vehicle.id()),
        vehicle_marker_data(vehicle),
    )
}
