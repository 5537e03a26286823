use std::{fmt::Display, path::Path};

use anyhow::{anyhow, Context as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::simulation::{clock::Interval, error::SimError, timeline::Event};

use super::{
    passenger::PassengerId, read_json, vehicle_info::VehicleId, waypoint::Waypoint, MapType,
};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PassengerAppear {
    #[serde(rename = "passengerid")]
    pub passenger_id: PassengerId,
    #[serde(rename = "passengerCoordinates")]
    pub coordinates: Waypoint,
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RangeUpdate {
    #[serde(rename = "passengerid")]
    pub passenger_id: PassengerId,
    #[serde(rename = "passengerCoordinates", default)]
    pub coordinates: Option<Waypoint>,
    #[serde(rename = "newRange")]
    pub new_range: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderReceived {
    #[serde(rename = "passengerid")]
    pub passenger_id: PassengerId,
    #[serde(rename = "driverid")]
    pub vehicle_id: VehicleId,
    #[serde(rename = "pickUpTime", deserialize_with = "lenient_u64")]
    pub pick_up_time: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PickUp {
    #[serde(rename = "passengerid")]
    pub passenger_id: PassengerId,
    #[serde(rename = "driverid")]
    pub vehicle_id: VehicleId,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DropOff {
    #[serde(rename = "driverid")]
    pub vehicle_id: VehicleId,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Cancel {
    #[serde(rename = "passengerid")]
    pub passenger_id: PassengerId,
}

/// Accepts `30` as well as `"30"`.
fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(u64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionType {
    PassengerAppear,
    RangeUpdate,
    OrderReceived,
    PickUp,
    DropOff,
    Cancel,
}

impl ActionType {
    pub fn tag(&self) -> &'static str {
        match self {
            ActionType::PassengerAppear => "passengerAppearAction",
            ActionType::RangeUpdate => "rangeUpdateAction",
            ActionType::OrderReceived => "orderReceivedAction",
            ActionType::PickUp => "pickUpAction",
            ActionType::DropOff => "dropOffAction",
            ActionType::Cancel => "cancelAction",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, SimError> {
        Ok(match tag {
            "passengerAppearAction" => ActionType::PassengerAppear,
            "rangeUpdateAction" => ActionType::RangeUpdate,
            "orderReceivedAction" => ActionType::OrderReceived,
            "pickUpAction" => ActionType::PickUp,
            "dropOffAction" => ActionType::DropOff,
            "cancelAction" => ActionType::Cancel,
            other => {
                return Err(SimError::UnknownAction {
                    action_type: other.to_string(),
                })
            }
        })
    }
}

impl Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "actionType", content = "data", rename_all = "camelCase")]
pub enum Action {
    PassengerAppear(PassengerAppear),
    RangeUpdate(RangeUpdate),
    OrderReceived(OrderReceived),
    PickUp(PickUp),
    DropOff(DropOff),
    Cancel(Cancel),
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::PassengerAppear(_) => ActionType::PassengerAppear,
            Action::RangeUpdate(_) => ActionType::RangeUpdate,
            Action::OrderReceived(_) => ActionType::OrderReceived,
            Action::PickUp(_) => ActionType::PickUp,
            Action::DropOff(_) => ActionType::DropOff,
            Action::Cancel(_) => ActionType::Cancel,
        }
    }

    fn parse_one(action_type: ActionType, data: Value) -> serde_json::Result<Self> {
        Ok(match action_type {
            ActionType::PassengerAppear => Action::PassengerAppear(serde_json::from_value(data)?),
            ActionType::RangeUpdate => Action::RangeUpdate(serde_json::from_value(data)?),
            ActionType::OrderReceived => Action::OrderReceived(serde_json::from_value(data)?),
            ActionType::PickUp => Action::PickUp(serde_json::from_value(data)?),
            ActionType::DropOff => Action::DropOff(serde_json::from_value(data)?),
            ActionType::Cancel => Action::Cancel(serde_json::from_value(data)?),
        })
    }

    pub fn parse(action_type: ActionType, data: Value) -> serde_json::Result<Vec<Self>> {
        match data {
            Value::Array(items) => items
                .into_iter()
                .map(|item| Self::parse_one(action_type, item))
                .collect(),
            other => Ok(vec![Self::parse_one(action_type, other)?]),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAction {
    #[serde(rename = "actionType")]
    pub action_type: String,
    #[serde(default)]
    pub data: Value,
}

pub type RawTimeline = MapType<String, Vec<RawAction>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    pub trigger_interval: Interval,
    pub action: Action,
}

impl TimelineEvent {
    pub fn new(trigger_interval: Interval, action: Action) -> Self {
        Self {
            trigger_interval,
            action,
        }
    }

    pub fn from_raw(raw: RawTimeline, time_interval: u32) -> anyhow::Result<Vec<TimelineEvent>> {
        let time_interval = u64::from(time_interval);
        if time_interval == 0 {
            return Err(anyhow!("time interval must be positive"));
        }

        let mut keyed = raw
            .into_iter()
            .map(|(key, actions)| {
                key.trim()
                    .parse::<u64>()
                    .map(|time| (time, actions))
                    .with_context(|| format!("invalid timeline timestamp {key:?}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        keyed.sort_by_key(|(time, _)| *time);

        let mut events = Vec::new();
        for (time, actions) in keyed {
            if time % time_interval != 0 {
                warn!(
                    time,
                    time_interval, "timestamp is not on an interval boundary, dropping its actions"
                );
                continue;
            }
            let interval = time / time_interval;
            for raw_action in actions {
                let action_type = match ActionType::from_tag(&raw_action.action_type) {
                    Ok(action_type) => action_type,
                    Err(err) => {
                        warn!(time, "{err}");
                        continue;
                    }
                };
                let parsed = Action::parse(action_type, raw_action.data)
                    .with_context(|| format!("malformed {action_type} payload at time {time}"))?;
                events.extend(parsed.into_iter().map(|a| TimelineEvent::new(interval, a)));
            }
        }

        Ok(events)
    }

    pub fn from_json_str(json: &str, time_interval: u32) -> anyhow::Result<Vec<TimelineEvent>> {
        let raw: RawTimeline = serde_json::from_str(json).context("unable to parse timeline")?;
        Self::from_raw(raw, time_interval)
    }

    pub fn load(path: impl AsRef<Path>, time_interval: u32) -> anyhow::Result<Vec<TimelineEvent>> {
        let path = path.as_ref();
        let raw: RawTimeline = read_json(path)
            .with_context(|| format!("unable to load timeline from {}", path.display()))?;
        Self::from_raw(raw, time_interval)
    }
}

impl Event for TimelineEvent {
    fn interval(&self) -> Interval {
        self.trigger_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_original_timeline_shape() {
        let json = r#"{
            "10": [
                {"actionType": "passengerAppearAction",
                 "data": [{"passengerid": 1, "passengerCoordinates": [114.1694, 22.3193], "range": 0.3}]},
                {"actionType": "orderReceivedAction",
                 "data": [{"passengerid": 1, "driverid": 17, "pickUpTime": "30"}]}
            ],
            "0": [{"actionType": "dropOffAction", "data": [{"driverid": 17}, {"driverid": 4}]}]
        }"#;
        let events = TimelineEvent::from_json_str(json, 5).unwrap();
        let summary: Vec<_> = events
            .iter()
            .map(|e| (e.trigger_interval, e.action.action_type()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, ActionType::DropOff),
                (0, ActionType::DropOff),
                (2, ActionType::PassengerAppear),
                (2, ActionType::OrderReceived),
            ]
        );
        assert_eq!(
            events[3].action,
            Action::OrderReceived(OrderReceived {
                passenger_id: PassengerId(1),
                vehicle_id: VehicleId(17),
                pick_up_time: 30,
            })
        );
    }

    #[test]
    fn unknown_tags_and_off_boundary_times_are_dropped() {
        let json = r#"{
            "3": [{"actionType": "cancelAction", "data": [{"passengerid": 1}]}],
            "4": [
                {"actionType": "teleportAction", "data": []},
                {"actionType": "cancelAction", "data": {"passengerid": 2}}
            ]
        }"#;
        let events = TimelineEvent::from_json_str(json, 2).unwrap();
        assert_eq!(
            events,
            vec![TimelineEvent::new(
                2,
                Action::Cancel(Cancel {
                    passenger_id: PassengerId(2)
                })
            )]
        );
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let json = r#"{"0": [{"actionType": "pickUpAction", "data": [{"passengerid": 1}]}]}"#;
        assert!(TimelineEvent::from_json_str(json, 1).is_err());
    }

    #[test]
    fn unknown_tag_reports_unknown_action() {
        assert_eq!(
            ActionType::from_tag("flyAction"),
            Err(SimError::UnknownAction {
                action_type: "flyAction".to_string()
            })
        );
        assert_eq!(
            ActionType::from_tag(ActionType::PickUp.tag()),
            Ok(ActionType::PickUp)
        );
    }
}
