use crate::model::MapType;

use super::clock::Interval;

pub trait Event {
    fn interval(&self) -> Interval;
}

#[derive(Debug, Clone)]
pub struct TimelineDispatcher<E: Event> {
    events: MapType<Interval, Vec<E>>,
    last_resolved: Option<Interval>,
}

impl<E: Event> TimelineDispatcher<E> {
    pub fn new() -> TimelineDispatcher<E> {
        TimelineDispatcher {
            events: MapType::new(),
            last_resolved: None,
        }
    }

    pub fn push(&mut self, event: E) {
        self.events.entry(event.interval()).or_default().push(event);
    }

    /// Events due at `interval`, in authoring order. Resolving an interval at
    /// or before the last resolved one yields nothing.
    pub fn resolve(&mut self, interval: Interval) -> Vec<E> {
        if self.last_resolved.is_some_and(|last| interval <= last) {
            return Vec::new();
        }
        self.last_resolved = Some(interval);
        self.events.remove(&interval).unwrap_or_default()
    }

    pub fn pending(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub fn missed(&self) -> impl Iterator<Item = &E> {
        let last = self.last_resolved;
        self.events
            .iter()
            .take_while(move |(interval, _)| last.is_some_and(|last| **interval <= last))
            .flat_map(|(_, events)| events.iter())
    }
}

impl<E: Event> Default for TimelineDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> FromIterator<E> for TimelineDispatcher<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut dispatcher = Self::new();
        for event in iter {
            dispatcher.push(event);
        }
        dispatcher
    }
}
