use serde::Serialize;

pub type Tick = u64;
pub type Interval = u64;

#[derive(Debug, Clone, Serialize)]
pub struct Clock {
    tick: Option<Tick>,
    total_ticks: Tick,
    steps_per_interval: u32,
}

impl Clock {
    pub fn new(total_ticks: Tick, steps_per_interval: u32) -> Self {
        debug_assert!(steps_per_interval > 0, "steps per interval must be positive");
        Self {
            tick: None,
            total_ticks,
            steps_per_interval: steps_per_interval.max(1),
        }
    }

    pub fn advance(&mut self) -> Tick {
        let tick = self.tick.map_or(0, |t| t + 1);
        self.tick = Some(tick);
        tick
    }

    /// Current tick, 0 before the first advance.
    pub fn tick(&self) -> Tick {
        self.tick.unwrap_or(0)
    }

    pub fn current_interval(&self) -> Interval {
        self.tick() / Tick::from(self.steps_per_interval)
    }

    pub fn is_boundary(&self) -> bool {
        self.tick() % Tick::from(self.steps_per_interval) == 0
    }

    pub fn is_terminal(&self) -> bool {
        self.tick.is_some_and(|t| t + 1 >= self.total_ticks)
    }

    pub fn total_ticks(&self) -> Tick {
        self.total_ticks
    }

    pub fn total_intervals(&self) -> Interval {
        self.total_ticks / Tick::from(self.steps_per_interval)
    }
}
