use std::time::Duration;

use crate::{config::TimeConfig, types::Tick};

/// Who advances the physics scene
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PhysicsMode {
    /// The engine steps physics on its own; replays do not simulate
    #[default]
    Automatic,
    /// Physics is stepped explicitly once per tick, including during replay
    TimeManager,
    /// No physics scene
    Disabled,
}

/// Queries the replication runtime makes against the host's tick clock
pub trait TimeManager {
    fn local_tick(&self) -> Tick;

    /// Seconds simulated by one tick
    fn tick_delta(&self) -> f64;

    fn physics_mode(&self) -> PhysicsMode;
}

/// A tick clock advanced manually, once per fixed update
pub struct FixedTimeManager {
    config: TimeConfig,
    tick: Tick,
}

impl FixedTimeManager {
    pub fn new(config: &TimeConfig) -> Self {
        Self {
            config: config.clone(),
            tick: 0,
        }
    }

    pub fn with_start_tick(config: &TimeConfig, tick: Tick) -> Self {
        Self {
            config: config.clone(),
            tick,
        }
    }

    /// Moves to the next tick and returns it
    pub fn advance(&mut self) -> Tick {
        self.tick = self.tick.wrapping_add(1);
        self.tick
    }

    pub fn tick_interval(&self) -> Duration {
        self.config.tick_interval
    }

    /// Number of whole ticks covering `duration`, rounded up
    pub fn duration_to_ticks(&self, duration: Duration) -> u32 {
        duration_to_ticks(duration, self.config.tick_interval)
    }
}

impl TimeManager for FixedTimeManager {
    fn local_tick(&self) -> Tick {
        self.tick
    }

    fn tick_delta(&self) -> f64 {
        self.config.tick_interval.as_secs_f64()
    }

    fn physics_mode(&self) -> PhysicsMode {
        self.config.physics_mode
    }
}

pub(crate) fn duration_to_ticks(duration: Duration, tick_interval: Duration) -> u32 {
    if duration.is_zero() || tick_interval.is_zero() {
        return 0;
    }
    let ticks = duration.as_nanos().div_ceil(tick_interval.as_nanos());
    u32::try_from(ticks).unwrap_or(u32::MAX)
}
