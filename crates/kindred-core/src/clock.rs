//! World clock and the daily ambient temperature cycle.
//!
//! The tick number is the single source of truth for time. It is the `now`
//! handed to the planner, stamped on memories and on transformed item
//! instances. Time of day is derived from it, never stored.

use std::f64::consts::TAU;

use crate::config::ClimateConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Monotonic tick counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldClock {
    /// Current tick, incremented at the start of each tick.
    tick: u64,
}

impl WorldClock {
    /// A clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// A clock resumed at `tick`.
    pub const fn at(tick: u64) -> Self {
        Self { tick }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Position within the current day in `[0, 1)`. Always 0 when the day
    /// length is 0.
    pub fn day_fraction(&self, ticks_per_day: u64) -> f64 {
        let Some(phase) = self.tick.checked_rem(ticks_per_day) else {
            return 0.0;
        };
        let phase = f64::from(u32::try_from(phase).unwrap_or(u32::MAX));
        let day = f64::from(u32::try_from(ticks_per_day).unwrap_or(u32::MAX));
        (phase / day).min(1.0)
    }

    /// Ambient temperature at the current tick: a sine around the base
    /// temperature, warmest a quarter into the day.
    pub fn ambient_temperature(&self, climate: &ClimateConfig) -> f64 {
        let angle = self.day_fraction(climate.ticks_per_day) * TAU;
        climate
            .daily_swing
            .mul_add(angle.sin(), climate.ambient_temperature)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn climate() -> ClimateConfig {
        ClimateConfig {
            ambient_temperature: 10.0,
            daily_swing: 5.0,
            ticks_per_day: 100,
        }
    }

    #[test]
    fn advance_increments() {
        let mut clock = WorldClock::new();
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert_eq!(clock.tick(), 2);
    }

    #[test]
    fn advance_overflow_is_error() {
        let mut clock = WorldClock::at(u64::MAX);
        assert_eq!(clock.advance(), Err(ClockError::TickOverflow));
        assert_eq!(clock.tick(), u64::MAX);
    }

    #[test]
    fn ambient_follows_the_day() {
        let climate = climate();
        assert!((WorldClock::at(0).ambient_temperature(&climate) - 10.0).abs() < 1e-9);
        assert!((WorldClock::at(25).ambient_temperature(&climate) - 15.0).abs() < 1e-9);
        assert!((WorldClock::at(75).ambient_temperature(&climate) - 5.0).abs() < 1e-9);
        assert!((WorldClock::at(125).ambient_temperature(&climate) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn zero_length_day_is_constant() {
        let climate = ClimateConfig {
            ticks_per_day: 0,
            ..climate()
        };
        assert_eq!(WorldClock::at(37).day_fraction(0), 0.0);
        assert_eq!(WorldClock::at(37).ambient_temperature(&climate), 10.0);
    }
}
