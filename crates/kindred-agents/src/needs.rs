//! Need pressures, recomputed from body state every tick.

use serde::{Deserialize, Serialize};

use kindred_types::Need;

/// Health level above which lost health stops registering as a need.
const HEALTH_CEILING: f64 = 80.0;
/// Hunger level above which eating stops registering as a need.
const HUNGER_CEILING: f64 = 90.0;
/// Body temperature under which warmth becomes a need.
const TEMPERATURE_FLOOR: f64 = 5.0;
/// Constant boredom pressure of a comfortable person.
const BOREDOM: f64 = 60.0;
/// Health and hunger must both exceed this for boredom to set in.
const COMFORT_LEVEL: f64 = 80.0;

/// The pressure of each need. Larger is more urgent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    /// Cube of the health deficit below 80.
    pub health: f64,
    /// Square of the hunger deficit below 90.
    pub hunger: f64,
    /// Ten per degree below 5, never negative.
    pub temperature: f64,
    /// 60 when health and hunger both exceed 80, else 0.
    pub boredom: f64,
}

impl Needs {
    /// Compute pressures from the current body state.
    pub fn compute(health: f64, hunger: f64, temperature: f64) -> Self {
        Self {
            health: (HEALTH_CEILING - health.min(HEALTH_CEILING)).powi(3),
            hunger: (HUNGER_CEILING - hunger.min(HUNGER_CEILING)).powi(2),
            temperature: ((TEMPERATURE_FLOOR - temperature) * 10.0).max(0.0),
            boredom: if health > COMFORT_LEVEL && hunger > COMFORT_LEVEL {
                BOREDOM
            } else {
                0.0
            },
        }
    }

    /// Pressure of one need.
    pub const fn get(&self, need: Need) -> f64 {
        match need {
            Need::Health => self.health,
            Need::Hunger => self.hunger,
            Need::Temperature => self.temperature,
            Need::Boredom => self.boredom,
        }
    }

    /// The most pressing need. Ties go to the earlier need in
    /// [`Need::ALL`], so a person with no pressure at all focuses on health.
    pub fn dominant(&self) -> Need {
        let mut focus = Need::Health;
        for need in Need::ALL {
            if self.get(need) > self.get(focus) {
                focus = need;
            }
        }
        focus
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn comfortable_person_is_bored() {
        let needs = Needs::compute(100.0, 100.0, 20.0);
        assert_eq!(needs.health, 0.0);
        assert_eq!(needs.hunger, 0.0);
        assert_eq!(needs.temperature, 0.0);
        assert_eq!(needs.boredom, 60.0);
        assert_eq!(needs.dominant(), Need::Boredom);
    }

    #[test]
    fn deficits_grow_polynomially() {
        let needs = Needs::compute(70.0, 80.0, 3.0);
        assert_eq!(needs.health, 1000.0);
        assert_eq!(needs.hunger, 100.0);
        assert_eq!(needs.temperature, 20.0);
        assert_eq!(needs.boredom, 0.0);
        assert_eq!(needs.dominant(), Need::Health);
    }

    #[test]
    fn starving_person_focuses_on_food() {
        let needs = Needs::compute(100.0, 10.0, 0.0);
        assert_eq!(needs.hunger, 6400.0);
        assert_eq!(needs.temperature, 50.0);
        assert_eq!(needs.dominant(), Need::Hunger);
    }

    #[test]
    fn ties_prefer_earlier_need() {
        let needs = Needs {
            health: 5.0,
            hunger: 5.0,
            temperature: 5.0,
            boredom: 5.0,
        };
        assert_eq!(needs.dominant(), Need::Health);
        assert_eq!(Needs::default().dominant(), Need::Health);
    }
}
