//! Body-state evolution applied to every person once per tick, before
//! planning.
//!
//! # Order of operations
//!
//! 1. Body temperature eases toward the ambient heat of the person's chunk.
//! 2. Warmth adds to the score; lost health subtracts from it.
//! 3. Below full health, health regenerates in proportion to how well fed
//!    the person is.
//! 4. Hunger drops, faster in the cold.
//! 5. Starvation costs health; excess hunger converts to health and excess
//!    health to score.
//! 6. The score never goes negative.

use kindred_world::World;
use kindred_world::math::{lerp, sigmoid};

use crate::config::VitalsConfig;
use crate::person::Person;

impl Person {
    /// Apply one tick of vitals against the heat of the current chunk.
    pub fn update_vitals(&mut self, world: &World, config: &VitalsConfig) {
        let ambient = world.heat_at(self.x, self.y).unwrap_or(self.temperature);
        self.apply_vitals(ambient, config);
    }

    /// Apply one tick of vitals against a given ambient heat.
    pub fn apply_vitals(&mut self, ambient: f64, config: &VitalsConfig) {
        let ceiling = config.ceiling;
        self.temperature = lerp(self.temperature, ambient, config.temperature_adaptation);

        self.score += (self.temperature / 20.0).powi(3);

        if self.health < ceiling {
            self.score -= ((ceiling - self.health) / ceiling).powi(2);
            self.health += sigmoid((self.hunger - 50.0) / 10.0) * config.heal_rate;
        }

        let coldness = 1.0 - sigmoid(self.temperature / 2.0);
        self.hunger -= config.hunger_decay * coldness.mul_add(0.9, 0.1);
        if self.hunger < 0.0 {
            self.health -= config.starvation_damage * coldness * coldness;
            self.hunger = 0.0;
        }
        if self.hunger > ceiling {
            self.health += self.hunger - ceiling;
            self.hunger = ceiling;
        }
        if self.health > ceiling {
            self.score += (self.health - ceiling).powi(2);
            self.health = ceiling;
        }

        if self.score < 0.0 {
            self.score = 0.0;
        }
    }

    /// Whether health has run out.
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn person() -> Person {
        Person::new(String::from("a"), String::from("b"), 0, (0, 0), 0.3)
    }

    #[test]
    fn cold_burns_food_faster() {
        let config = VitalsConfig::default();
        let mut cold = person();
        let mut warm = person();
        cold.temperature = -20.0;
        warm.temperature = 20.0;
        cold.apply_vitals(-20.0, &config);
        warm.apply_vitals(20.0, &config);
        assert!(cold.hunger < warm.hunger);
        assert!(warm.hunger < 100.0);
    }

    #[test]
    fn starvation_costs_health() {
        let config = VitalsConfig::default();
        let mut p = person();
        p.hunger = 0.0;
        p.temperature = -10.0;
        p.apply_vitals(-10.0, &config);
        assert_eq!(p.hunger, 0.0);
        assert!(p.health < 100.0);
    }

    #[test]
    fn overfull_converts() {
        let config = VitalsConfig::default();
        let mut p = person();
        p.temperature = 20.0;
        p.hunger = 110.0;
        p.apply_vitals(20.0, &config);
        assert_eq!(p.hunger, 100.0);
        assert_eq!(p.health, 100.0);
        assert!(p.score > 50.0);
    }

    #[test]
    fn temperature_eases_toward_ambient() {
        let config = VitalsConfig::default();
        let mut p = person();
        p.apply_vitals(50.0, &config);
        assert_eq!(p.temperature, 1.0);
        assert!(p.score >= 0.0);
    }
}
