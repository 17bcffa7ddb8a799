//! Tunables for the planner and for body-state evolution.
//!
//! Both structs deserialize from the `planner` and `vitals` sections of the
//! simulation YAML; every field has a default so partial sections work.

use serde::{Deserialize, Serialize};

/// Parameters of perception and action selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Half-width of the square perception window (default: 10).
    pub perception_radius: i64,

    /// Half-width of the window in which remembered person locations are
    /// checked against what is seen (default: 8).
    pub person_prune_radius: i64,

    /// Ticks a memory survives (default: 86 400, one simulated day).
    pub memory_ttl: u64,

    /// Per-tick chance a hungry person abandons its sub-objectives and
    /// replans from the root (default: 0.002).
    pub replan_chance: f64,

    /// Chance of a random step when nothing else was chosen (default: 0.5).
    pub idle_wander_chance: f64,

    /// How many times exploration widens its search window before giving
    /// up on avoiding searched regions (default: 10).
    pub search_expansions: u32,

    /// Body temperature under which a person stays by the fire
    /// (default: 2.0).
    pub warm_threshold: f64,

    /// Name of the item persons warm themselves at (default: `fire`).
    pub fire_item: String,

    /// Name of the item persons feed fires with (default: `kindling`).
    pub kindling_item: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            perception_radius: 10,
            person_prune_radius: 8,
            memory_ttl: 86_400,
            replan_chance: 0.002,
            idle_wander_chance: 0.5,
            search_expansions: 10,
            warm_threshold: 2.0,
            fire_item: String::from("fire"),
            kindling_item: String::from("kindling"),
        }
    }
}

/// Parameters of the per-tick body-state update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    /// Fraction of the gap to ambient heat closed per tick (default: 0.02).
    pub temperature_adaptation: f64,

    /// Base hunger lost per tick before the cold multiplier (default: 0.03).
    pub hunger_decay: f64,

    /// Health regained per tick when well fed (default: 0.01).
    pub heal_rate: f64,

    /// Health lost per tick while starving in the cold (default: 1.0).
    pub starvation_damage: f64,

    /// Ceiling for health and hunger; excess converts (default: 100).
    pub ceiling: f64,

    /// Starting health of new persons (default: 100).
    pub starting_health: f64,

    /// Starting hunger of new persons (default: 100).
    pub starting_hunger: f64,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            temperature_adaptation: 0.02,
            hunger_decay: 0.03,
            heal_rate: 0.01,
            starvation_damage: 1.0,
            ceiling: 100.0,
            starting_health: 100.0,
            starting_hunger: 100.0,
        }
    }
}
