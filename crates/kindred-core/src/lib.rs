//! World clock, tick cycle, and orchestration for the Kindred simulation.
//!
//! The planner in `kindred-agents` only chooses actions. This crate owns
//! everything around it: loading configuration, spawning people, applying
//! the chosen actions to the world, and advancing recipe timers.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and the daily ambient temperature cycle.
//! - [`config`] -- Configuration loading from YAML into typed structs.
//! - [`population`] -- Name generation, family groups, reputations, and
//!   initial item placement.
//! - [`resolution`] -- Serial application of actions and timed recipes.
//! - [`tick`] -- The per-tick phase sequence.

pub mod clock;
pub mod config;
pub mod population;
pub mod resolution;
pub mod tick;

pub use clock::WorldClock;
pub use config::{ConfigError, SimulationConfig};
pub use resolution::ActionOutcome;
pub use tick::{SimulationState, TickError, TickSummary, run_tick};
