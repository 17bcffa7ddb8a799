//! Persons and their cognition for the Kindred simulation.
//!
//! This crate is the logic layer for persons: everything that reads the
//! world and the registry to decide what a person does next, without
//! applying the decision. The tick driver in `kindred-core` executes the
//! emitted [`Action`](kindred_types::Action).
//!
//! # Modules
//!
//! - [`config`] -- Tunables for planning and vitals ([`PlannerConfig`],
//!   [`VitalsConfig`]).
//! - [`error`] -- Error types for objective bookkeeping ([`AgentError`]).
//! - [`memory`] -- Timestamped memories and their maintenance
//!   ([`MemoryBook`]).
//! - [`movement`] -- Greedy single-step movement with local obstacle
//!   avoidance.
//! - [`needs`] -- Per-tick need pressures ([`Needs`]).
//! - [`objective`] -- The objective arena ([`ObjectiveStack`]).
//! - [`person`] -- [`Person`] state, identity, and display.
//! - [`planner`] -- Perception and action selection ([`Person::think`]).
//! - [`view`] -- Tick-start snapshots of other persons ([`PersonView`]).
//! - [`vitals`] -- Body-state evolution ([`Person::update_vitals`]).

pub mod config;
pub mod error;
pub mod memory;
pub mod movement;
pub mod needs;
pub mod objective;
pub mod person;
pub mod planner;
pub mod view;
pub mod vitals;

// Re-export primary types at crate root.
pub use config::{PlannerConfig, VitalsConfig};
pub use error::AgentError;
pub use memory::{Memory, MemoryBook, MemoryKind, Noun};
pub use needs::Needs;
pub use objective::{Objective, ObjectiveId, ObjectiveStack, Obtain};
pub use person::{Person, Scratch};
pub use planner::Surroundings;
pub use view::PersonView;
