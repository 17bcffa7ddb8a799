//! Shared type definitions for the Kindred simulation.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: identifiers, the per-tick action emitted by the planner, and
//! the content records items and recipes are loaded from. Types seen by the
//! render layer flow to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe identifiers for persons, items and recipes
//! - [`enums`] -- Directions and needs
//! - [`actions`] -- The single action a person emits each tick
//! - [`content`] -- Item/recipe records, conditions, value gates, outcomes

pub mod actions;
pub mod content;
pub mod enums;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use actions::Action;
pub use content::{
    ArithmeticOp, CompareOp, Conditions, ContentPack, ItemCondition, ItemDisplay, ItemRecord,
    PropertyComparison, RecipeOutcome, RecipeRecord, RecipeResult, ValueChange, ValueGate,
};
pub use enums::{Direction, Need};
pub use ids::{ItemId, PersonId, RecipeId};
