//! The cognition-facing knowledge base of the Kindred simulation.
//!
//! Items and recipes are immutable, content-defined records. This crate owns
//! them together with every fact derived from them: which recipes consume
//! or produce an item, how deep an item sits in the crafting graph, and how
//! much gathering a person should expect before holding one.
//!
//! # Modules
//!
//! - [`condition`] -- The pure condition engine: [`matches`] and [`compare`].
//! - [`error`] -- Load-time content validation errors ([`ContentError`]).
//! - [`item`] -- [`Item`] definitions and runtime [`ItemState`] instances.
//! - [`recipe`] -- [`Recipe`] gates, weighted outcome selection, and
//!   instance transformation.
//! - [`registry`] -- The [`Registry`]: lookups, queries, derived indices,
//!   crafting depth, and cost heuristics.

pub mod condition;
pub mod error;
pub mod item;
pub mod recipe;
pub mod registry;

// Re-export primary types at crate root.
pub use condition::{compare, matches};
pub use error::ContentError;
pub use item::{Item, ItemState};
pub use recipe::Recipe;
pub use registry::Registry;
