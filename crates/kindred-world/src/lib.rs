//! The spatial world of the Kindred simulation.
//!
//! A square grid of square chunks, each chunk a flat array of optional item
//! instances, plus a per-chunk ambient heat field that diffuses every tick.
//!
//! # Modules
//!
//! - [`chunk`] -- [`Chunk`]: one square block of cells.
//! - [`error`] -- Error types for world writes ([`WorldError`]).
//! - [`grid`] -- [`World`]: absolute-coordinate access, perception windows,
//!   active-item enumeration, and the per-tick heat update.
//! - [`heat`] -- [`HeatField`]: exponential smoothing and asymmetric
//!   4-neighbor diffusion.
//! - [`math`] -- Small numeric helpers shared with the planner.

pub mod chunk;
pub mod error;
pub mod grid;
pub mod heat;
pub mod math;

// Re-export primary types at crate root.
pub use chunk::Chunk;
pub use error::WorldError;
pub use grid::{LocalCell, World, WorldDimensions};
pub use heat::HeatField;
