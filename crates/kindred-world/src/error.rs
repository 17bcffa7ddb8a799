//! Error types for the `kindred-world` crate.
//!
//! Reads never fail: coordinates outside the grid read as empty cells. Only
//! writes outside the grid are reported.

/// Errors that can occur when mutating the world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The target cell lies outside the grid.
    #[error("cell ({x}, {y}) is outside the {size}x{size} world")]
    OutOfBounds {
        /// Requested column.
        x: i64,
        /// Requested row.
        y: i64,
        /// World side length in cells.
        size: i64,
    },
}
