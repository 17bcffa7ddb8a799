//! Error types for the `kindred-agents` crate.
//!
//! Planning itself never fails. These errors surface only from explicit
//! objective bookkeeping with ids or positions that are not on the stack.

use crate::objective::ObjectiveId;

/// Errors that can occur during objective operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// No objective with this id is on the stack.
    #[error("objective not found: {0}")]
    ObjectiveNotFound(ObjectiveId),

    /// A stack position past the end was given.
    #[error("objective position {index} out of range (stack holds {len})")]
    PositionOutOfRange {
        /// Requested position.
        index: usize,
        /// Current stack length.
        len: usize,
    },
}
