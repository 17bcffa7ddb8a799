//! The action a person emits each tick.
//!
//! The planner never mutates the world itself; it produces exactly one
//! [`Action`] per tick and the execution layer applies it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Direction;

/// A discrete per-tick action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum Action {
    /// Stand still.
    #[default]
    Nothing,
    /// Step one cell.
    Move {
        /// Where to step.
        direction: Direction,
    },
    /// Use, pick up, or drop onto the cell in the given direction.
    Interact {
        /// Which cell to interact with.
        direction: Direction,
    },
    /// Consume the held item.
    Eat,
}

impl Action {
    /// Whether this is [`Action::Nothing`].
    pub const fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_wire_shape() {
        let json = serde_json::to_value(Action::Move { direction: Direction::Left }).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({ "type": "move", "direction": "left" }))
        );
        let eat = serde_json::to_value(Action::Eat).ok();
        assert_eq!(eat, Some(serde_json::json!({ "type": "eat" })));
    }
}
