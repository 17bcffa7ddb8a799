//! Enumeration types shared by the planner and the execution layer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One of the five cells a person can act on: its own cell or an
/// orthogonal neighbor.
///
/// [`Direction::ALL`] is the order the planner scans neighbor cells in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// The person's own cell.
    Here,
    /// One cell toward smaller `y`.
    Up,
    /// One cell toward smaller `x`.
    Left,
    /// One cell toward larger `y`.
    Down,
    /// One cell toward larger `x`.
    Right,
}

impl Direction {
    /// All directions in scan order.
    pub const ALL: [Self; 5] = [Self::Here, Self::Up, Self::Left, Self::Down, Self::Right];

    /// The four movement directions (everything except [`Direction::Here`]).
    pub const MOVES: [Self; 4] = [Self::Up, Self::Left, Self::Down, Self::Right];

    /// Position of this direction in [`Direction::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Here => 0,
            Self::Up => 1,
            Self::Left => 2,
            Self::Down => 3,
            Self::Right => 4,
        }
    }

    /// Grid offset `(dx, dy)` of this direction.
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::Here => (0, 0),
            Self::Up => (0, -1),
            Self::Left => (-1, 0),
            Self::Down => (0, 1),
            Self::Right => (1, 0),
        }
    }

    /// Apply this direction to a position.
    pub const fn apply(self, x: i64, y: i64) -> (i64, i64) {
        let (dx, dy) = self.offset();
        (x.saturating_add(dx), y.saturating_add(dy))
    }
}

/// The four needs a person balances. The declaration order is the
/// tie-break order when two needs are equally pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum Need {
    /// Recover lost health.
    Health,
    /// Eat.
    Hunger,
    /// Get warm.
    Temperature,
    /// Something to do when otherwise comfortable.
    Boredom,
}

impl Need {
    /// All needs in tie-break order.
    pub const ALL: [Self; 4] = [Self::Health, Self::Hunger, Self::Temperature, Self::Boredom];
}
