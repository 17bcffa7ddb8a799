//! Tick-start snapshots of persons.
//!
//! Every person plans against the positions all persons had when the tick
//! began. Moves resolved later in the same tick are invisible until the
//! next one.

use kindred_types::PersonId;

/// Where a person stood at the start of the tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonView {
    /// Who.
    pub id: PersonId,
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

impl PersonView {
    /// Whether the person stands at `(x, y)`.
    pub const fn is_at(&self, x: i64, y: i64) -> bool {
        self.x == x && self.y == y
    }
}
