//! One square block of cells.

use serde::{Deserialize, Serialize};

use kindred_content::{ItemState, Registry, matches};
use kindred_types::Conditions;

/// A `size` x `size` block of optional item instances, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk column.
    pub x: usize,
    /// Chunk row.
    pub y: usize,
    /// Cells per side.
    size: usize,
    /// Row-major cells.
    cells: Vec<Option<ItemState>>,
}

impl Chunk {
    /// An empty chunk at chunk coordinates `(x, y)`.
    pub fn new(x: usize, y: usize, size: usize) -> Self {
        Self {
            x,
            y,
            size,
            cells: vec![None; size.saturating_mul(size)],
        }
    }

    /// Cells per side.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Flat index of local coordinates, if inside the chunk.
    fn index(&self, local_x: usize, local_y: usize) -> Option<usize> {
        (local_x < self.size && local_y < self.size)
            .then(|| local_y.saturating_mul(self.size).saturating_add(local_x))
    }

    /// Instance at local coordinates.
    pub fn get(&self, local_x: usize, local_y: usize) -> Option<&ItemState> {
        self.index(local_x, local_y)
            .and_then(|i| self.cells.get(i))
            .and_then(Option::as_ref)
    }

    /// Replace the cell at local coordinates, returning what was there.
    /// Writes outside the chunk are ignored and return `None`.
    pub fn set(
        &mut self,
        local_x: usize,
        local_y: usize,
        item: Option<ItemState>,
    ) -> Option<ItemState> {
        let index = self.index(local_x, local_y)?;
        let slot = self.cells.get_mut(index)?;
        std::mem::replace(slot, item)
    }

    /// Absolute world coordinates of a flat cell index.
    fn position(&self, index: usize) -> (usize, usize) {
        let local_x = index.checked_rem(self.size).unwrap_or(0);
        let local_y = index.checked_div(self.size).unwrap_or(0);
        (
            self.x.saturating_mul(self.size).saturating_add(local_x),
            self.y.saturating_mul(self.size).saturating_add(local_y),
        )
    }

    /// Every occupied cell with its absolute coordinates, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, &ItemState)> + '_ {
        self.cells.iter().enumerate().filter_map(|(index, cell)| {
            cell.as_ref().map(|state| {
                let (x, y) = self.position(index);
                (x, y, state)
            })
        })
    }

    /// Whether any instance matches the descriptor.
    pub fn has(&self, registry: &Registry, descriptor: &Conditions) -> bool {
        self.find(registry, descriptor).is_some()
    }

    /// First instance matching the descriptor, with absolute coordinates.
    pub fn find(
        &self,
        registry: &Registry,
        descriptor: &Conditions,
    ) -> Option<(usize, usize, &ItemState)> {
        self.occupied()
            .find(|(_, _, state)| matches(registry.item_of(state), descriptor))
    }

    /// Whether any instance is of an active item.
    pub fn is_active(&self, registry: &Registry) -> bool {
        self.occupied()
            .any(|(_, _, state)| registry.is_active(state.item))
    }

    /// Total `heat` property of every instance in the chunk.
    pub fn heat_produced(&self, registry: &Registry) -> f64 {
        self.occupied()
            .map(|(_, _, state)| registry.item_of(state).property("heat"))
            .sum()
    }
}
