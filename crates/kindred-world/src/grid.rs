//! The world grid: absolute-coordinate access over chunks.
//!
//! Coordinates are signed so callers can probe offsets freely; anything
//! outside `0..size()` reads as an empty cell. The grid shares the content
//! [`Registry`] so it can resolve item properties (heat, activity, blocking)
//! without global state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use kindred_content::{Item, ItemState, Registry};

use crate::chunk::Chunk;
use crate::error::WorldError;
use crate::heat::HeatField;

/// Grid shape: `chunks_per_side` x `chunks_per_side` chunks of
/// `chunk_size` x `chunk_size` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldDimensions {
    /// Chunks along each axis.
    pub chunks_per_side: usize,
    /// Cells along each chunk axis.
    pub chunk_size: usize,
}

impl Default for WorldDimensions {
    fn default() -> Self {
        Self {
            chunks_per_side: 40,
            chunk_size: 10,
        }
    }
}

impl WorldDimensions {
    /// Cells along each world axis.
    pub const fn side(&self) -> usize {
        self.chunks_per_side.saturating_mul(self.chunk_size)
    }
}

/// One cell of a perception window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalCell<'a> {
    /// Absolute column (may lie outside the grid).
    pub x: i64,
    /// Absolute row (may lie outside the grid).
    pub y: i64,
    /// The instance there, if any.
    pub item: Option<&'a ItemState>,
}

/// The chunked grid plus its heat field.
#[derive(Debug, Clone)]
pub struct World {
    /// Grid shape.
    dimensions: WorldDimensions,
    /// Row-major chunks.
    chunks: Vec<Chunk>,
    /// One heat value per chunk, indexed like `chunks`.
    heat: HeatField,
    /// Shared content.
    registry: Arc<Registry>,
}

impl World {
    /// An empty world with every heat value at zero.
    pub fn new(dimensions: WorldDimensions, registry: Arc<Registry>) -> Self {
        let per_side = dimensions.chunks_per_side;
        let chunks = (0..per_side)
            .flat_map(|y| (0..per_side).map(move |x| (x, y)))
            .map(|(x, y)| Chunk::new(x, y, dimensions.chunk_size))
            .collect();
        debug!(
            chunks_per_side = per_side,
            chunk_size = dimensions.chunk_size,
            "World created"
        );
        Self {
            dimensions,
            chunks,
            heat: HeatField::new(per_side, 0.0),
            registry,
        }
    }

    /// The shared registry.
    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Swap in rebuilt content.
    pub fn set_registry(&mut self, registry: Arc<Registry>) {
        self.registry = registry;
    }

    /// Grid shape.
    pub const fn dimensions(&self) -> WorldDimensions {
        self.dimensions
    }

    /// Cells along each axis.
    pub fn size(&self) -> i64 {
        i64::try_from(self.dimensions.side()).unwrap_or(i64::MAX)
    }

    /// Whether `(x, y)` lies on the grid.
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        (0..self.size()).contains(&x) && (0..self.size()).contains(&y)
    }

    /// Chunk index and in-chunk coordinates of an absolute cell.
    fn locate(&self, x: i64, y: i64) -> Option<(usize, usize, usize)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        let size = self.dimensions.chunk_size;
        let (chunk_x, local_x) = (x.checked_div(size)?, x.checked_rem(size)?);
        let (chunk_y, local_y) = (y.checked_div(size)?, y.checked_rem(size)?);
        let per_side = self.dimensions.chunks_per_side;
        if chunk_x >= per_side || chunk_y >= per_side {
            return None;
        }
        let index = chunk_y.checked_mul(per_side)?.checked_add(chunk_x)?;
        Some((index, local_x, local_y))
    }

    /// Index of the chunk containing `(x, y)`.
    pub fn chunk_index_of(&self, x: i64, y: i64) -> Option<usize> {
        self.locate(x, y).map(|(index, _, _)| index)
    }

    /// All chunks, row-major.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Chunk at chunk coordinates.
    pub fn chunk(&self, chunk_x: usize, chunk_y: usize) -> Option<&Chunk> {
        let per_side = self.dimensions.chunks_per_side;
        if chunk_x >= per_side {
            return None;
        }
        self.chunks
            .get(chunk_y.saturating_mul(per_side).saturating_add(chunk_x))
    }

    /// Instance at `(x, y)`; empty outside the grid.
    pub fn get(&self, x: i64, y: i64) -> Option<&ItemState> {
        let (index, local_x, local_y) = self.locate(x, y)?;
        self.chunks.get(index)?.get(local_x, local_y)
    }

    /// Item definition of the instance at `(x, y)`.
    pub fn item_at(&self, x: i64, y: i64) -> Option<&Item> {
        self.get(x, y).map(|state| self.registry.item_of(state))
    }

    /// Whether the cell holds a blocking item.
    pub fn is_blocking(&self, x: i64, y: i64) -> bool {
        self.item_at(x, y).is_some_and(Item::is_blocking)
    }

    /// Whether the cell is on the grid and empty.
    pub fn is_free(&self, x: i64, y: i64) -> bool {
        self.in_bounds(x, y) && self.get(x, y).is_none()
    }

    /// Replace the cell at `(x, y)`, returning what was there.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] when the cell is off the grid.
    pub fn set(
        &mut self,
        x: i64,
        y: i64,
        item: Option<ItemState>,
    ) -> Result<Option<ItemState>, WorldError> {
        let out_of_bounds = WorldError::OutOfBounds {
            x,
            y,
            size: self.size(),
        };
        let (index, local_x, local_y) = self.locate(x, y).ok_or_else(|| out_of_bounds.clone())?;
        let chunk = self.chunks.get_mut(index).ok_or(out_of_bounds)?;
        Ok(chunk.set(local_x, local_y, item))
    }

    /// Remove and return the instance at `(x, y)`; nothing outside the grid.
    pub fn take(&mut self, x: i64, y: i64) -> Option<ItemState> {
        let (index, local_x, local_y) = self.locate(x, y)?;
        self.chunks.get_mut(index)?.set(local_x, local_y, None)
    }

    /// Every cell of the inclusive square window of `radius` around
    /// `(x, y)`, row by row. Cells off the grid are reported empty, not
    /// clamped.
    pub fn local_world(&self, x: i64, y: i64, radius: i64) -> Vec<LocalCell<'_>> {
        let radius = radius.max(0);
        let mut cells = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (cx, cy) = (x.saturating_add(dx), y.saturating_add(dy));
                cells.push(LocalCell {
                    x: cx,
                    y: cy,
                    item: self.get(cx, cy),
                });
            }
        }
        cells
    }

    /// Every instance of an active item, chunk by chunk.
    pub fn active(&self) -> Vec<LocalCell<'_>> {
        self.chunks
            .iter()
            .flat_map(|chunk| chunk.occupied())
            .filter(|(_, _, state)| self.registry.is_active(state.item))
            .map(|(x, y, state)| LocalCell {
                x: i64::try_from(x).unwrap_or(i64::MAX),
                y: i64::try_from(y).unwrap_or(i64::MAX),
                item: Some(state),
            })
            .collect()
    }

    /// Number of occupied cells.
    pub fn occupied_count(&self) -> usize {
        self.chunks.iter().map(|c| c.occupied().count()).sum()
    }

    // -------------------------------------------------------------------
    // Heat
    // -------------------------------------------------------------------

    /// The heat field.
    pub const fn heat(&self) -> &HeatField {
        &self.heat
    }

    /// Ambient heat of the chunk containing `(x, y)`.
    pub fn heat_at(&self, x: i64, y: i64) -> Option<f64> {
        self.chunk_index_of(x, y).and_then(|i| self.heat.get(i))
    }

    /// Set every heat value, e.g. to start a world at ambient temperature.
    pub fn fill_heat(&mut self, value: f64) {
        self.heat.fill(value);
    }

    /// Advance the heat field by one tick toward `ambient` plus each
    /// chunk's item heat.
    pub fn update(&mut self, ambient: f64) {
        let produced: Vec<f64> = self
            .chunks
            .iter()
            .map(|chunk| chunk.heat_produced(&self.registry))
            .collect();
        self.heat.update(ambient, &produced);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use kindred_types::ItemId;

    use super::*;

    fn small() -> World {
        World::new(
            WorldDimensions {
                chunks_per_side: 3,
                chunk_size: 4,
            },
            Arc::new(Registry::new()),
        )
    }

    #[test]
    fn reads_outside_are_empty() {
        let world = small();
        assert_eq!(world.size(), 12);
        assert!(world.get(-1, 0).is_none());
        assert!(world.get(0, 12).is_none());
        assert!(world.heat_at(40, 40).is_none());
    }

    #[test]
    fn writes_outside_fail() {
        let mut world = small();
        let err = world.set(12, 0, Some(ItemState::new(ItemId(1)))).unwrap_err();
        assert_eq!(err, WorldError::OutOfBounds { x: 12, y: 0, size: 12 });
    }

    #[test]
    fn set_get_take_across_chunks() {
        let mut world = small();
        world.set(5, 9, Some(ItemState::new(ItemId(2)))).unwrap();
        assert_eq!(world.get(5, 9).unwrap().item, ItemId(2));
        assert_eq!(world.chunk_index_of(5, 9), Some(7));
        assert_eq!(world.chunk(1, 2).unwrap().get(1, 1).unwrap().item, ItemId(2));
        assert_eq!(world.take(5, 9).unwrap().item, ItemId(2));
        assert!(world.get(5, 9).is_none());
    }

    #[test]
    fn local_window_is_square_and_unclamped() {
        let mut world = small();
        world.set(0, 0, Some(ItemState::new(ItemId(1)))).unwrap();
        let window = world.local_world(0, 0, 2);
        assert_eq!(window.len(), 25);
        assert_eq!((window[0].x, window[0].y), (-2, -2));
        assert!(window[0].item.is_none());
        let center = window[12];
        assert_eq!((center.x, center.y), (0, 0));
        assert!(center.item.is_some());
    }
}
