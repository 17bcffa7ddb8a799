//! The ambient heat field.
//!
//! One scalar per chunk, row-major. Each tick the field first eases toward
//! its targets (ambient temperature plus the heat produced by the chunk's
//! items), then every value diffuses toward the average of its four
//! neighbors. Warming spreads fast and cooling is slow, so a fire warms its
//! surroundings long before the ambient air takes the heat away again.

use serde::{Deserialize, Serialize};

use crate::math::lerp;

/// Fraction of the way each value moves toward its target per tick.
pub const SMOOTHING_RATE: f64 = 0.05;
/// Diffusion weight when the neighbor average is warmer.
pub const WARMING_RATE: f64 = 0.2;
/// Diffusion weight when the neighbor average is cooler.
pub const COOLING_RATE: f64 = 0.01;

/// A square field of heat values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatField {
    /// Values per row.
    side: usize,
    /// Row-major values.
    values: Vec<f64>,
}

impl HeatField {
    /// A `side` x `side` field with every value set to `initial`.
    pub fn new(side: usize, initial: f64) -> Self {
        Self {
            side,
            values: vec![initial; side.saturating_mul(side)],
        }
    }

    /// Values per row.
    pub const fn side(&self) -> usize {
        self.side
    }

    /// All values, row-major.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at flat index.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Overwrite every value.
    pub fn fill(&mut self, value: f64) {
        self.values.fill(value);
    }

    /// One full tick: smooth toward `ambient + produced[i]`, then diffuse.
    ///
    /// `produced` is indexed like the field; missing entries count as zero.
    pub fn update(&mut self, ambient: f64, produced: &[f64]) {
        self.relax(ambient, produced);
        self.disperse();
    }

    /// Ease each value [`SMOOTHING_RATE`] of the way toward its target.
    pub fn relax(&mut self, ambient: f64, produced: &[f64]) {
        for (index, value) in self.values.iter_mut().enumerate() {
            let target = ambient + produced.get(index).copied().unwrap_or(0.0);
            *value = lerp(*value, target, SMOOTHING_RATE);
        }
    }

    /// Diffuse toward the 4-neighbor average, in place and in row-major
    /// order. Missing neighbors at the edges count as the cell itself.
    pub fn disperse(&mut self) {
        let side = self.side;
        let cells = (0..side).flat_map(|y| (0..side).map(move |x| (x, y)));
        for (index, (x, _)) in cells.enumerate() {
            let Some(current) = self.get(index) else {
                continue;
            };
            let left = if x > 0 {
                index.checked_sub(1).and_then(|i| self.get(i))
            } else {
                None
            };
            let right = if x.saturating_add(1) < side {
                self.get(index.saturating_add(1))
            } else {
                None
            };
            let up = index.checked_sub(side).and_then(|i| self.get(i));
            let down = index.checked_add(side).and_then(|i| self.get(i));

            let sum: f64 = [left, right, up, down]
                .into_iter()
                .map(|n| n.unwrap_or(current))
                .sum();
            let average = sum / 4.0;
            let rate = if average > current {
                WARMING_RATE
            } else {
                COOLING_RATE
            };
            if let Some(slot) = self.values.get_mut(index) {
                *slot = lerp(current, average, rate);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn uniform_ambient_field_is_a_fixed_point() {
        let mut field = HeatField::new(6, 12.5);
        let produced = vec![0.0; 36];
        for _ in 0..50 {
            field.update(12.5, &produced);
        }
        assert!(field.values().iter().all(|v| *v == 12.5));
    }

    #[test]
    fn source_warms_neighbors_faster_than_they_cool() {
        let mut field = HeatField::new(5, 0.0);
        let mut produced = vec![0.0; 25];
        produced[12] = 100.0;
        for _ in 0..20 {
            field.update(0.0, &produced);
        }
        let center = field.values()[12];
        let neighbor = field.values()[13];
        let corner = field.values()[0];
        assert!(center > neighbor);
        assert!(neighbor > corner);
        assert!(corner >= 0.0);
    }

    #[test]
    fn edges_do_not_leak() {
        // A warm corner: missing neighbors count as the cell itself,
        // so only the two inner neighbors pull it down.
        let mut field = HeatField::new(3, 0.0);
        field.values[0] = 10.0;
        field.disperse();
        // Neighbors: left=self, right=0, up=self, down=0 -> average 5.
        assert_eq!(field.values()[0], lerp(10.0, 5.0, COOLING_RATE));
    }
}
