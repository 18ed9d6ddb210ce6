//! Inverse distance weighted estimation of grid cells.
//!
//! Each cell takes the `k` nearest indexed points. A point lying exactly on the
//! cell centre supplies the value directly. Otherwise every neighbour strictly
//! inside the search radius contributes with weight `1 / d^p`, and the weights
//! are normalised by their sum before they are applied.

use pcd_core::raster::{Surface, NO_DATA};

use crate::cancel::CancelFlag;
use crate::config::{Attribute, RunConfig};
use crate::filter::{cell_to_rgb, rgb_to_cell};
use crate::index::{Neighbour, SpatialIndex};

#[derive(Debug, Clone, Copy)]
pub struct IdwEstimator {
    weight: f64,
    max_distance_sq: f64,
    neighbours: usize,
    rgb: bool,
}

impl IdwEstimator {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            weight: config.weight,
            max_distance_sq: config.max_distance_sq(),
            neighbours: config.neighbours,
            rgb: config.attribute == Attribute::Rgb,
        }
    }

    fn contributes(&self, neighbour: &Neighbour) -> bool {
        neighbour.distance_sq > 0.0 && neighbour.distance_sq < self.max_distance_sq
    }

    fn weight_of(&self, neighbour: &Neighbour) -> f64 {
        1.0 / neighbour.distance_sq.sqrt().powf(self.weight)
    }

    /// Estimates the value at one position, `None` when no neighbour qualifies.
    pub fn estimate(
        &self,
        index: &SpatialIndex,
        northing: f64,
        easting: f64,
        scratch: &mut Vec<Neighbour>,
    ) -> Option<f64> {
        index.nearest_into(northing, easting, self.neighbours, scratch);
        self.combine(scratch)
    }

    /// Combines neighbours sorted by ascending distance into one value.
    pub fn combine(&self, neighbours: &[Neighbour]) -> Option<f64> {
        match neighbours.first() {
            Some(nearest) if nearest.distance_sq == 0.0 => return Some(nearest.value),
            None => return None,
            _ => {}
        }

        let sum_weights: f64 = neighbours
            .iter()
            .filter(|n| self.contributes(n))
            .map(|n| self.weight_of(n))
            .sum();
        if !(sum_weights > 0.0) {
            return None;
        }

        let contributing = neighbours.iter().filter(|n| self.contributes(n));
        if self.rgb {
            let mut channels = [0.0f64; 3];
            for n in contributing {
                let w = self.weight_of(n);
                let rgb = cell_to_rgb(n.value);
                for (channel, &v) in channels.iter_mut().zip(rgb.iter()) {
                    *channel += w * v as f64 / sum_weights;
                }
            }
            let rgb = channels.map(|c| c.clamp(0.0, 255.0) as u8);
            Some(rgb_to_cell(rgb))
        } else {
            Some(
                contributing
                    .map(|n| self.weight_of(n) * n.value / sum_weights)
                    .sum(),
            )
        }
    }

    /// Fills `surface` row by row. Returns `false` if cancelled before the last row.
    pub fn fill(&self, index: &SpatialIndex, surface: &mut Surface, cancel: &CancelFlag) -> bool {
        let grid = *surface.grid();
        let mut scratch = Vec::with_capacity(self.neighbours.min(index.len()));

        for row in 0..grid.rows {
            for (col, cell) in surface.row_mut(row).iter_mut().enumerate() {
                let (northing, easting) = grid.cell_center(row, col);
                *cell = self
                    .estimate(index, northing, easting, &mut scratch)
                    .unwrap_or(NO_DATA);
            }
            if cancel.is_cancelled() {
                log::debug!("cancelled after row {} of {}", row + 1, grid.rows);
                return false;
            }
        }
        true
    }
}
