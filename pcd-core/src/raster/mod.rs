pub mod grid;
pub mod surface;

pub use grid::GridSpec;
pub use surface::{Surface, NO_DATA};

use std::collections::TryReserveError;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("resolution must be a positive number, got {0}")]
    InvalidResolution(f64),
    #[error("grid of {rows} x {cols} cells is too large")]
    TooLarge { rows: usize, cols: usize },
    #[error("failed to allocate raster: {0}")]
    Allocation(#[from] TryReserveError),
}
