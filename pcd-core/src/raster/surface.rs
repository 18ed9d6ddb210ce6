use super::{GridSpec, RasterError};

/// Value written to cells without a valid estimate.
pub const NO_DATA: f64 = -32768.0;

/// Row-major grid of cell values, initialised to [`NO_DATA`].
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    grid: GridSpec,
    values: Vec<f64>,
}

impl Surface {
    pub fn new(grid: GridSpec) -> Result<Self, RasterError> {
        let len = grid.cell_count()?;
        let mut values = Vec::new();
        values.try_reserve_exact(len)?;
        values.resize(len, NO_DATA);
        Ok(Self { grid, values })
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.grid.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.grid.cols;
        &self.values[start..start + self.grid.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.grid.cols;
        &mut self.values[start..start + self.grid.cols]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
