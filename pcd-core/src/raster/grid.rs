use crate::pointcloud::point::BoundingRect;

use super::RasterError;

/// Output grid anchored at its north-west corner.
///
/// Rows run from north to south and columns from west to east, so cell
/// `(0, 0)` is the north-west cell. `south` and `east` are derived from the
/// row and column counts, which means the grid may extend past the point
/// extent on those two sides but never falls short of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub resolution: f64,
    pub rows: usize,
    pub cols: usize,
}

impl GridSpec {
    /// Plans a grid covering `extent` with cells of `resolution` size.
    ///
    /// An empty extent yields a single cell centred on the origin.
    pub fn plan(extent: &BoundingRect, resolution: f64) -> Result<Self, RasterError> {
        if !(resolution > 0.0 && resolution.is_finite()) {
            return Err(RasterError::InvalidResolution(resolution));
        }

        let (min_x, min_y, max_x, max_y) = if extent.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            (extent.min[0], extent.min[1], extent.max[0], extent.max[1])
        };

        let half = resolution / 2.0;
        let west = min_x - half;
        let north = max_y + half;
        let rows = (((north - min_y) / resolution).ceil() as usize).max(1);
        let cols = (((max_x - west) / resolution).ceil() as usize).max(1);
        let south = north - rows as f64 * resolution;
        let east = west + cols as f64 * resolution;

        Ok(Self {
            north,
            south,
            east,
            west,
            resolution,
            rows,
            cols,
        })
    }

    pub fn cell_count(&self) -> Result<usize, RasterError> {
        self.rows
            .checked_mul(self.cols)
            .ok_or(RasterError::TooLarge {
                rows: self.rows,
                cols: self.cols,
            })
    }

    /// Returns the `(northing, easting)` of a cell centre.
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let half = self.resolution / 2.0;
        let easting = col as f64 * self.resolution + (self.west + half);
        let northing = (self.north - half) - row as f64 * self.resolution;
        (northing, easting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min: [f64; 2], max: [f64; 2]) -> BoundingRect {
        BoundingRect { min, max }
    }

    #[test]
    fn plan_covers_extent() {
        let grid = GridSpec::plan(&rect([0.0, 0.0], [1.0, 1.0]), 1.0).unwrap();
        assert_eq!(grid.west, -0.5);
        assert_eq!(grid.north, 1.5);
        assert_eq!(grid.rows, 2);
        assert_eq!(grid.cols, 2);
        assert_eq!(grid.south, -0.5);
        assert_eq!(grid.east, 1.5);
    }

    #[test]
    fn grid_tiles_exactly() {
        let grid = GridSpec::plan(&rect([10.0, 20.0], [18.0, 23.5]), 2.0).unwrap();
        assert_eq!(grid.rows, 3);
        assert_eq!(grid.cols, 5);
        assert_eq!(grid.cols as f64 * grid.resolution, grid.east - grid.west);
        assert_eq!(grid.rows as f64 * grid.resolution, grid.north - grid.south);
        assert!(grid.south <= 20.0);
        assert!(grid.east >= 18.0);
        assert_eq!(grid.cell_count().unwrap(), 15);
    }

    #[test]
    fn cell_centers_run_north_to_south() {
        let grid = GridSpec::plan(&rect([0.0, 0.0], [1.0, 1.0]), 1.0).unwrap();
        assert_eq!(grid.cell_center(0, 0), (1.0, 0.0));
        assert_eq!(grid.cell_center(1, 0), (0.0, 0.0));
        assert_eq!(grid.cell_center(0, 1), (1.0, 1.0));
        assert_eq!(grid.cell_center(1, 1), (0.0, 1.0));
    }

    #[test]
    fn degenerate_extents_yield_single_cell() {
        let empty = GridSpec::plan(&BoundingRect::default(), 1.0).unwrap();
        assert_eq!((empty.rows, empty.cols), (1, 1));
        assert_eq!(empty.west, -0.5);
        assert_eq!(empty.north, 0.5);

        let single = GridSpec::plan(&rect([5.0, 7.0], [5.0, 7.0]), 0.5).unwrap();
        assert_eq!((single.rows, single.cols), (1, 1));
        assert_eq!(single.cell_center(0, 0), (7.0, 5.0));
    }

    #[test]
    fn rejects_non_positive_resolution() {
        for resolution in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                GridSpec::plan(&BoundingRect::default(), resolution),
                Err(RasterError::InvalidResolution(_))
            ));
        }
    }
}
