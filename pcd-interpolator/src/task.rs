use std::path::{Path, PathBuf};

use pcd_core::{
    pointcloud::point::PointRecord,
    raster::{GridSpec, Surface},
};
use pcd_exporter::raster::{write_raster, RasterHeader, RasterPaths};
use pcd_parser::parsers::Parser;

use crate::{
    cancel::CancelFlag, config::RunConfig, error::InterpolationError, filter::PointFilter,
    idw::IdwEstimator, index::SpatialIndex,
};

pub const TOOL_NAME: &str = "IDW Interpolation (LiDAR)";

/// One file of a run. `display` marks the output surfaced to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub path: PathBuf,
    pub point_count: u64,
    pub display: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Written(PathBuf),
    Cancelled,
}

/// Interpolates a surface from `records`. Returns `None` when cancelled.
pub fn interpolate_points(
    records: &[PointRecord],
    config: &RunConfig,
    cancel: &CancelFlag,
) -> Result<Option<Surface>, InterpolationError> {
    let filtered = PointFilter::new(config).apply(records)?;
    log::debug!(
        "{} of {} points qualify",
        filtered.points.len(),
        records.len()
    );

    let index = SpatialIndex::build(&filtered.points)?;
    let extent = filtered.extent;
    drop(filtered);

    let grid = GridSpec::plan(&extent, config.resolution)?;
    log::debug!("grid: {} rows x {} cols", grid.rows, grid.cols);

    let mut surface = Surface::new(grid)?;
    if !IdwEstimator::new(config).fill(&index, &mut surface, cancel) {
        return Ok(None);
    }
    Ok(Some(surface))
}

/// Reads, interpolates and writes one file.
pub fn run_task(
    parser: &dyn Parser,
    path: &Path,
    config: &RunConfig,
    cancel: &CancelFlag,
) -> Result<TaskOutcome, InterpolationError> {
    let records = parser.parse()?;
    let Some(surface) = interpolate_points(&records, config, cancel)? else {
        return Ok(TaskOutcome::Cancelled);
    };
    drop(records);

    let paths = RasterPaths::derive(path, &config.suffix);
    let header = RasterHeader::new(
        *surface.grid(),
        config.attribute.data_scale(),
        config.attribute.palette(),
    )
    .with_creation_metadata(TOOL_NAME);
    write_raster(&paths, &header, &surface)?;

    Ok(TaskOutcome::Written(paths.header))
}
