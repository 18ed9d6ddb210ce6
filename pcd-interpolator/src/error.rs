use std::collections::TryReserveError;

use pcd_core::raster::RasterError;
use pcd_exporter::ExportError;
use pcd_parser::ParseError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("no input files were specified")]
    NoInputFiles,
    #[error("unknown attribute to interpolate: {0:?}")]
    UnknownAttribute(String),
    #[error("unknown return number policy: {0:?}")]
    UnknownReturnPolicy(String),
    #[error("{name} is not a valid number: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("resolution must be greater than zero, got {0}")]
    NonPositiveResolution(f64),
    #[error("weight must be a finite, non-negative number, got {0}")]
    InvalidWeight(f64),
    #[error("maximum search distance must be greater than zero, got {0}")]
    InvalidMaxDistance(f64),
    #[error("number of neighbours to use must be at least one")]
    InvalidNeighbourCount,
}

#[derive(Debug, thiserror::Error)]
pub enum InterpolationError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
}

impl InterpolationError {
    pub fn is_out_of_memory(&self) -> bool {
        matches!(
            self,
            InterpolationError::OutOfMemory(_)
                | InterpolationError::Parse(ParseError::Allocation(_))
                | InterpolationError::Raster(RasterError::Allocation(_))
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
