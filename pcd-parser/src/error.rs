use std::{collections::TryReserveError, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unsupported point cloud file: {0:?}")]
    UnsupportedExtension(PathBuf),
    #[error("failed to read {path:?}: {source}")]
    Las {
        path: PathBuf,
        #[source]
        source: las::Error,
    },
    #[error("{path:?} declares {count} points, more than this platform can address")]
    TooManyPoints { path: PathBuf, count: u64 },
    #[error("out of memory while reading points: {0}")]
    Allocation(#[from] TryReserveError),
}
