pub mod error;
pub mod raster;

pub use error::ExportError;
