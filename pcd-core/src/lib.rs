pub mod pointcloud;
pub mod raster;
