pub mod grid;
pub mod icons;
pub mod placement;
pub mod raster;
pub mod token;
