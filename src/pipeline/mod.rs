pub mod distance;
pub mod elevation;
pub mod parse;
pub mod process;
pub mod profile;
pub mod rasterize;
pub mod render;
pub mod segment;

pub use profile::build_profile;
