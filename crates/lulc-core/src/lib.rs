//! Core library for land-use/land-cover (LULC) class area reporting.
//!
//! A classified raster arrives as a [`ClassGrid`] of integer class codes; the
//! caller names the codes to report on with a [`ClassSpec`]; and
//! [`aggregate_areas`] turns pixel counts into square-kilometre areas, one
//! [`AreaRecord`] per requested code in request order.

pub mod areas;
pub mod error;
pub mod grid;

pub use areas::{aggregate_areas, class_histogram, validate_resolution, AreaRecord, ClassSpec};
pub use error::ConfigError;
pub use grid::ClassGrid;
