//! Implements the sampling of grid arrays at arbitrary points

mod geometry;
mod probe_filter;
pub use crate::probe::geometry::*;
pub use crate::probe::probe_filter::*;
