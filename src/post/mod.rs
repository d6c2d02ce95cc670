//! Implements the post-processing pipelines (stations, merging, stacking, figures)

mod fancy_plot;
mod merge;
mod mesh_stacker;
mod point_clamper;
mod resampler;
mod stations;
mod tecplot;
mod variable_map;
pub use crate::post::fancy_plot::*;
pub use crate::post::merge::*;
pub use crate::post::mesh_stacker::*;
pub use crate::post::point_clamper::*;
pub use crate::post::resampler::*;
pub use crate::post::stations::*;
pub use crate::post::tecplot::*;
pub use crate::post::variable_map::*;
