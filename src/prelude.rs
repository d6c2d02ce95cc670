//! Makes available common structures needed to post-process a simulation
//!
//! You may write `use tndmvis::prelude::*` in your code and obtain
//! access to commonly used functionality.

pub use crate::base::{init_logging, BoundingBox, CLAMP_EPSILON, DEFAULT_TEST_DIR, SECONDS_PER_YEAR};
pub use crate::post::{
    merge_pvd, stack_meshes, stack_steps, write_tecplot, Colormap, FancyPlot, GridLoader, MeshLoader, ResampledData,
    StationResampler, StationSet, Transform, VariableConfig, VariableMap,
};
pub use crate::probe::{ProbeFilter, ProbeOptions};
pub use crate::vtk::{read_grid, write_pvd, write_vtu, TimeSeriesIndex, TimestepPolicy, UnstructuredGrid};
pub use crate::TndmError;
