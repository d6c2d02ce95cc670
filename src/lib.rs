//! Post-processing tools for earthquake-fault simulation output
//!
//! The simulation writes one VTU file per output time and a PVD file
//! listing them. This crate reads that time series and
//!
//! * samples the fields at station points into Tecplot tables ([post::StationResampler])
//! * merges the pieces of parallel (PVTU) output into serial VTU files ([post::merge_pvd])
//! * stacks all time steps along a time axis for a slip-versus-time figure ([post::stack_meshes])

mod error;
pub use crate::error::*;

pub mod base;
pub mod post;
pub mod prelude;
pub mod probe;
pub mod vtk;
