//! Implements readers and writers for VTK XML files (PVD, VTU, PVTU)

mod cell_types;
mod data_array;
mod pvd;
mod pvtu_reader;
mod samples;
mod unstructured_grid;
mod vtu_reader;
mod vtu_writer;
mod xml;
pub use crate::vtk::cell_types::*;
pub use crate::vtk::pvd::*;
pub use crate::vtk::pvtu_reader::*;
pub use crate::vtk::samples::*;
pub use crate::vtk::unstructured_grid::*;
pub use crate::vtk::vtu_reader::*;
pub use crate::vtk::vtu_writer::*;
