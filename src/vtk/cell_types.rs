//! Defines the VTK cell type numbers used by the reader, writer, and probe

pub const VTK_VERTEX: u8 = 1;
pub const VTK_POLY_VERTEX: u8 = 2;
pub const VTK_LINE: u8 = 3;
pub const VTK_POLY_LINE: u8 = 4;
pub const VTK_TRIANGLE: u8 = 5;
pub const VTK_POLYGON: u8 = 7;
pub const VTK_PIXEL: u8 = 8;
pub const VTK_QUAD: u8 = 9;
pub const VTK_TETRA: u8 = 10;
pub const VTK_VOXEL: u8 = 11;
pub const VTK_HEXAHEDRON: u8 = 12;
pub const VTK_QUADRATIC_EDGE: u8 = 21;
pub const VTK_QUADRATIC_TRIANGLE: u8 = 22;
pub const VTK_QUADRATIC_QUAD: u8 = 23;
pub const VTK_QUADRATIC_TETRA: u8 = 24;
pub const VTK_QUADRATIC_HEXAHEDRON: u8 = 25;
pub const VTK_LAGRANGE_CURVE: u8 = 68;
pub const VTK_LAGRANGE_TRIANGLE: u8 = 69;
pub const VTK_LAGRANGE_QUADRILATERAL: u8 = 70;
pub const VTK_LAGRANGE_TETRAHEDRON: u8 = 71;
pub const VTK_LAGRANGE_HEXAHEDRON: u8 = 72;
