use super::{FieldArray, UnstructuredGrid};
use crate::TndmError;
use std::ffi::OsStr;
use std::fmt::Write;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::Path;

/// Writes a grid to a VTU file (ASCII format) for visualization with ParaView
///
/// # Input
///
/// * `grid` -- the unstructured grid
/// * `full_path` -- may be a String, &str, or Path
pub fn write_vtu<P>(grid: &UnstructuredGrid, full_path: &P) -> Result<(), TndmError>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path);
    grid.validate().map_err(|message| TndmError::format(path, message))?;

    // output buffer
    let mut buffer = String::new();

    // header
    write!(
        &mut buffer,
        "<?xml version=\"1.0\"?>\n\
         <VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">\n\
         <UnstructuredGrid>\n\
         <Piece NumberOfPoints=\"{}\" NumberOfCells=\"{}\">\n",
        grid.npoint(),
        grid.ncell()
    )
    .unwrap();

    // data: points and cells
    if !grid.point_data.is_empty() {
        write!(&mut buffer, "<PointData>\n").unwrap();
        for array in &grid.point_data {
            write_field(&mut buffer, array);
        }
        write!(&mut buffer, "</PointData>\n").unwrap();
    }
    if !grid.cell_data.is_empty() {
        write!(&mut buffer, "<CellData>\n").unwrap();
        for array in &grid.cell_data {
            write_field(&mut buffer, array);
        }
        write!(&mut buffer, "</CellData>\n").unwrap();
    }

    // nodes: coordinates
    write!(
        &mut buffer,
        "<Points>\n\
         <DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">\n"
    )
    .unwrap();
    let coords: Vec<_> = grid.points.iter().flatten().map(|x| format!("{:?}", x)).collect();
    write!(&mut buffer, "{}", coords.join(" ")).unwrap();
    write!(
        &mut buffer,
        "\n</DataArray>\n\
         </Points>\n"
    )
    .unwrap();

    // elements: connectivity
    write!(
        &mut buffer,
        "<Cells>\n\
         <DataArray type=\"Int32\" Name=\"connectivity\" format=\"ascii\">\n"
    )
    .unwrap();
    write!(&mut buffer, "{}", join(&grid.connectivity)).unwrap();

    // elements: offsets
    write!(
        &mut buffer,
        "\n</DataArray>\n\
         <DataArray type=\"Int32\" Name=\"offsets\" format=\"ascii\">\n"
    )
    .unwrap();
    write!(&mut buffer, "{}", join(&grid.offsets)).unwrap();

    // elements: types
    write!(
        &mut buffer,
        "\n</DataArray>\n\
         <DataArray type=\"UInt8\" Name=\"types\" format=\"ascii\">\n"
    )
    .unwrap();
    write!(&mut buffer, "{}", join(&grid.types)).unwrap();
    write!(
        &mut buffer,
        "\n</DataArray>\n\
         </Cells>\n"
    )
    .unwrap();

    // footer
    write!(
        &mut buffer,
        "</Piece>\n\
         </UnstructuredGrid>\n\
         </VTKFile>\n"
    )
    .unwrap();

    // write file
    if let Some(p) = path.parent() {
        fs::create_dir_all(p).map_err(|e| TndmError::io(p, e))?;
    }
    let mut file = File::create(path).map_err(|e| TndmError::io(path, e))?;
    file.write_all(buffer.as_bytes()).map_err(|e| TndmError::io(path, e))?;
    Ok(())
}

/// Writes a point or cell array
fn write_field(buffer: &mut String, array: &FieldArray) {
    write!(
        buffer,
        "<DataArray type=\"Float64\" Name=\"{}\" NumberOfComponents=\"{}\" format=\"ascii\">\n",
        array.name, array.num_components
    )
    .unwrap();
    let values: Vec<_> = array.values.iter().map(|v| format!("{:?}", v)).collect();
    write!(buffer, "{}\n</DataArray>\n", values.join(" ")).unwrap();
}

/// Joins integers with spaces
fn join<T: ToString>(values: &[T]) -> String {
    values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
