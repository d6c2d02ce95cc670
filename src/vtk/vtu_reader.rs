use super::data_array::{decode_ascii, decode_base64, decode_raw, BinaryLayout, NumberType};
use super::xml::{attributes, tag_name, usize_attribute};
use super::{FieldArray, UnstructuredGrid};
use crate::TndmError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

/// Reads a serial VTK XML unstructured grid file (.vtu)
///
/// Supports ASCII, inline binary (base64) and appended (raw or base64)
/// data arrays, optionally compressed with zlib. All pieces in the file
/// are appended into a single grid.
///
/// # Input
///
/// * `full_path` -- may be a String, &str, or Path
pub fn read_vtu<P>(full_path: &P) -> Result<UnstructuredGrid, TndmError>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path);
    if !path.is_file() {
        return Err(TndmError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|e| TndmError::io(path, e))?;
    parse_vtu(&bytes).map_err(|message| TndmError::format(path, message))
}

/// Defines where the values of a data array are stored
#[derive(Clone, Copy, Debug, PartialEq)]
enum ArrayFormat {
    Ascii,
    Binary,
    Appended,
}

/// Holds the description of a `<DataArray>` element before decoding
#[derive(Debug)]
struct ArraySpec {
    name: Option<String>,
    kind: NumberType,
    num_components: usize,
    format: ArrayFormat,
    offset: usize,
    text: String,
}

/// Holds the arrays of one `<Piece>` before decoding
#[derive(Debug, Default)]
struct PieceSpec {
    npoint: usize,
    ncell: usize,
    points: Option<ArraySpec>,
    connectivity: Option<ArraySpec>,
    offsets: Option<ArraySpec>,
    types: Option<ArraySpec>,
    point_data: Vec<ArraySpec>,
    cell_data: Vec<ArraySpec>,
}

/// Defines the parent element of the data array being parsed
#[derive(Clone, Copy, Debug, PartialEq)]
enum Section {
    None,
    Points,
    Cells,
    PointData,
    CellData,
}

/// Holds the contents of the `<AppendedData>` element
enum Appended<'a> {
    None,
    Raw(&'a [u8]),
    Base64(String),
}

/// Parses the contents of a VTU file
fn parse_vtu(bytes: &[u8]) -> Result<UnstructuredGrid, String> {
    // the appended section may hold arbitrary bytes, so it is not handed to the XML parser
    let (xml_part, appended) = split_appended(bytes)?;

    let mut reader = Reader::from_reader(xml_part);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut layout = BinaryLayout::new();
    let mut found_root = false;
    let mut pieces: Vec<PieceSpec> = Vec::new();
    let mut piece: Option<PieceSpec> = None;
    let mut section = Section::None;
    let mut current: Option<ArraySpec> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("invalid XML at position {}: {}", reader.buffer_position(), e))?;
        match event {
            Event::Start(e) | Event::Empty(e) if !found_root => {
                if tag_name(&e) != "VTKFile" {
                    return Err("expected VTKFile as the root element".to_string());
                }
                layout = parse_root(&e)?;
                found_root = true;
            }
            Event::Start(e) => match tag_name(&e).as_str() {
                "Piece" => piece = Some(parse_piece(&e)?),
                "Points" => section = Section::Points,
                "Cells" => section = Section::Cells,
                "PointData" => section = Section::PointData,
                "CellData" => section = Section::CellData,
                "DataArray" => current = Some(parse_array(&e)?),
                _ => (),
            },
            Event::Empty(e) => {
                if tag_name(&e) == "DataArray" {
                    let spec = parse_array(&e)?;
                    store_array(piece.as_mut(), section, spec)?;
                } else if tag_name(&e) == "Piece" {
                    pieces.push(parse_piece(&e)?);
                }
            }
            Event::Text(t) => {
                if let Some(spec) = current.as_mut() {
                    let text = t.unescape().map_err(|e| format!("invalid XML text: {}", e))?;
                    spec.text.push_str(&text);
                }
            }
            Event::End(e) => match String::from_utf8_lossy(e.local_name().as_ref()).as_ref() {
                "DataArray" => {
                    if let Some(spec) = current.take() {
                        store_array(piece.as_mut(), section, spec)?;
                    }
                }
                "Points" | "Cells" | "PointData" | "CellData" => section = Section::None,
                "Piece" => {
                    if let Some(p) = piece.take() {
                        pieces.push(p);
                    }
                }
                _ => (),
            },
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
    }

    if !found_root {
        return Err("expected VTKFile as the root element".to_string());
    }
    if pieces.is_empty() {
        return Err("there are no pieces in the file".to_string());
    }
    let mut grids = pieces
        .iter()
        .map(|p| build_piece(p, &layout, &appended))
        .collect::<Result<Vec<_>, _>>()?;
    if grids.len() == 1 {
        Ok(grids.remove(0))
    } else {
        Ok(UnstructuredGrid::append_all(&grids))
    }
}

/// Splits the file into the XML header and the contents of `<AppendedData>`
fn split_appended(bytes: &[u8]) -> Result<(&[u8], Appended<'_>), String> {
    let start = match find(bytes, b"<AppendedData") {
        Some(i) => i,
        None => return Ok((bytes, Appended::None)),
    };
    let tag_end = find(&bytes[start..], b">")
        .map(|i| start + i)
        .ok_or_else(|| "unterminated AppendedData element".to_string())?;
    let tag = String::from_utf8_lossy(&bytes[start..tag_end]);
    let raw = tag.contains("\"raw\"");
    let marker = find(&bytes[tag_end..], b"_")
        .map(|i| tag_end + i + 1)
        .ok_or_else(|| "missing '_' marker in AppendedData".to_string())?;
    let data = &bytes[marker..];
    let appended = if raw {
        Appended::Raw(data)
    } else {
        let end = find(data, b"</AppendedData").unwrap_or(data.len());
        Appended::Base64(String::from_utf8_lossy(&data[..end]).trim().to_string())
    };
    Ok((&bytes[..start], appended))
}

/// Returns the position of the first occurrence of `needle`
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Reads byte order, header type, and compressor from the root element
fn parse_root(e: &BytesStart) -> Result<BinaryLayout, String> {
    let attrs = attributes(e)?;
    if let Some(kind) = attrs.get("type") {
        if kind != "UnstructuredGrid" {
            return Err(format!("expected an UnstructuredGrid file but found type=\"{}\"", kind));
        }
    }
    let mut layout = BinaryLayout::new();
    layout.big_endian = match attrs.get("byte_order").map(|s| s.as_str()) {
        None | Some("LittleEndian") => false,
        Some("BigEndian") => true,
        Some(other) => return Err(format!("unknown byte_order \"{}\"", other)),
    };
    layout.header_u64 = match attrs.get("header_type").map(|s| s.as_str()) {
        None | Some("UInt32") => false,
        Some("UInt64") => true,
        Some(other) => return Err(format!("unsupported header_type \"{}\"", other)),
    };
    layout.compressed = match attrs.get("compressor").map(|s| s.as_str()) {
        None | Some("") => false,
        Some("vtkZLibDataCompressor") => true,
        Some(other) => return Err(format!("unsupported compressor \"{}\"", other)),
    };
    Ok(layout)
}

/// Reads the number of points and cells of a piece
fn parse_piece(e: &BytesStart) -> Result<PieceSpec, String> {
    let attrs = attributes(e)?;
    Ok(PieceSpec {
        npoint: usize_attribute(&attrs, "NumberOfPoints")?.unwrap_or(0),
        ncell: usize_attribute(&attrs, "NumberOfCells")?.unwrap_or(0),
        ..Default::default()
    })
}

/// Reads the attributes of a data array
fn parse_array(e: &BytesStart) -> Result<ArraySpec, String> {
    let attrs: HashMap<String, String> = attributes(e)?;
    let type_name = attrs
        .get("type")
        .ok_or_else(|| "DataArray without type attribute".to_string())?;
    let kind =
        NumberType::from_vtk(type_name).ok_or_else(|| format!("unsupported DataArray type \"{}\"", type_name))?;
    let format = match attrs.get("format").map(|s| s.as_str()) {
        Some("ascii") => ArrayFormat::Ascii,
        Some("binary") => ArrayFormat::Binary,
        Some("appended") => ArrayFormat::Appended,
        Some(other) => return Err(format!("unsupported DataArray format \"{}\"", other)),
        None => return Err("DataArray without format attribute".to_string()),
    };
    Ok(ArraySpec {
        name: attrs.get("Name").cloned(),
        kind,
        num_components: usize_attribute(&attrs, "NumberOfComponents")?.unwrap_or(1),
        format,
        offset: usize_attribute(&attrs, "offset")?.unwrap_or(0),
        text: String::new(),
    })
}

/// Stores a parsed array in the current piece
fn store_array(piece: Option<&mut PieceSpec>, section: Section, spec: ArraySpec) -> Result<(), String> {
    let piece = match piece {
        Some(p) => p,
        None => return Ok(()), // e.g., FieldData outside pieces
    };
    match section {
        Section::Points => piece.points = Some(spec),
        Section::Cells => match spec.name.as_deref() {
            Some("connectivity") => piece.connectivity = Some(spec),
            Some("offsets") => piece.offsets = Some(spec),
            Some("types") => piece.types = Some(spec),
            _ => (),
        },
        Section::PointData => piece.point_data.push(spec),
        Section::CellData => piece.cell_data.push(spec),
        Section::None => (),
    }
    Ok(())
}

/// Decodes the values of a data array
fn decode(spec: &ArraySpec, layout: &BinaryLayout, appended: &Appended) -> Result<Vec<f64>, String> {
    let name = spec.name.as_deref().unwrap_or("unnamed");
    let values = match spec.format {
        ArrayFormat::Ascii => decode_ascii(&spec.text, spec.kind),
        ArrayFormat::Binary => decode_base64(&spec.text, spec.kind, layout),
        ArrayFormat::Appended => match appended {
            Appended::None => Err("appended DataArray but there is no AppendedData".to_string()),
            Appended::Raw(bytes) => match bytes.get(spec.offset..) {
                Some(b) => decode_raw(b, spec.kind, layout),
                None => Err("appended offset is out of range".to_string()),
            },
            Appended::Base64(text) => match text.get(spec.offset..) {
                Some(t) => decode_base64(t, spec.kind, layout),
                None => Err("appended offset is out of range".to_string()),
            },
        },
    };
    values.map_err(|message| format!("DataArray '{}': {}", name, message))
}

/// Converts decoded values into indices
fn to_indices(values: Vec<f64>, what: &str) -> Result<Vec<usize>, String> {
    values
        .into_iter()
        .map(|v| {
            if v < 0.0 || v.fract() != 0.0 {
                Err(format!("invalid {} value {}", what, v))
            } else {
                Ok(v as usize)
            }
        })
        .collect()
}

/// Decodes all arrays of a piece and assembles the grid
fn build_piece(spec: &PieceSpec, layout: &BinaryLayout, appended: &Appended) -> Result<UnstructuredGrid, String> {
    let mut grid = UnstructuredGrid::new();

    // points
    if spec.npoint > 0 {
        let points = spec.points.as_ref().ok_or_else(|| "missing Points".to_string())?;
        if points.num_components != 3 {
            return Err(format!("Points must have 3 components, found {}", points.num_components));
        }
        let coords = decode(points, layout, appended)?;
        if coords.len() != 3 * spec.npoint {
            return Err(format!(
                "expected {} point coordinates but found {}",
                3 * spec.npoint,
                coords.len()
            ));
        }
        grid.points = coords.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
    }

    // cells
    if spec.ncell > 0 {
        let missing = |what: &str| format!("missing Cells/{}", what);
        let connectivity = spec.connectivity.as_ref().ok_or_else(|| missing("connectivity"))?;
        let offsets = spec.offsets.as_ref().ok_or_else(|| missing("offsets"))?;
        let types = spec.types.as_ref().ok_or_else(|| missing("types"))?;
        grid.connectivity = to_indices(decode(connectivity, layout, appended)?, "connectivity")?;
        grid.offsets = to_indices(decode(offsets, layout, appended)?, "offsets")?;
        grid.types = to_indices(decode(types, layout, appended)?, "types")?
            .into_iter()
            .map(|t| u8::try_from(t).map_err(|_| format!("cell type {} is out of range", t)))
            .collect::<Result<_, _>>()?;
        if grid.types.len() != spec.ncell {
            return Err(format!("expected {} cell types but found {}", spec.ncell, grid.types.len()));
        }
    }

    // arrays
    for (specs, arrays) in [(&spec.point_data, &mut grid.point_data), (&spec.cell_data, &mut grid.cell_data)] {
        for a in specs {
            if let Some(name) = &a.name {
                arrays.push(FieldArray {
                    name: name.clone(),
                    num_components: a.num_components,
                    values: decode(a, layout, appended)?,
                });
            }
        }
    }

    grid.validate()?;
    Ok(grid)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
