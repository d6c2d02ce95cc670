use super::xml::{attributes, tag_name};
use super::{read_vtu, UnstructuredGrid};
use crate::TndmError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads a parallel VTK XML unstructured grid file (.pvtu) and appends all its pieces
///
/// The piece files given by the `Source` attributes are resolved relative
/// to the directory of the PVTU file.
///
/// # Input
///
/// * `full_path` -- may be a String, &str, or Path
pub fn read_pvtu<P>(full_path: &P) -> Result<UnstructuredGrid, TndmError>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path);
    let sources = pvtu_sources(path)?;
    let mut pieces = Vec::with_capacity(sources.len());
    for source in &sources {
        debug!(piece = %source.display(), "reading piece");
        pieces.push(read_vtu(source)?);
    }
    Ok(UnstructuredGrid::append_all(&pieces))
}

/// Reads any supported grid file, selected by the extension (.vtu or .pvtu)
///
/// # Input
///
/// * `full_path` -- may be a String, &str, or Path
pub fn read_grid<P>(full_path: &P) -> Result<UnstructuredGrid, TndmError>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path);
    match path.extension().and_then(|e| e.to_str()) {
        Some("vtu") => read_vtu(path),
        Some("pvtu") => read_pvtu(path),
        _ => Err(TndmError::format(
            path,
            "unsupported mesh file format (expected .vtu or .pvtu)",
        )),
    }
}

/// Returns the paths of the piece files referenced by a PVTU file
pub fn pvtu_sources(path: &Path) -> Result<Vec<PathBuf>, TndmError> {
    if !path.is_file() {
        return Err(TndmError::NotFound(path.to_path_buf()));
    }
    let contents = fs::read(path).map_err(|e| TndmError::io(path, e))?;
    let dirname = path.parent().unwrap_or_else(|| Path::new(""));
    let names = parse_sources(&contents).map_err(|message| TndmError::format(path, message))?;
    let mut sources = Vec::with_capacity(names.len());
    for name in names {
        let source = dirname.join(name);
        if !source.is_file() {
            return Err(TndmError::NotFound(source));
        }
        sources.push(source);
    }
    Ok(sources)
}

/// Parses the PVTU document and returns the `Source` attribute of all pieces
fn parse_sources(contents: &[u8]) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_reader(contents);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut found_root = false;
    let mut sources = Vec::new();
    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("invalid XML at position {}: {}", reader.buffer_position(), e))?
        {
            Event::Start(e) | Event::Empty(e) => {
                let name = tag_name(&e);
                if !found_root {
                    let attrs = attributes(&e)?;
                    if name != "VTKFile" || attrs.get("type").map(|s| s.as_str()) != Some("PUnstructuredGrid") {
                        return Err("expected a VTKFile of type PUnstructuredGrid".to_string());
                    }
                    found_root = true;
                } else if name == "Piece" {
                    let attrs = attributes(&e)?;
                    match attrs.get("Source") {
                        Some(source) if !source.is_empty() => sources.push(source.clone()),
                        _ => return Err("expected attribute 'Source' in Piece".to_string()),
                    }
                }
            }
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
    }
    if !found_root {
        return Err("expected a VTKFile of type PUnstructuredGrid".to_string());
    }
    Ok(sources)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
