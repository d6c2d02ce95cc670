use super::xml::{attributes, tag_name};
use crate::TndmError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::ffi::OsStr;
use std::fmt::Write;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::ops::Index;
use std::path::{Path, PathBuf};

/// Holds one entry of a PVD collection
#[derive(Clone, Debug, PartialEq)]
pub struct DataSetEntry {
    /// Holds the time of the output
    pub time: f64,

    /// Holds the path of the data file (resolved relative to the PVD file)
    pub file_path: PathBuf,
}

/// Defines how a missing time stamp is replaced
///
/// In both cases the replacement is the zero-based position of the
/// `DataSet` element in the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestepPolicy {
    /// Only an absent `timestep` attribute is replaced; `timestep="0"` means time zero
    Explicit,

    /// An absent or zero `timestep` is replaced (legacy behavior)
    ZeroMeansAbsent,
}

/// Holds the time-ordered list of data files given by a PVD file
///
/// The entries are sorted by time with a stable sort; thus, entries with
/// the same time keep their order in the document.
#[derive(Clone, Debug)]
pub struct TimeSeriesIndex {
    entries: Vec<DataSetEntry>,
}

impl TimeSeriesIndex {
    /// Reads a PVD file using [TimestepPolicy::Explicit]
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read<P>(full_path: &P) -> Result<Self, TndmError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        TimeSeriesIndex::read_with_policy(full_path, TimestepPolicy::Explicit)
    }

    /// Reads a PVD file
    ///
    /// # Errors
    ///
    /// * [TndmError::Format] if the root is not `VTKFile` version 0.1, a
    ///   `DataSet` has no `file` attribute, or a `timestep` is not a number
    /// * [TndmError::NotFound] if a referenced data file does not exist
    pub fn read_with_policy<P>(full_path: &P, policy: TimestepPolicy) -> Result<Self, TndmError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path);
        if !path.is_file() {
            return Err(TndmError::NotFound(path.to_path_buf()));
        }
        let contents = fs::read(path).map_err(|e| TndmError::io(path, e))?;
        let records = parse_collection(&contents).map_err(|message| TndmError::format(path, message))?;
        let dirname = path.parent().unwrap_or_else(|| Path::new(""));
        let mut entries = Vec::with_capacity(records.len());
        for (ordinal, (file, timestep)) in records.into_iter().enumerate() {
            let file_path = dirname.join(&file);
            if !file_path.is_file() {
                return Err(TndmError::NotFound(file_path));
            }
            let time = match (timestep, policy) {
                (None, _) => ordinal as f64,
                (Some(t), TimestepPolicy::ZeroMeansAbsent) if t == 0.0 => ordinal as f64,
                (Some(t), _) => t,
            };
            entries.push(DataSetEntry { time, file_path });
        }
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(TimeSeriesIndex { entries })
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry at a position
    pub fn get(&self, index: usize) -> Option<&DataSetEntry> {
        self.entries.get(index)
    }

    /// Returns an iterator over the entries in time order
    pub fn iter(&self) -> std::slice::Iter<'_, DataSetEntry> {
        self.entries.iter()
    }

    /// Returns the times of all entries
    pub fn times(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.time).collect()
    }
}

impl Index<usize> for TimeSeriesIndex {
    type Output = DataSetEntry;
    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a TimeSeriesIndex {
    type Item = &'a DataSetEntry;
    type IntoIter = std::slice::Iter<'a, DataSetEntry>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Parses the PVD document and returns the `(file, timestep)` pairs in document order
fn parse_collection(contents: &[u8]) -> Result<Vec<(String, Option<f64>)>, String> {
    let mut reader = Reader::from_reader(contents);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0;
    let mut in_collection = false;
    let mut records = Vec::new();
    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| format!("invalid XML at position {}: {}", reader.buffer_position(), e))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = tag_name(e);
                if depth == 0 {
                    let attrs = attributes(e)?;
                    let version = attrs.get("version").map(|v| v.trim());
                    if name != "VTKFile" || version != Some("0.1") {
                        return Err("expected VTKFile version 0.1".to_string());
                    }
                } else if depth == 1 && name == "Collection" {
                    in_collection = !is_empty;
                } else if depth == 2 && in_collection && name == "DataSet" {
                    let attrs = attributes(e)?;
                    let file = match attrs.get("file") {
                        Some(f) if !f.is_empty() => f.clone(),
                        _ => return Err("expected attribute 'file' in DataSet".to_string()),
                    };
                    let timestep = match attrs.get("timestep") {
                        Some(t) => Some(
                            t.trim()
                                .parse::<f64>()
                                .map_err(|_| format!("cannot parse timestep=\"{}\" as a number", t))?,
                        ),
                        None => None,
                    };
                    records.push((file, timestep));
                }
                if !is_empty {
                    depth += 1;
                }
            }
            Event::End(_) => {
                depth -= 1;
                if depth == 1 {
                    in_collection = false;
                }
            }
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
    }
    Ok(records)
}

/// Writes a PVD file referencing a sequence of data files
///
/// # Input
///
/// * `full_path` -- may be a String, &str, or Path
/// * `entries` -- `(time, file)` pairs; `file` is written as given (usually relative to the PVD file)
pub fn write_pvd<P>(full_path: &P, entries: &[(f64, String)]) -> Result<(), TndmError>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path);

    // header
    let mut buffer = String::new();
    write!(
        &mut buffer,
        "<?xml version=\"1.0\"?>\n<VTKFile type=\"Collection\" version=\"0.1\" byte_order=\"LittleEndian\">\n<Collection>\n"
    )
    .unwrap();

    // add VTU entries to PVD file
    for (time, file) in entries {
        write!(&mut buffer, "<DataSet timestep=\"{:?}\" file=\"{}\" />\n", time, file).unwrap();
    }

    // footer
    write!(&mut buffer, "</Collection>\n</VTKFile>\n").unwrap();

    // write file
    if let Some(p) = path.parent() {
        fs::create_dir_all(p).map_err(|e| TndmError::io(p, e))?;
    }
    let mut file = File::create(path).map_err(|e| TndmError::io(path, e))?;
    file.write_all(buffer.as_bytes()).map_err(|e| TndmError::io(path, e))?;
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
