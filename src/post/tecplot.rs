use super::ResampledData;
use crate::TndmError;
use std::fmt::Write;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::PathBuf;

/// Writes one Tecplot table per station
///
/// The files are named `{prefix}_{name}.dat`, or `{prefix}_{index}.dat` if
/// no station names are given. Each file contains a title, the variable
/// names, and one line per time step:
///
/// ```text
/// TITLE = "Temporal signal for station 0"
/// VARIABLES = "Time","slip"
/// 0.0 1.5
/// 10.0 1.75
/// ```
///
/// # Input
///
/// * `prefix` -- the output path prefix (may contain directories)
/// * `data` -- the resampled data
/// * `names` -- the station names (one per station)
///
/// # Output
///
/// Returns the paths of the written files in station order.
pub fn write_tecplot(prefix: &str, data: &ResampledData, names: Option<&[String]>) -> Result<Vec<PathBuf>, TndmError> {
    let (ncol, nstep, nstation) = data.shape();
    if let Some(n) = names {
        if n.len() != nstation {
            return Err(TndmError::Invalid("the number of station names must equal the number of stations"));
        }
    }
    let header: Vec<_> = data.columns.iter().map(|c| format!("\"{}\"", c)).collect();
    let mut paths = Vec::with_capacity(nstation);
    for s in 0..nstation {
        let path = match names {
            Some(n) => PathBuf::from(format!("{}_{}.dat", prefix, n[s])),
            None => PathBuf::from(format!("{}_{}.dat", prefix, s)),
        };

        let mut buffer = String::new();
        write!(&mut buffer, "TITLE = \"Temporal signal for station {}\"\n", s).unwrap();
        write!(&mut buffer, "VARIABLES = {}\n", header.join(",")).unwrap();
        for t in 0..nstep {
            let row: Vec<_> = (0..ncol).map(|q| format!("{:?}", data.get(q, t, s))).collect();
            write!(&mut buffer, "{}\n", row.join(" ")).unwrap();
        }

        if let Some(p) = path.parent() {
            if !p.as_os_str().is_empty() {
                fs::create_dir_all(p).map_err(|e| TndmError::io(p, e))?;
            }
        }
        let mut file = File::create(&path).map_err(|e| TndmError::io(&path, e))?;
        file.write_all(buffer.as_bytes()).map_err(|e| TndmError::io(&path, e))?;
        paths.push(path);
    }
    Ok(paths)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
