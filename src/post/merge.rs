use crate::base::Progress;
use crate::vtk::{read_grid, write_pvd, write_vtu, TimeSeriesIndex};
use crate::TndmError;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Converts a parallel time series (PVD referencing PVTU files) into a serial one
///
/// The pieces of each PVTU file are appended and written as a single VTU
/// file at the same location relative to the PVD file, but within `out_dir`.
/// A PVTU file outside of the PVD directory is written as `out_dir/<name>.vtu`.
/// Then, a PVD file listing the new VTU files is written into `out_dir`.
///
/// # Input
///
/// * `pvd_path` -- the PVD file; may be a String, &str, or Path
/// * `out_dir` -- the output directory (created if needed)
/// * `show_progress` -- prints a progress bar
///
/// # Output
///
/// Returns the path of the new PVD file followed by the paths of the VTU files.
pub fn merge_pvd<P, Q>(pvd_path: &P, out_dir: &Q, show_progress: bool) -> Result<Vec<PathBuf>, TndmError>
where
    P: AsRef<OsStr> + ?Sized,
    Q: AsRef<OsStr> + ?Sized,
{
    let pvd_path = Path::new(pvd_path);
    let out_dir = Path::new(out_dir);
    let index = TimeSeriesIndex::read(pvd_path)?;
    let pvd_dir = pvd_path.parent().unwrap_or_else(|| Path::new(""));
    let pvd_name = pvd_path
        .file_name()
        .ok_or(TndmError::Invalid("the PVD path must have a file name"))?;
    info!(nstep = index.len(), out_dir = %out_dir.display(), "merging");

    // merge the pieces
    let mut entries = Vec::with_capacity(index.len());
    let mut targets = Vec::with_capacity(index.len());
    let progress = Progress::new(index.len(), show_progress);
    for (i, entry) in index.iter().enumerate() {
        let relative = entry
            .file_path
            .strip_prefix(pvd_dir)
            .ok()
            .filter(|r| r.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)))
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(entry.file_path.file_name().unwrap_or_default()));
        let name = relative.with_extension("vtu").to_string_lossy().to_string();
        let target = out_dir.join(&name);
        debug!(source = %entry.file_path.display(), target = %target.display(), "merging pieces");
        let grid = read_grid(&entry.file_path)?;
        write_vtu(&grid, &target)?;
        entries.push((entry.time, name));
        targets.push(target);
        progress.update(i);
    }

    // write the collection
    let new_pvd = out_dir.join(pvd_name);
    write_pvd(&new_pvd, &entries)?;
    let mut written = vec![new_pvd];
    written.extend(targets);
    Ok(written)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
