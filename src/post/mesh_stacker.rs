use super::MeshLoader;
use crate::base::{Progress, SECONDS_PER_YEAR};
use crate::vtk::{TimeSeriesIndex, UnstructuredGrid};
use crate::TndmError;
use std::path::PathBuf;
use tracing::{debug, info};

/// Holds one time step of a stacked series
#[derive(Clone, Debug, PartialEq)]
pub struct StackedStep {
    /// Holds the time in seconds
    pub time: f64,

    /// Holds the file the mesh was read from
    pub file_path: PathBuf,

    /// Holds the translated mesh
    pub grid: UnstructuredGrid,
}

/// Loads all meshes of a time series and moves each one along a time axis
///
/// Each mesh is translated along `axis` (0, 1, or 2) by `time / SECONDS_PER_YEAR`,
/// i.e., the stacking coordinate is the time in years.
pub fn stack_steps<L>(
    loader: &mut L,
    index: &TimeSeriesIndex,
    axis: usize,
    show_progress: bool,
) -> Result<Vec<StackedStep>, TndmError>
where
    L: MeshLoader<Mesh = UnstructuredGrid>,
{
    if axis > 2 {
        return Err(TndmError::Invalid("the time axis must be 0, 1, or 2"));
    }
    info!(nstep = index.len(), axis, "stacking meshes");
    let progress = Progress::new(index.len(), show_progress);
    let mut steps = Vec::with_capacity(index.len());
    for (i, entry) in index.iter().enumerate() {
        debug!(file = %entry.file_path.display(), time = entry.time, "loading");
        let mut grid = loader.load(&entry.file_path)?;
        let mut shift = [0.0; 3];
        shift[axis] = entry.time / SECONDS_PER_YEAR;
        grid.translate(shift);
        steps.push(StackedStep {
            time: entry.time,
            file_path: entry.file_path.clone(),
            grid,
        });
        progress.update(i);
    }
    Ok(steps)
}

/// Combines all meshes of a time series into one, stacked along a time axis
///
/// Arrays that are not present in all meshes are dropped from the result.
pub fn stack_meshes<L>(
    loader: &mut L,
    index: &TimeSeriesIndex,
    axis: usize,
    show_progress: bool,
) -> Result<UnstructuredGrid, TndmError>
where
    L: MeshLoader<Mesh = UnstructuredGrid>,
{
    let steps = stack_steps(loader, index, axis, show_progress)?;
    let grids: Vec<_> = steps.into_iter().map(|s| s.grid).collect();
    Ok(UnstructuredGrid::append_all(&grids))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
