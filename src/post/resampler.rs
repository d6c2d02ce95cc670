use super::{clamp_points, VariableMap};
use crate::base::{BoundingBox, Progress};
use crate::probe::{ProbeFilter, ProbeOptions, ProbeOutput};
use crate::vtk::{read_grid, TimeSeriesIndex, UnstructuredGrid};
use crate::TndmError;
use std::path::Path;
use tracing::{debug, info};

/// Defines the capabilities of a mesh needed by the resampler
pub trait ProbeMesh {
    /// Returns the bounding box of the mesh
    fn bounds(&self) -> BoundingBox;

    /// Samples scalar fields at a set of points
    ///
    /// Returns a message if a field is missing or cannot be probed.
    fn probe(&self, points: &[[f64; 3]], fields: &[&str], options: &ProbeOptions) -> Result<ProbeOutput, String>;
}

/// Loads the mesh of one time step
pub trait MeshLoader {
    /// Defines the type of the loaded mesh
    type Mesh: ProbeMesh;

    /// Loads a mesh from a file
    fn load(&mut self, path: &Path) -> Result<Self::Mesh, TndmError>;
}

impl ProbeMesh for UnstructuredGrid {
    fn bounds(&self) -> BoundingBox {
        UnstructuredGrid::bounds(self)
    }

    fn probe(&self, points: &[[f64; 3]], fields: &[&str], options: &ProbeOptions) -> Result<ProbeOutput, String> {
        ProbeFilter::new(self, *options).probe(points, fields)
    }
}

/// Loads VTU and PVTU files
#[derive(Clone, Copy, Debug, Default)]
pub struct GridLoader;

impl MeshLoader for GridLoader {
    type Mesh = UnstructuredGrid;
    fn load(&mut self, path: &Path) -> Result<UnstructuredGrid, TndmError> {
        read_grid(path)
    }
}

/// Holds the values sampled at the stations over time
///
/// The values are indexed by `(variable, timestep, station)`; variable 0
/// is the time, and variable `q + 1` corresponds to the `q`-th mapped column.
#[derive(Clone, Debug, PartialEq)]
pub struct ResampledData {
    /// Holds the column names: "Time" followed by the mapped columns
    pub columns: Vec<String>,

    /// Holds the number of time steps
    pub nstep: usize,

    /// Holds the number of stations
    pub nstation: usize,

    /// Holds all values (variable-major, then time step, then station)
    values: Vec<f64>,
}

impl ResampledData {
    /// Allocates a new instance filled with NaN
    pub fn new(columns: Vec<String>, nstep: usize, nstation: usize) -> Self {
        let size = columns.len() * nstep * nstation;
        ResampledData {
            columns,
            nstep,
            nstation,
            values: vec![f64::NAN; size],
        }
    }

    /// Returns the shape `(number of columns, nstep, nstation)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.columns.len(), self.nstep, self.nstation)
    }

    /// Returns a value
    pub fn get(&self, variable: usize, step: usize, station: usize) -> f64 {
        self.values[self.position(variable, step, station)]
    }

    /// Sets a value
    pub fn set(&mut self, variable: usize, step: usize, station: usize, value: f64) {
        let k = self.position(variable, step, station);
        self.values[k] = value;
    }

    fn position(&self, variable: usize, step: usize, station: usize) -> usize {
        assert!(variable < self.columns.len() && step < self.nstep && station < self.nstation);
        (variable * self.nstep + step) * self.nstation + station
    }
}

/// Samples mapped mesh fields at stations for every time step
pub struct StationResampler<L: MeshLoader> {
    loader: L,
    variables: VariableMap,
    options: ProbeOptions,
    show_progress: bool,
}

impl<L: MeshLoader> StationResampler<L> {
    /// Allocates a new instance
    pub fn new(loader: L, variables: VariableMap) -> Self {
        StationResampler {
            loader,
            variables,
            options: ProbeOptions::default(),
            show_progress: false,
        }
    }

    /// Sets the probe tolerance
    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<&mut Self, TndmError> {
        if !(tolerance >= 0.0) {
            return Err(TndmError::Invalid("the probe tolerance must be non-negative"));
        }
        self.options.tolerance = tolerance;
        Ok(self)
    }

    /// Enables the progress bar
    pub fn set_progress(&mut self, flag: bool) -> &mut Self {
        self.show_progress = flag;
        self
    }

    /// Returns the variable map
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// Samples all time steps at the stations
    ///
    /// The stations are clamped once against the bounding box of the first
    /// mesh; the following meshes are assumed to share its geometry.
    ///
    /// # Errors
    ///
    /// * [TndmError::OutOfBounds] if a station lies too far outside of the first mesh
    /// * [TndmError::ProbeMiss] if no cell is found for a station
    /// * [TndmError::Format] if a mapped field is missing (or a mesh cannot be read)
    pub fn resample(&mut self, index: &TimeSeriesIndex, stations: &[[f64; 3]]) -> Result<ResampledData, TndmError> {
        let mut columns = vec!["Time".to_string()];
        columns.extend(self.variables.columns().iter().map(|c| c.to_string()));
        let mut data = ResampledData::new(columns, index.len(), stations.len());
        if index.is_empty() {
            return Ok(data);
        }
        info!(nstep = index.len(), nstation = stations.len(), "resampling");

        // move the stations into the bounding box of the first mesh
        let first = self.loader.load(&index[0].file_path)?;
        let points = clamp_points(stations, &first.bounds())?;

        let fields = self.variables.fields();
        let columns = self.variables.columns();
        let progress = Progress::new(index.len(), self.show_progress);
        for (t, entry) in index.iter().enumerate() {
            debug!(file = %entry.file_path.display(), time = entry.time, "probing");
            let mesh = if t == 0 {
                None
            } else {
                Some(self.loader.load(&entry.file_path)?)
            };
            let mesh = mesh.as_ref().unwrap_or(&first);
            let output = mesh
                .probe(&points, &fields, &self.options)
                .map_err(|message| TndmError::format(&entry.file_path, message))?;
            if let Some(s) = output.first_invalid() {
                return Err(TndmError::ProbeMiss {
                    point: points[s],
                    path: entry.file_path.clone(),
                });
            }
            for s in 0..points.len() {
                data.set(0, t, s, entry.time);
                for (q, column) in columns.iter().enumerate() {
                    data.set(q + 1, t, s, self.variables.transform(column, output.value(q, s)));
                }
            }
            progress.update(t);
        }
        Ok(data)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{MeshLoader, ResampledData, StationResampler};
    use crate::post::VariableMap;
    use crate::vtk::*;
    use crate::TndmError;
    use russell_chk::assert_approx_eq;
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Generates fault meshes in memory; the time is taken from the file name
    struct FaultLoader {
        loaded: Vec<PathBuf>,
    }

    impl MeshLoader for FaultLoader {
        type Mesh = UnstructuredGrid;
        fn load(&mut self, path: &Path) -> Result<UnstructuredGrid, TndmError> {
            self.loaded.push(path.to_path_buf());
            let stem = path.file_stem().unwrap().to_str().unwrap();
            let time: f64 = stem.trim_start_matches("step_").parse().unwrap();
            Ok(Samples::fault_2d(4, 2.0, time))
        }
    }

    /// Returns a single triangle of the unit square (the upper-left half is empty)
    struct HalfSquareLoader;

    impl MeshLoader for HalfSquareLoader {
        type Mesh = UnstructuredGrid;
        fn load(&mut self, _: &Path) -> Result<UnstructuredGrid, TndmError> {
            let mut grid = UnstructuredGrid::new();
            grid.points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]];
            grid.push_cell(VTK_TRIANGLE, &[0, 1, 2]);
            grid.point_data.push(FieldArray::scalar("u", vec![0.0, 1.0, 2.0]));
            Ok(grid)
        }
    }

    /// Writes a PVD file with empty data files named after the times
    fn write_index(dir: &Path, times: &[f64]) -> TimeSeriesIndex {
        let mut entries = Vec::new();
        for t in times {
            let name = format!("step_{}.vtu", t);
            fs::write(dir.join(&name), "").unwrap();
            entries.push((*t, name));
        }
        let path = dir.join("fault.pvd");
        write_pvd(&path, &entries).unwrap();
        TimeSeriesIndex::read(&path).unwrap()
    }

    #[test]
    fn resampled_data_works() {
        let mut data = ResampledData::new(vec!["Time".to_string(), "slip".to_string()], 3, 2);
        assert_eq!(data.shape(), (2, 3, 2));
        assert!(data.get(1, 2, 1).is_nan());
        data.set(1, 2, 1, 5.0);
        assert_eq!(data.get(1, 2, 1), 5.0);
        assert!(data.get(1, 2, 0).is_nan());
    }

    #[test]
    fn set_tolerance_captures_errors() {
        let mut resampler = StationResampler::new(HalfSquareLoader, VariableMap::new());
        assert_eq!(
            resampler.set_tolerance(-1.0).err().map(|e| e.to_string()),
            Some("the probe tolerance must be non-negative".to_string())
        );
        assert!(resampler.set_tolerance(f64::NAN).is_err());
        assert!(resampler.set_tolerance(0.5).is_ok());
    }

    #[test]
    fn variables_works() {
        let mut variables = VariableMap::from_pairs(&[("state1", "slip")]);
        variables.set_transform("slip", Box::new(|x| 2.0 * x));
        let resampler = StationResampler::new(HalfSquareLoader, variables);
        assert_eq!(resampler.variables().columns(), &["slip"]);
        assert_eq!(format!("{}", resampler.variables()), "state1 → slip (transformed)\n");
    }

    #[test]
    fn resample_works() {
        let dir = tempfile::tempdir().unwrap();
        let index = write_index(dir.path(), &[20.0, 0.0, 10.0]);
        let mut variables = VariableMap::from_pairs(&[("state1", "slip"), ("state3", "slip_rate")]);
        variables.set_transform("slip_rate", Box::new(|x| -x));
        let loader = FaultLoader { loaded: Vec::new() };
        let mut resampler = StationResampler::new(loader, variables);
        let stations = [[0.0, -0.25, 0.0], [0.00005, -1.5, 0.0]];
        let data = resampler.resample(&index, &stations).unwrap();

        assert_eq!(data.columns, &["Time", "slip", "slip_rate"]);
        assert_eq!(data.shape(), (3, 3, 2));
        for t in 0..3 {
            let time = 10.0 * (t as f64);
            for s in 0..2 {
                assert_eq!(data.get(0, t, s), time);
            }
            assert_approx_eq!(data.get(1, t, 0), 10.0 + time + 0.25, 1e-13);
            assert_approx_eq!(data.get(1, t, 1), 10.0 + time + 1.5, 1e-13);
            assert_approx_eq!(data.get(2, t, 0), -(30.0 + time + 0.25), 1e-13);
            assert_approx_eq!(data.get(2, t, 1), -(30.0 + time + 1.5), 1e-13);
        }

        // each mesh is loaded once, in time order
        let loaded: Vec<_> = resampler
            .loader
            .loaded
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(loaded, &["step_0.vtu", "step_10.vtu", "step_20.vtu"]);
    }

    #[test]
    fn resample_handles_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let index = write_index(dir.path(), &[]);
        let loader = FaultLoader { loaded: Vec::new() };
        let mut resampler = StationResampler::new(loader, VariableMap::from_pairs(&[("state1", "slip")]));
        let data = resampler.resample(&index, &[[0.0, 0.0, 0.0]]).unwrap();
        assert_eq!(data.shape(), (2, 0, 1));
        assert!(resampler.loader.loaded.is_empty());
    }

    #[test]
    fn resample_captures_errors() {
        let dir = tempfile::tempdir().unwrap();
        let index = write_index(dir.path(), &[0.0]);
        let file = dir.path().join("step_0.vtu");

        // far outside of the bounding box
        let mut resampler = StationResampler::new(HalfSquareLoader, VariableMap::from_pairs(&[("u", "u")]));
        assert_eq!(
            resampler.resample(&index, &[[0.5, 2.0, 0.0]]).err().map(|e| e.to_string()),
            Some("station [0.5, 2.0, 0.0] lies too far outside of the mesh's bounding box [0.0, 1.0, 0.0, 1.0, 0.0, 0.0]".to_string())
        );

        // inside of the bounding box but not close to any cell
        match resampler.resample(&index, &[[0.5, 0.25, 0.0], [0.1, 0.9, 0.0]]).err() {
            Some(TndmError::ProbeMiss { point, path }) => {
                assert_eq!(point, [0.1, 0.9, 0.0]);
                assert_eq!(path, file);
            }
            other => panic!("expected ProbeMiss, got {:?}", other),
        }

        // a larger tolerance accepts the station
        resampler.set_tolerance(1.0).unwrap();
        assert!(resampler.resample(&index, &[[0.1, 0.9, 0.0]]).is_ok());

        // missing field
        let mut resampler = StationResampler::new(HalfSquareLoader, VariableMap::from_pairs(&[("state1", "slip")]));
        assert_eq!(
            resampler.resample(&index, &[[0.5, 0.25, 0.0]]).err().map(|e| e.to_string()),
            Some(format!("{}: field 'state1' is not defined at points or cells", file.display()))
        );
    }
}
