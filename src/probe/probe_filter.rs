use super::{closest_on_segment, closest_on_triangle, combine, point_distance, tetra_coordinates};
use crate::base::CLAMP_EPSILON;
use crate::vtk::*;

/// Holds the options of the probe filter
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeOptions {
    /// Maximum distance between a probe point and the closest cell for the sample to be valid
    pub tolerance: f64,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        ProbeOptions {
            tolerance: CLAMP_EPSILON,
        }
    }
}

/// Holds the location of a point with respect to a grid
#[derive(Clone, Debug, PartialEq)]
pub struct CellSample {
    /// Holds the index of the closest cell
    pub cell: usize,

    /// Holds the distance between the point and the closest cell
    pub distance: f64,

    /// Holds the (point id, weight) pairs interpolating point data at the closest point
    pub weights: Vec<(usize, f64)>,
}

/// Holds the results of probing a grid at a set of points
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeOutput {
    /// Holds the names of the probed fields
    pub names: Vec<String>,

    /// Holds the sampled values (field-major: `values[field][point]`); NaN if invalid
    pub values: Vec<Vec<f64>>,

    /// Indicates which points were found within the tolerance
    pub valid: Vec<bool>,
}

impl ProbeOutput {
    /// Returns the sampled value of a field at a point
    pub fn value(&self, field: usize, point: usize) -> f64 {
        self.values[field][point]
    }

    /// Returns the index of the first point that could not be sampled
    pub fn first_invalid(&self) -> Option<usize> {
        self.valid.iter().position(|ok| !ok)
    }
}

/// Samples point and cell arrays of an unstructured grid at arbitrary points
///
/// Each point is located by scanning all cells for the closest one. Point
/// data are interpolated with the linear weights of the closest point in
/// that cell; cell data take the value of that cell. Higher-order cells
/// are handled through their corner points (or, for curves, through the
/// polyline connecting their nodes).
pub struct ProbeFilter<'a> {
    grid: &'a UnstructuredGrid,
    options: ProbeOptions,
}

impl<'a> ProbeFilter<'a> {
    /// Allocates a new instance
    pub fn new(grid: &'a UnstructuredGrid, options: ProbeOptions) -> Self {
        ProbeFilter { grid, options }
    }

    /// Locates the cell closest to a point
    ///
    /// Returns None if the grid has no supported cells. Ties are resolved
    /// in favor of the cell with the lowest index.
    pub fn locate(&self, x: &[f64; 3]) -> Option<CellSample> {
        let mut best: Option<CellSample> = None;
        for cell in 0..self.grid.ncell() {
            if let Some((distance, weights)) = self.closest_in_cell(cell, x) {
                let better = match &best {
                    Some(b) => distance < b.distance,
                    None => true,
                };
                if better {
                    best = Some(CellSample { cell, distance, weights });
                }
                if distance == 0.0 {
                    break;
                }
            }
        }
        best
    }

    /// Samples the given scalar fields at all points
    ///
    /// Fields are looked up among the point data first, then among the cell data.
    ///
    /// # Errors
    ///
    /// Returns a message if a field does not exist or has more than one component.
    pub fn probe(&self, points: &[[f64; 3]], fields: &[&str]) -> Result<ProbeOutput, String> {
        // find the arrays
        let mut arrays = Vec::with_capacity(fields.len());
        for name in fields {
            let (array, at_points) = match (self.grid.point_field(name), self.grid.cell_field(name)) {
                (Some(a), _) => (a, true),
                (None, Some(a)) => (a, false),
                (None, None) => return Err(format!("field '{}' is not defined at points or cells", name)),
            };
            if array.num_components != 1 {
                return Err(format!(
                    "field '{}' has {} components but only scalar fields can be probed",
                    name, array.num_components
                ));
            }
            arrays.push((array, at_points));
        }

        // sample
        let mut values = vec![vec![f64::NAN; points.len()]; fields.len()];
        let mut valid = vec![false; points.len()];
        for (p, x) in points.iter().enumerate() {
            let sample = match self.locate(x) {
                Some(s) if s.distance <= self.options.tolerance => s,
                _ => continue,
            };
            valid[p] = true;
            for (f, (array, at_points)) in arrays.iter().enumerate() {
                values[f][p] = if *at_points {
                    sample.weights.iter().map(|(id, w)| w * array.values[*id]).sum()
                } else {
                    array.values[sample.cell]
                };
            }
        }
        Ok(ProbeOutput {
            names: fields.iter().map(|s| s.to_string()).collect(),
            values,
            valid,
        })
    }

    /// Computes the distance to a cell and the weights of the closest point
    fn closest_in_cell(&self, cell: usize, x: &[f64; 3]) -> Option<(f64, Vec<(usize, f64)>)> {
        let ids = self.grid.cell_points(cell);
        let n = ids.len();
        let corners = |count: usize| if n >= count { Some(&ids[..count]) } else { None };
        match self.grid.types[cell] {
            VTK_VERTEX | VTK_POLY_VERTEX => self.nearest(
                ids.iter().map(|&id| (point_distance(x, &self.grid.points[id]), vec![(id, 1.0)])),
            ),
            VTK_LINE | VTK_POLY_LINE => self.nearest(ids.windows(2).map(|s| self.segment(x, s[0], s[1]))),
            VTK_QUADRATIC_EDGE => {
                let c = corners(3)?;
                self.nearest([self.segment(x, c[0], c[2]), self.segment(x, c[2], c[1])].into_iter())
            }
            VTK_LAGRANGE_CURVE => {
                if n < 2 {
                    return None;
                }
                // nodes along the curve: first end, interior nodes, last end
                let mut path = Vec::with_capacity(n);
                path.push(ids[0]);
                path.extend_from_slice(&ids[2..]);
                path.push(ids[1]);
                self.nearest(path.windows(2).map(|s| self.segment(x, s[0], s[1])))
            }
            VTK_TRIANGLE | VTK_QUADRATIC_TRIANGLE | VTK_LAGRANGE_TRIANGLE => {
                let c = corners(3)?;
                Some(self.triangle(x, c[0], c[1], c[2]))
            }
            VTK_QUAD | VTK_QUADRATIC_QUAD | VTK_LAGRANGE_QUADRILATERAL => {
                let c = corners(4)?;
                self.nearest([self.triangle(x, c[0], c[1], c[2]), self.triangle(x, c[0], c[2], c[3])].into_iter())
            }
            VTK_PIXEL => {
                let c = corners(4)?;
                self.nearest([self.triangle(x, c[0], c[1], c[3]), self.triangle(x, c[0], c[3], c[2])].into_iter())
            }
            VTK_POLYGON => {
                if n < 3 {
                    return None;
                }
                self.nearest((1..n - 1).map(|i| self.triangle(x, ids[0], ids[i], ids[i + 1])))
            }
            VTK_TETRA | VTK_QUADRATIC_TETRA | VTK_LAGRANGE_TETRAHEDRON => {
                let c = corners(4)?;
                Some(self.tetra(x, [c[0], c[1], c[2], c[3]]))
            }
            VTK_HEXAHEDRON | VTK_QUADRATIC_HEXAHEDRON | VTK_LAGRANGE_HEXAHEDRON => {
                let c = corners(8)?;
                Some(self.hexahedron(x, [c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
            }
            VTK_VOXEL => {
                let c = corners(8)?;
                Some(self.hexahedron(x, [c[0], c[1], c[3], c[2], c[4], c[5], c[7], c[6]]))
            }
            _ => None,
        }
    }

    /// Returns the candidate with the smallest distance (the first one on ties)
    fn nearest<I>(&self, candidates: I) -> Option<(f64, Vec<(usize, f64)>)>
    where
        I: Iterator<Item = (f64, Vec<(usize, f64)>)>,
    {
        let mut best: Option<(f64, Vec<(usize, f64)>)> = None;
        for candidate in candidates {
            let better = match &best {
                Some(b) => candidate.0 < b.0,
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }
        best
    }

    fn segment(&self, x: &[f64; 3], a: usize, b: usize) -> (f64, Vec<(usize, f64)>) {
        let pts = [self.grid.points[a], self.grid.points[b]];
        let w = closest_on_segment(x, &pts[0], &pts[1]);
        (point_distance(x, &combine(&pts, &w)), vec![(a, w[0]), (b, w[1])])
    }

    fn triangle(&self, x: &[f64; 3], a: usize, b: usize, c: usize) -> (f64, Vec<(usize, f64)>) {
        let pts = [self.grid.points[a], self.grid.points[b], self.grid.points[c]];
        let w = closest_on_triangle(x, &pts[0], &pts[1], &pts[2]);
        (point_distance(x, &combine(&pts, &w)), vec![(a, w[0]), (b, w[1]), (c, w[2])])
    }

    fn tetra(&self, x: &[f64; 3], ids: [usize; 4]) -> (f64, Vec<(usize, f64)>) {
        let p = ids.map(|id| self.grid.points[id]);
        if let Some(l) = tetra_coordinates(x, &p[0], &p[1], &p[2], &p[3]) {
            if l.iter().all(|&li| li >= -1e-12) {
                return (0.0, ids.iter().copied().zip(l).collect());
            }
        }
        let faces = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
        self.nearest(faces.iter().map(|f| self.triangle(x, ids[f[0]], ids[f[1]], ids[f[2]])))
            .unwrap_or((f64::INFINITY, Vec::new()))
    }

    /// Splits the hexahedron into six tetrahedra sharing the diagonal 0-6
    fn hexahedron(&self, x: &[f64; 3], ids: [usize; 8]) -> (f64, Vec<(usize, f64)>) {
        const TETS: [[usize; 4]; 6] = [
            [0, 1, 2, 6],
            [0, 2, 3, 6],
            [0, 3, 7, 6],
            [0, 7, 4, 6],
            [0, 4, 5, 6],
            [0, 5, 1, 6],
        ];
        self.nearest(TETS.iter().map(|t| self.tetra(x, t.map(|i| ids[i]))))
            .unwrap_or((f64::INFINITY, Vec::new()))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{ProbeFilter, ProbeOptions};
    use crate::base::CLAMP_EPSILON;
    use crate::vtk::*;
    use russell_chk::assert_approx_eq;

    fn unit_tetra() -> UnstructuredGrid {
        let mut grid = UnstructuredGrid::new();
        grid.points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        grid.push_cell(VTK_TETRA, &[0, 1, 2, 3]);
        let u = grid.points.iter().map(|x| 1.0 + 2.0 * x[0] + 3.0 * x[1] + 4.0 * x[2]).collect();
        grid.point_data.push(FieldArray::scalar("u", u));
        grid
    }

    fn unit_cube() -> UnstructuredGrid {
        let mut grid = UnstructuredGrid::new();
        grid.points = vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ];
        grid.push_cell(VTK_HEXAHEDRON, &[0, 1, 2, 3, 4, 5, 6, 7]);
        let u = grid.points.iter().map(|x| x[0] + x[1] + x[2]).collect();
        grid.point_data.push(FieldArray::scalar("u", u));
        grid.cell_data.push(FieldArray::scalar("material", vec![7.0]));
        grid
    }

    #[test]
    fn default_options_work() {
        assert_eq!(ProbeOptions::default().tolerance, CLAMP_EPSILON);
    }

    #[test]
    fn probe_captures_errors() {
        let mut grid = Samples::unit_square_tri3();
        grid.point_data.push(FieldArray {
            name: "v".to_string(),
            num_components: 2,
            values: vec![0.0; 8],
        });
        let probe = ProbeFilter::new(&grid, ProbeOptions::default());
        assert_eq!(
            probe.probe(&[[0.5, 0.5, 0.0]], &["w"]).err(),
            Some("field 'w' is not defined at points or cells".to_string())
        );
        assert_eq!(
            probe.probe(&[[0.5, 0.5, 0.0]], &["v"]).err(),
            Some("field 'v' has 2 components but only scalar fields can be probed".to_string())
        );
    }

    #[test]
    fn probe_triangles_works() {
        let grid = Samples::unit_square_tri3();
        let probe = ProbeFilter::new(&grid, ProbeOptions::default());
        let out = probe
            .probe(&[[0.25, 0.5, 0.0], [0.75, 0.25, 0.0], [0.25, 0.75, 0.0]], &["u", "id"])
            .unwrap();
        assert_eq!(out.names, &["u", "id"]);
        assert_eq!(out.valid, &[true, true, true]);
        assert_eq!(out.first_invalid(), None);
        assert_approx_eq!(out.value(0, 0), 0.75, 1e-15);
        assert_approx_eq!(out.value(0, 1), 1.0, 1e-15);
        assert_approx_eq!(out.value(0, 2), 1.0, 1e-15);
        assert_eq!(out.value(1, 1), 0.0);
        assert_eq!(out.value(1, 2), 1.0);
    }

    #[test]
    fn probe_handles_tolerance() {
        let grid = Samples::unit_square_tri3();
        let points = [[-0.5, 0.5, 0.0], [0.5, 0.5, 0.5 * CLAMP_EPSILON]];

        let probe = ProbeFilter::new(&grid, ProbeOptions::default());
        let out = probe.probe(&points, &["u"]).unwrap();
        assert_eq!(out.valid, &[false, true]);
        assert_eq!(out.first_invalid(), Some(0));
        assert!(out.value(0, 0).is_nan());

        let probe = ProbeFilter::new(&grid, ProbeOptions { tolerance: 1.0 });
        let out = probe.probe(&points, &["u"]).unwrap();
        assert_eq!(out.valid, &[true, true]);
        assert_approx_eq!(out.value(0, 0), 0.5, 1e-15);
    }

    #[test]
    fn probe_lines_works() {
        let grid = Samples::fault_2d(4, 2.0, 10.0);
        let probe = ProbeFilter::new(&grid, ProbeOptions::default());
        let out = probe.probe(&[[0.0, -0.7, 0.0], [0.0, 0.0, 0.0]], &["state1", "state3"]).unwrap();
        assert_eq!(out.valid, &[true, true]);
        assert_approx_eq!(out.value(0, 0), 20.7, 1e-14);
        assert_approx_eq!(out.value(1, 0), 40.7, 1e-14);
        assert_approx_eq!(out.value(0, 1), 20.0, 1e-14);
        let sample = probe.locate(&[0.0, -0.7, 0.0]).unwrap();
        assert_eq!(sample.cell, 1);
        assert_approx_eq!(sample.distance, 0.0, 1e-15);
    }

    #[test]
    fn probe_lagrange_curve_works() {
        let mut grid = UnstructuredGrid::new();
        grid.points = vec![[0.0, 0.0, 0.0], [0.0, -2.0, 0.0], [0.0, -1.0, 0.0]];
        grid.push_cell(VTK_LAGRANGE_CURVE, &[0, 1, 2]);
        grid.point_data.push(FieldArray::scalar("s", vec![0.0, 4.0, 1.0]));
        let probe = ProbeFilter::new(&grid, ProbeOptions::default());
        let out = probe.probe(&[[0.0, -0.5, 0.0], [0.0, -1.5, 0.0]], &["s"]).unwrap();
        assert_approx_eq!(out.value(0, 0), 0.5, 1e-15);
        assert_approx_eq!(out.value(0, 1), 2.5, 1e-15);
    }

    #[test]
    fn probe_tetra_works() {
        let grid = unit_tetra();
        let probe = ProbeFilter::new(&grid, ProbeOptions::default());
        let out = probe.probe(&[[0.1, 0.2, 0.3], [1.0, 1.0, 1.0]], &["u"]).unwrap();
        assert_eq!(out.valid, &[true, false]);
        assert_approx_eq!(out.value(0, 0), 3.0, 1e-14);
        let sample = probe.locate(&[1.0, 1.0, 1.0]).unwrap();
        assert_approx_eq!(sample.distance, f64::sqrt(3.0) * 2.0 / 3.0, 1e-14);
    }

    #[test]
    fn probe_hexahedron_works() {
        let grid = unit_cube();
        let probe = ProbeFilter::new(&grid, ProbeOptions::default());
        let out = probe.probe(&[[0.3, 0.4, 0.5], [1.0, 1.0, 1.0]], &["u", "material"]).unwrap();
        assert_eq!(out.valid, &[true, true]);
        assert_approx_eq!(out.value(0, 0), 1.2, 1e-14);
        assert_approx_eq!(out.value(0, 1), 3.0, 1e-14);
        assert_eq!(out.value(1, 0), 7.0);
    }

    #[test]
    fn locate_handles_empty_grid() {
        let grid = UnstructuredGrid::new();
        let probe = ProbeFilter::new(&grid, ProbeOptions::default());
        assert_eq!(probe.locate(&[0.0, 0.0, 0.0]), None);
        let out = probe.probe(&[[0.0, 0.0, 0.0]], &[]).unwrap();
        assert_eq!(out.valid, &[false]);
    }
}
