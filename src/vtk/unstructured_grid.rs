use crate::base::BoundingBox;

/// Holds a named array of values attached to points or cells
#[derive(Clone, Debug, PartialEq)]
pub struct FieldArray {
    /// Holds the name of the array (e.g., "state1")
    pub name: String,

    /// Holds the number of components per tuple
    pub num_components: usize,

    /// Holds all values (tuple-major)
    pub values: Vec<f64>,
}

impl FieldArray {
    /// Allocates a new scalar array
    pub fn scalar(name: &str, values: Vec<f64>) -> Self {
        FieldArray {
            name: name.to_string(),
            num_components: 1,
            values,
        }
    }

    /// Returns the number of tuples
    pub fn num_tuples(&self) -> usize {
        if self.num_components == 0 {
            0
        } else {
            self.values.len() / self.num_components
        }
    }

    /// Returns the i-th tuple
    pub fn tuple(&self, i: usize) -> &[f64] {
        &self.values[i * self.num_components..(i + 1) * self.num_components]
    }
}

/// Holds a VTK unstructured grid: points, cells, and the attached arrays
///
/// The cells are stored as in VTK files: the point ids of all cells are
/// concatenated in `connectivity`, and `offsets[c]` marks the end of cell `c`.
#[derive(Clone, Debug, PartialEq)]
pub struct UnstructuredGrid {
    /// Holds the point coordinates
    pub points: Vec<[f64; 3]>,

    /// Holds the point ids of all cells
    pub connectivity: Vec<usize>,

    /// Holds the end of each cell in `connectivity`
    pub offsets: Vec<usize>,

    /// Holds the VTK cell type of each cell
    pub types: Vec<u8>,

    /// Holds the arrays defined at points
    pub point_data: Vec<FieldArray>,

    /// Holds the arrays defined at cells
    pub cell_data: Vec<FieldArray>,
}

impl UnstructuredGrid {
    /// Allocates an empty grid
    pub fn new() -> Self {
        UnstructuredGrid {
            points: Vec::new(),
            connectivity: Vec::new(),
            offsets: Vec::new(),
            types: Vec::new(),
            point_data: Vec::new(),
            cell_data: Vec::new(),
        }
    }

    /// Adds a cell given its VTK type and point ids
    pub fn push_cell(&mut self, vtk_type: u8, point_ids: &[usize]) {
        self.connectivity.extend_from_slice(point_ids);
        self.offsets.push(self.connectivity.len());
        self.types.push(vtk_type);
    }

    /// Returns the number of points
    pub fn npoint(&self) -> usize {
        self.points.len()
    }

    /// Returns the number of cells
    pub fn ncell(&self) -> usize {
        self.types.len()
    }

    /// Returns the point ids of a cell
    pub fn cell_points(&self, cell: usize) -> &[usize] {
        let start = if cell == 0 { 0 } else { self.offsets[cell - 1] };
        &self.connectivity[start..self.offsets[cell]]
    }

    /// Returns the array defined at points with the given name
    pub fn point_field(&self, name: &str) -> Option<&FieldArray> {
        self.point_data.iter().find(|a| a.name == name)
    }

    /// Returns the array defined at cells with the given name
    pub fn cell_field(&self, name: &str) -> Option<&FieldArray> {
        self.cell_data.iter().find(|a| a.name == name)
    }

    /// Returns the bounding box of all points
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Moves all points by a vector
    pub fn translate(&mut self, shift: [f64; 3]) {
        for p in &mut self.points {
            for d in 0..3 {
                p[d] += shift[d];
            }
        }
    }

    /// Checks the consistency of cells and arrays
    pub fn validate(&self) -> Result<(), String> {
        let ncell = self.ncell();
        if self.offsets.len() != ncell {
            return Err(format!("there are {} offsets but {} cell types", self.offsets.len(), ncell));
        }
        let mut start = 0;
        for (c, &end) in self.offsets.iter().enumerate() {
            if end < start || end > self.connectivity.len() {
                return Err(format!("offset of cell {} is out of range", c));
            }
            start = end;
        }
        if let Some(id) = self.connectivity.iter().find(|&&id| id >= self.npoint()) {
            return Err(format!("point id {} exceeds the number of points {}", id, self.npoint()));
        }
        for (arrays, count, kind) in [(&self.point_data, self.npoint(), "point"), (&self.cell_data, ncell, "cell")] {
            for array in arrays {
                if array.num_components == 0 || array.values.len() != count * array.num_components {
                    return Err(format!(
                        "{} array '{}' has {} values but {} tuples of {} components are required",
                        kind,
                        array.name,
                        array.values.len(),
                        count,
                        array.num_components
                    ));
                }
            }
        }
        Ok(())
    }

    /// Appends a sequence of grids into a single one
    ///
    /// Point ids are shifted; duplicate points are not merged. Only arrays
    /// present in all grids (same name and number of components) are kept.
    pub fn append_all(grids: &[UnstructuredGrid]) -> UnstructuredGrid {
        let mut result = UnstructuredGrid::new();
        if grids.is_empty() {
            return result;
        }
        let point_arrays: Vec<_> = grids.iter().map(|g| &g.point_data).collect();
        let cell_arrays: Vec<_> = grids.iter().map(|g| &g.cell_data).collect();
        result.point_data = common_arrays(&point_arrays);
        result.cell_data = common_arrays(&cell_arrays);

        for grid in grids {
            let shift = result.points.len();
            let conn_shift = result.connectivity.len();
            result.points.extend_from_slice(&grid.points);
            result.connectivity.extend(grid.connectivity.iter().map(|id| id + shift));
            result.offsets.extend(grid.offsets.iter().map(|o| o + conn_shift));
            result.types.extend_from_slice(&grid.types);
            for array in &mut result.point_data {
                if let Some(src) = grid.point_field(&array.name) {
                    array.values.extend_from_slice(&src.values);
                }
            }
            for array in &mut result.cell_data {
                if let Some(src) = grid.cell_field(&array.name) {
                    array.values.extend_from_slice(&src.values);
                }
            }
        }
        result
    }
}

/// Returns empty copies of the arrays present in all lists (same name and number of components)
fn common_arrays(all: &[&Vec<FieldArray>]) -> Vec<FieldArray> {
    match all.first() {
        Some(first) => first
            .iter()
            .filter(|a| {
                all.iter()
                    .all(|list| list.iter().any(|b| b.name == a.name && b.num_components == a.num_components))
            })
            .map(|a| FieldArray {
                name: a.name.clone(),
                num_components: a.num_components,
                values: Vec::new(),
            })
            .collect(),
        None => Vec::new(),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{FieldArray, UnstructuredGrid};
    use crate::vtk::Samples;

    fn unit_square() -> UnstructuredGrid {
        Samples::unit_square_tri3()
    }

    #[test]
    fn cells_and_bounds_work() {
        let grid = unit_square();
        assert_eq!(grid.npoint(), 4);
        assert_eq!(grid.ncell(), 2);
        assert_eq!(grid.cell_points(0), &[0, 1, 2]);
        assert_eq!(grid.cell_points(1), &[0, 2, 3]);
        assert_eq!(grid.bounds().to_vtk_bounds(), [0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(grid.point_field("u").unwrap().tuple(2), &[2.0]);
        assert!(grid.cell_field("u").is_none());
        assert_eq!(grid.validate(), Ok(()));
    }

    #[test]
    fn validate_captures_errors() {
        let mut grid = unit_square();
        grid.connectivity[0] = 9;
        assert_eq!(
            grid.validate().err(),
            Some("point id 9 exceeds the number of points 4".to_string())
        );
        let mut grid = unit_square();
        grid.point_data[0].values.pop();
        assert_eq!(
            grid.validate().err(),
            Some("point array 'u' has 3 values but 4 tuples of 1 components are required".to_string())
        );
        let mut grid = unit_square();
        grid.offsets[1] = 7;
        assert_eq!(grid.validate().err(), Some("offset of cell 1 is out of range".to_string()));
    }

    #[test]
    fn translate_works() {
        let mut grid = unit_square();
        grid.translate([0.0, 0.0, 2.5]);
        assert_eq!(grid.points[2], [1.0, 1.0, 2.5]);
    }

    #[test]
    fn append_all_works() {
        let a = unit_square();
        let mut b = unit_square();
        b.translate([0.0, 0.0, 1.0]);
        b.point_data.push(FieldArray::scalar("only_in_b", vec![0.0; 4]));
        let c = UnstructuredGrid::append_all(&[a, b]);
        assert_eq!(c.npoint(), 8);
        assert_eq!(c.ncell(), 4);
        assert_eq!(c.cell_points(2), &[4, 5, 6]);
        assert_eq!(c.cell_points(3), &[4, 6, 7]);
        assert_eq!(c.point_data.len(), 1);
        assert_eq!(c.point_data[0].values, &[0.0, 1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0]);
        assert_eq!(c.cell_data[0].values, &[0.0, 1.0, 0.0, 1.0]);
        assert_eq!(c.validate(), Ok(()));

        let empty = UnstructuredGrid::append_all(&[]);
        assert_eq!(empty, UnstructuredGrid::new());
    }
}
