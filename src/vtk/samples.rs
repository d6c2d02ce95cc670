use super::{FieldArray, UnstructuredGrid, VTK_LINE, VTK_TRIANGLE};

/// Holds sample grids for tests and examples
pub struct Samples {}

impl Samples {
    /// Returns two triangles forming the unit square at z = 0
    ///
    /// ```text
    /// 3-------2
    /// |     / |
    /// |   /   |
    /// | /     |
    /// 0-------1
    /// ```
    ///
    /// The point array "u" equals x + y and the cell array "id" holds the cell index.
    pub fn unit_square_tri3() -> UnstructuredGrid {
        let mut grid = UnstructuredGrid::new();
        grid.points = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        grid.push_cell(VTK_TRIANGLE, &[0, 1, 2]);
        grid.push_cell(VTK_TRIANGLE, &[0, 2, 3]);
        grid.point_data.push(FieldArray::scalar("u", vec![0.0, 1.0, 2.0, 1.0]));
        grid.cell_data.push(FieldArray::scalar("id", vec![0.0, 1.0]));
        grid
    }

    /// Returns a vertical fault trace at x = 0 made of line cells, from y = 0 down to y = -depth
    ///
    /// The point arrays "state0" to "state4" are linear in depth and time:
    /// `state{k} = 10 k + time - y`, such that probing reproduces them exactly.
    pub fn fault_2d(nsegment: usize, depth: f64, time: f64) -> UnstructuredGrid {
        let mut grid = UnstructuredGrid::new();
        for i in 0..(nsegment + 1) {
            let y = -depth * (i as f64) / (nsegment as f64);
            grid.points.push([0.0, y, 0.0]);
        }
        for i in 0..nsegment {
            grid.push_cell(VTK_LINE, &[i, i + 1]);
        }
        for k in 0..5 {
            let values = grid.points.iter().map(|p| 10.0 * k as f64 + time - p[1]).collect();
            grid.point_data.push(FieldArray::scalar(&format!("state{}", k), values));
        }
        grid
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Samples;

    #[test]
    fn samples_are_consistent() {
        let square = Samples::unit_square_tri3();
        assert_eq!(square.validate(), Ok(()));

        let fault = Samples::fault_2d(4, 2.0, 10.0);
        assert_eq!(fault.validate(), Ok(()));
        assert_eq!(fault.npoint(), 5);
        assert_eq!(fault.ncell(), 4);
        assert_eq!(fault.points[4], [0.0, -2.0, 0.0]);
        assert_eq!(fault.point_field("state1").unwrap().values[4], 22.0);
    }
}
