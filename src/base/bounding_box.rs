use std::fmt;

/// Holds the axis-aligned extent of a set of points in 3D space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Holds the minimum coordinates (x, y, z)
    pub min: [f64; 3],

    /// Holds the maximum coordinates (x, y, z)
    pub max: [f64; 3],
}

impl BoundingBox {
    /// Allocates a new instance from the min and max corners
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        BoundingBox { min, max }
    }

    /// Allocates an inverted (empty) box that grows with [BoundingBox::extend]
    pub fn empty() -> Self {
        BoundingBox {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    /// Computes the bounding box of a set of points
    ///
    /// Returns an empty box if there are no points.
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        let mut bbox = BoundingBox::empty();
        for p in points {
            bbox.extend(p);
        }
        bbox
    }

    /// Enlarges the box to include a point
    pub fn extend(&mut self, point: &[f64; 3]) {
        for d in 0..3 {
            self.min[d] = f64::min(self.min[d], point[d]);
            self.max[d] = f64::max(self.max[d], point[d]);
        }
    }

    /// Returns true if the box has no extent (no points were added)
    pub fn is_empty(&self) -> bool {
        (0..3).any(|d| self.min[d] > self.max[d])
    }

    /// Returns true if the point lies inside the box or on its boundary
    pub fn contains(&self, point: &[f64; 3]) -> bool {
        (0..3).all(|d| point[d] >= self.min[d] && point[d] <= self.max[d])
    }

    /// Returns the bounds in VTK order `[xmin, xmax, ymin, ymax, zmin, zmax]`
    pub fn to_vtk_bounds(&self) -> [f64; 6] {
        [
            self.min[0],
            self.max[0],
            self.min[1],
            self.max[1],
            self.min[2],
            self.max[2],
        ]
    }
}

impl fmt::Display for BoundingBox {
    /// Prints the bounds in VTK order
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_vtk_bounds())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
