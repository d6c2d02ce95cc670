use crate::base::{BoundingBox, CLAMP_EPSILON};
use crate::TndmError;

/// Moves points lying marginally outside a bounding box onto its boundary
///
/// Each coordinate is clamped to `[min, max]` independently. Points on the
/// boundary or inside the box are unchanged.
///
/// # Errors
///
/// Returns [TndmError::OutOfBounds] if a point would be moved by more than
/// [CLAMP_EPSILON]. Thus, only the sub-epsilon corrections needed to work
/// around round-off in the mesh coordinates are permitted.
pub fn clamp_points(points: &[[f64; 3]], bbox: &BoundingBox) -> Result<Vec<[f64; 3]>, TndmError> {
    let mut clamped = Vec::with_capacity(points.len());
    for old in points {
        let mut new = *old;
        let mut dist2 = 0.0;
        for d in 0..3 {
            if old[d] > bbox.max[d] {
                new[d] = bbox.max[d];
            } else if old[d] < bbox.min[d] {
                new[d] = bbox.min[d];
            }
            dist2 += (old[d] - new[d]) * (old[d] - new[d]);
        }
        if dist2 > CLAMP_EPSILON * CLAMP_EPSILON {
            return Err(TndmError::OutOfBounds {
                point: *old,
                bounds: bbox.to_string(),
            });
        }
        clamped.push(new);
    }
    Ok(clamped)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
