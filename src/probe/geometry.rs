//! Closest-point queries on segments, triangles and tetrahedra

/// Returns the Euclidean distance between two points
pub fn point_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    norm(&sub(a, b))
}

/// Returns the point at the given barycentric coordinates
pub fn combine<const N: usize>(vertices: &[[f64; 3]; N], weights: &[f64; N]) -> [f64; 3] {
    let mut x = [0.0; 3];
    for (v, w) in vertices.iter().zip(weights) {
        for d in 0..3 {
            x[d] += w * v[d];
        }
    }
    x
}

/// Finds the closest point to `p` on the segment `ab`
///
/// Returns the weights `[1 - t, t]` of the closest point `a + t (b - a)`.
pub fn closest_on_segment(p: &[f64; 3], a: &[f64; 3], b: &[f64; 3]) -> [f64; 2] {
    let ab = sub(b, a);
    let len2 = dot(&ab, &ab);
    if len2 == 0.0 {
        return [1.0, 0.0];
    }
    let t = f64::min(f64::max(dot(&sub(p, a), &ab) / len2, 0.0), 1.0);
    [1.0 - t, t]
}

/// Finds the closest point to `p` on the triangle `abc`
///
/// Returns the barycentric coordinates of the closest point. The search
/// follows the Voronoi regions of vertices, edges and face (see Ericson,
/// Real-Time Collision Detection, 5.1.5).
pub fn closest_on_triangle(p: &[f64; 3], a: &[f64; 3], b: &[f64; 3], c: &[f64; 3]) -> [f64; 3] {
    let ab = sub(b, a);
    let ac = sub(c, a);

    // vertex region a
    let ap = sub(p, a);
    let d1 = dot(&ab, &ap);
    let d2 = dot(&ac, &ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return [1.0, 0.0, 0.0];
    }

    // vertex region b
    let bp = sub(p, b);
    let d3 = dot(&ab, &bp);
    let d4 = dot(&ac, &bp);
    if d3 >= 0.0 && d4 <= d3 {
        return [0.0, 1.0, 0.0];
    }

    // edge region ab
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return [1.0 - v, v, 0.0];
    }

    // vertex region c
    let cp = sub(p, c);
    let d5 = dot(&ab, &cp);
    let d6 = dot(&ac, &cp);
    if d6 >= 0.0 && d5 <= d6 {
        return [0.0, 0.0, 1.0];
    }

    // edge region ac
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return [1.0 - w, 0.0, w];
    }

    // edge region bc
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return [0.0, 1.0 - w, w];
    }

    // face region
    let sum = va + vb + vc;
    if sum == 0.0 {
        // degenerate (collinear) triangle: use the closest edge
        let edges = [(0, 1), (0, 2), (1, 2)];
        let vertices = [*a, *b, *c];
        let mut best = [1.0, 0.0, 0.0];
        let mut best_distance = f64::INFINITY;
        for (i, j) in edges {
            let [s, t] = closest_on_segment(p, &vertices[i], &vertices[j]);
            let mut weights = [0.0; 3];
            weights[i] = s;
            weights[j] += t;
            let distance = point_distance(p, &combine(&vertices, &weights));
            if distance < best_distance {
                best_distance = distance;
                best = weights;
            }
        }
        return best;
    }
    let v = vb / sum;
    let w = vc / sum;
    [1.0 - v - w, v, w]
}

/// Computes the barycentric coordinates of `p` with respect to the tetrahedron `abcd`
///
/// Returns None if the tetrahedron is degenerate (zero volume).
pub fn tetra_coordinates(p: &[f64; 3], a: &[f64; 3], b: &[f64; 3], c: &[f64; 3], d: &[f64; 3]) -> Option<[f64; 4]> {
    let ab = sub(b, a);
    let ac = sub(c, a);
    let ad = sub(d, a);
    let ap = sub(p, a);
    let det = triple(&ab, &ac, &ad);
    let scale = norm(&ab) * norm(&ac) * norm(&ad);
    if scale == 0.0 || f64::abs(det) <= 1e-12 * scale {
        return None;
    }
    let l1 = triple(&ap, &ac, &ad) / det;
    let l2 = triple(&ab, &ap, &ad) / det;
    let l3 = triple(&ab, &ac, &ap) / det;
    Some([1.0 - l1 - l2 - l3, l1, l2, l3])
}

fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: &[f64; 3]) -> f64 {
    f64::sqrt(dot(a, a))
}

/// Returns a · (b × c)
fn triple(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3]) -> f64 {
    let cross = [
        b[1] * c[2] - b[2] * c[1],
        b[2] * c[0] - b[0] * c[2],
        b[0] * c[1] - b[1] * c[0],
    ];
    dot(a, &cross)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
