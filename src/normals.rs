//! Smooth per-vertex normals from an indexed triangle list.

use std::cmp::Ordering;

use nalgebra::Vector3;

use crate::types::{Value, Vector};

/// Computes unit-length per-vertex normals.
///
/// Each triangle's face normal `(v1 - v0) × (v2 - v0)` is normalized and added to
/// its three vertices; each vertex sum is then normalized. Degenerate triangles and
/// triangles that reference missing vertices contribute nothing, and vertices with
/// no contributions keep the zero vector.
///
/// Contributions are summed per vertex in sorted order, so the output is
/// bit-identical however `indices` orders its triangles.
pub fn compute_normals(vertices: &[[Value; 3]], indices: &[u32]) -> Vec<[Value; 3]> {
    let mut contributions: Vec<Vec<Vector>> = vec![Vec::new(); vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(&va), Some(&vb), Some(&vc)) = (vertices.get(a), vertices.get(b), vertices.get(c))
        else {
            continue;
        };
        let Some(normal) = face_normal(va, vb, vc) else {
            continue;
        };
        contributions[a].push(normal);
        contributions[b].push(normal);
        contributions[c].push(normal);
    }

    contributions
        .into_iter()
        .map(|mut faces| -> [Value; 3] {
            faces.sort_unstable_by(cmp_vector);
            let sum = faces.iter().fold(Vector::zeros(), |acc, n| acc + n);
            let norm = sum.norm();
            if norm > 0.0 && norm.is_finite() {
                (sum / norm).into()
            } else {
                [0.0; 3]
            }
        })
        .collect()
}

/// Unit normal of triangle `(a, b, c)`, or `None` if it has no area.
///
/// The cross product is taken in `f64`: edges near `Value::MAX` would overflow
/// its squared norm in `f32`.
pub fn face_normal(a: [Value; 3], b: [Value; 3], c: [Value; 3]) -> Option<Vector> {
    let [a, b, c] = [a, b, c].map(|p| Vector3::from(p.map(f64::from)));
    let cross = (b - a).cross(&(c - a));
    let norm = cross.norm();
    (norm > 0.0 && norm.is_finite()).then(|| (cross / norm).map(|v| v as Value))
}

fn cmp_vector(l: &Vector, r: &Vector) -> Ordering {
    l.x.total_cmp(&r.x)
        .then_with(|| l.y.total_cmp(&r.y))
        .then_with(|| l.z.total_cmp(&r.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_triangle_faces_up() {
        let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = compute_normals(&vertices, &[0, 1, 2]);
        for n in normals {
            assert_eq!(n, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn reversed_winding_flips_normal() {
        let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = compute_normals(&vertices, &[0, 2, 1]);
        assert_eq!(normals[0], [0.0, 0.0, -1.0]);
    }

    #[test]
    fn untouched_and_degenerate() {
        let vertices = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [5.0, 5.0, 5.0],
        ];
        // Collinear triangle plus an out-of-range one.
        let normals = compute_normals(&vertices, &[0, 1, 2, 0, 1, 9]);
        assert!(normals.iter().all(|&n| n == [0.0; 3]));
        assert_eq!(normals.len(), vertices.len());
    }

    #[test]
    fn shared_vertex_averages_faces() {
        // Two faces meeting at a ridge along the y axis.
        let vertices = [
            [0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 0.0, 1.0],
            [-1.0, 0.0, 1.0],
        ];
        let normals = compute_normals(&vertices, &[0, 2, 1, 0, 1, 3]);
        let n = normals[0];
        assert_relative_eq!(n[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(n[1], 0.0, epsilon = 1e-6);
        assert_relative_eq!(n[2].abs(), 1.0, epsilon = 1e-6);
        let len = Vector::from(normals[2]).norm();
        assert_relative_eq!(len, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn tall_triangle_normal_is_unit() {
        let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 3.0e38], [0.0, 1.0, 0.0]];
        let normals = compute_normals(&vertices, &[0, 1, 2]);
        for n in normals {
            assert_relative_eq!(Vector::from(n).norm(), 1.0, epsilon = 1e-6);
            assert_relative_eq!(n[0], -1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn order_independent() {
        let vertices = [
            [0.0, 0.0, 0.3],
            [1.0, 0.0, -0.2],
            [0.0, 1.0, 0.7],
            [1.0, 1.0, 0.1],
            [2.0, 0.5, 0.9],
        ];
        let a = compute_normals(&vertices, &[0, 2, 1, 1, 2, 3, 1, 3, 4]);
        let b = compute_normals(&vertices, &[1, 3, 4, 0, 2, 1, 1, 2, 3]);
        let c = compute_normals(&vertices, &[1, 2, 3, 1, 3, 4, 0, 2, 1]);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }
}
