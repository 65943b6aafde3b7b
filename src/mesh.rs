use bevy::prelude::Component;

use crate::types::{Bounds, Rgb, Value};

/// Render-ready surface geometry.
///
/// Every per-vertex buffer has one entry per grid point, `(resolution + 1)²` in total.
/// Use the `*_flat` accessors for tightly packed `f32` views when uploading to a GPU.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct SurfaceMesh {
    /// Vertex positions `[x, y, z]`. Invalid samples have `z = 0`.
    pub vertices: Vec<[Value; 3]>,

    /// Triangle list, three vertex indices per triangle, after filtering.
    pub indices: Vec<u32>,

    /// Unit-length per-vertex normals, zero for vertices no triangle touches.
    pub normals: Vec<[Value; 3]>,

    /// Per-vertex colours, each component in `[0, 1]`.
    pub colors: Vec<Rgb>,

    /// Extrema of the valid samples before z clamping.
    pub actual_bounds: Bounds,

    /// Extrema of the valid samples after z clamping. Colours are normalized against these.
    pub clamped_bounds: Bounds,
}

impl SurfaceMesh {
    /// Creates an empty mesh with no vertices, triangles, normals or colours.
    pub fn new_empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            normals: Vec::new(),
            colors: Vec::new(),
            actual_bounds: Bounds::EMPTY,
            clamped_bounds: Bounds::EMPTY,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns the three vertex indices of triangle `tri`.
    pub fn triangle(&self, tri: usize) -> [u32; 3] {
        let k = tri * 3;
        [self.indices[k], self.indices[k + 1], self.indices[k + 2]]
    }

    /// Iterates triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// `[x0, y0, z0, x1, y1, z1, ...]`
    pub fn vertices_flat(&self) -> &[Value] {
        self.vertices.as_flattened()
    }

    pub fn normals_flat(&self) -> &[Value] {
        self.normals.as_flattened()
    }

    pub fn colors_flat(&self) -> &[Value] {
        self.colors.as_flattened()
    }

    /// Colours with an opaque alpha channel, the layout Bevy's `ATTRIBUTE_COLOR` expects.
    pub fn colors_rgba(&self) -> Vec<[Value; 4]> {
        self.colors.iter().map(|&[r, g, b]| [r, g, b, 1.0]).collect()
    }
}

impl Default for SurfaceMesh {
    fn default() -> Self {
        Self::new_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> SurfaceMesh {
        SurfaceMesh {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.5]],
            indices: vec![0, 2, 1, 1, 2, 3],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            colors: vec![[0.1, 0.2, 0.3]; 4],
            ..SurfaceMesh::new_empty()
        }
    }

    #[test]
    fn triangle_access() {
        let mesh = quad();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangle(1), [1, 2, 3]);
        assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 2, 1], [1, 2, 3]]);
    }

    #[test]
    fn flat_views() {
        let mesh = quad();
        assert_eq!(mesh.vertices_flat().len(), 12);
        assert_eq!(mesh.vertices_flat()[9..], [1.0, 1.0, 0.5]);
        assert_eq!(mesh.normals_flat().len(), 12);
        assert_eq!(mesh.colors_flat()[..3], [0.1, 0.2, 0.3]);
        assert_eq!(mesh.colors_rgba()[0], [0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn empty_mesh() {
        let mesh = SurfaceMesh::default();
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.actual_bounds.is_empty());
    }
}
