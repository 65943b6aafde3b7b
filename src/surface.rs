use ndarray::Array2;

use crate::{
    color::{ColorMap, create_gradient},
    function::SurfaceFunction,
    grid::SurfaceGrid,
    mesh::SurfaceMesh,
    normals::compute_normals,
    types::{Bounds, Domain, Resolution, Scalar, Value, ZRange},
    utils::{cell_corners, cell_triangles},
};

/// Distance from a clamp boundary under which a vertex counts as lying on it.
pub const DEFAULT_LID_TOLERANCE: Scalar = 1.0e-3;

/// Builds a [`SurfaceMesh`] from a function sampled over a rectangular grid.
///
/// ```text
/// SurfaceGrid::sample   →  (r+1)² raw z values
/// clamp + bounds        →  vertices, validity mask
/// cell_triangles        →  2 triangles per cell, minus invalid and lid triangles
/// compute_normals       →  per-vertex normals
/// create_gradient       →  per-vertex colours over clamped_bounds
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMeshGenerator {
    /// Palette used for vertex colours.
    pub color_map: ColorMap,
    /// Triangles with all corners this close to one clamp boundary are dropped.
    pub lid_tolerance: Scalar,
}

impl Default for SurfaceMeshGenerator {
    fn default() -> Self {
        Self {
            color_map: ColorMap::default(),
            lid_tolerance: DEFAULT_LID_TOLERANCE,
        }
    }
}

impl SurfaceMeshGenerator {
    pub fn new(color_map: ColorMap) -> Self {
        Self {
            color_map,
            ..Default::default()
        }
    }

    pub fn with_lid_tolerance(mut self, tolerance: Scalar) -> Self {
        self.lid_tolerance = tolerance;
        self
    }

    /// Samples `function` over `domain` and builds the full mesh.
    ///
    /// Never fails: non-finite samples, and samples whose (clamped) height does not
    /// fit a [`Value`], are flattened to `z = 0`, left out of both bounds and of
    /// every triangle that touches them. With a `z_range`, an oversized sample is
    /// clamped first and stays; its actual height saturates at `±Value::MAX`.
    pub fn generate<F>(
        &self,
        function: &F,
        domain: &Domain,
        resolution: Resolution,
        z_range: Option<ZRange>,
    ) -> SurfaceMesh
    where
        F: SurfaceFunction + ?Sized,
    {
        let grid = SurfaceGrid::sample(function, domain, resolution);
        self.build(&grid, z_range)
    }

    /// Builds the mesh from an already sampled grid.
    pub fn build(&self, grid: &SurfaceGrid, z_range: Option<ZRange>) -> SurfaceMesh {
        let side = grid.side();

        let mut vertices: Vec<[Value; 3]> = Vec::with_capacity(side * side);
        let mut valid = Array2::from_elem((side, side), false);
        let mut clamped_z = Array2::<Scalar>::zeros((side, side));
        let mut actual_bounds = Bounds::EMPTY;
        let mut clamped_bounds = Bounds::EMPTY;

        for ((i, j), &z) in grid.samples.indexed_iter() {
            let (x, y) = grid.coordinates(i, j);
            let (xf, yf) = (x as Value, y as Value);

            // Finite in f64 is not enough: anything past Value::MAX narrows to inf.
            let clamped = z_range.map_or(z, |range| range.clamp(z));
            let zf = clamped as Value;
            if !z.is_finite() || !zf.is_finite() {
                vertices.push([xf, yf, 0.0]);
                continue;
            }

            actual_bounds.include([xf, yf, (z as Value).clamp(Value::MIN, Value::MAX)]);
            clamped_bounds.include([xf, yf, zf]);

            valid[[i, j]] = true;
            clamped_z[[i, j]] = clamped;
            vertices.push([xf, yf, zf]);
        }

        let indices = self.triangulate(&valid, &clamped_z, z_range);

        let normals = compute_normals(&vertices, &indices);

        let actual_bounds = actual_bounds.or_zero();
        let clamped_bounds = clamped_bounds.or_zero();
        let heights: Vec<Value> = vertices.iter().map(|v| v[2]).collect();
        let colors = create_gradient(
            &heights,
            self.color_map,
            Some(clamped_bounds.min[2]),
            Some(clamped_bounds.max[2]),
        );

        log::debug!(
            "surface mesh: {} vertices, {} of {} triangles kept",
            vertices.len(),
            indices.len() / 3,
            2 * (side - 1) * (side - 1),
        );

        SurfaceMesh {
            vertices,
            indices,
            normals,
            colors,
            actual_bounds,
            clamped_bounds,
        }
    }

    /// Emits two triangles per grid cell, skipping those touching invalid
    /// vertices and, when clamping, those lying flat on a clamp boundary.
    fn triangulate(
        &self,
        valid: &Array2<bool>,
        clamped_z: &Array2<Scalar>,
        z_range: Option<ZRange>,
    ) -> Vec<u32> {
        let side = valid.nrows();
        let cells = side - 1;
        let mut indices = Vec::with_capacity(cells * cells * 6);

        let at = |k: u32| {
            let k = k as usize;
            (k / side, k % side)
        };

        for i in 0..cells {
            for j in 0..cells {
                for tri in cell_triangles(cell_corners(i, j, side)) {
                    if tri.iter().any(|&k| !valid[at(k)]) {
                        continue;
                    }
                    if let Some(range) = z_range {
                        let near = tri.map(|k| range.near_bounds(clamped_z[at(k)], self.lid_tolerance));
                        let on_low = near.iter().all(|&(low, _)| low);
                        let on_high = near.iter().all(|&(_, high)| high);
                        if on_low || on_high {
                            continue;
                        }
                    }
                    indices.extend_from_slice(&tri);
                }
            }
        }

        indices
    }
}
