use crate::{types::Resolution, utils::vertex_index};

/// Line-list indices for the axis-aligned grid edges of a surface.
///
/// Horizontal edges `(i, j)-(i, j+1)` come first, then vertical edges `(i, j)-(i+1, j)`.
/// Diagonals are never included. The result depends only on `resolution`:
/// ```text
/// pairs = r·(r + 1)  horizontal  +  r·(r + 1)  vertical  =  2·r·(r + 1)
/// ```
pub fn generate_wireframe_indices(resolution: Resolution) -> Vec<u32> {
    let r = resolution.get() as usize;
    let side = resolution.side();
    let mut indices = Vec::with_capacity(4 * r * side);

    for i in 0..side {
        for j in 0..r {
            indices.push(vertex_index(i, j, side));
            indices.push(vertex_index(i, j + 1, side));
        }
    }

    for i in 0..r {
        for j in 0..side {
            indices.push(vertex_index(i, j, side));
            indices.push(vertex_index(i + 1, j, side));
        }
    }

    indices
}
