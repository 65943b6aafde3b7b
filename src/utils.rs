/// Returns the vertex index of grid point `(i, j)` on a grid with `side` points per axis.
///
/// `i` walks the x axis and `j` the y axis; vertices are stored row-major by `i`:
/// ```text
/// index = i * side + j
/// ```
#[inline]
pub fn vertex_index(i: usize, j: usize, side: usize) -> u32 {
    (i * side + j) as u32
}

/// Returns the 4 corner vertex indices of grid cell `(i, j)`.
///
/// Corners are ordered `[top_left, top_right, bottom_left, bottom_right]`:
/// ```text
///        j        j+1
///   i    TL ------ TR        +-- y (j)
///        |       / |         |
///        |     /   |         x (i)
///        |   /     |
///   i+1  BL ------ BR
/// ```
#[inline]
pub fn cell_corners(i: usize, j: usize, side: usize) -> [u32; 4] {
    [
        vertex_index(i, j, side),
        vertex_index(i, j + 1, side),
        vertex_index(i + 1, j, side),
        vertex_index(i + 1, j + 1, side),
    ]
}

/// Splits a cell into its two triangles.
///
/// The winding is fixed: `(TL, BL, TR)` then `(TR, BL, BR)`. For a surface
/// facing +z this makes `(v1 - v0) × (v2 - v0)` point up.
#[inline]
pub fn cell_triangles([tl, tr, bl, br]: [u32; 4]) -> [[u32; 3]; 2] {
    [[tl, bl, tr], [tr, bl, br]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_row_major() {
        assert_eq!(vertex_index(0, 0, 3), 0);
        assert_eq!(vertex_index(0, 2, 3), 2);
        assert_eq!(vertex_index(1, 0, 3), 3);
        assert_eq!(vertex_index(2, 2, 3), 8);
    }

    #[test]
    fn cell_split() {
        let corners = cell_corners(1, 0, 3);
        assert_eq!(corners, [3, 4, 6, 7]);
        assert_eq!(cell_triangles(corners), [[3, 6, 4], [4, 6, 7]]);
    }
}
