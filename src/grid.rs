use ndarray::Array2;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    function::SurfaceFunction,
    interp::lerp,
    types::{Domain, Resolution, Scalar},
};

/// Raw function samples over a regular `(r + 1) × (r + 1)` grid.
///
/// `samples[[i, j]]` holds `f(x_i, y_j)` where
/// ```text
/// x_i = lerp(x.low, x.high, i / r)
/// y_j = lerp(y.low, y.high, j / r)
/// ```
/// Values are stored exactly as the function returned them, non-finite included.
#[derive(Debug, Clone)]
pub struct SurfaceGrid {
    pub domain: Domain,
    pub resolution: Resolution,
    pub samples: Array2<Scalar>,
}

impl SurfaceGrid {
    /// Evaluates `function` at every grid point.
    ///
    /// Rows (constant `i`) are sampled in parallel with Rayon and stitched back in order,
    /// so the result does not depend on scheduling.
    pub fn sample<F>(function: &F, domain: &Domain, resolution: Resolution) -> Self
    where
        F: SurfaceFunction + ?Sized,
    {
        let side = resolution.side();

        let rows: Vec<Vec<Scalar>> = (0..side)
            .into_par_iter()
            .map(|i| {
                let x = Self::axis_coordinate(domain.x().low, domain.x().high, i, resolution);
                (0..side)
                    .map(|j| {
                        let y = Self::axis_coordinate(domain.y().low, domain.y().high, j, resolution);
                        function.evaluate(x, y)
                    })
                    .collect()
            })
            .collect();

        let flat: Vec<Scalar> = rows.into_iter().flatten().collect();
        let samples = Array2::from_shape_vec((side, side), flat)
            .unwrap_or_else(|_| Array2::zeros((side, side)));

        Self {
            domain: *domain,
            resolution,
            samples,
        }
    }

    /// World-space `(x, y)` of grid point `(i, j)`.
    pub fn coordinates(&self, i: usize, j: usize) -> (Scalar, Scalar) {
        (
            Self::axis_coordinate(self.domain.x().low, self.domain.x().high, i, self.resolution),
            Self::axis_coordinate(self.domain.y().low, self.domain.y().high, j, self.resolution),
        )
    }

    /// Grid points per axis.
    pub fn side(&self) -> usize {
        self.resolution.side()
    }

    #[inline]
    fn axis_coordinate(low: Scalar, high: Scalar, k: usize, resolution: Resolution) -> Scalar {
        lerp(low, high, k as Scalar / resolution.get() as Scalar)
    }
}
