use nalgebra::{Point3, Vector3};
use serde::Deserialize;

use crate::error::ConfigError;

/// Vertex buffer component. Matches what Bevy uploads to the GPU.
pub type Value = f32;

/// Precision used while evaluating expressions and sampling the domain.
pub type Scalar = f64;

/// A 3D point with [`Value`] components.
pub type Point = Point3<Value>;

/// A 3D vector with [`Value`] components.
pub type Vector = Vector3<Value>;

/// Linear RGB colour, each component in `[0, 1]`.
pub type Rgb = [Value; 3];

/// Largest resolution whose `(resolution + 1)²` vertex indices still fit in a `u32`.
pub const MAX_RESOLUTION: u32 = 65_534;

/// Resolution used when none is supplied.
pub const DEFAULT_RESOLUTION: u32 = 50;

/// A closed interval `[low, high]` with finite endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "[Scalar; 2]")]
pub struct Interval {
    pub low: Scalar,
    pub high: Scalar,
}

impl From<[Scalar; 2]> for Interval {
    fn from([low, high]: [Scalar; 2]) -> Self {
        Self { low, high }
    }
}

impl Interval {
    pub const fn new(low: Scalar, high: Scalar) -> Self {
        Self { low, high }
    }

    pub fn width(&self) -> Scalar {
        self.high - self.low
    }

    pub fn contains(&self, v: Scalar) -> bool {
        self.low <= v && v <= self.high
    }

    fn is_finite(&self) -> bool {
        self.low.is_finite() && self.high.is_finite()
    }
}

/// The rectangle of the xy-plane a surface is sampled over.
///
/// Both axes satisfy `low < high` with finite endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    x: Interval,
    y: Interval,
}

impl Domain {
    pub fn new(x: Interval, y: Interval) -> Result<Self, ConfigError> {
        for (axis, range) in [('x', x), ('y', y)] {
            if !range.is_finite() || range.low >= range.high {
                return Err(ConfigError::InvalidDomain {
                    axis,
                    low: range.low,
                    high: range.high,
                });
            }
        }
        Ok(Self { x, y })
    }

    /// `[-half, half]` on both axes.
    pub fn symmetric(half: Scalar) -> Result<Self, ConfigError> {
        Self::new(Interval::new(-half, half), Interval::new(-half, half))
    }

    pub fn x(&self) -> Interval {
        self.x
    }

    pub fn y(&self) -> Interval {
        self.y
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            x: Interval::new(-5.0, 5.0),
            y: Interval::new(-5.0, 5.0),
        }
    }
}

/// Number of grid subdivisions along each axis.
///
/// A resolution `r` yields `(r + 1)²` vertices and `2r²` triangles before filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution(u32);

impl Resolution {
    pub fn new(resolution: u32) -> Result<Self, ConfigError> {
        if resolution == 0 || resolution > MAX_RESOLUTION {
            return Err(ConfigError::InvalidResolution(resolution));
        }
        Ok(Self(resolution))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Grid points per side: `resolution + 1`.
    pub fn side(self) -> usize {
        self.0 as usize + 1
    }

    /// Total vertex count: `(resolution + 1)²`.
    pub fn vertex_count(self) -> usize {
        self.side() * self.side()
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(DEFAULT_RESOLUTION)
    }
}

/// Closed clamp interval for sampled z values. `low == high` is allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZRange(Interval);

impl ZRange {
    pub fn new(low: Scalar, high: Scalar) -> Result<Self, ConfigError> {
        let range = Interval::new(low, high);
        if !range.is_finite() || low > high {
            return Err(ConfigError::InvalidZRange { low, high });
        }
        Ok(Self(range))
    }

    pub fn low(&self) -> Scalar {
        self.0.low
    }

    pub fn high(&self) -> Scalar {
        self.0.high
    }

    pub fn clamp(&self, z: Scalar) -> Scalar {
        z.clamp(self.0.low, self.0.high)
    }

    /// True when `z` is within `tolerance` of either boundary, reported as `(near_low, near_high)`.
    pub fn near_bounds(&self, z: Scalar, tolerance: Scalar) -> (bool, bool) {
        (
            (z - self.0.low).abs() <= tolerance,
            (z - self.0.high).abs() <= tolerance,
        )
    }
}

/// Axis-aligned extrema of a set of vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [Value; 3],
    pub max: [Value; 3],
}

impl Bounds {
    /// Bounds containing nothing; the first [`include`](Bounds::include) replaces them.
    pub const EMPTY: Self = Self {
        min: [Value::INFINITY; 3],
        max: [Value::NEG_INFINITY; 3],
    };

    pub fn is_empty(&self) -> bool {
        self.min.iter().zip(&self.max).any(|(lo, hi)| lo > hi)
    }

    pub fn include(&mut self, p: [Value; 3]) {
        for k in 0..3 {
            self.min[k] = self.min[k].min(p[k]);
            self.max[k] = self.max[k].max(p[k]);
        }
    }

    /// Replaces still-empty axes with `[0, 0]` so the bounds stay finite.
    pub(crate) fn or_zero(mut self) -> Self {
        for k in 0..3 {
            if self.min[k] > self.max[k] {
                self.min[k] = 0.0;
                self.max[k] = 0.0;
            }
        }
        self
    }

    pub fn size(&self) -> Vector {
        Vector::from(self.max) - Vector::from(self.min)
    }

    pub fn center(&self) -> Point {
        Point::from((Vector::from(self.max) + Vector::from(self.min)) / 2.0)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}
