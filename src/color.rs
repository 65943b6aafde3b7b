//! Scalar-to-colour mapping through fixed palettes.

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::{
    interp::{find_t, lerp_array},
    types::{Rgb, Value},
};

/// Colour returned for non-finite inputs.
pub const BLACK: Rgb = [0.0, 0.0, 0.0];

const VIRIDIS: [Rgb; 5] = [
    [0.267, 0.005, 0.329],
    [0.229, 0.322, 0.546],
    [0.128, 0.567, 0.551],
    [0.369, 0.789, 0.383],
    [0.993, 0.906, 0.144],
];

const PLASMA: [Rgb; 5] = [
    [0.050, 0.030, 0.528],
    [0.494, 0.012, 0.658],
    [0.798, 0.280, 0.470],
    [0.973, 0.585, 0.253],
    [0.940, 0.975, 0.131],
];

const COOLWARM: [Rgb; 5] = [
    [0.230, 0.299, 0.754],
    [0.552, 0.690, 0.996],
    [0.865, 0.865, 0.865],
    [0.958, 0.604, 0.482],
    [0.706, 0.016, 0.150],
];

const OCEAN: [Rgb; 4] = [
    [0.000, 0.050, 0.200],
    [0.000, 0.300, 0.600],
    [0.100, 0.700, 0.800],
    [0.850, 1.000, 1.000],
];

const HEAT: [Rgb; 4] = [
    [0.000, 0.000, 0.000],
    [0.800, 0.000, 0.000],
    [1.000, 0.700, 0.000],
    [1.000, 1.000, 1.000],
];

/// Built-in palettes. Each is an immutable ordered list of control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMap {
    /// Perceptually uniform, dark purple to yellow.
    #[default]
    Viridis,
    Plasma,
    /// Blue through grey to red.
    CoolWarm,
    Ocean,
    Heat,
}

impl ColorMap {
    pub const ALL: [ColorMap; 5] = [
        ColorMap::Viridis,
        ColorMap::Plasma,
        ColorMap::CoolWarm,
        ColorMap::Ocean,
        ColorMap::Heat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorMap::Viridis => "viridis",
            ColorMap::Plasma => "plasma",
            ColorMap::CoolWarm => "coolwarm",
            ColorMap::Ocean => "ocean",
            ColorMap::Heat => "heat",
        }
    }

    /// Control points, ordered from value `0` to value `1`.
    pub fn stops(self) -> &'static [Rgb] {
        match self {
            ColorMap::Viridis => &VIRIDIS,
            ColorMap::Plasma => &PLASMA,
            ColorMap::CoolWarm => &COOLWARM,
            ColorMap::Ocean => &OCEAN,
            ColorMap::Heat => &HEAT,
        }
    }
}

impl fmt::Display for ColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a palette name is not in [`ColorMap::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("unknown color scheme `{_0}`")]
pub struct UnknownColorMap(pub String);

impl std::error::Error for UnknownColorMap {}

impl FromStr for ColorMap {
    type Err = UnknownColorMap;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorMap::ALL
            .into_iter()
            .find(|map| map.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownColorMap(s.to_owned()))
    }
}

/// Maps a normalized `value` to a colour of `map`.
///
/// `value` is clamped to `[0, 1]` and placed on the control points at
/// `value * (N - 1)`; the result blends the stops either side of it.
/// Non-finite values map to [`BLACK`].
pub fn get_color(value: Value, map: ColorMap) -> Rgb {
    if !value.is_finite() {
        return BLACK;
    }

    let stops = map.stops();
    let last = stops.len() - 1;
    let t = value.clamp(0.0, 1.0);
    if t == 0.0 {
        return stops[0];
    }
    if t == 1.0 {
        return stops[last];
    }

    let scaled = t * last as Value;
    let lo = scaled.floor() as usize;
    let hi = (scaled.ceil() as usize).min(last);
    lerp_array(stops[lo], stops[hi], scaled - lo as Value)
}

/// Colours every entry of `values`, normalizing against `[min, max]`.
///
/// `min`/`max` default to the extrema of the finite entries. A zero-width
/// range maps everything to the first stop. Non-finite entries, or an input
/// with no finite entries at all, produce [`BLACK`].
pub fn create_gradient(
    values: &[Value],
    map: ColorMap,
    min_override: Option<Value>,
    max_override: Option<Value>,
) -> Vec<Rgb> {
    let (lo, hi) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((Value::INFINITY, Value::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return vec![BLACK; values.len()];
    }

    let min = min_override.unwrap_or(lo);
    let max = max_override.unwrap_or(hi);
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                BLACK
            } else if range == 0.0 {
                get_color(0.0, map)
            } else {
                // Normalized in f64: `max - min` can exceed Value::MAX.
                let t = find_t(f64::from(min), f64::from(max), f64::from(v));
                get_color(t as Value, map)
            }
        })
        .collect()
}

/// Samples `map` at `steps + 1` evenly spaced values from `0` to `1`.
pub fn generate_legend(map: ColorMap, steps: usize) -> Vec<(Value, Rgb)> {
    if steps == 0 {
        return vec![(0.0, get_color(0.0, map))];
    }
    (0..=steps)
        .map(|i| {
            let t = i as Value / steps as Value;
            (t, get_color(t, map))
        })
        .collect()
}
