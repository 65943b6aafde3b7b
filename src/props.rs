//! Plot parameters as they arrive from external content.
//!
//! Content embeds a plot as a JSON object with a fixed set of fields:
//!
//! ```json
//! {
//!   "function": "sin(x) * cos(y)",
//!   "domain": { "x": [-3, 3], "y": [-3, 3] },
//!   "resolution": 60,
//!   "colorScheme": "plasma",
//!   "zRange": [-1, 1],
//!   "height": 500,
//!   "cameraPosition": [6, 4, 6],
//!   "enableControls": true,
//!   "wireframe": false
//! }
//! ```
//!
//! Only `function` is required. Unknown fields are rejected.

use bevy::math::Vec3;
use serde::Deserialize;

use crate::{
    color::ColorMap,
    error::ConfigError,
    plot::{SurfacePlot, SurfacePresentation},
    types::{DEFAULT_RESOLUTION, Domain, Interval, Resolution, Scalar, ZRange},
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SurfacePlotProps {
    pub function: String,
    #[serde(default)]
    pub domain: DomainProps,
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    #[serde(default)]
    pub color_scheme: ColorMap,
    #[serde(default)]
    pub z_range: Option<[Scalar; 2]>,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_camera_position")]
    pub camera_position: [f32; 3],
    #[serde(default = "default_enable_controls")]
    pub enable_controls: bool,
    #[serde(default)]
    pub wireframe: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainProps {
    pub x: Interval,
    pub y: Interval,
}

impl Default for DomainProps {
    fn default() -> Self {
        let domain = Domain::default();
        Self {
            x: domain.x(),
            y: domain.y(),
        }
    }
}

fn default_resolution() -> u32 {
    DEFAULT_RESOLUTION
}

fn default_height() -> u32 {
    SurfacePresentation::default().height
}

fn default_camera_position() -> [f32; 3] {
    SurfacePresentation::default().camera_position.to_array()
}

fn default_enable_controls() -> bool {
    true
}

impl SurfacePlotProps {
    /// Validates the numeric fields and splits the props into the mesh inputs
    /// and the pass-through presentation parameters.
    pub fn into_components(self) -> Result<(SurfacePlot, SurfacePresentation), ConfigError> {
        let domain = Domain::new(self.domain.x, self.domain.y)?;
        let resolution = Resolution::new(self.resolution)?;
        let z_range = self
            .z_range
            .map(|[low, high]| ZRange::new(low, high))
            .transpose()?;

        let plot = SurfacePlot {
            function: self.function,
            domain,
            resolution,
            color_map: self.color_scheme,
            z_range,
            wireframe: self.wireframe,
        };
        let presentation = SurfacePresentation {
            height: self.height,
            camera_position: Vec3::from_array(self.camera_position),
            enable_controls: self.enable_controls,
        };
        Ok((plot, presentation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(json: &str) -> SurfacePlotProps {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn minimal_props_use_defaults() {
        let (plot, presentation) = props(r#"{ "function": "x * y" }"#).into_components().unwrap();
        assert_eq!(plot.function, "x * y");
        assert_eq!(plot.domain, Domain::default());
        assert_eq!(plot.resolution.get(), 50);
        assert_eq!(plot.color_map, ColorMap::Viridis);
        assert_eq!(plot.z_range, None);
        assert!(!plot.wireframe);
        assert_eq!(presentation, SurfacePresentation::default());
    }

    #[test]
    fn full_props() {
        let (plot, presentation) = props(
            r#"{
                "function": "sin(x) * cos(y)",
                "domain": { "x": [-3, 3], "y": [0, 1.5] },
                "resolution": 60,
                "colorScheme": "plasma",
                "zRange": [-1, 1],
                "height": 500,
                "cameraPosition": [6, 4, 6],
                "enableControls": false,
                "wireframe": true
            }"#,
        )
        .into_components()
        .unwrap();

        assert_eq!(plot.domain.x(), Interval::new(-3.0, 3.0));
        assert_eq!(plot.domain.y(), Interval::new(0.0, 1.5));
        assert_eq!(plot.resolution.get(), 60);
        assert_eq!(plot.color_map, ColorMap::Plasma);
        assert_eq!(plot.z_range, Some(ZRange::new(-1.0, 1.0).unwrap()));
        assert!(plot.wireframe);
        assert_eq!(presentation.height, 500);
        assert_eq!(presentation.camera_position, Vec3::new(6.0, 4.0, 6.0));
        assert!(!presentation.enable_controls);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_str::<SurfacePlotProps>(r#"{ "function": "x", "colour": "red" }"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<SurfacePlotProps>(
            r#"{ "function": "x", "domain": { "x": [0, 1], "y": [0, 1], "z": [0, 1] } }"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn function_is_required() {
        assert!(serde_json::from_str::<SurfacePlotProps>(r#"{ "resolution": 10 }"#).is_err());
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let err = props(r#"{ "function": "x", "domain": { "x": [1, -1], "y": [0, 1] } }"#)
            .into_components()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDomain { axis: 'x', .. }));

        let err = props(r#"{ "function": "x", "resolution": 0 }"#).into_components().unwrap_err();
        assert_eq!(err, ConfigError::InvalidResolution(0));

        let err = props(r#"{ "function": "x", "zRange": [2, 1] }"#).into_components().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidZRange { .. }));
    }
}
