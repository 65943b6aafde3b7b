use bevy::prelude::*;

use crate::{
    color::ColorMap,
    error::Result,
    function::SurfaceFunction,
    mesh::SurfaceMesh,
    surface::SurfaceMeshGenerator,
    types::{Domain, Resolution, ZRange},
    wireframe::generate_wireframe_indices,
};

/// A surface `z = f(x, y)` to be meshed by [`SurfacePlotPlugin`](crate::plugin::SurfacePlotPlugin).
///
/// Every field is an input of the mesh build; changing any of them through
/// `Mut<SurfacePlot>` queues a rebuild.
///
/// ```rust,ignore
/// commands.spawn(
///     SurfacePlot::new("sin(x) * cos(y)")
///         .with_domain(Domain::symmetric(3.0)?)
///         .with_resolution(Resolution::new(80)?)
///         .with_color_map(ColorMap::Plasma)
///         .with_wireframe(true),
/// );
/// ```
#[derive(Component, Debug, Clone, PartialEq)]
#[require(Transform)]
pub struct SurfacePlot {
    /// Expression text in `x` and `y`.
    pub function: String,
    pub domain: Domain,
    pub resolution: Resolution,
    pub color_map: ColorMap,
    /// Optional clamp interval for z.
    pub z_range: Option<ZRange>,
    /// Also build a line-list overlay of the grid edges.
    pub wireframe: bool,
}

impl Default for SurfacePlot {
    fn default() -> Self {
        Self {
            function: String::new(),
            domain: Domain::default(),
            resolution: Resolution::default(),
            color_map: ColorMap::default(),
            z_range: None,
            wireframe: false,
        }
    }
}

impl SurfacePlot {
    /// Creates a plot of `function` with default domain, resolution and colours.
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            ..Default::default()
        }
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_color_map(mut self, color_map: ColorMap) -> Self {
        self.color_map = color_map;
        self
    }

    pub fn with_z_range(mut self, z_range: Option<ZRange>) -> Self {
        self.z_range = z_range;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    /// Builds the geometry for an already compiled `function`.
    ///
    /// `function` is taken separately so the caller decides how parsing is cached.
    pub fn build_with<F>(&self, function: &F) -> GeneratedSurface
    where
        F: SurfaceFunction + ?Sized,
    {
        let mesh = SurfaceMeshGenerator::new(self.color_map).generate(
            function,
            &self.domain,
            self.resolution,
            self.z_range,
        );
        let wireframe = self
            .wireframe
            .then(|| generate_wireframe_indices(self.resolution));
        GeneratedSurface { mesh, wireframe }
    }

    /// Parses [`function`](SurfacePlot::function) and builds the geometry.
    pub fn build(&self) -> Result<GeneratedSurface> {
        let function = crate::function::parse(&self.function)?;
        Ok(self.build_with(&function))
    }
}

/// Presentation-only parameters.
///
/// Carried alongside a [`SurfacePlot`] for the application's camera and layout code;
/// the mesh pipeline never reads them.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct SurfacePresentation {
    /// Viewport height in logical pixels.
    pub height: u32,
    pub camera_position: Vec3,
    /// Whether the user may orbit/zoom the camera.
    pub enable_controls: bool,
}

impl Default for SurfacePresentation {
    fn default() -> Self {
        Self {
            height: 400,
            camera_position: Vec3::splat(5.0),
            enable_controls: true,
        }
    }
}

/// Output of one build: the surface mesh and, when requested, wireframe line indices.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct GeneratedSurface {
    pub mesh: SurfaceMesh,
    pub wireframe: Option<Vec<u32>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ParseError, PlotError};

    #[test]
    fn builds_surface_and_wireframe() {
        let plot = SurfacePlot::new("x^2 + y^2")
            .with_domain(Domain::symmetric(1.0).unwrap())
            .with_resolution(Resolution::new(4).unwrap())
            .with_wireframe(true);
        let generated = plot.build().unwrap();
        assert_eq!(generated.mesh.vertex_count(), 25);
        assert_eq!(generated.mesh.triangle_count(), 32);
        assert_eq!(generated.wireframe.map(|w| w.len()), Some(80));
    }

    #[test]
    fn wireframe_is_optional() {
        let plot = SurfacePlot::new("x").with_resolution(Resolution::new(2).unwrap());
        assert!(plot.build().unwrap().wireframe.is_none());
    }

    #[test]
    fn parse_errors_surface() {
        let err = SurfacePlot::new("  ").build().unwrap_err();
        assert!(matches!(err, PlotError::Parse(ParseError::EmptyExpression)));
    }
}
