pub mod cache;
pub mod color;
pub mod error;
pub mod expr;
pub mod function;
pub mod grid;
pub mod interp;
pub mod mesh;
pub mod normals;
pub mod plot;
pub mod plugin;
pub mod props;
pub mod surface;
pub mod types;
pub mod utils;
pub mod wireframe;

pub use function::{CompiledFunction, SurfaceFunction, parse};
pub use plot::SurfacePlot;
pub use plugin::SurfacePlotPlugin;
pub use surface::SurfaceMeshGenerator;
