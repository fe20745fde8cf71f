//! WebGPU rendering module
//!
//! The scene is tessellated on the CPU into vertex-colored triangles and
//! drawn with a single pipeline.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, pixel_to_ndc};
pub use scene::{SceneOptions, build_frame};
pub use vertex::{Color, Vertex};
