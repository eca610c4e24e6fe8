//! Rendering module
//!
//! A stateless painter drawing onto any `Surface`. Backends: a vertex mesh
//! (headless, GPU-upload ready) and Canvas2D in the browser.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod mesh;
pub mod painter;
pub mod shapes;
pub mod surface;
pub mod vertex;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use mesh::{DrawStats, MeshSurface};
pub use painter::{FrameStyle, draw_frame, draw_layered_frame};
pub use surface::{Paint, Surface, SurfaceContext};
pub use vertex::Vertex;
