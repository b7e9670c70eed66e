//! OSR Render - wgpu compositing for off-screen browsers
//!
//! Backs the bridge's frame compositor with GPU textures and presents the
//! composited layers directly to a window surface.

mod backend;
mod gpu;
mod quad;
mod surface;

pub use backend::{LAYER_FORMAT, WgpuBackend, copy_layout};
pub use gpu::{GpuConfig, GpuContext, GpuError, default_instance};
pub use quad::{QuadPipeline, TexturedVertex, quad_vertices};
pub use surface::{Frame, RenderSurface, SurfaceConfig, preferred_format};
