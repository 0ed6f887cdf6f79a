//! GPU rendering subsystem.
//!
//! Renderers consume `scene` draw items and issue GPU commands via wgpu.
//! Each renderer is responsible for its own GPU resources (pipelines, buffers).
//!
//! Convention:
//! - CPU geometry is posed into render space before upload.
//! - Vertex shaders apply the frame camera (`projection * view`) only.

mod ctx;
pub mod triangles;

pub use ctx::{RenderCtx, RenderTarget};
