//! Prism engine crate.
//!
//! Draws batches of triangles through two shading paths (flat color and
//! per-vertex color) on top of wgpu, plus the platform + GPU runtime pieces
//! used to host them.

pub mod device;
pub mod window;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
