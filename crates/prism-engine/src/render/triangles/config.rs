use crate::paint::Color;

use super::common::default_blend;
use super::DepthState;

/// Construction-time configuration shared by both shading paths.
///
/// Captured once when the paths are built; never changed per draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct TrianglesConfig {
    /// Color for items that supply neither `color` nor `colors`.
    pub default_color: Color,

    /// Default depth state of the flat-color path.
    pub flat_depth: DepthState,

    /// Default depth state of the vertex-color path.
    pub vertex_depth: DepthState,

    /// Blend state used by both paths.
    pub blend: wgpu::BlendState,
}

impl Default for TrianglesConfig {
    fn default() -> Self {
        Self {
            default_color: Color::WHITE,
            flat_depth: DepthState::FLAT_COLOR,
            vertex_depth: DepthState::VERTEX_COLOR,
            blend: default_blend(),
        }
    }
}
