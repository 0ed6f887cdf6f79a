//! Triangle-list renderer with two shading paths.
//!
//! Each frame's items are split by [`FramePlan`] into a flat-color batch and a
//! vertex-color batch; each non-empty batch becomes exactly one draw call on
//! its path. Both paths are built once in [`TrianglesRenderer::new`].

mod attributes;
mod common;
mod config;
mod depth;
mod error;
mod flat;
mod plan;
mod vertex;

pub use attributes::{resolve_flat_color, resolve_points, resolve_vertex_colors};
pub use common::{default_blend, ColorVertex, FlatVertex};
pub use config::TrianglesConfig;
pub use depth::DepthState;
pub use error::TriangleError;
pub use flat::FlatColorPath;
pub use plan::{DiagnosticLog, DrawCallInfo, DrawSubmitter, FlatBatch, FramePlan, FrameReport, VertexBatch};
pub use vertex::VertexColorPath;

use crate::render::{RenderCtx, RenderTarget};
use crate::scene::DrawItems;

/// Owns both shading paths and draws one frame's triangle items.
///
/// Vertex, color and camera buffers are reused across calls, so the renderer
/// draws at most once per frame; a second [`TrianglesRenderer::render`] in the
/// same frame is rejected.
pub struct TrianglesRenderer {
    config: TrianglesConfig,
    flat: FlatColorPath,
    vertex: VertexColorPath,
    diagnostics: DiagnosticLog,
    last_frame: Option<u64>,
}

impl TrianglesRenderer {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        config: TrianglesConfig,
    ) -> Self {
        let flat = FlatColorPath::new(device, color_format, depth_format, &config);
        let vertex = VertexColorPath::new(device, color_format, depth_format, &config);
        Self {
            config,
            flat,
            vertex,
            diagnostics: DiagnosticLog::default(),
            last_frame: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &TrianglesConfig {
        &self.config
    }

    /// Classifies, resolves and draws `items` into `target`.
    ///
    /// Invalid items are skipped and listed in the report; a GPU failure aborts
    /// the remaining draw calls of this frame. Pass every item of the frame in
    /// one call: a second call with the same `ctx.frame_index` returns
    /// [`TriangleError::FrameAlreadyRendered`] without touching GPU buffers.
    pub fn render<'a>(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        items: impl Into<DrawItems<'a>>,
    ) -> Result<FrameReport, TriangleError> {
        claim_frame(&mut self.last_frame, ctx.frame_index)?;

        let plan = FramePlan::build(items, &self.config);
        self.diagnostics.record(&plan);
        let mut submitter = WgpuSubmitter {
            flat: &mut self.flat,
            vertex: &mut self.vertex,
            ctx,
            target,
        };
        plan.submit(&mut submitter)
    }
}

struct WgpuSubmitter<'r, 'c, 't, 'e> {
    flat: &'r mut FlatColorPath,
    vertex: &'r mut VertexColorPath,
    ctx: &'c RenderCtx<'c>,
    target: &'t mut RenderTarget<'e>,
}

impl DrawSubmitter for WgpuSubmitter<'_, '_, '_, '_> {
    fn submit_flat(&mut self, batch: &FlatBatch) -> Result<(), TriangleError> {
        self.flat.draw(self.ctx, self.target, batch)
    }

    fn submit_vertex(&mut self, batch: &VertexBatch) -> Result<(), TriangleError> {
        self.vertex.draw(self.ctx, self.target, batch)
    }
}

fn claim_frame(last: &mut Option<u64>, frame: u64) -> Result<(), TriangleError> {
    if *last == Some(frame) {
        return Err(TriangleError::FrameAlreadyRendered { frame });
    }
    *last = Some(frame);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_render_in_one_frame_is_rejected() {
        let mut last = None;
        assert!(claim_frame(&mut last, 4).is_ok());
        assert_eq!(
            claim_frame(&mut last, 4),
            Err(TriangleError::FrameAlreadyRendered { frame: 4 })
        );
        assert!(claim_frame(&mut last, 5).is_ok());
    }
}
