//! Shared GPU types and utilities used by both shading paths.

use bytemuck::{Pod, Zeroable};

use crate::coords::Camera;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::ShadingPath;

use super::{DepthState, TriangleError};

// ── blend ─────────────────────────────────────────────────────────────────

/// Standard straight-alpha "source over" blending shared by both paths.
pub fn default_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── camera uniform ────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub(super) fn new(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
        }
    }

    pub(super) fn min_binding_size() -> std::num::NonZeroU64 {
        std::num::NonZeroU64::new(std::mem::size_of::<Self>() as u64)
            .expect("CameraUniform has non-zero size by construction")
    }
}

// ── vertices ──────────────────────────────────────────────────────────────

/// Flat-color path vertex: position plus the index of the owning item in the
/// batch's color table.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FlatVertex {
    pub position: [f32; 3],
    pub item: u32,
}

impl FlatVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Uint32     // item
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FlatVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Vertex-color path vertex.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl ColorVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x4  // color
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

// ── pipelines ─────────────────────────────────────────────────────────────

/// Compiled pipelines of one shading path, one per depth state.
///
/// The default depth state is compiled at construction; override states are
/// compiled the first time a batch needs them and kept for the renderer's
/// lifetime.
pub(super) struct PipelineSet {
    label: &'static str,
    shader: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    variants: Vec<(DepthState, wgpu::RenderPipeline)>,
}

pub(super) struct PipelineSetDesc<'a> {
    pub label: &'static str,
    pub shader_src: &'static str,
    pub bind_group_layout: &'a wgpu::BindGroupLayout,
    pub vertex_layout: wgpu::VertexBufferLayout<'static>,
    pub color_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub blend: wgpu::BlendState,
    pub default_depth: DepthState,
}

impl PipelineSet {
    pub(super) fn new(device: &wgpu::Device, desc: PipelineSetDesc<'_>) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.shader_src.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(desc.label),
            bind_group_layouts: &[desc.bind_group_layout],
            immediate_size: 0,
        });

        let mut set = Self {
            label: desc.label,
            shader,
            layout,
            vertex_layout: desc.vertex_layout,
            color_format: desc.color_format,
            depth_format: desc.depth_format,
            blend: desc.blend,
            variants: Vec::new(),
        };
        set.get_or_create(device, desc.default_depth);
        set
    }

    /// Pipelines are compiled for fixed attachment formats.
    pub(super) fn check_target(
        &self,
        path: ShadingPath,
        ctx: &RenderCtx<'_>,
    ) -> Result<(), TriangleError> {
        if ctx.surface_format != self.color_format || ctx.depth_format != self.depth_format {
            return Err(TriangleError::GpuSubmissionFailure {
                path,
                reason: format!(
                    "pipeline built for {:?}/{:?}, target is {:?}/{:?}",
                    self.color_format, self.depth_format, ctx.surface_format, ctx.depth_format
                ),
            });
        }
        Ok(())
    }

    pub(super) fn get_or_create(
        &mut self,
        device: &wgpu::Device,
        depth: DepthState,
    ) -> &wgpu::RenderPipeline {
        let idx = match self.variants.iter().position(|(d, _)| *d == depth) {
            Some(idx) => idx,
            None => {
                log::debug!("{}: compiling pipeline for {depth:?}", self.label);
                let pipeline = self.create(device, depth);
                self.variants.push((depth, pipeline));
                self.variants.len() - 1
            }
        };
        &self.variants[idx].1
    }

    fn create(&self, device: &wgpu::Device, depth: DepthState) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(&self.layout),

            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[self.vertex_layout.clone()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: Some(self.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(depth.to_wgpu(self.depth_format)),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        })
    }
}

// ── buffers ───────────────────────────────────────────────────────────────

/// A GPU buffer that grows (power-of-two) to fit each upload.
pub(super) struct GrowableBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
}

impl GrowableBuffer {
    pub(super) fn new(label: &'static str, usage: wgpu::BufferUsages) -> Self {
        Self {
            label,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            buffer: None,
            capacity: 0,
        }
    }

    /// Uploads `bytes`, reallocating first if needed. Returns `true` when the
    /// underlying buffer changed (bind groups referencing it must be rebuilt).
    ///
    /// Growth never exceeds `limit`; callers check `bytes` against it first.
    pub(super) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        limit: u64,
    ) -> bool {
        let required = bytes.len() as u64;
        let mut reallocated = false;

        if self.buffer.is_none() || required > self.capacity {
            let new_cap = required.next_power_of_two().max(1024).min(limit).max(required);
            self.buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: new_cap,
                usage: self.usage,
                mapped_at_creation: false,
            }));
            self.capacity = new_cap;
            reallocated = true;
        }

        if let Some(buffer) = self.buffer.as_ref() {
            queue.write_buffer(buffer, 0, bytes);
        }
        reallocated
    }

    pub(super) fn get(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }
}

/// Rejects uploads the device cannot hold instead of letting wgpu raise a
/// validation error mid-frame.
pub(super) fn check_fits(
    path: ShadingPath,
    what: &str,
    bytes: u64,
    max: u64,
) -> Result<(), TriangleError> {
    if bytes > max {
        return Err(TriangleError::GpuSubmissionFailure {
            path,
            reason: format!("{what} needs {bytes} bytes, device limit is {max}"),
        });
    }
    Ok(())
}

pub(super) fn vertex_count_u32(path: ShadingPath, count: usize) -> Result<u32, TriangleError> {
    u32::try_from(count).map_err(|_| TriangleError::GpuSubmissionFailure {
        path,
        reason: format!("vertex count {count} exceeds u32"),
    })
}

// ── pass ──────────────────────────────────────────────────────────────────

/// Records one non-indexed triangle-list draw into `target`, loading the
/// existing color and depth contents.
pub(super) fn encode_draw(
    target: &mut RenderTarget<'_>,
    label: &str,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    vbo: &wgpu::Buffer,
    vertex_count: u32,
) {
    let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target.color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: target.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    rpass.set_pipeline(pipeline);
    rpass.set_bind_group(0, bind_group, &[]);
    rpass.set_vertex_buffer(0, vbo.slice(..));
    rpass.draw(0..vertex_count, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layouts_are_tightly_packed() {
        assert_eq!(std::mem::size_of::<FlatVertex>(), 16);
        assert_eq!(std::mem::size_of::<ColorVertex>(), 28);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
    }

    #[test]
    fn check_fits_rejects_oversized_uploads() {
        assert!(check_fits(ShadingPath::FlatColor, "vertex buffer", 16, 16).is_ok());
        let err = check_fits(ShadingPath::VertexColor, "vertex buffer", 17, 16).unwrap_err();
        assert!(matches!(
            err,
            TriangleError::GpuSubmissionFailure { path: ShadingPath::VertexColor, .. }
        ));
    }

    #[test]
    fn blend_is_source_over() {
        let b = default_blend();
        assert_eq!(b.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(b.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
    }
}
