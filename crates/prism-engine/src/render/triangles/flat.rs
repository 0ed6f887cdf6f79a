use crate::render::{RenderCtx, RenderTarget};
use crate::scene::ShadingPath;

use super::common::{
    check_fits, encode_draw, vertex_count_u32, CameraUniform, FlatVertex, GrowableBuffer,
    PipelineSet, PipelineSetDesc,
};
use super::{DepthState, FlatBatch, TriangleError, TrianglesConfig};

const PATH: ShadingPath = ShadingPath::FlatColor;

/// Flat-color shading path.
///
/// Every triangle of an item is filled with that item's single color. Item
/// colors live in a per-batch storage buffer indexed by `FlatVertex::item`,
/// so a whole batch is still one draw call.
pub struct FlatColorPath {
    default_depth: DepthState,
    pipelines: PipelineSet,
    bind_group_layout: wgpu::BindGroupLayout,
    camera_ubo: wgpu::Buffer,
    vertices: GrowableBuffer,
    colors: GrowableBuffer,
    bind_group: Option<wgpu::BindGroup>,
}

impl FlatColorPath {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        config: &TrianglesConfig,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism flat bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(CameraUniform::min_binding_size()),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(16),
                    },
                    count: None,
                },
            ],
        });

        let pipelines = PipelineSet::new(
            device,
            PipelineSetDesc {
                label: "prism flat pipeline",
                shader_src: include_str!("shaders/flat.wgsl"),
                bind_group_layout: &bind_group_layout,
                vertex_layout: FlatVertex::layout(),
                color_format,
                depth_format,
                blend: config.blend,
                default_depth: config.flat_depth,
            },
        );

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism flat camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            default_depth: config.flat_depth,
            pipelines,
            bind_group_layout,
            camera_ubo,
            vertices: GrowableBuffer::new("prism flat vbo", wgpu::BufferUsages::VERTEX),
            colors: GrowableBuffer::new("prism flat item colors", wgpu::BufferUsages::STORAGE),
            bind_group: None,
        }
    }

    #[inline]
    pub fn default_depth(&self) -> DepthState {
        self.default_depth
    }

    pub(super) fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        batch: &FlatBatch,
    ) -> Result<(), TriangleError> {
        let count = vertex_count_u32(PATH, batch.vertex_count())?;
        if count == 0 {
            return Ok(());
        }

        let limits = ctx.device.limits();
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&batch.vertices);
        let color_bytes: &[u8] = bytemuck::cast_slice(&batch.item_colors);
        let color_limit = (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size);
        check_fits(PATH, "vertex buffer", vertex_bytes.len() as u64, limits.max_buffer_size)?;
        check_fits(PATH, "item color table", color_bytes.len() as u64, color_limit)?;
        self.pipelines.check_target(PATH, ctx)?;

        ctx.queue
            .write_buffer(&self.camera_ubo, 0, bytemuck::bytes_of(&CameraUniform::new(&ctx.camera)));
        self.vertices
            .upload(ctx.device, ctx.queue, vertex_bytes, limits.max_buffer_size);
        let rebind = self.colors.upload(ctx.device, ctx.queue, color_bytes, color_limit);

        if rebind || self.bind_group.is_none() {
            self.bind_group = self.colors.get().map(|colors| {
                ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("prism flat bind group"),
                    layout: &self.bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: self.camera_ubo.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: colors.as_entire_binding(),
                        },
                    ],
                })
            });
        }

        let pipeline = self.pipelines.get_or_create(ctx.device, batch.depth);
        let (Some(bind_group), Some(vbo)) = (self.bind_group.as_ref(), self.vertices.get()) else {
            return Err(TriangleError::GpuSubmissionFailure {
                path: PATH,
                reason: "buffers were not allocated".into(),
            });
        };

        encode_draw(target, "prism flat pass", pipeline, bind_group, vbo, count);
        Ok(())
    }
}
