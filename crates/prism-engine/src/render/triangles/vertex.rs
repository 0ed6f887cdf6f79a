use crate::render::{RenderCtx, RenderTarget};
use crate::scene::ShadingPath;

use super::common::{
    check_fits, encode_draw, vertex_count_u32, CameraUniform, ColorVertex, GrowableBuffer,
    PipelineSet, PipelineSetDesc,
};
use super::{DepthState, TriangleError, TrianglesConfig, VertexBatch};

const PATH: ShadingPath = ShadingPath::VertexColor;

/// Vertex-color shading path: per-vertex colors interpolated across each triangle.
pub struct VertexColorPath {
    default_depth: DepthState,
    pipelines: PipelineSet,
    camera_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertices: GrowableBuffer,
}

impl VertexColorPath {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        config: &TrianglesConfig,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("prism vertex-color bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(CameraUniform::min_binding_size()),
                },
                count: None,
            }],
        });

        let pipelines = PipelineSet::new(
            device,
            PipelineSetDesc {
                label: "prism vertex-color pipeline",
                shader_src: include_str!("shaders/vertex.wgsl"),
                bind_group_layout: &bind_group_layout,
                vertex_layout: ColorVertex::layout(),
                color_format,
                depth_format,
                blend: config.blend,
                default_depth: config.vertex_depth,
            },
        );

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism vertex-color camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("prism vertex-color bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        Self {
            default_depth: config.vertex_depth,
            pipelines,
            camera_ubo,
            bind_group,
            vertices: GrowableBuffer::new("prism vertex-color vbo", wgpu::BufferUsages::VERTEX),
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
        batch: &VertexBatch,
    ) -> Result<(), TriangleError> {
        let count = vertex_count_u32(PATH, batch.vertex_count())?;
        if count == 0 {
            return Ok(());
        }

        let limits = ctx.device.limits();
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&batch.vertices);
        check_fits(PATH, "vertex buffer", vertex_bytes.len() as u64, limits.max_buffer_size)?;
        self.pipelines.check_target(PATH, ctx)?;

        ctx.queue
            .write_buffer(&self.camera_ubo, 0, bytemuck::bytes_of(&CameraUniform::new(&ctx.camera)));
        self.vertices
            .upload(ctx.device, ctx.queue, vertex_bytes, limits.max_buffer_size);

        let pipeline = self.pipelines.get_or_create(ctx.device, batch.depth);
        let Some(vbo) = self.vertices.get() else {
            return Err(TriangleError::GpuSubmissionFailure {
                path: PATH,
                reason: "vertex buffer was not allocated".into(),
            });
        };

        encode_draw(target, "prism vertex-color pass", pipeline, &self.bind_group, vbo, count);
        Ok(())
    }
}
