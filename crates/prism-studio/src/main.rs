use std::time::Instant;

use anyhow::Result;
use glam::{Quat, Vec3};

use prism_engine::coords::{Camera, Point3, Pose};
use prism_engine::core::{App, AppControl, FrameCtx};
use prism_engine::device::GpuInit;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::paint::Color;
use prism_engine::render::triangles::{TrianglesConfig, TrianglesRenderer};
use prism_engine::scene::DrawItem;
use prism_engine::window::{Runtime, RuntimeConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig {
            title: "Prism Studio".to_string(),
            ..Default::default()
        },
        GpuInit::default(),
        Studio::new(),
    )
}

struct Studio {
    started: Instant,
    renderer: Option<TrianglesRenderer>,
}

impl Studio {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            renderer: None,
        }
    }

    fn scene(&self) -> Vec<DrawItem> {
        let t = self.started.elapsed().as_secs_f32();

        vec![
            // Flat-colored fan, spinning about its center.
            DrawItem::new(fan(6, 1.0))
                .with_color(Color::from_rgba8(236, 112, 99, 255))
                .with_pose(Pose::new(Vec3::new(-2.0, 0.0, 0.0), Quat::from_rotation_z(t))),
            // Byte-range color resolved at upload.
            DrawItem::new(quad(0.8))
                .with_color(Color::new(93.0, 173.0, 226.0, 200.0))
                .with_pose(Pose::new(Vec3::new(2.0, 0.0, 0.0), Quat::from_rotation_y(t * 0.7))),
            // Vertex-colored gradient quad.
            DrawItem::new(quad(1.0)).with_colors(vec![
                Color::new(1.0, 0.0, 0.0, 1.0),
                Color::new(0.0, 1.0, 0.0, 1.0),
                Color::new(0.0, 0.0, 1.0, 1.0),
                Color::new(1.0, 0.0, 0.0, 1.0),
                Color::new(0.0, 0.0, 1.0, 1.0),
                Color::new(1.0, 1.0, 0.0, 1.0),
            ]),
            // Two coplanar quads; the later one layers over the earlier one.
            DrawItem::new(quad(0.6))
                .with_colors(vec![Color::from_rgba8(40, 40, 40, 255); 6])
                .with_pose(Pose::from_position(Vec3::new(0.0, -2.0, 0.0))),
            DrawItem::new(quad(0.3))
                .with_colors(vec![Color::from_rgba8(250, 250, 250, 255); 6])
                .with_pose(Pose::from_position(Vec3::new(0.0, -2.0, 0.0))),
        ]
    }
}

impl App for Studio {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let camera = Camera::look_at(
            Vec3::new(0.0, 1.5, 7.0),
            Vec3::ZERO,
            45f32.to_radians(),
            ctx.window.aspect_ratio(),
        );

        let items = self.scene();
        let first_frame = ctx.frame_index == 0;

        let renderer = self.renderer.get_or_insert_with(|| {
            TrianglesRenderer::new(
                ctx.gpu.device(),
                ctx.gpu.surface_format(),
                ctx.gpu.depth_format(),
                TrianglesConfig::default(),
            )
        });

        let mut failed = false;
        let control = ctx.render(Color::from_rgba8(18, 18, 24, 255), camera, |rctx, target| {
            match renderer.render(rctx, target, &items) {
                Ok(report) if first_frame => {
                    log::info!(
                        "first frame: {} draw calls, {} rejected items",
                        report.draw_calls.len(),
                        report.rejected.len()
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("frame dropped: {e}");
                    failed = true;
                }
            }
        });

        if failed { AppControl::Exit } else { control }
    }
}

/// Triangle fan around the origin in the XY plane, as a triangle list.
fn fan(segments: usize, radius: f32) -> Vec<Point3> {
    let step = std::f32::consts::TAU / segments as f32;
    (0..segments)
        .flat_map(|i| {
            let a0 = step * i as f32;
            let a1 = step * (i + 1) as f32;
            [
                Point3::ZERO,
                Point3::new(a0.cos() * radius, a0.sin() * radius, 0.0),
                Point3::new(a1.cos() * radius, a1.sin() * radius, 0.0),
            ]
        })
        .collect()
}

/// Axis-aligned square in the XY plane as two triangles.
fn quad(half: f32) -> Vec<Point3> {
    let (a, b, c, d) = (
        Point3::new(-half, -half, 0.0),
        Point3::new(half, -half, 0.0),
        Point3::new(half, half, 0.0),
        Point3::new(-half, half, 0.0),
    );
    vec![a, b, c, a, c, d]
}
