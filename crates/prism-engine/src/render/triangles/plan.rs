use crate::scene::{partition, Batch, DrawItems, ShadingPath};

use super::attributes::{resolve_flat_color, resolve_points, resolve_vertex_colors};
use super::common::{ColorVertex, FlatVertex};
use super::{DepthState, TriangleError, TrianglesConfig};

/// Resolved buffers for one flat-color draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatBatch {
    pub vertices: Vec<FlatVertex>,
    /// One color per item; `FlatVertex::item` indexes into this table.
    pub item_colors: Vec<[f32; 4]>,
    pub depth: DepthState,
    /// Items disagreed on depth overrides; `depth` is the path default.
    pub mixed_depth: bool,
    /// Frame-input indices of the items in this batch.
    pub items: Vec<usize>,
}

/// Resolved buffers for one vertex-color draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBatch {
    pub vertices: Vec<ColorVertex>,
    pub depth: DepthState,
    pub mixed_depth: bool,
    pub items: Vec<usize>,
}

impl FlatBatch {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

impl VertexBatch {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Issues draw calls for resolved batches.
///
/// Implementations perform exactly one GPU draw per call. Errors are fatal for
/// the frame and are never retried.
pub trait DrawSubmitter {
    fn submit_flat(&mut self, batch: &FlatBatch) -> Result<(), TriangleError>;
    fn submit_vertex(&mut self, batch: &VertexBatch) -> Result<(), TriangleError>;
}

/// Summary of one issued draw call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCallInfo {
    pub path: ShadingPath,
    pub vertex_count: usize,
    pub item_count: usize,
    pub depth: DepthState,
}

/// Outcome of a frame: issued draw calls plus per-item diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub draw_calls: Vec<DrawCallInfo>,
    /// `TriangleError::InvalidDrawItem` for every item that was not drawn.
    pub rejected: Vec<TriangleError>,
    /// `TriangleError::ColorFormatAmbiguous` for items drawn with clamped colors.
    pub warnings: Vec<TriangleError>,
    /// Paths whose items disagreed on depth overrides and fell back to the
    /// path default.
    pub mixed_depth: Vec<ShadingPath>,
}

/// CPU-side result of classifying and resolving one frame's items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FramePlan {
    pub flat: Option<FlatBatch>,
    pub vertex: Option<VertexBatch>,
    pub rejected: Vec<TriangleError>,
    pub warnings: Vec<TriangleError>,
    pub mixed_depth: Vec<ShadingPath>,
}

impl FramePlan {
    pub fn build<'a>(items: impl Into<DrawItems<'a>>, config: &TrianglesConfig) -> Self {
        let parts = partition(items);

        let mut plan = FramePlan {
            rejected: parts
                .rejected
                .into_iter()
                .map(|(index, reason)| TriangleError::InvalidDrawItem { index, reason })
                .collect(),
            ..Default::default()
        };

        plan.flat = build_flat(&parts.flat, config, &mut plan.warnings);
        plan.vertex = build_vertex(&parts.vertex, config, &mut plan.rejected, &mut plan.warnings);

        if plan.flat.as_ref().is_some_and(|b| b.mixed_depth) {
            plan.mixed_depth.push(ShadingPath::FlatColor);
        }
        if plan.vertex.as_ref().is_some_and(|b| b.mixed_depth) {
            plan.mixed_depth.push(ShadingPath::VertexColor);
        }

        plan
    }

    /// Submits every non-empty batch, flat-color first.
    pub fn submit(self, submitter: &mut impl DrawSubmitter) -> Result<FrameReport, TriangleError> {
        let mut draw_calls = Vec::with_capacity(2);

        if let Some(batch) = &self.flat {
            submitter.submit_flat(batch).inspect_err(|e| log::error!("{e}"))?;
            draw_calls.push(DrawCallInfo {
                path: ShadingPath::FlatColor,
                vertex_count: batch.vertex_count(),
                item_count: batch.items.len(),
                depth: batch.depth,
            });
        }

        if let Some(batch) = &self.vertex {
            submitter.submit_vertex(batch).inspect_err(|e| log::error!("{e}"))?;
            draw_calls.push(DrawCallInfo {
                path: ShadingPath::VertexColor,
                vertex_count: batch.vertex_count(),
                item_count: batch.items.len(),
                depth: batch.depth,
            });
        }

        Ok(FrameReport {
            draw_calls,
            rejected: self.rejected,
            warnings: self.warnings,
            mixed_depth: self.mixed_depth,
        })
    }
}

/// Logs plan diagnostics at `warn` the first time each kind shows up, then at
/// `debug`. The full per-frame data stays in [`FrameReport`].
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    warned_rejected: bool,
    warned_ambiguous: bool,
    warned_mixed_depth: bool,
}

impl DiagnosticLog {
    /// Returns how many messages went out at `warn`.
    pub fn record(&mut self, plan: &FramePlan) -> usize {
        let mut warned = 0;
        for err in &plan.rejected {
            warned += emit(&mut self.warned_rejected, format_args!("{err}"));
        }
        for err in &plan.warnings {
            warned += emit(&mut self.warned_ambiguous, format_args!("{err}"));
        }
        for path in &plan.mixed_depth {
            warned += emit(
                &mut self.warned_mixed_depth,
                format_args!(
                    "{} batch: items disagree on depth overrides; using path default",
                    path.label()
                ),
            );
        }
        warned
    }
}

fn emit(warned: &mut bool, msg: std::fmt::Arguments<'_>) -> usize {
    if *warned {
        log::debug!("{msg}");
        return 0;
    }
    log::warn!("{msg} (repeats are logged at debug level)");
    *warned = true;
    1
}

fn build_flat(
    batch: &Batch<'_>,
    config: &TrianglesConfig,
    warnings: &mut Vec<TriangleError>,
) -> Option<FlatBatch> {
    if batch.is_empty() {
        return None;
    }

    let mut vertices = Vec::with_capacity(batch.vertex_count());
    let mut item_colors = Vec::with_capacity(batch.len());
    let mut items = Vec::with_capacity(batch.len());

    for &(index, item) in &batch.items {
        let slot = item_colors.len() as u32;
        item_colors.push(resolve_flat_color(index, item, config.default_color, warnings));
        vertices.extend(resolve_points(item).map(|position| FlatVertex { position, item: slot }));
        items.push(index);
    }

    let (depth, mixed_depth) = config.flat_depth.for_batch(batch.iter());
    Some(FlatBatch {
        vertices,
        item_colors,
        depth,
        mixed_depth,
        items,
    })
}

fn build_vertex(
    batch: &Batch<'_>,
    config: &TrianglesConfig,
    rejected: &mut Vec<TriangleError>,
    warnings: &mut Vec<TriangleError>,
) -> Option<VertexBatch> {
    let mut vertices = Vec::with_capacity(batch.vertex_count());
    let mut items = Vec::with_capacity(batch.len());

    for &(index, item) in &batch.items {
        let colors = match resolve_vertex_colors(index, item, config.default_color, warnings) {
            Ok(colors) => colors,
            Err(reason) => {
                rejected.push(TriangleError::InvalidDrawItem { index, reason });
                continue;
            }
        };
        vertices.extend(
            resolve_points(item)
                .zip(colors)
                .map(|(position, color)| ColorVertex { position, color }),
        );
        items.push(index);
    }

    if items.is_empty() {
        return None;
    }

    let (depth, mixed_depth) = config.vertex_depth.for_batch(batch.iter());
    Some(VertexBatch {
        vertices,
        depth,
        mixed_depth,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Point3, Pose};
    use crate::paint::Color;
    use crate::scene::{DepthConfig, DrawItem, InvalidItemReason};

    const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

    #[derive(Default)]
    struct Recorder {
        flat: Vec<FlatBatch>,
        vertex: Vec<VertexBatch>,
        fail_flat: bool,
    }

    impl DrawSubmitter for Recorder {
        fn submit_flat(&mut self, batch: &FlatBatch) -> Result<(), TriangleError> {
            if self.fail_flat {
                return Err(TriangleError::GpuSubmissionFailure {
                    path: ShadingPath::FlatColor,
                    reason: "device lost".into(),
                });
            }
            assert!(batch.vertex_count() > 0, "zero-count draw issued");
            self.flat.push(batch.clone());
            Ok(())
        }

        fn submit_vertex(&mut self, batch: &VertexBatch) -> Result<(), TriangleError> {
            assert!(batch.vertex_count() > 0, "zero-count draw issued");
            self.vertex.push(batch.clone());
            Ok(())
        }
    }

    fn tri(z: f32) -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        ]
    }

    fn run(items: &[DrawItem]) -> (Recorder, FrameReport) {
        let mut rec = Recorder::default();
        let report = FramePlan::build(items, &TrianglesConfig::default())
            .submit(&mut rec)
            .unwrap();
        (rec, report)
    }

    #[test]
    fn mixed_items_issue_two_draw_calls() {
        let c0 = Color::new(0.0, 0.0, 1.0, 1.0);
        let c1 = Color::new(0.0, 1.0, 0.0, 1.0);
        let c2 = Color::new(1.0, 1.0, 0.0, 1.0);
        let items = vec![
            DrawItem::new(tri(0.0)).with_color(RED),
            DrawItem::new(tri(1.0)).with_colors(vec![c0, c1, c2]),
        ];
        let (rec, report) = run(&items);

        assert_eq!(report.draw_calls.len(), 2);
        assert_eq!(rec.flat.len(), 1);
        assert_eq!(rec.vertex.len(), 1);

        let flat = &rec.flat[0];
        assert_eq!(flat.items, vec![0]);
        assert_eq!(flat.vertex_count(), 3);
        assert_eq!(flat.item_colors, vec![[1.0, 0.0, 0.0, 1.0]]);

        let vertex = &rec.vertex[0];
        assert_eq!(vertex.items, vec![1]);
        assert_eq!(vertex.vertex_count(), 3);
        let colors: Vec<_> = vertex.vertices.iter().map(|v| v.color).collect();
        assert_eq!(colors, vec![c0.channels(), c1.channels(), c2.channels()]);
    }

    #[test]
    fn empty_partitions_issue_no_draw_calls() {
        let (rec, report) = run(&[]);
        assert!(report.draw_calls.is_empty());
        assert!(rec.flat.is_empty() && rec.vertex.is_empty());

        let (rec, report) = run(&[DrawItem::new(tri(0.0)).with_color(RED)]);
        assert_eq!(report.draw_calls.len(), 1);
        assert!(rec.vertex.is_empty());
    }

    #[test]
    fn vertex_count_sums_points_across_items() {
        let items = vec![
            DrawItem::new([tri(0.0), tri(0.5)].concat()).with_color(RED),
            DrawItem::new(tri(1.0)),
        ];
        let (rec, report) = run(&items);
        assert_eq!(report.draw_calls[0].vertex_count, 9);
        assert_eq!(report.draw_calls[0].item_count, 2);
        // Item slots index the color table in batch order.
        let slots: Vec<u32> = rec.flat[0].vertices.iter().map(|v| v.item).collect();
        assert_eq!(slots, vec![0, 0, 0, 0, 0, 0, 1, 1, 1]);
        assert_eq!(rec.flat[0].item_colors[1], Color::WHITE.channels());
    }

    #[test]
    fn empty_colors_with_color_renders_flat() {
        let items = vec![DrawItem::new(tri(0.0))
            .with_color(RED)
            .with_colors(Vec::<Color>::new())];
        let (rec, _) = run(&items);
        assert!(rec.vertex.is_empty());
        assert_eq!(rec.flat[0].item_colors, vec![RED.channels()]);
    }

    #[test]
    fn invalid_item_is_reported_and_siblings_still_draw() {
        let items = vec![
            DrawItem::new(tri(0.0)).with_colors(vec![RED; 2]),
            DrawItem::new(tri(1.0)).with_colors(vec![RED; 3]),
        ];
        let (rec, report) = run(&items);
        assert_eq!(rec.vertex[0].items, vec![1]);
        assert_eq!(
            report.rejected,
            vec![TriangleError::InvalidDrawItem {
                index: 0,
                reason: InvalidItemReason::ColorCountMismatch { points: 3, colors: 2 },
            }]
        );
    }

    #[test]
    fn poses_are_applied_per_item() {
        let items = vec![
            DrawItem::new(tri(0.0)).with_pose(Pose::from_position(Point3::new(10.0, 0.0, 0.0))),
            DrawItem::new(tri(0.0)),
        ];
        let (rec, _) = run(&items);
        let xs: Vec<f32> = rec.flat[0].vertices.iter().map(|v| v.position[0]).collect();
        assert_eq!(xs, vec![10.0, 11.0, 10.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn byte_range_colors_are_normalized_before_upload() {
        let items = vec![DrawItem::new(tri(0.0)).with_color(Color::new(255.0, 0.0, 0.0, 255.0))];
        let (rec, report) = run(&items);
        assert_eq!(rec.flat[0].item_colors, vec![[1.0, 0.0, 0.0, 1.0]]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn ambiguous_colors_still_draw_with_a_warning() {
        let items = vec![DrawItem::new(tri(0.0)).with_color(Color::new(-3.0, 0.0, 0.0, 1.0))];
        let (rec, report) = run(&items);
        assert_eq!(rec.flat[0].item_colors, vec![[0.0, 0.0, 0.0, 1.0]]);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn flat_depth_defaults_and_unanimous_override() {
        let (_, report) = run(&[DrawItem::new(tri(0.0))]);
        assert_eq!(report.draw_calls[0].depth, DepthState::FLAT_COLOR);

        let mask = DepthConfig { mask: true, ..Default::default() };
        let items = vec![
            DrawItem::new(tri(0.0)).with_depth(mask),
            DrawItem::new(tri(1.0)).with_depth(mask),
        ];
        let (_, report) = run(&items);
        assert!(report.draw_calls[0].depth.mask);
    }

    #[test]
    fn disagreeing_depth_overrides_use_path_default() {
        let mask = DepthConfig { mask: true, ..Default::default() };
        let items = vec![
            DrawItem::new(tri(0.0)).with_depth(mask),
            DrawItem::new(tri(1.0)),
        ];
        let (_, report) = run(&items);
        assert_eq!(report.draw_calls[0].depth, DepthState::FLAT_COLOR);
    }

    #[test]
    fn falsy_enable_override_does_not_disable_depth() {
        let off = DepthConfig { enable: false, ..Default::default() };
        let (_, report) = run(&[DrawItem::new(tri(0.0)).with_depth(off)]);
        assert!(report.draw_calls[0].depth.enable);
    }

    #[test]
    fn vertex_path_defaults_to_less_equal_with_writes() {
        let (_, report) = run(&[DrawItem::new(tri(0.0)).with_colors(vec![RED; 3])]);
        assert_eq!(report.draw_calls[0].path, ShadingPath::VertexColor);
        assert_eq!(report.draw_calls[0].depth, DepthState::VERTEX_COLOR);
    }

    #[test]
    fn gpu_failure_is_propagated() {
        let mut rec = Recorder { fail_flat: true, ..Default::default() };
        let items = vec![
            DrawItem::new(tri(0.0)),
            DrawItem::new(tri(1.0)).with_colors(vec![RED; 3]),
        ];
        let err = FramePlan::build(&items, &TrianglesConfig::default())
            .submit(&mut rec)
            .unwrap_err();
        assert!(matches!(err, TriangleError::GpuSubmissionFailure { .. }));
        assert!(rec.vertex.is_empty());
    }

    #[test]
    fn single_item_plans_like_one_element_slice() {
        let item = DrawItem::new(tri(0.0)).with_colors(vec![RED; 3]);
        let config = TrianglesConfig::default();
        assert_eq!(
            FramePlan::build(&item, &config),
            FramePlan::build(std::slice::from_ref(&item), &config)
        );
    }

    #[test]
    fn mixed_depth_is_reported_per_path() {
        let mask = DepthConfig { mask: true, ..Default::default() };
        let items = vec![
            DrawItem::new(tri(0.0)).with_depth(mask),
            DrawItem::new(tri(1.0)),
            DrawItem::new(tri(2.0)).with_colors(vec![RED; 3]),
        ];
        let (rec, report) = run(&items);
        assert!(rec.flat[0].mixed_depth);
        assert!(!rec.vertex[0].mixed_depth);
        assert_eq!(report.mixed_depth, vec![ShadingPath::FlatColor]);
    }

    #[test]
    fn diagnostics_warn_once_per_kind() {
        let mask = DepthConfig { mask: true, ..Default::default() };
        let items = vec![
            DrawItem::new(tri(0.0)).with_colors(vec![RED; 2]),
            DrawItem::new(vec![Point3::ZERO]),
            DrawItem::new(tri(1.0)).with_color(Color::new(-1.0, 0.0, 0.0, 1.0)),
            DrawItem::new(tri(2.0)).with_depth(mask),
        ];
        let plan = FramePlan::build(&items, &TrianglesConfig::default());
        assert_eq!(plan.rejected.len(), 2);

        let mut diagnostics = DiagnosticLog::default();
        // One warning each for rejection, ambiguity and mixed depth.
        assert_eq!(diagnostics.record(&plan), 3);
        // The same problems on the next frame stay quiet.
        assert_eq!(diagnostics.record(&plan), 0);
    }
}
