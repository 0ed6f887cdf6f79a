use thiserror::Error;

use crate::scene::{InvalidItemReason, ShadingPath};

/// Failures and diagnostics produced while building or submitting triangle batches.
///
/// `InvalidDrawItem` and `ColorFormatAmbiguous` are per-item diagnostics: the
/// frame still draws. `GpuSubmissionFailure` aborts the frame's remaining draw
/// calls and is returned to the caller. `FrameAlreadyRendered` rejects a
/// second render into the same frame before anything is uploaded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TriangleError {
    #[error("draw item {index} rejected: {reason}")]
    InvalidDrawItem {
        index: usize,
        reason: InvalidItemReason,
    },

    #[error("draw item {index}: ambiguous color channels {channels:?} (vertex {vertex:?}), clamped to [0, 1]")]
    ColorFormatAmbiguous {
        index: usize,
        vertex: Option<usize>,
        channels: [f32; 4],
    },

    #[error("{} draw call failed: {reason}", .path.label())]
    GpuSubmissionFailure { path: ShadingPath, reason: String },

    #[error("frame {frame} was already rendered; draw all items in one call")]
    FrameAlreadyRendered { frame: u64 },
}
