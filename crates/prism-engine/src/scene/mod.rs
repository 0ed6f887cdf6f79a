//! Scene (draw input) types.
//!
//! Responsibilities:
//! - caller-facing draw items and their depth overrides
//! - item validation and shading-path classification
//! - splitting one frame's items into per-path batches

mod batch;
mod item;
mod items;

pub use batch::{partition, Batch, Partition};
pub use item::{CompareFunc, DepthConfig, DrawItem, InvalidItemReason, ShadingPath};
pub use items::DrawItems;
