//! Paint model shared between scene items and renderers.
//!
//! Scope:
//! - caller-facing color representation
//! - range detection and normalization to `[0, 1]` straight alpha

pub mod color;

pub use color::{Color, ColorFormat};
