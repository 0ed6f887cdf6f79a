//! Coordinate and transform types shared across the engine.
//!
//! Canonical CPU space:
//! - Right-handed, +Y up
//! - Item points are local space; a `Pose` maps them into render space
//! - `Camera` maps render space to clip space in the vertex stage

mod camera;
mod pose;

pub use camera::Camera;
pub use pose::Pose;

/// A point in local object space.
pub type Point3 = glam::Vec3;
