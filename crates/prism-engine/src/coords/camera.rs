use glam::Mat4;

/// View and projection transforms for the current frame.
///
/// Owned by the host; renderers only read it and upload `projection * view`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Camera {
    #[inline]
    pub const fn new(view: Mat4, projection: Mat4) -> Self {
        Self { view, projection }
    }

    /// Right-handed perspective camera looking from `eye` at `target`, with a
    /// [0, 1] depth range as wgpu expects.
    pub fn look_at(eye: glam::Vec3, target: glam::Vec3, fov_y: f32, aspect: f32) -> Self {
        let view = Mat4::look_at_rh(eye, target, glam::Vec3::Y);
        let projection = Mat4::perspective_rh(fov_y, aspect.max(f32::EPSILON), 0.05, 1000.0);
        Self { view, projection }
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}
