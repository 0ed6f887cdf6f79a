use glam::{Mat4, Quat, Vec3};

use super::Point3;

/// Rigid transform applied to an item's local-space points.
///
/// Rotation is applied first, then translation. `orientation` is normalized
/// on use; a zero or non-finite quaternion is treated as no rotation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    #[inline]
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    #[inline]
    pub const fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    /// Maps a local-space point into render space.
    #[inline]
    pub fn apply(&self, point: Point3) -> Point3 {
        self.rotation() * point + self.position
    }

    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation(), self.position)
    }

    /// Unit-length orientation.
    pub fn rotation(&self) -> Quat {
        let len = self.orientation.length();
        if len.is_finite() && len > f32::EPSILON {
            self.orientation.normalize()
        } else {
            Quat::IDENTITY
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn identity_leaves_points_untouched() {
        let p = Vec3::new(1.0, -2.0, 3.5);
        assert_eq!(Pose::IDENTITY.apply(p), p);
    }

    #[test]
    fn rotation_happens_before_translation() {
        let pose = Pose::new(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
        );
        // +X rotated a quarter turn around Z lands on +Y, then shifts by +10 X.
        assert!(approx(pose.apply(Vec3::X), Vec3::new(10.0, 1.0, 0.0)));
    }

    #[test]
    fn matrix_agrees_with_apply() {
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.7));
        let p = Vec3::new(-4.0, 0.5, 2.0);
        assert!(approx(pose.to_matrix().transform_point3(p), pose.apply(p)));
    }

    #[test]
    fn non_unit_orientation_does_not_scale() {
        let pose = Pose::new(Vec3::ZERO, Quat::from_xyzw(0.0, 0.0, 0.0, 3.0));
        assert!(approx(pose.apply(Vec3::X), Vec3::X));

        let pose = Pose::new(Vec3::ZERO, Quat::from_rotation_z(1.2) * 2.0);
        assert!(approx(pose.apply(Vec3::X), Quat::from_rotation_z(1.2) * Vec3::X));
    }

    #[test]
    fn zero_orientation_is_no_rotation() {
        let pose = Pose::new(Vec3::new(0.0, 1.0, 0.0), Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert!(approx(pose.apply(Vec3::X), Vec3::new(1.0, 1.0, 0.0)));
    }
}
