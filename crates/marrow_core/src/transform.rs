use glam::{Mat3, Mat4, Quat, Vec3};

use crate::math::{self, EPSILON, LENGTH_EPSILON};

/// Rigid transform with non-uniform scale.
///
/// Applied right to left: scale, then rotate, then translate. Joints store
/// their local transform relative to the parent joint.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    #[inline]
    #[must_use]
    pub const fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY, Vec3::ONE)
    }

    #[inline]
    #[must_use]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self::new(Vec3::ZERO, rotation, Vec3::ONE)
    }

    #[inline]
    #[must_use]
    pub const fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self::new(position, rotation, Vec3::ONE)
    }

    /// Expresses `child` (relative to `parent`) in the parent's space.
    ///
    /// `combine(root, combine(mid, leaf))` equals
    /// `combine(combine(root, mid), leaf)` for uniform scales.
    #[must_use]
    pub fn combine(parent: &Self, child: &Self) -> Self {
        Self {
            scale: parent.scale * child.scale,
            rotation: parent.rotation * child.rotation,
            position: parent.position + parent.rotation * (parent.scale * child.position),
        }
    }

    /// Inverse transform. Near-zero scale axes invert to zero.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        let invert_axis = |s: f32| if s.abs() < LENGTH_EPSILON { 0.0 } else { 1.0 / s };
        let scale = Vec3::new(
            invert_axis(self.scale.x),
            invert_axis(self.scale.y),
            invert_axis(self.scale.z),
        );
        Self {
            position: rotation * (scale * -self.position),
            rotation,
            scale,
        }
    }

    /// Interpolates position and scale linearly and rotation along the short arc.
    #[must_use]
    pub fn mix(a: &Self, b: &Self, t: f32) -> Self {
        Self {
            position: a.position.lerp(b.position, t),
            rotation: math::nlerp(a.rotation, b.rotation, t),
            scale: a.scale.lerp(b.scale, t),
        }
    }

    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Decomposes a matrix, estimating scale from the rotation-scale block.
    ///
    /// Shear is folded into the scale estimate and otherwise lost.
    #[must_use]
    pub fn from_mat4(m: &Mat4) -> Self {
        let (_, rotation, position) = m.to_scale_rotation_translation();
        let rotation = math::normalize_quat(rotation);

        let rot_scale = Mat3::from_mat4(*m);
        let inv_rot = Mat3::from_quat(rotation.inverse());
        let scale_skew = inv_rot * rot_scale;

        Self {
            position,
            rotation,
            scale: Vec3::new(scale_skew.x_axis.x, scale_skew.y_axis.y, scale_skew.z_axis.z),
        }
    }

    #[inline]
    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * point)
    }

    /// Directions ignore translation.
    #[inline]
    #[must_use]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }

    /// Component-wise comparison within `eps`. Rotations `q` and `-q` are
    /// considered equal.
    #[must_use]
    pub fn abs_diff_eq(&self, other: &Self, eps: f32) -> bool {
        self.position.abs_diff_eq(other.position, eps)
            && self.scale.abs_diff_eq(other.scale, eps)
            && math::quat_same_rotation(self.rotation, other.rotation, eps)
    }

    /// [`Self::abs_diff_eq`] with the crate tolerance.
    #[inline]
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.abs_diff_eq(other, EPSILON)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.to_mat4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_combine_applies_parent_rotation() {
        let parent = Transform::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_z(FRAC_PI_2),
            Vec3::ONE,
        );
        let child = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));

        let world = Transform::combine(&parent, &child);
        assert!(world.position.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = Transform::new(
            Vec3::new(3.0, -2.0, 0.5),
            Quat::from_rotation_y(0.7),
            Vec3::splat(2.0),
        );
        let identity = Transform::combine(&t, &t.inverse());
        assert!(identity.approx_eq(&Transform::IDENTITY), "got {identity:?}");
    }

    #[test]
    fn test_mat4_round_trip() {
        let t = Transform::new(
            Vec3::new(4.0, 5.0, 6.0),
            Quat::from_rotation_x(0.3),
            Vec3::new(1.0, 2.0, 3.0),
        );
        let back = Transform::from_mat4(&t.to_mat4());
        assert!(back.abs_diff_eq(&t, 1e-4), "got {back:?}");
    }

    #[test]
    fn test_mix_endpoints() {
        let a = Transform::from_position(Vec3::ZERO);
        let b = Transform::new(Vec3::X, Quat::from_rotation_y(1.0), Vec3::splat(3.0));
        assert!(Transform::mix(&a, &b, 0.0).approx_eq(&a));
        assert!(Transform::mix(&a, &b, 1.0).approx_eq(&b));
    }
}
