//! Dual quaternion
//!
//! A unit dual quaternion encodes a rigid transform (rotation + translation,
//! no scale). The real part holds the rotation and the dual part holds half of
//! the pure translation quaternion multiplied by that rotation:
//!
//! ```text
//! real = r
//! dual = 0.5 * t * r      (t = translation as a quaternion with w = 0)
//! ```
//!
//! Skinning with dual quaternions keeps volume where linear blend skinning
//! collapses ("candy-wrapper") when joint rotations diverge.
//!
//! Multiplication is written left to right: `a * b` applies `a` first and then
//! `b`, the opposite of matrix and `glam::Quat` order.

use std::ops::{Add, Mul};

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};

use crate::math::LENGTH_EPSILON;
use crate::transform::Transform;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DualQuaternion {
    /// Rotation
    pub real: Quat,
    /// Translation, affected by the rotation
    pub dual: Quat,
}

const ZERO_QUAT: Quat = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);

impl DualQuaternion {
    pub const IDENTITY: Self = Self {
        real: Quat::IDENTITY,
        dual: ZERO_QUAT,
    };

    #[inline]
    #[must_use]
    pub const fn new(real: Quat, dual: Quat) -> Self {
        Self { real, dual }
    }

    /// Builds a unit dual quaternion from a rotation and a translation.
    #[must_use]
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        let pure = Quat::from_xyzw(translation.x, translation.y, translation.z, 0.0);
        Self {
            real: rotation,
            dual: (pure * rotation) * 0.5,
        }
    }

    /// Scale of the transform is dropped.
    #[inline]
    #[must_use]
    pub fn from_transform(t: &Transform) -> Self {
        Self::from_rotation_translation(t.rotation, t.position)
    }

    /// Recovers rotation and translation. Scale is always one.
    #[must_use]
    pub fn to_transform(&self) -> Transform {
        Transform::from_position_rotation(self.translation(), self.real)
    }

    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        let t = (self.dual * 2.0) * self.real.conjugate();
        Vec3::new(t.x, t.y, t.z)
    }

    /// Real-part dot product, used for neighborhood and blend direction checks.
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> f32 {
        self.real.dot(other.real)
    }

    #[inline]
    #[must_use]
    pub fn conjugate(&self) -> Self {
        Self {
            real: self.real.conjugate(),
            dual: self.dual.conjugate(),
        }
    }

    /// Scales both parts by `1 / |real|`. A degenerate real part yields identity.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mag_sq = self.real.length_squared();
        if mag_sq < LENGTH_EPSILON {
            log::trace!("normalizing a degenerate dual quaternion, returning identity");
            return Self::IDENTITY;
        }
        let inv_mag = 1.0 / mag_sq.sqrt();
        Self {
            real: self.real * inv_mag,
            dual: self.dual * inv_mag,
        }
    }

    /// In-place [`Self::normalized`].
    pub fn normalize(&mut self) {
        *self = self.normalized();
    }

    /// Rotates a direction. Translation does not apply.
    #[inline]
    #[must_use]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.real * v
    }

    #[inline]
    #[must_use]
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.real * p + self.translation()
    }

    /// Component-wise comparison within `eps`.
    #[must_use]
    pub fn abs_diff_eq(&self, other: &Self, eps: f32) -> bool {
        self.real.abs_diff_eq(other.real, eps) && self.dual.abs_diff_eq(other.dual, eps)
    }
}

impl Default for DualQuaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Add for DualQuaternion {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            real: self.real + rhs.real,
            dual: self.dual + rhs.dual,
        }
    }
}

impl Mul<f32> for DualQuaternion {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self {
            real: self.real * rhs,
            dual: self.dual * rhs,
        }
    }
}

impl Mul for DualQuaternion {
    type Output = Self;

    /// Applies `self` first, then `rhs`. Both operands are normalized.
    fn mul(self, rhs: Self) -> Self {
        let lhs = self.normalized();
        let rhs = rhs.normalized();
        Self {
            real: rhs.real * lhs.real,
            dual: rhs.dual * lhs.real + rhs.real * lhs.dual,
        }
    }
}

impl From<Transform> for DualQuaternion {
    fn from(t: Transform) -> Self {
        Self::from_transform(&t)
    }
}

impl From<DualQuaternion> for Transform {
    fn from(dq: DualQuaternion) -> Self {
        dq.to_transform()
    }
}

/// Conversion to a shader ready `mat2x4`.
impl From<DualQuaternion> for [[f32; 4]; 2] {
    fn from(dq: DualQuaternion) -> Self {
        [dq.real.to_array(), dq.dual.to_array()]
    }
}
