//! Quaternion and vector helpers shared by the animation code.
//!
//! `glam` provides the algebra; these helpers add the animation-specific rules
//! on top of it: neighborhooding for shortest-path interpolation, nlerp, and a
//! from-to rotation that survives opposite vectors.

use glam::{Quat, Vec3};

/// Tolerance used for approximate equality of poses and transforms.
pub const EPSILON: f32 = 1e-5;

/// Squared lengths below this are treated as zero.
pub const LENGTH_EPSILON: f32 = 1e-6;

/// Returns `b` flipped onto the same hemisphere as `a`.
///
/// `q` and `-q` encode the same rotation; interpolating towards the one with a
/// positive dot product takes the shorter arc.
#[inline]
#[must_use]
pub fn neighborhood(a: Quat, b: Quat) -> Quat {
    if a.dot(b) < 0.0 { -b } else { b }
}

/// Normalizes `q`, falling back to identity for a zero quaternion.
#[inline]
#[must_use]
pub fn normalize_quat(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if len_sq < LENGTH_EPSILON {
        return Quat::IDENTITY;
    }
    q * (1.0 / len_sq.sqrt())
}

/// Component-wise mix of two quaternions without renormalization.
#[inline]
#[must_use]
pub fn mix_quat(a: Quat, b: Quat, t: f32) -> Quat {
    a * (1.0 - t) + b * t
}

/// Normalized linear interpolation with neighborhood correction.
#[inline]
#[must_use]
pub fn nlerp(a: Quat, b: Quat, t: f32) -> Quat {
    normalize_quat(mix_quat(a, neighborhood(a, b), t))
}

/// Shortest rotation taking direction `from` onto direction `to`.
///
/// Zero-length input yields identity. Opposite directions rotate half a turn
/// around the axis most orthogonal to `from`.
#[must_use]
pub fn from_to(from: Vec3, to: Vec3) -> Quat {
    let f = from.normalize_or_zero();
    let t = to.normalize_or_zero();
    if f == Vec3::ZERO || t == Vec3::ZERO {
        return Quat::IDENTITY;
    }

    if f.abs_diff_eq(t, LENGTH_EPSILON) {
        return Quat::IDENTITY;
    }

    if f.abs_diff_eq(-t, LENGTH_EPSILON) {
        let mut ortho = Vec3::X;
        if f.y.abs() < f.x.abs() {
            ortho = Vec3::Y;
        }
        if f.z.abs() < f.y.abs() && f.z.abs() < f.x.abs() {
            ortho = Vec3::Z;
        }
        let axis = f.cross(ortho).normalize_or_zero();
        return Quat::from_xyzw(axis.x, axis.y, axis.z, 0.0);
    }

    let half = (f + t).normalize_or_zero();
    let axis = f.cross(half);
    normalize_quat(Quat::from_xyzw(axis.x, axis.y, axis.z, f.dot(half)))
}

/// Orientation whose +Z axis points along `direction` with +Y twisted towards `up`.
#[must_use]
pub fn look_rotation(direction: Vec3, up: Vec3) -> Quat {
    let f = direction.normalize_or_zero();
    let u = up.normalize_or_zero();
    let r = u.cross(f);
    let u = f.cross(r);

    let world_to_object = from_to(Vec3::Z, f);
    let object_up = world_to_object * Vec3::Y;
    let up_to_up = from_to(object_up, u);

    normalize_quat(up_to_up * world_to_object)
}

/// Approximate equality of two quaternions, ignoring the double cover.
#[inline]
#[must_use]
pub fn quat_same_rotation(a: Quat, b: Quat, eps: f32) -> bool {
    a.abs_diff_eq(b, eps) || a.abs_diff_eq(-b, eps)
}
