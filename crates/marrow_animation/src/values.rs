use glam::{Quat, Vec3};
use marrow_core::math;

/// Values a keyframe track can carry: `f32`, `Vec3` and `Quat`.
///
/// `Default` is the value returned when a track cannot be sampled (zero,
/// zero vector, identity rotation).
pub trait Interpolatable: Copy + Default + PartialEq + std::fmt::Debug + Send + Sync + 'static {
    /// Zero element, used for unset tangents.
    const ZERO: Self;

    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;

    /// Hermite spline between `v0` and `v1`. Tangents are scaled by the frame
    /// delta `dt` before use.
    fn interpolate_cubic(
        v0: Self,
        out_tangent0: Self,
        in_tangent1: Self,
        v1: Self,
        t: f32,
        dt: f32,
    ) -> Self;

    /// Adjusts a stored keyframe value before it is used. Quaternions are
    /// renormalized; other types pass through.
    #[inline]
    fn from_keyframe(value: Self) -> Self {
        value
    }

    fn is_finite(&self) -> bool;
}

/// Hermite basis functions `(h1, h2, h3, h4)` for points `p1`, `p2` and
/// slopes `s1`, `s2`.
#[inline]
fn hermite_basis(t: f32) -> (f32, f32, f32, f32) {
    let t2 = t * t;
    let t3 = t2 * t;

    let h2 = -2.0 * t3 + 3.0 * t2;
    let h1 = 1.0 - h2;
    let h4 = t3 - t2;
    let h3 = h4 - t2 + t;

    (h1, h2, h3, h4)
}

impl Interpolatable for f32 {
    const ZERO: Self = 0.0;

    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let (h1, h2, h3, h4) = hermite_basis(t);
        let m0 = out_tangent0 * dt;
        let m1 = in_tangent1 * dt;

        h1 * v0 + h2 * v1 + h3 * m0 + h4 * m1
    }

    fn is_finite(&self) -> bool {
        f32::is_finite(*self)
    }
}

impl Interpolatable for Vec3 {
    const ZERO: Self = Vec3::ZERO;

    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let (h1, h2, h3, h4) = hermite_basis(t);
        let m0 = out_tangent0 * dt;
        let m1 = in_tangent1 * dt;

        v0 * h1 + v1 * h2 + m0 * h3 + m1 * h4
    }

    fn is_finite(&self) -> bool {
        Vec3::is_finite(*self)
    }
}

impl Interpolatable for Quat {
    const ZERO: Self = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);

    /// nlerp along the short arc.
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        math::nlerp(start, end, t)
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f32, dt: f32) -> Self {
        let (h1, h2, h3, h4) = hermite_basis(t);
        let v1 = math::neighborhood(v0, v1);
        let m0 = out_tangent0 * dt;
        let m1 = in_tangent1 * dt;

        math::normalize_quat(v0 * h1 + v1 * h2 + m0 * h3 + m1 * h4)
    }

    #[inline]
    fn from_keyframe(value: Self) -> Self {
        math::normalize_quat(value)
    }

    fn is_finite(&self) -> bool {
        Quat::is_finite(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hermite_basis_endpoints() {
        assert_eq!(hermite_basis(0.0), (1.0, 0.0, 0.0, 0.0));
        assert_eq!(hermite_basis(1.0), (0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn test_cubic_quat_is_unit() {
        let a = Quat::from_rotation_x(0.2);
        let b = -Quat::from_rotation_x(1.4);
        for i in 0..=10 {
            let q = Quat::interpolate_cubic(a, Quat::ZERO, Quat::ZERO, b, i as f32 / 10.0, 1.0);
            assert!((q.length() - 1.0).abs() < 1e-5);
        }
    }
}
