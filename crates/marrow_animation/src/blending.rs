//! Pose blending.
//!
//! Every function optionally restricts itself to a sub-hierarchy: with
//! `root = Some(j)` only `j` and its descendants (according to the output
//! pose's parents) are written, everything else is left untouched.

use glam::{Quat, Vec3};
use marrow_core::{Transform, math};

use crate::clip::Clip;
use crate::pose::Pose;
use crate::skeleton::Skeleton;
use crate::tracks::KeyframeSampler;

#[inline]
fn in_scope(pose: &Pose, root: Option<usize>, joint: usize) -> bool {
    root.is_none_or(|root| pose.is_in_hierarchy(root, joint))
}

/// `output = mix(a, b, t)` per joint in scope. All poses share one size.
pub fn blend(output: &mut Pose, a: &Pose, b: &Pose, t: f32, root: Option<usize>) {
    for joint in 0..output.len() {
        if !in_scope(output, root, joint) {
            continue;
        }
        let mixed = Transform::mix(&a.local_transform(joint), &b.local_transform(joint), t);
        output.set_local_transform(joint, mixed);
    }
}

/// `pose = mix(pose, other, t)` per joint in scope.
pub fn blend_in_place(pose: &mut Pose, other: &Pose, t: f32, root: Option<usize>) {
    for joint in 0..pose.len() {
        if !in_scope(pose, root, joint) {
            continue;
        }
        let mixed = Transform::mix(&pose.local_transform(joint), &other.local_transform(joint), t);
        pose.set_local_transform(joint, mixed);
    }
}

/// Applies the difference between `additive` and `additive_base` on top of
/// `input`, writing into `output`.
pub fn add(
    output: &mut Pose,
    input: &Pose,
    additive: &Pose,
    additive_base: &Pose,
    root: Option<usize>,
) {
    for joint in 0..output.len() {
        if !in_scope(output, root, joint) {
            continue;
        }
        let combined = add_transform(
            &input.local_transform(joint),
            &additive.local_transform(joint),
            &additive_base.local_transform(joint),
        );
        output.set_local_transform(joint, combined);
    }
}

/// [`add`] with `input` and `output` being the same pose.
pub fn add_in_place(pose: &mut Pose, additive: &Pose, additive_base: &Pose, root: Option<usize>) {
    for joint in 0..pose.len() {
        if !in_scope(pose, root, joint) {
            continue;
        }
        let combined = add_transform(
            &pose.local_transform(joint),
            &additive.local_transform(joint),
            &additive_base.local_transform(joint),
        );
        pose.set_local_transform(joint, combined);
    }
}

fn add_transform(input: &Transform, additive: &Transform, base: &Transform) -> Transform {
    let position = input.position + (additive.position - base.position);
    let scale = input.scale + (additive.scale - base.scale);
    // Delta applied on the parent side of the joint rotation
    let rotation = additive.rotation * base.rotation.inverse() * input.rotation;
    Transform::new(position, math::normalize_quat(rotation), scale)
}

/// Reference pose for additive blending: the rest pose sampled at the start
/// of `clip`.
#[must_use]
pub fn make_additive_pose<V, Q>(skeleton: &Skeleton, clip: &Clip<V, Q>) -> Pose
where
    V: KeyframeSampler<Vec3>,
    Q: KeyframeSampler<Quat>,
{
    let mut pose = skeleton.rest_pose().clone();
    clip.sample(&mut pose, clip.start_time());
    pose
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm(angle: f32) -> Pose {
        let mut pose = Pose::new(3);
        pose.set_parent(1, Some(0));
        pose.set_parent(2, Some(1));
        for joint in 0..3 {
            pose.set_local_transform(
                joint,
                Transform::from_position_rotation(Vec3::X, Quat::from_rotation_z(angle)),
            );
        }
        pose
    }

    #[test]
    fn test_blend_respects_root() {
        let a = arm(0.0);
        let b = arm(1.0);
        let mut out = a.clone();
        blend(&mut out, &a, &b, 1.0, Some(1));

        assert_eq!(out.local_transform(0), a.local_transform(0));
        assert!(out.local_transform(2).approx_eq(&b.local_transform(2)));
    }

    #[test]
    fn test_add_zero_delta_is_identity() {
        let input = arm(0.3);
        let base = arm(0.8);
        let mut out = Pose::new(3);
        out.set_parent(1, Some(0));
        out.set_parent(2, Some(1));

        add(&mut out, &input, &base, &base, None);
        assert_eq!(out, input);
    }

    #[test]
    fn test_add_applies_rotation_delta() {
        let input = arm(0.0);
        let base = arm(0.0);
        let additive = arm(0.5);

        let mut pose = input.clone();
        add_in_place(&mut pose, &additive, &base, None);
        assert!(math::quat_same_rotation(
            pose.local_transform(0).rotation,
            Quat::from_rotation_z(0.5),
            1e-5
        ));
    }

    #[test]
    fn test_add_applies_delta_in_parent_frame() {
        let mut input = Pose::new(1);
        input.set_local_transform(0, Transform::from_rotation(Quat::from_rotation_x(1.0)));
        let base = Pose::new(1);
        let mut additive = Pose::new(1);
        additive.set_local_transform(0, Transform::from_rotation(Quat::from_rotation_z(1.0)));

        let mut out = input.clone();
        add(&mut out, &input, &additive, &base, None);

        let expected = Quat::from_rotation_z(1.0) * Quat::from_rotation_x(1.0);
        let rotated = out.local_transform(0).rotation * Vec3::Y;
        assert!(rotated.abs_diff_eq(expected * Vec3::Y, 1e-5), "{rotated}");
        assert!(rotated.abs_diff_eq(Vec3::new(-0.455, 0.292, 0.841), 1e-3), "{rotated}");
    }
}
