//! Skeleton re-ordering.
//!
//! [`Pose::matrix_palette`](crate::Pose::matrix_palette) composes the whole
//! hierarchy in one pass only when every parent is stored before its children.
//! Imported rigs do not always satisfy that; [`rearrange_skeleton`] reorders
//! joints breadth-first from the roots and returns the mapping needed to fix
//! up clips and skinned meshes that refer to the old indices.

use std::collections::VecDeque;

use glam::{Quat, UVec4, Vec3};
use marrow_core::Result;

use crate::clip::Clip;
use crate::pose::Pose;
use crate::skeleton::Skeleton;
use crate::tracks::KeyframeSampler;

/// Old joint index -> new joint index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoneMap {
    old_to_new: Vec<usize>,
}

impl BoneMap {
    /// New index of `old`, `None` when `old` is out of range.
    #[must_use]
    pub fn get(&self, old: usize) -> Option<usize> {
        self.old_to_new.get(old).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.old_to_new.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.old_to_new.is_empty()
    }

    /// Whether the map changes nothing.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.old_to_new.iter().enumerate().all(|(i, &j)| i == j)
    }

    fn remap(&self, old: usize) -> usize {
        self.get(old).unwrap_or(old)
    }
}

/// Reorders the skeleton so parents precede children. Roots keep their
/// relative order, then come their children level by level.
pub fn rearrange_skeleton(skeleton: &mut Skeleton) -> Result<BoneMap> {
    let rest = skeleton.rest_pose();
    let bind = skeleton.bind_pose();
    let len = rest.len();
    if len == 0 {
        return Ok(BoneMap::default());
    }

    let mut children = vec![Vec::new(); len];
    let mut queue = VecDeque::with_capacity(len);
    for joint in 0..len {
        match rest.parent(joint) {
            Some(parent) => children[parent].push(joint),
            None => queue.push_back(joint),
        }
    }

    // new -> old
    let mut order = Vec::with_capacity(len);
    while let Some(current) = queue.pop_front() {
        queue.extend(children[current].iter().copied());
        order.push(current);
    }

    let mut old_to_new = vec![0; len];
    for (new, &old) in order.iter().enumerate() {
        old_to_new[old] = new;
    }
    let map = BoneMap { old_to_new };

    let mut new_rest = Pose::new(len);
    let mut new_bind = Pose::new(len);
    let mut new_names = Vec::with_capacity(len);
    for (new, &old) in order.iter().enumerate() {
        new_rest.set_local_transform(new, rest.local_transform(old));
        new_bind.set_local_transform(new, bind.local_transform(old));
        new_names.push(skeleton.joint_name(old).unwrap_or_default().to_owned());

        let parent = bind.parent(old).map(|p| map.remap(p));
        new_rest.set_parent(new, parent);
        new_bind.set_parent(new, parent);
    }

    skeleton.set(new_rest, new_bind, new_names)?;
    log::debug!("Rearranged skeleton of {len} joints");
    Ok(map)
}

/// Points every track of `clip` at the joint's new index.
pub fn rearrange_clip<V, Q>(clip: &mut Clip<V, Q>, map: &BoneMap)
where
    V: KeyframeSampler<Vec3>,
    Q: KeyframeSampler<Quat>,
{
    for index in 0..clip.len() {
        let joint = map.remap(clip.joint_at(index));
        clip.set_joint_at(index, joint);
    }
}

/// Rewrites per-vertex joint indices of a skinned mesh.
pub fn remap_influences(influences: &mut [UVec4], map: &BoneMap) {
    let remap = |joint: u32| map.remap(joint as usize) as u32;
    for influence in influences {
        *influence = UVec4::new(
            remap(influence.x),
            remap(influence.y),
            remap(influence.z),
            remap(influence.w),
        );
    }
}
