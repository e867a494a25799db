use glam::{Mat4, Vec3};
use marrow_core::{DualQuaternion, MarrowError, Result, Transform};

/// A joint hierarchy: one local transform and one optional parent per joint.
///
/// Joints without a parent are roots. Parents may appear after their children;
/// [`matrix_palette`](Self::matrix_palette) then falls back to composing each
/// remaining joint separately. Reordering with
/// [`rearrange_skeleton`](crate::rearrange_skeleton) restores the fast path.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    joints: Vec<Transform>,
    parents: Vec<Option<usize>>,
}

impl Pose {
    /// `len` identity root joints.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            joints: vec![Transform::IDENTITY; len],
            parents: vec![None; len],
        }
    }

    /// Builds a pose, checking that both arrays have the same length, every
    /// parent exists and no parent chain loops.
    pub fn from_parts(joints: Vec<Transform>, parents: Vec<Option<usize>>) -> Result<Self> {
        if joints.len() != parents.len() {
            return Err(MarrowError::PoseSizeMismatch {
                joints: joints.len(),
                parents: parents.len(),
            });
        }

        let len = parents.len();
        for (joint, parent) in parents.iter().enumerate() {
            if let Some(parent) = *parent
                && parent >= len
            {
                return Err(MarrowError::ParentOutOfRange { joint, parent, len });
            }
        }

        let pose = Self { joints, parents };
        for joint in 0..len {
            // A chain longer than the joint count must revisit a joint
            if pose.ancestors(joint).count() >= len {
                return Err(MarrowError::HierarchyCycle { joint });
            }
        }
        Ok(pose)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Grows with identity root joints or truncates.
    pub fn resize(&mut self, len: usize) {
        self.joints.resize(len, Transform::IDENTITY);
        self.parents.resize(len, None);
    }

    #[inline]
    #[must_use]
    pub fn parent(&self, joint: usize) -> Option<usize> {
        self.parents[joint]
    }

    /// Re-parents a joint without validation.
    #[inline]
    pub fn set_parent(&mut self, joint: usize, parent: Option<usize>) {
        self.parents[joint] = parent;
    }

    #[inline]
    #[must_use]
    pub fn local_transform(&self, joint: usize) -> Transform {
        self.joints[joint]
    }

    #[inline]
    pub fn set_local_transform(&mut self, joint: usize, transform: Transform) {
        self.joints[joint] = transform;
    }

    #[must_use]
    pub fn local_transforms(&self) -> &[Transform] {
        &self.joints
    }

    #[must_use]
    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    /// Parent, grandparent, ... up to the root. Bounded by the joint count so a
    /// cycle introduced through [`set_parent`](Self::set_parent) cannot hang.
    pub fn ancestors(&self, joint: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.parents[joint], |&p| self.parents[p]).take(self.len())
    }

    /// Model-space transform of a joint.
    #[must_use]
    pub fn global_transform(&self, joint: usize) -> Transform {
        self.ancestors(joint)
            .fold(self.joints[joint], |child, parent| {
                Transform::combine(&self.joints[parent], &child)
            })
    }

    #[must_use]
    pub fn global_transforms(&self) -> Vec<Transform> {
        (0..self.len()).map(|j| self.global_transform(j)).collect()
    }

    /// Writes one model-space matrix per joint into `out`.
    ///
    /// Parents that precede their children are composed in a single pass;
    /// from the first joint breaking that order onward every joint walks its
    /// own parent chain.
    pub fn matrix_palette(&self, out: &mut Vec<Mat4>) {
        let len = self.len();
        out.clear();
        out.reserve(len);

        let mut first_unordered = len;
        for joint in 0..len {
            let local = self.joints[joint].to_mat4();
            match self.parents[joint] {
                None => out.push(local),
                Some(parent) if parent < joint => {
                    let global = out[parent] * local;
                    out.push(global);
                }
                Some(_) => {
                    first_unordered = joint;
                    break;
                }
            }
        }

        for joint in first_unordered..len {
            out.push(self.global_transform(joint).to_mat4());
        }
    }

    /// Model-space dual quaternion of a joint. The joint's own transform is
    /// applied first, then each ancestor's.
    #[must_use]
    pub fn global_dual_quaternion(&self, joint: usize) -> DualQuaternion {
        self.ancestors(joint).fold(
            DualQuaternion::from_transform(&self.joints[joint]),
            |result, parent| result * DualQuaternion::from_transform(&self.joints[parent]),
        )
    }

    /// Writes one model-space dual quaternion per joint into `out`.
    pub fn dual_quaternion_palette(&self, out: &mut Vec<DualQuaternion>) {
        out.clear();
        out.extend((0..self.len()).map(|j| self.global_dual_quaternion(j)));
    }

    /// Whether `search` is `root` or one of its descendants.
    #[must_use]
    pub fn is_in_hierarchy(&self, root: usize, search: usize) -> bool {
        search == root || self.ancestors(search).any(|p| p == root)
    }

    /// Model-space positions of every joint.
    #[must_use]
    pub fn joint_positions(&self) -> Vec<Vec3> {
        (0..self.len())
            .map(|j| self.global_transform(j).position)
            .collect()
    }

    /// `(joint, parent)` model-space position pairs for every non-root joint,
    /// ready for debug line drawing.
    #[must_use]
    pub fn joint_segments(&self) -> Vec<(Vec3, Vec3)> {
        let positions = self.joint_positions();
        self.parents
            .iter()
            .enumerate()
            .filter_map(|(joint, parent)| parent.map(|p| (positions[joint], positions[p])))
            .collect()
    }
}

/// Same size, same parents, local transforms equal within
/// [`EPSILON`](marrow_core::math::EPSILON).
impl PartialEq for Pose {
    fn eq(&self, other: &Self) -> bool {
        self.parents == other.parents
            && self
                .joints
                .iter()
                .zip(&other.joints)
                .all(|(a, b)| a.approx_eq(b))
    }
}
