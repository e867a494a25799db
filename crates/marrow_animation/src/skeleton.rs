use glam::Mat4;
use marrow_core::{DualQuaternion, MarrowError, Result};
use rustc_hash::FxHashMap;

use crate::pose::Pose;

/// Rest pose, bind pose and joint names of a rig.
///
/// The inverse bind matrices and dual quaternions are derived from the bind
/// pose and rebuilt whenever it is assigned.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    rest_pose: Pose,
    bind_pose: Pose,
    joint_names: Vec<String>,
    name_to_index: FxHashMap<String, usize>,
    inverse_bind_pose: Vec<Mat4>,
    inverse_bind_dual_quaternions: Vec<DualQuaternion>,
}

impl Skeleton {
    pub fn new(rest: Pose, bind: Pose, names: Vec<String>) -> Result<Self> {
        let mut skeleton = Self::default();
        skeleton.set(rest, bind, names)?;
        Ok(skeleton)
    }

    /// Replaces all three parts. The skeleton is unchanged on error.
    pub fn set(&mut self, rest: Pose, bind: Pose, names: Vec<String>) -> Result<()> {
        if rest.len() != bind.len() || rest.len() != names.len() {
            return Err(MarrowError::JointNameCountMismatch {
                rest: rest.len(),
                bind: bind.len(),
                names: names.len(),
            });
        }

        self.rest_pose = rest;
        self.joint_names = names;
        self.name_to_index = self
            .joint_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        self.assign_bind_pose(bind);
        Ok(())
    }

    /// Replaces the bind pose and rebuilds the inverse bind data.
    pub fn set_bind_pose(&mut self, bind: Pose) -> Result<()> {
        if bind.len() != self.rest_pose.len() {
            return Err(MarrowError::JointNameCountMismatch {
                rest: self.rest_pose.len(),
                bind: bind.len(),
                names: self.joint_names.len(),
            });
        }
        self.assign_bind_pose(bind);
        Ok(())
    }

    fn assign_bind_pose(&mut self, bind: Pose) {
        self.bind_pose = bind;
        self.inverse_bind_pose = (0..self.bind_pose.len())
            .map(|j| self.bind_pose.global_transform(j).to_mat4().inverse())
            .collect();
        self.inverse_bind_dual_quaternions = (0..self.bind_pose.len())
            .map(|j| self.bind_pose.global_dual_quaternion(j).conjugate())
            .collect();
        log::debug!(
            "Rebuilt inverse bind pose for {} joints",
            self.inverse_bind_pose.len()
        );
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rest_pose.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rest_pose.is_empty()
    }

    #[must_use]
    pub fn rest_pose(&self) -> &Pose {
        &self.rest_pose
    }

    #[must_use]
    pub fn bind_pose(&self) -> &Pose {
        &self.bind_pose
    }

    /// Inverse of each joint's model-space bind matrix.
    #[must_use]
    pub fn inverse_bind_pose(&self) -> &[Mat4] {
        &self.inverse_bind_pose
    }

    /// Conjugate of each joint's model-space bind dual quaternion.
    #[must_use]
    pub fn inverse_bind_dual_quaternions(&self) -> &[DualQuaternion] {
        &self.inverse_bind_dual_quaternions
    }

    #[must_use]
    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    #[must_use]
    pub fn joint_name(&self, joint: usize) -> Option<&str> {
        self.joint_names.get(joint).map(String::as_str)
    }

    #[must_use]
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }
}
