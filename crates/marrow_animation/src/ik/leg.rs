use glam::Vec3;
use marrow_core::{MarrowError, Result, Transform};

use super::{FabrikSolver, IkSolver};
use crate::pose::Pose;
use crate::skeleton::Skeleton;
use crate::tracks::ScalarTrack;

/// Hip, knee and ankle of one leg solved with FABRIK in model space.
///
/// The pin track is authored alongside a walk cycle and tells the caller how
/// strongly the foot should stick to the ground at a given playback time.
#[derive(Debug, Clone)]
pub struct IkLeg {
    solver: FabrikSolver,
    adjusted_pose: Pose,
    pin_track: ScalarTrack,
    ankle_to_ground_offset: f32,
    hip: usize,
    knee: usize,
    ankle: usize,
    toe: usize,
}

impl IkLeg {
    /// Resolves the four joints by name.
    pub fn new(skeleton: &Skeleton, hip: &str, knee: &str, ankle: &str, toe: &str) -> Result<Self> {
        let find = |name: &str| {
            skeleton
                .joint_index(name)
                .ok_or_else(|| MarrowError::UnknownJointName(name.to_owned()))
        };

        let mut solver = FabrikSolver::new();
        solver.resize(3);
        Ok(Self {
            solver,
            adjusted_pose: skeleton.rest_pose().clone(),
            pin_track: ScalarTrack::default(),
            ankle_to_ground_offset: 0.0,
            hip: find(hip)?,
            knee: find(knee)?,
            ankle: find(ankle)?,
            toe: find(toe)?,
        })
    }

    /// Solves the leg so the ankle sits `ankle_to_ground_offset` above
    /// `ankle_target`, and stores a copy of `pose` with the three joints
    /// replaced in [`adjusted_pose`](Self::adjusted_pose).
    ///
    /// `model` places the character in the world; `ankle_target` is given in
    /// world space.
    pub fn solve_for_leg(&mut self, model: &Transform, pose: &Pose, ankle_target: Vec3) -> bool {
        self.solver.set_local_transform(
            0,
            Transform::combine(model, &pose.global_transform(self.hip)),
        );
        self.solver
            .set_local_transform(1, pose.local_transform(self.knee));
        self.solver
            .set_local_transform(2, pose.local_transform(self.ankle));
        self.adjusted_pose.clone_from(pose);

        let target = Transform::from_position(ankle_target + Vec3::Y * self.ankle_to_ground_offset);
        let reached = self.solver.solve(&target);

        let root_world = match pose.parent(self.hip) {
            Some(parent) => Transform::combine(model, &pose.global_transform(parent)),
            None => *model,
        };
        self.adjusted_pose.set_local_transform(
            self.hip,
            Transform::combine(&root_world.inverse(), &self.solver.local_transform(0)),
        );
        self.adjusted_pose
            .set_local_transform(self.knee, self.solver.local_transform(1));
        self.adjusted_pose
            .set_local_transform(self.ankle, self.solver.local_transform(2));
        reached
    }

    /// Pose from the last [`solve_for_leg`](Self::solve_for_leg).
    #[must_use]
    pub fn adjusted_pose(&self) -> &Pose {
        &self.adjusted_pose
    }

    #[must_use]
    pub fn pin_track(&self) -> &ScalarTrack {
        &self.pin_track
    }

    pub fn pin_track_mut(&mut self) -> &mut ScalarTrack {
        &mut self.pin_track
    }

    #[must_use]
    pub fn ankle_to_ground_offset(&self) -> f32 {
        self.ankle_to_ground_offset
    }

    pub fn set_ankle_to_ground_offset(&mut self, offset: f32) {
        self.ankle_to_ground_offset = offset;
    }

    #[must_use]
    pub fn solver(&self) -> &FabrikSolver {
        &self.solver
    }

    /// For tuning [`IkSettings`](super::IkSettings). The chain itself is
    /// overwritten by every solve.
    pub fn solver_mut(&mut self) -> &mut FabrikSolver {
        &mut self.solver
    }

    #[must_use]
    pub fn hip(&self) -> usize {
        self.hip
    }

    #[must_use]
    pub fn knee(&self) -> usize {
        self.knee
    }

    #[must_use]
    pub fn ankle(&self) -> usize {
        self.ankle
    }

    #[must_use]
    pub fn toe(&self) -> usize {
        self.toe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ik::IkSettings;

    fn leg_skeleton() -> Skeleton {
        let down = Transform::from_position(Vec3::new(0.0, -1.0, 0.0));
        let rest = Pose::from_parts(
            vec![
                Transform::from_position(Vec3::new(0.0, 3.0, 0.0)),
                Transform::from_position(Vec3::new(0.5, 0.0, 0.0)),
                down,
                down,
                Transform::from_position(Vec3::new(0.0, 0.0, 0.3)),
            ],
            vec![None, Some(0), Some(1), Some(2), Some(3)],
        )
        .unwrap();
        let names = ["pelvis", "hip", "knee", "ankle", "toe"].map(String::from).to_vec();
        Skeleton::new(rest.clone(), rest, names).unwrap()
    }

    #[test]
    fn test_unknown_joint_name() {
        let err = IkLeg::new(&leg_skeleton(), "hip", "knee", "heel", "toe").unwrap_err();
        assert_eq!(err, MarrowError::UnknownJointName("heel".into()));
    }

    #[test]
    fn test_solve_moves_ankle_to_target() {
        let skeleton = leg_skeleton();
        let mut leg = IkLeg::new(&skeleton, "hip", "knee", "ankle", "toe").unwrap();
        leg.solver.set_settings(IkSettings {
            max_steps: 50,
            threshold: 1e-3,
        });
        leg.set_ankle_to_ground_offset(0.2);

        // Hip sits at (0.5, 3, 0) with two unit segments below it
        let target = Vec3::new(0.8, 1.3, 0.0);
        assert!(leg.solve_for_leg(&Transform::IDENTITY, skeleton.rest_pose(), target));

        let ankle = leg.adjusted_pose().global_transform(leg.ankle()).position;
        assert!(ankle.distance(target + Vec3::Y * 0.2) < 1e-2);
        assert_eq!(
            leg.adjusted_pose().local_transform(0),
            skeleton.rest_pose().local_transform(0)
        );
    }
}
