use marrow_core::{Transform, math};

use super::{IkSettings, IkSolver, chain_global_transform};

/// Cyclic coordinate descent.
///
/// Each step walks from the joint before the effector back to the root and
/// rotates every joint so that the effector points at the goal.
#[derive(Debug, Clone, Default)]
pub struct CcdSolver {
    chain: Vec<Transform>,
    settings: IkSettings,
}

impl CcdSolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: IkSettings) -> Self {
        Self {
            chain: Vec::new(),
            settings,
        }
    }

    fn effector_position(&self) -> glam::Vec3 {
        chain_global_transform(&self.chain, self.chain.len() - 1).position
    }
}

impl IkSolver for CcdSolver {
    fn chain(&self) -> &[Transform] {
        &self.chain
    }

    fn chain_mut(&mut self) -> &mut Vec<Transform> {
        &mut self.chain
    }

    fn settings(&self) -> &IkSettings {
        &self.settings
    }

    fn set_settings(&mut self, settings: IkSettings) {
        self.settings = settings;
    }

    fn solve(&mut self, target: &Transform) -> bool {
        if self.chain.is_empty() {
            return false;
        }

        let goal = target.position;
        let threshold_sq = self.settings.threshold_squared();
        let reached = |solver: &Self| (goal - solver.effector_position()).length_squared() < threshold_sq;

        for _ in 0..self.settings.max_steps {
            if reached(self) {
                return true;
            }

            for joint in (0..self.chain.len().saturating_sub(1)).rev() {
                let effector = self.effector_position();
                let world = chain_global_transform(&self.chain, joint);

                let to_effector = effector - world.position;
                let to_goal = goal - world.position;
                if to_goal.length_squared() > math::EPSILON {
                    // Rotating the joint's world frame by `effector_to_goal`
                    // equals this local rotation applied on the right
                    let effector_to_goal = math::from_to(to_effector, to_goal);
                    let local_delta = world.rotation.inverse() * effector_to_goal * world.rotation;
                    let local = &mut self.chain[joint];
                    local.rotation = math::normalize_quat(local.rotation * local_delta);
                }

                if reached(self) {
                    return true;
                }
            }
        }

        log::debug!(
            "CCD did not converge within {} steps",
            self.settings.max_steps
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn arm() -> CcdSolver {
        let mut solver = CcdSolver::new();
        solver.resize(3);
        solver.set_local_transform(1, Transform::from_position(Vec3::X));
        solver.set_local_transform(2, Transform::from_position(Vec3::X));
        solver
    }

    #[test]
    fn test_empty_chain_fails() {
        assert!(!CcdSolver::new().solve(&Transform::IDENTITY));
    }

    #[test]
    fn test_reaches_point_inside_range() {
        let mut solver = arm();
        solver.set_settings(IkSettings {
            max_steps: 100,
            threshold: 1e-3,
        });
        let goal = Vec3::new(1.0, 1.0, 0.0);
        assert!(solver.solve(&Transform::from_position(goal)));
        assert!(solver.global_transform(2).position.distance(goal) < 1e-3);
    }
}
