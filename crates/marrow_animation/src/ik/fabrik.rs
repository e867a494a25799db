use glam::Vec3;
use marrow_core::{Transform, math};

use super::{IkSettings, IkSolver, chain_global_transform};

/// Forward and backward reaching inverse kinematics.
///
/// Works on model-space joint positions with fixed segment lengths, then
/// turns the moved positions back into local rotations. Joint positions and
/// lengths are captured from the chain at the start of every solve.
#[derive(Debug, Clone, Default)]
pub struct FabrikSolver {
    chain: Vec<Transform>,
    settings: IkSettings,
    world_chain: Vec<Vec3>,
    /// `lengths[i]` is the distance from joint `i - 1` to joint `i`
    lengths: Vec<f32>,
}

impl FabrikSolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: IkSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    fn chain_to_world(&mut self) {
        self.world_chain.clear();
        self.world_chain
            .extend((0..self.chain.len()).map(|i| chain_global_transform(&self.chain, i).position));

        self.lengths.clear();
        self.lengths.push(0.0);
        self.lengths.extend(
            self.world_chain
                .windows(2)
                .map(|pair| pair[1].distance(pair[0])),
        );
    }

    fn iterate_backward(&mut self, goal: Vec3) {
        let last = self.world_chain.len() - 1;
        self.world_chain[last] = goal;
        for i in (0..last).rev() {
            let direction = (self.world_chain[i] - self.world_chain[i + 1]).normalize_or_zero();
            self.world_chain[i] = self.world_chain[i + 1] + direction * self.lengths[i + 1];
        }
    }

    fn iterate_forward(&mut self, base: Vec3) {
        self.world_chain[0] = base;
        for i in 1..self.world_chain.len() {
            let direction = (self.world_chain[i] - self.world_chain[i - 1]).normalize_or_zero();
            self.world_chain[i] = self.world_chain[i - 1] + direction * self.lengths[i];
        }
    }

    /// Rotates each joint so the next joint lands on its solved position.
    fn world_to_chain(&mut self) {
        for i in 0..self.chain.len().saturating_sub(1) {
            let world = chain_global_transform(&self.chain, i);
            let next = chain_global_transform(&self.chain, i + 1);
            let inv_rotation = world.rotation.inverse();

            let to_next = inv_rotation * (next.position - world.position);
            let to_desired = inv_rotation * (self.world_chain[i + 1] - world.position);

            let delta = math::from_to(to_next, to_desired);
            let local = &mut self.chain[i];
            local.rotation = math::normalize_quat(local.rotation * delta);
        }
    }
}

impl IkSolver for FabrikSolver {
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

        let last = self.chain.len() - 1;
        let threshold_sq = self.settings.threshold_squared();
        let goal = target.position;

        self.chain_to_world();
        let base = self.world_chain[0];

        for _ in 0..self.settings.max_steps {
            if (self.world_chain[last] - goal).length_squared() < threshold_sq {
                self.world_to_chain();
                return true;
            }
            self.iterate_backward(goal);
            self.iterate_forward(base);
        }

        self.world_to_chain();
        let effector = self.global_transform(last).position;
        let reached = (effector - goal).length_squared() < threshold_sq;
        if !reached {
            log::debug!(
                "FABRIK did not converge within {} steps",
                self.settings.max_steps
            );
        }
        reached
    }
}
