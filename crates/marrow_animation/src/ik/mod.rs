//! Inverse Kinematics
//!
//! Solvers operate on an explicit chain of local transforms ordered from the
//! root to the end effector. The chain is independent of any [`Pose`]: callers
//! copy joints in, solve, and copy the result back (see [`IkLeg`]).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use marrow_animation::{CcdSolver, IkSettings, IkSolver};
//!
//! let mut solver = CcdSolver::with_settings(IkSettings {
//!     max_steps: 30,
//!     ..Default::default()
//! });
//! solver.resize(3);
//! // ...fill the chain...
//! let reached = solver.solve(&Transform::from_position(goal));
//! ```
//!
//! A solve that runs out of steps returns `false` but leaves the chain in its
//! latest state, which is usually a good partial approach.
//!
//! [`Pose`]: crate::Pose

mod ccd;
mod fabrik;
mod leg;

pub use ccd::CcdSolver;
pub use fabrik::FabrikSolver;
pub use leg::IkLeg;

use marrow_core::Transform;

// ---------------------------------------------------------------------------
// IkSettings
// ---------------------------------------------------------------------------

/// Iteration budget and convergence tolerance of a solver.
///
/// | Field       | Description                                   | Default   |
/// |-------------|-----------------------------------------------|-----------|
/// | `max_steps` | Iterations before giving up                   | `15`      |
/// | `threshold` | Effector-to-goal distance counted as reached  | `0.00001` |
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IkSettings {
    pub max_steps: usize,
    pub threshold: f32,
}

impl Default for IkSettings {
    fn default() -> Self {
        Self {
            max_steps: 15,
            threshold: 0.00001,
        }
    }
}

impl IkSettings {
    #[inline]
    #[must_use]
    pub fn threshold_squared(&self) -> f32 {
        self.threshold * self.threshold
    }
}

// ---------------------------------------------------------------------------
// IkSolver
// ---------------------------------------------------------------------------

/// Common interface of the chain solvers.
pub trait IkSolver {
    fn chain(&self) -> &[Transform];

    fn chain_mut(&mut self) -> &mut Vec<Transform>;

    fn settings(&self) -> &IkSettings;

    fn set_settings(&mut self, settings: IkSettings);

    /// Moves the end effector towards `target.position`. Returns whether it
    /// got within the threshold.
    fn solve(&mut self, target: &Transform) -> bool;

    #[inline]
    fn len(&self) -> usize {
        self.chain().len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.chain().is_empty()
    }

    /// Grows with identity joints or truncates.
    fn resize(&mut self, len: usize) {
        self.chain_mut().resize(len, Transform::IDENTITY);
    }

    fn local_transform(&self, index: usize) -> Transform {
        self.chain()[index]
    }

    fn set_local_transform(&mut self, index: usize, transform: Transform) {
        self.chain_mut()[index] = transform;
    }

    /// Joint `index` combined with every joint before it.
    fn global_transform(&self, index: usize) -> Transform {
        chain_global_transform(self.chain(), index)
    }
}

pub(crate) fn chain_global_transform(chain: &[Transform], index: usize) -> Transform {
    chain[..index]
        .iter()
        .rev()
        .fold(chain[index], |child, parent| Transform::combine(parent, &child))
}
