//! Foundational math for the Marrow animation core.
//!
//! - [`Transform`]: position / rotation / scale with hierarchical composition
//! - [`DualQuaternion`]: rigid transform encoding used for dual-quaternion skinning
//! - [`math`]: quaternion helpers (neighborhooding, nlerp, from-to rotation)
//! - [`errors`]: the [`MarrowError`] type returned by authoring constructors

pub mod dual_quat;
pub mod errors;
pub mod math;
pub mod transform;

pub use dual_quat::DualQuaternion;
pub use errors::{MarrowError, Result};
pub use transform::Transform;

pub use glam::{Mat4, Quat, Vec3, Vec4};
