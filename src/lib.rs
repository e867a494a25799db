//! # Marrow
//!
//! Skeletal animation core: keyframe sampling, joint hierarchies, pose
//! blending and cross-fading, inverse kinematics and dual-quaternion skinning
//! data.
//!
//! This crate re-exports the workspace members:
//!
//! - [`marrow_core`]: `Transform`, `DualQuaternion`, quaternion helpers, errors
//! - [`marrow_animation`]: tracks, clips, poses, skeletons, blending, IK, crowds
//!
//! GPU resources, windowing and asset import are left to the caller; Marrow
//! only produces plain buffers (local poses, matrix palettes, dual quaternions,
//! baked animation textures).
//!
//! ```rust,ignore
//! use marrow::prelude::*;
//!
//! let mut pose = skeleton.rest_pose().clone();
//! let time = clip.sample(&mut pose, time + dt);
//! pose.matrix_palette(&mut palette);
//! ```

pub use marrow_animation;
pub use marrow_core;

pub use marrow_animation::*;
pub use marrow_core::{DualQuaternion, MarrowError, Result, Transform, math};

pub use glam::{Mat4, Quat, UVec2, UVec4, Vec3, Vec4};

pub mod prelude {
    pub use marrow_animation::{
        Clip, CrossFadeController, FastClip, Frame, IkSettings, IkSolver, Interpolation,
        KeyframeSampler, Pose, Skeleton, Track, TransformTrack,
    };
    pub use marrow_core::{DualQuaternion, MarrowError, Transform};

    pub use glam::{Mat4, Quat, Vec3};
}
