//! Skeletal animation for Marrow.
//!
//! - [`Track`] / [`FastTrack`]: keyframed curves behind [`KeyframeSampler`]
//! - [`TransformTrack`] / [`Clip`]: per-joint animation bundled into clips
//! - [`Pose`] / [`Skeleton`]: joint hierarchies, palettes, inverse bind data
//! - [`blending`]: linear and additive pose blending
//! - [`CrossFadeController`]: clip playback with queued fades
//! - [`ik`]: CCD and FABRIK chain solvers and a leg helper
//! - [`rearrange_skeleton`], [`bake_animation`], [`Crowd`]: crowd rendering support

pub mod baker;
pub mod blending;
pub mod clip;
pub mod cross_fade;
pub mod crowd;
pub mod fast_track;
pub mod ik;
pub mod pose;
pub mod rearrange;
pub mod skeleton;
pub mod tracks;
pub mod transform_track;
pub mod values;

pub use baker::{AnimTexture, bake_animation};
pub use blending::{add, add_in_place, blend, blend_in_place, make_additive_pose};
pub use clip::{Clip, FastClip, optimize_clip};
pub use cross_fade::{CrossFadeController, CrossFadeTarget};
pub use crowd::{Crowd, CrowdSettings};
pub use fast_track::{
    FastQuaternionTrack, FastScalarTrack, FastTrack, FastVectorTrack, FramesMut, SAMPLES_PER_SECOND,
    optimize_track,
};
pub use ik::{CcdSolver, FabrikSolver, IkLeg, IkSettings, IkSolver};
pub use pose::Pose;
pub use rearrange::{BoneMap, rearrange_clip, rearrange_skeleton, remap_influences};
pub use skeleton::Skeleton;
pub use tracks::{
    Frame, Interpolation, KeyframeSampler, QuaternionTrack, ScalarTrack, Track, VectorTrack,
    adjust_time,
};
pub use transform_track::{FastTransformTrack, TransformTrack, optimize_transform_track};
pub use values::Interpolatable;
