//! Error Types
//!
//! This module defines the error types used when authoring animation data.
//!
//! # Overview
//!
//! Runtime evaluation (sampling, blending, palettes, IK) never fails: degenerate
//! input produces an innocuous default value instead. Only the constructors that
//! validate authored data return [`Result<T>`], which is an alias for
//! `std::result::Result<T, MarrowError>`.
//!
//! ```rust,ignore
//! use marrow_animation::{Frame, Interpolation, ScalarTrack};
//!
//! let track = ScalarTrack::from_frames(
//!     vec![Frame::new(0.0, 0.0), Frame::new(1.0, 1.0)],
//!     Interpolation::Linear,
//! )?;
//! ```

use thiserror::Error;

/// The main error type for Marrow.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarrowError {
    // ========================================================================
    // Track Errors
    // ========================================================================
    /// Frame times must be strictly increasing within a track.
    #[error("Frame {index} has time {time} which does not follow the previous frame time {previous}")]
    NonIncreasingFrameTime {
        /// Index of the offending frame
        index: usize,
        /// Time of the offending frame
        time: f32,
        /// Time of the frame before it
        previous: f32,
    },

    /// A frame holds a NaN or infinite component.
    #[error("Frame {index} contains a non-finite value")]
    NonFiniteFrame {
        /// Index of the offending frame
        index: usize,
    },

    // ========================================================================
    // Hierarchy Errors
    // ========================================================================
    /// Joint and parent arrays of a pose differ in length.
    #[error("Pose has {joints} joints but {parents} parent entries")]
    PoseSizeMismatch { joints: usize, parents: usize },

    /// A parent index points outside the pose.
    #[error("Joint {joint} has parent {parent} but the pose only has {len} joints")]
    ParentOutOfRange {
        joint: usize,
        parent: usize,
        len: usize,
    },

    /// Following parent links from a joint never reaches a root.
    #[error("Joint {joint} is part of a parent cycle")]
    HierarchyCycle { joint: usize },

    /// Rest pose, bind pose and joint name list disagree in size.
    #[error("Skeleton size mismatch: rest={rest}, bind={bind}, names={names}")]
    JointNameCountMismatch {
        rest: usize,
        bind: usize,
        names: usize,
    },

    /// A joint id does not exist in the target pose.
    #[error("Joint {joint} is out of range for a pose of {len} joints")]
    JointOutOfRange { joint: usize, len: usize },

    /// No joint carries the requested name.
    #[error("Skeleton has no joint named '{0}'")]
    UnknownJointName(String),

    // ========================================================================
    // Baking Errors
    // ========================================================================
    /// The animation texture cannot hold the requested data.
    #[error("Animation texture of size {size} needs at least {required} texels per side")]
    TextureTooSmall { size: usize, required: usize },
}

/// Alias for `Result<T, MarrowError>`.
pub type Result<T> = std::result::Result<T, MarrowError>;
