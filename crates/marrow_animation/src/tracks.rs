use glam::{Quat, Vec3};
use marrow_core::{MarrowError, Result};

use crate::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolation {
    /// Holds the value of the current frame until the next one.
    Constant,
    #[default]
    Linear,
    /// Hermite spline using the frames' in/out tangents.
    Cubic,
}

/// A single keyframe. Tangents only matter for [`Interpolation::Cubic`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame<T: Interpolatable> {
    pub time: f32,
    pub value: T,
    pub in_tangent: T,
    pub out_tangent: T,
}

impl<T: Interpolatable> Frame<T> {
    #[must_use]
    pub fn new(time: f32, value: T) -> Self {
        Self {
            time,
            value,
            in_tangent: T::ZERO,
            out_tangent: T::ZERO,
        }
    }

    #[must_use]
    pub fn with_tangents(time: f32, value: T, in_tangent: T, out_tangent: T) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

/// Maps `time` into `[start, end]`.
///
/// Looping wraps into `[start, end)` with a modulo (negative results re-add the
/// duration); otherwise the time is clamped. A non-positive duration maps
/// everything to `start`.
#[must_use]
pub fn adjust_time(time: f32, start: f32, end: f32, looping: bool) -> f32 {
    let duration = end - start;
    if duration <= 0.0 {
        return start;
    }

    if looping {
        let mut t = (time - start) % duration;
        if t < 0.0 {
            t += duration;
        }
        t + start
    } else {
        time.clamp(start, end)
    }
}

/// Shared sampling interface of [`Track`] and [`FastTrack`](crate::FastTrack).
///
/// Implementors only differ in how [`frame_index`](Self::frame_index) locates
/// the frame for a given time; interpolation is shared.
pub trait KeyframeSampler<T: Interpolatable> {
    fn frames(&self) -> &[Frame<T>];

    fn interpolation(&self) -> Interpolation;

    /// Index of the last frame at or before `time`, capped so that a next
    /// frame always exists. `None` when the track has one frame or less.
    fn frame_index(&self, time: f32, looping: bool) -> Option<usize>;

    #[inline]
    fn len(&self) -> usize {
        self.frames().len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.frames().is_empty()
    }

    /// Tracks with one frame or less are inert and never sampled by clips.
    #[inline]
    fn is_animated(&self) -> bool {
        self.len() > 1
    }

    fn start_time(&self) -> f32 {
        self.frames().first().map_or(0.0, |f| f.time)
    }

    fn end_time(&self) -> f32 {
        self.frames().last().map_or(0.0, |f| f.time)
    }

    fn duration(&self) -> f32 {
        self.end_time() - self.start_time()
    }

    /// Maps a playback time into this track's range. Inert tracks map to 0.
    fn adjust_time_to_fit(&self, time: f32, looping: bool) -> f32 {
        if !self.is_animated() || self.duration() <= 0.0 {
            return 0.0;
        }
        adjust_time(time, self.start_time(), self.end_time(), looping)
    }

    /// Samples the track. Degenerate tracks yield `T::default()`.
    fn sample(&self, time: f32, looping: bool) -> T {
        let Some(index) = self.frame_index(time, looping) else {
            log::trace!("sampling an inert track ({} frames), returning default", self.len());
            return T::default();
        };
        let track_time = self.adjust_time_to_fit(time, looping);
        sample_at_frame(self.frames(), self.interpolation(), index, track_time)
    }
}

/// Interpolates between `frames[index]` and `frames[index + 1]` at the already
/// mapped `time`.
pub(crate) fn sample_at_frame<T: Interpolatable>(
    frames: &[Frame<T>],
    interpolation: Interpolation,
    index: usize,
    time: f32,
) -> T {
    let (Some(this), Some(next)) = (frames.get(index), frames.get(index + 1)) else {
        return T::default();
    };

    if interpolation == Interpolation::Constant {
        // Reaching the next frame's time exactly (clamped to the end) holds that frame.
        let frame = if time >= next.time { next } else { this };
        return T::from_keyframe(frame.value);
    }

    let frame_delta = next.time - this.time;
    if frame_delta <= 0.0 {
        log::trace!("frame delta {frame_delta} at frame {index}, returning default");
        return T::default();
    }
    let t = (time - this.time) / frame_delta;

    let v0 = T::from_keyframe(this.value);
    let v1 = T::from_keyframe(next.value);
    match interpolation {
        Interpolation::Linear => T::interpolate_linear(v0, v1, t),
        _ => T::interpolate_cubic(v0, this.out_tangent, next.in_tangent, v1, t, frame_delta),
    }
}

/// Looks up the last frame at or before `time` with a binary search.
pub(crate) fn search_frame_index<T: Interpolatable>(
    frames: &[Frame<T>],
    time: f32,
    looping: bool,
) -> Option<usize> {
    let size = frames.len();
    if size <= 1 {
        return None;
    }

    let start = frames[0].time;
    let end = frames[size - 1].time;
    let time = if looping {
        adjust_time(time, start, end, true)
    } else {
        if time <= start {
            return Some(0);
        }
        if time >= frames[size - 2].time {
            return Some(size - 2);
        }
        time
    };

    // partition_point finds the first frame after `time`
    let next_idx = frames.partition_point(|f| f.time <= time);
    Some(next_idx.saturating_sub(1).min(size - 2))
}

/// Keyframed curve over a scalar, vector or quaternion value.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track<T: Interpolatable> {
    frames: Vec<Frame<T>>,
    interpolation: Interpolation,
}

pub type ScalarTrack = Track<f32>;
pub type VectorTrack = Track<Vec3>;
pub type QuaternionTrack = Track<Quat>;

impl<T: Interpolatable> Track<T> {
    #[must_use]
    pub fn new(interpolation: Interpolation) -> Self {
        Self {
            frames: Vec::new(),
            interpolation,
        }
    }

    /// Builds a track, checking that frame times strictly increase and every
    /// component is finite.
    pub fn from_frames(frames: Vec<Frame<T>>, interpolation: Interpolation) -> Result<Self> {
        validate_frames(&frames)?;
        Ok(Self {
            frames,
            interpolation,
        })
    }

    /// Appends a frame without validation.
    pub fn push_frame(&mut self, frame: Frame<T>) {
        self.frames.push(frame);
    }

    /// Mutable access for authoring. Keep frame times strictly increasing.
    pub fn frames_mut(&mut self) -> &mut Vec<Frame<T>> {
        &mut self.frames
    }

    pub(crate) fn frames_vec(&self) -> &Vec<Frame<T>> {
        &self.frames
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    #[must_use]
    pub fn into_frames(self) -> Vec<Frame<T>> {
        self.frames
    }
}

impl<T: Interpolatable> KeyframeSampler<T> for Track<T> {
    #[inline]
    fn frames(&self) -> &[Frame<T>] {
        &self.frames
    }

    #[inline]
    fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    fn frame_index(&self, time: f32, looping: bool) -> Option<usize> {
        search_frame_index(&self.frames, time, looping)
    }
}

pub(crate) fn validate_frames<T: Interpolatable>(frames: &[Frame<T>]) -> Result<()> {
    for (index, frame) in frames.iter().enumerate() {
        if !frame.time.is_finite()
            || !frame.value.is_finite()
            || !frame.in_tangent.is_finite()
            || !frame.out_tangent.is_finite()
        {
            return Err(MarrowError::NonFiniteFrame { index });
        }
    }
    for (index, pair) in frames.windows(2).enumerate() {
        if pair[1].time <= pair[0].time {
            return Err(MarrowError::NonIncreasingFrameTime {
                index: index + 1,
                time: pair[1].time,
                previous: pair[0].time,
            });
        }
    }
    Ok(())
}
