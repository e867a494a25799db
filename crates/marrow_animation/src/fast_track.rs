use std::ops::{Deref, DerefMut};

use glam::{Quat, Vec3};

use crate::tracks::{Frame, Interpolation, KeyframeSampler, Track, adjust_time, search_frame_index};
use crate::values::Interpolatable;

/// Lookup table resolution.
pub const SAMPLES_PER_SECOND: f32 = 60.0;

/// A [`Track`] with a precomputed frame lookup table.
///
/// The table maps fixed-rate time buckets across the track duration to the
/// frame active at the start of each bucket, replacing the per-sample search
/// with a table read plus a short forward step over any frame boundary inside
/// the bucket. Results match the plain track exactly.
///
/// The table is rebuilt by every mutating method here, including when the
/// [`FramesMut`] guard returned by [`frames_mut`](Self::frames_mut) is dropped.
#[derive(Debug, Clone, Default)]
pub struct FastTrack<T: Interpolatable> {
    track: Track<T>,
    sampled_frames: Vec<usize>,
}

pub type FastScalarTrack = FastTrack<f32>;
pub type FastVectorTrack = FastTrack<Vec3>;
pub type FastQuaternionTrack = FastTrack<Quat>;

impl<T: Interpolatable> FastTrack<T> {
    #[must_use]
    pub fn new(interpolation: Interpolation) -> Self {
        Self {
            track: Track::new(interpolation),
            sampled_frames: Vec::new(),
        }
    }

    pub fn push_frame(&mut self, frame: Frame<T>) {
        self.track.push_frame(frame);
        self.update_index_lookup_table();
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.track.set_interpolation(interpolation);
    }

    /// Mutable access for authoring. The lookup table is rebuilt when the
    /// returned guard goes out of scope.
    pub fn frames_mut(&mut self) -> FramesMut<'_, T> {
        FramesMut { track: self }
    }

    #[must_use]
    pub fn track(&self) -> &Track<T> {
        &self.track
    }

    #[must_use]
    pub fn into_track(self) -> Track<T> {
        self.track
    }

    /// Number of buckets in the lookup table.
    #[must_use]
    pub fn lookup_len(&self) -> usize {
        self.sampled_frames.len()
    }

    pub fn update_index_lookup_table(&mut self) {
        self.sampled_frames.clear();

        let frames = self.track.frames();
        let num_frames = frames.len();
        if num_frames <= 1 {
            return;
        }

        let start = self.track.start_time();
        let duration = self.track.duration();
        let num_samples = ((duration * SAMPLES_PER_SECOND) as usize).max(2);
        self.sampled_frames.reserve(num_samples);

        for i in 0..num_samples {
            let t = i as f32 / (num_samples - 1) as f32;
            let time = start + t * duration;

            let next_idx = frames.partition_point(|f| f.time <= time);
            self.sampled_frames
                .push(next_idx.saturating_sub(1).min(num_frames - 2));
        }
    }
}

impl<T: Interpolatable> KeyframeSampler<T> for FastTrack<T> {
    #[inline]
    fn frames(&self) -> &[Frame<T>] {
        self.track.frames()
    }

    #[inline]
    fn interpolation(&self) -> Interpolation {
        self.track.interpolation()
    }

    fn frame_index(&self, time: f32, looping: bool) -> Option<usize> {
        let frames = self.track.frames();
        let size = frames.len();
        if size <= 1 {
            return None;
        }
        if self.sampled_frames.len() < 2 {
            return search_frame_index(frames, time, looping);
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

        let duration = end - start;
        if duration <= 0.0 {
            return Some(0);
        }

        // 1. Bucket whose start time is at or before `time`
        let last_bucket = self.sampled_frames.len() - 1;
        let normalized = ((time - start) / duration).clamp(0.0, 1.0);
        let bucket = ((normalized * last_bucket as f32) as usize).min(last_bucket);

        // 2. Step over frames that begin inside the bucket. The backward step
        //    only triggers when rounding put the bucket start past `time`.
        let mut index = self.sampled_frames[bucket].min(size - 2);
        while index > 0 && frames[index].time > time {
            index -= 1;
        }
        while index + 2 < size && frames[index + 1].time <= time {
            index += 1;
        }
        Some(index)
    }
}

/// Frame access handed out by [`FastTrack::frames_mut`].
pub struct FramesMut<'a, T: Interpolatable> {
    track: &'a mut FastTrack<T>,
}

impl<T: Interpolatable> Deref for FramesMut<'_, T> {
    type Target = Vec<Frame<T>>;

    fn deref(&self) -> &Self::Target {
        self.track.track.frames_vec()
    }
}

impl<T: Interpolatable> DerefMut for FramesMut<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.track.track.frames_mut()
    }
}

impl<T: Interpolatable> Drop for FramesMut<'_, T> {
    fn drop(&mut self) {
        self.track.update_index_lookup_table();
    }
}

impl<T: Interpolatable> From<Track<T>> for FastTrack<T> {
    fn from(track: Track<T>) -> Self {
        let mut fast = Self {
            track,
            sampled_frames: Vec::new(),
        };
        fast.update_index_lookup_table();
        fast
    }
}

/// Copies a track into its optimized form.
#[must_use]
pub fn optimize_track<T: Interpolatable>(input: &Track<T>) -> FastTrack<T> {
    FastTrack::from(input.clone())
}
