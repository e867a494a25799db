use glam::{Quat, Vec3};
use marrow_core::{MarrowError, Result};
use rustc_hash::FxHashMap;

use crate::fast_track::{FastQuaternionTrack, FastVectorTrack};
use crate::pose::Pose;
use crate::tracks::{KeyframeSampler, QuaternionTrack, VectorTrack, adjust_time};
use crate::transform_track::{TransformTrack, optimize_transform_track};

/// A named animation: at most one [`TransformTrack`] per joint.
///
/// The cached time range covers every valid track. Call
/// [`recalculate_duration`](Self::recalculate_duration) after editing tracks
/// through [`track_mut`](Self::track_mut).
#[derive(Debug, Clone)]
pub struct Clip<V = VectorTrack, Q = QuaternionTrack> {
    name: String,
    tracks: Vec<TransformTrack<V, Q>>,
    /// joint id -> index into `tracks`
    lookup: FxHashMap<usize, usize>,
    start_time: f32,
    end_time: f32,
    looping: bool,
}

pub type FastClip = Clip<FastVectorTrack, FastQuaternionTrack>;

impl<V, Q> Clip<V, Q>
where
    V: KeyframeSampler<Vec3> + Default,
    Q: KeyframeSampler<Quat> + Default,
{
    /// Empty looping clip.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
            lookup: FxHashMap::default(),
            start_time: 0.0,
            end_time: 0.0,
            looping: true,
        }
    }

    /// Track animating `joint`, inserting an empty one if none exists.
    pub fn track_mut(&mut self, joint: usize) -> &mut TransformTrack<V, Q> {
        let index = *self.lookup.entry(joint).or_insert_with(|| {
            self.tracks.push(TransformTrack::new(joint));
            self.tracks.len() - 1
        });
        &mut self.tracks[index]
    }
}

impl<V, Q> Clip<V, Q>
where
    V: KeyframeSampler<Vec3>,
    Q: KeyframeSampler<Quat>,
{
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    #[must_use]
    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.end_time
    }

    #[must_use]
    pub fn duration(&self) -> f32 {
        self.end_time - self.start_time
    }

    /// Number of joint tracks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn tracks(&self) -> &[TransformTrack<V, Q>] {
        &self.tracks
    }

    #[must_use]
    pub fn track(&self, joint: usize) -> Option<&TransformTrack<V, Q>> {
        self.lookup.get(&joint).map(|&i| &self.tracks[i])
    }

    /// Joint animated by the track at `index`.
    #[must_use]
    pub fn joint_at(&self, index: usize) -> usize {
        self.tracks[index].id()
    }

    /// Retargets the track at `index` to `joint`. A track already bound to
    /// `joint` loses its lookup entry.
    pub fn set_joint_at(&mut self, index: usize, joint: usize) {
        let old = self.tracks[index].id();
        if self.lookup.get(&old) == Some(&index) {
            self.lookup.remove(&old);
        }
        self.tracks[index].set_id(joint);
        self.lookup.insert(joint, index);
    }

    /// Recomputes the time range from the valid tracks.
    pub fn recalculate_duration(&mut self) {
        let (start, end) = self
            .tracks
            .iter()
            .filter(|t| t.is_valid())
            .map(|t| (t.start_time(), t.end_time()))
            .reduce(|(s0, e0), (s1, e1)| (s0.min(s1), e0.max(e1)))
            .unwrap_or((0.0, 0.0));
        self.start_time = start;
        self.end_time = end;
    }

    /// Wraps or clamps `time` into the clip range. Zero-length clips map to 0.
    #[must_use]
    pub fn adjust_time_to_fit_range(&self, time: f32) -> f32 {
        if self.duration() <= 0.0 {
            return 0.0;
        }
        adjust_time(time, self.start_time, self.end_time, self.looping)
    }

    /// Samples every track into the matching joint of `pose` and returns the
    /// mapped time.
    ///
    /// Components without animation keep the pose's value. Tracks for joints
    /// outside the pose are skipped; use [`validate_for`](Self::validate_for)
    /// to catch them up front.
    pub fn sample(&self, pose: &mut Pose, time: f32) -> f32 {
        if self.duration() <= 0.0 {
            return 0.0;
        }

        let time = self.adjust_time_to_fit_range(time);
        for track in &self.tracks {
            let joint = track.id();
            if joint >= pose.len() {
                log::trace!("clip '{}' skips joint {joint} outside the pose", self.name);
                continue;
            }
            let local = pose.local_transform(joint);
            pose.set_local_transform(joint, track.sample(&local, time, self.looping));
        }
        time
    }

    /// Checks that every track targets a joint of `pose`.
    pub fn validate_for(&self, pose: &Pose) -> Result<()> {
        match self.tracks.iter().find(|t| t.id() >= pose.len()) {
            Some(track) => Err(MarrowError::JointOutOfRange {
                joint: track.id(),
                len: pose.len(),
            }),
            None => Ok(()),
        }
    }
}

/// Converts every track of a clip to its optimized form.
#[must_use]
pub fn optimize_clip(input: &Clip) -> FastClip {
    let fast = FastClip {
        name: input.name.clone(),
        tracks: input.tracks.iter().map(optimize_transform_track).collect(),
        lookup: input.lookup.clone(),
        start_time: input.start_time,
        end_time: input.end_time,
        looping: input.looping,
    };
    log::debug!("Optimized clip '{}' ({} tracks)", fast.name, fast.tracks.len());
    fast
}
