use std::sync::Arc;

use glam::{Quat, Vec3};
use smallvec::SmallVec;

use crate::blending::blend_in_place;
use crate::clip::Clip;
use crate::pose::Pose;
use crate::skeleton::Skeleton;
use crate::tracks::{KeyframeSampler, QuaternionTrack, VectorTrack};

/// A clip fading in on top of the current playback.
#[derive(Debug, Clone)]
pub struct CrossFadeTarget<V = VectorTrack, Q = QuaternionTrack> {
    pub clip: Arc<Clip<V, Q>>,
    pub pose: Pose,
    pub time: f32,
    pub duration: f32,
    pub elapsed: f32,
}

impl<V, Q> CrossFadeTarget<V, Q>
where
    V: KeyframeSampler<Vec3>,
    Q: KeyframeSampler<Quat>,
{
    #[must_use]
    pub fn new(clip: Arc<Clip<V, Q>>, pose: Pose, duration: f32) -> Self {
        Self {
            time: clip.start_time(),
            clip,
            pose,
            duration,
            elapsed: 0.0,
        }
    }

    /// Blend weight of this target, `elapsed / duration` clamped to `[0, 1]`.
    /// Zero-length fades are fully weighted.
    #[must_use]
    pub fn weight(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Plays one clip and fades to queued clips over time.
///
/// Clips are shared through [`Arc`] and compared by identity: fading to the
/// clip that is already last in line is a no-op.
#[derive(Debug, Clone)]
pub struct CrossFadeController<V = VectorTrack, Q = QuaternionTrack> {
    skeleton: Option<Arc<Skeleton>>,
    pose: Pose,
    clip: Option<Arc<Clip<V, Q>>>,
    time: f32,
    targets: SmallVec<[CrossFadeTarget<V, Q>; 4]>,
}

impl<V, Q> Default for CrossFadeController<V, Q> {
    fn default() -> Self {
        Self {
            skeleton: None,
            pose: Pose::default(),
            clip: None,
            time: 0.0,
            targets: SmallVec::new(),
        }
    }
}

impl<V, Q> CrossFadeController<V, Q>
where
    V: KeyframeSampler<Vec3>,
    Q: KeyframeSampler<Quat>,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_skeleton(skeleton: Arc<Skeleton>) -> Self {
        let mut controller = Self::default();
        controller.set_skeleton(skeleton);
        controller
    }

    /// Assigns the skeleton and resets the pose to its rest pose.
    pub fn set_skeleton(&mut self, skeleton: Arc<Skeleton>) {
        self.pose = skeleton.rest_pose().clone();
        self.skeleton = Some(skeleton);
    }

    /// Plays `clip` from its start, dropping every queued fade.
    pub fn play(&mut self, clip: Arc<Clip<V, Q>>) {
        self.targets.clear();
        self.time = clip.start_time();
        self.pose = self.rest_pose();
        self.clip = Some(clip);
    }

    /// Queues a fade to `clip` over `fade_time` seconds.
    ///
    /// Without a current clip this is [`play`](Self::play). Fading to the clip
    /// last in line (the current clip when nothing is queued) does nothing.
    pub fn fade_to(&mut self, clip: Arc<Clip<V, Q>>, fade_time: f32) {
        let Some(current) = &self.clip else {
            self.play(clip);
            return;
        };

        let last = self.targets.last().map_or(current, |target| &target.clip);
        if Arc::ptr_eq(last, &clip) {
            return;
        }

        let pose = self.rest_pose();
        self.targets.push(CrossFadeTarget::new(clip, pose, fade_time));
    }

    /// Advances playback by `dt` and rebuilds the pose.
    ///
    /// The first finished fade becomes the current clip, dropping it and every
    /// target queued before it; at most one promotion happens per update.
    pub fn update(&mut self, dt: f32) {
        let Some(skeleton) = self.skeleton.clone() else {
            return;
        };
        if self.clip.is_none() {
            return;
        }

        if let Some(index) = self.targets.iter().position(CrossFadeTarget::is_finished) {
            let promoted = self.targets.remove(index);
            self.targets.drain(..index);
            log::debug!(
                "Cross-fade to '{}' finished, {} fades still queued",
                promoted.clip.name(),
                self.targets.len()
            );
            self.time = promoted.time;
            self.pose = promoted.pose;
            self.clip = Some(promoted.clip);
        }

        self.pose = skeleton.rest_pose().clone();
        if let Some(clip) = &self.clip {
            self.time = clip.sample(&mut self.pose, self.time + dt);
        }

        for target in &mut self.targets {
            target.time = target.clip.sample(&mut target.pose, target.time + dt);
            target.elapsed += dt;
            blend_in_place(&mut self.pose, &target.pose, target.weight(), None);
        }
    }

    #[must_use]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    #[must_use]
    pub fn current_clip(&self) -> Option<&Arc<Clip<V, Q>>> {
        self.clip.as_ref()
    }

    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[must_use]
    pub fn targets(&self) -> &[CrossFadeTarget<V, Q>] {
        &self.targets
    }

    #[must_use]
    pub fn is_fading(&self) -> bool {
        !self.targets.is_empty()
    }

    #[must_use]
    pub fn skeleton(&self) -> Option<&Arc<Skeleton>> {
        self.skeleton.as_ref()
    }

    fn rest_pose(&self) -> Pose {
        self.skeleton
            .as_ref()
            .map_or_else(Pose::default, |s| s.rest_pose().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::{Frame, Interpolation, Track};
    use marrow_core::Transform;

    fn skeleton() -> Arc<Skeleton> {
        let rest = Pose::new(1);
        Arc::new(Skeleton::new(rest.clone(), rest, vec!["root".into()]).unwrap())
    }

    fn clip(name: &str, to: f32) -> Arc<Clip> {
        let mut clip = Clip::new(name);
        *clip.track_mut(0).position_mut() = Track::from_frames(
            vec![Frame::new(0.0, Vec3::ZERO), Frame::new(1.0, Vec3::new(to, 0.0, 0.0))],
            Interpolation::Linear,
        )
        .unwrap();
        clip.recalculate_duration();
        Arc::new(clip)
    }

    #[test]
    fn test_fade_to_same_clip_is_noop() {
        let a = clip("a", 1.0);
        let b = clip("b", 2.0);
        let mut controller = CrossFadeController::with_skeleton(skeleton());

        controller.fade_to(a.clone(), 0.5);
        assert!(Arc::ptr_eq(controller.current_clip().unwrap(), &a));
        controller.fade_to(a.clone(), 0.5);
        assert!(!controller.is_fading());

        controller.fade_to(b.clone(), 0.5);
        controller.fade_to(b, 0.5);
        assert_eq!(controller.targets().len(), 1);
    }

    #[test]
    fn test_finished_fade_is_promoted() {
        let a = clip("a", 1.0);
        let b = clip("b", 2.0);
        let mut controller = CrossFadeController::with_skeleton(skeleton());
        controller.play(a);
        controller.fade_to(b.clone(), 0.2);

        controller.update(0.25);
        assert!(controller.is_fading());
        controller.update(0.25);
        assert!(!controller.is_fading());
        assert!(Arc::ptr_eq(controller.current_clip().unwrap(), &b));
        assert!((controller.time() - 0.5).abs() < 1e-6);

        let expected = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        assert!(controller.pose().local_transform(0).approx_eq(&expected));
    }

    #[test]
    fn test_update_without_skeleton_is_noop() {
        let mut controller = CrossFadeController::new();
        controller.play(clip("a", 1.0));
        controller.update(0.5);
        assert_eq!(controller.time(), 0.0);
        assert!(controller.pose().is_empty());
    }
}
