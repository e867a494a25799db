use glam::{Quat, Vec3};
use marrow_core::Transform;

use crate::fast_track::{FastQuaternionTrack, FastVectorTrack, optimize_track};
use crate::tracks::{KeyframeSampler, QuaternionTrack, VectorTrack};

/// Position, rotation and scale tracks animating one joint.
///
/// Generic over the sampling strategy so the same container serves plain and
/// optimized tracks; see [`FastTransformTrack`].
#[derive(Debug, Clone, Default)]
pub struct TransformTrack<V = VectorTrack, Q = QuaternionTrack> {
    id: usize,
    position: V,
    rotation: Q,
    scale: V,
}

pub type FastTransformTrack = TransformTrack<FastVectorTrack, FastQuaternionTrack>;

impl<V, Q> TransformTrack<V, Q>
where
    V: KeyframeSampler<Vec3> + Default,
    Q: KeyframeSampler<Quat> + Default,
{
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self {
            id,
            position: V::default(),
            rotation: Q::default(),
            scale: V::default(),
        }
    }
}

impl<V, Q> TransformTrack<V, Q>
where
    V: KeyframeSampler<Vec3>,
    Q: KeyframeSampler<Quat>,
{
    #[must_use]
    pub fn from_parts(id: usize, position: V, rotation: Q, scale: V) -> Self {
        Self {
            id,
            position,
            rotation,
            scale,
        }
    }

    /// Joint this track animates.
    #[inline]
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn set_id(&mut self, id: usize) {
        self.id = id;
    }

    #[must_use]
    pub fn position(&self) -> &V {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut V {
        &mut self.position
    }

    #[must_use]
    pub fn rotation(&self) -> &Q {
        &self.rotation
    }

    pub fn rotation_mut(&mut self) -> &mut Q {
        &mut self.rotation
    }

    #[must_use]
    pub fn scale(&self) -> &V {
        &self.scale
    }

    pub fn scale_mut(&mut self) -> &mut V {
        &mut self.scale
    }

    /// A track is valid when at least one component is animated.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.position.is_animated() || self.rotation.is_animated() || self.scale.is_animated()
    }

    /// Earliest start time across the animated components, 0 if none.
    #[must_use]
    pub fn start_time(&self) -> f32 {
        self.animated_ranges()
            .into_iter()
            .flatten()
            .map(|(start, _)| start)
            .reduce(f32::min)
            .unwrap_or(0.0)
    }

    /// Latest end time across the animated components, 0 if none.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.animated_ranges()
            .into_iter()
            .flatten()
            .map(|(_, end)| end)
            .reduce(f32::max)
            .unwrap_or(0.0)
    }

    fn animated_ranges(&self) -> [Option<(f32, f32)>; 3] {
        [
            self.position
                .is_animated()
                .then(|| (self.position.start_time(), self.position.end_time())),
            self.rotation
                .is_animated()
                .then(|| (self.rotation.start_time(), self.rotation.end_time())),
            self.scale
                .is_animated()
                .then(|| (self.scale.start_time(), self.scale.end_time())),
        ]
    }

    /// Samples the animated components on top of `reference`. Inert components
    /// keep the reference value.
    #[must_use]
    pub fn sample(&self, reference: &Transform, time: f32, looping: bool) -> Transform {
        let mut result = *reference;
        if self.position.is_animated() {
            result.position = self.position.sample(time, looping);
        }
        if self.rotation.is_animated() {
            result.rotation = self.rotation.sample(time, looping);
        }
        if self.scale.is_animated() {
            result.scale = self.scale.sample(time, looping);
        }
        result
    }
}

/// Converts every component track to its optimized form.
#[must_use]
pub fn optimize_transform_track(input: &TransformTrack) -> FastTransformTrack {
    TransformTrack {
        id: input.id,
        position: optimize_track(&input.position),
        rotation: optimize_track(&input.rotation),
        scale: optimize_track(&input.scale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracks::{Frame, Interpolation, Track};

    fn position_only() -> TransformTrack {
        let mut track = TransformTrack::new(3);
        *track.position_mut() = Track::from_frames(
            vec![Frame::new(0.5, Vec3::ZERO), Frame::new(1.5, Vec3::X)],
            Interpolation::Linear,
        )
        .unwrap();
        track
    }

    #[test]
    fn test_inert_components_keep_reference() {
        let track = position_only();
        let reference = Transform::new(Vec3::Y, Quat::from_rotation_z(0.5), Vec3::splat(2.0));

        let sampled = track.sample(&reference, 1.0, false);
        assert!(sampled.position.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
        assert_eq!(sampled.rotation, reference.rotation);
        assert_eq!(sampled.scale, reference.scale);
    }

    #[test]
    fn test_time_range() {
        let mut track = position_only();
        *track.scale_mut() = Track::from_frames(
            vec![Frame::new(0.0, Vec3::ONE), Frame::new(1.0, Vec3::ONE)],
            Interpolation::Linear,
        )
        .unwrap();
        assert!(track.is_valid());
        assert_eq!(track.start_time(), 0.0);
        assert_eq!(track.end_time(), 1.5);
    }

    #[test]
    fn test_empty_track_is_invalid() {
        let track = TransformTrack::<VectorTrack, QuaternionTrack>::new(0);
        assert!(!track.is_valid());
        assert_eq!(track.start_time(), 0.0);
        assert_eq!(track.end_time(), 0.0);
    }
}
