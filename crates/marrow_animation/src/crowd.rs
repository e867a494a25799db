//! Crowd playback over a baked [`AnimTexture`](crate::AnimTexture).
//!
//! Every actor plays the same clip at its own time. Per tick the crowd works
//! out, for each actor, the two baked columns around its playback time and the
//! interpolation factor between them; a vertex shader does the rest.

use glam::{Quat, UVec2, Vec3};
use rand::Rng;

use crate::clip::Clip;
use crate::tracks::{KeyframeSampler, adjust_time};
use marrow_core::Transform;

/// | Field        | Description                          | Default |
/// |--------------|--------------------------------------|---------|
/// | `max_actors` | Upper bound on the number of actors  | `80`    |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrowdSettings {
    pub max_actors: usize,
}

impl Default for CrowdSettings {
    fn default() -> Self {
        Self { max_actors: 80 }
    }
}

/// Consecutive rejected samples before position placement gives up.
const MAX_PLACEMENT_FAILURES: usize = 2000;

#[derive(Debug, Clone, Default)]
pub struct Crowd {
    settings: CrowdSettings,
    positions: Vec<Vec3>,
    rotations: Vec<Quat>,
    scales: Vec<Vec3>,
    /// Current and next baked column per actor
    frames: Vec<UVec2>,
    /// Interpolation factor between the two columns
    times: Vec<f32>,
    current_play_times: Vec<f32>,
    next_play_times: Vec<f32>,
}

impl Crowd {
    #[must_use]
    pub fn new(settings: CrowdSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn settings(&self) -> &CrowdSettings {
        &self.settings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// New actors stand at the origin with unit scale.
    pub fn resize(&mut self, size: usize) {
        let size = if size > self.settings.max_actors {
            log::warn!(
                "Crowd of {size} actors exceeds the limit of {}, clamping",
                self.settings.max_actors
            );
            self.settings.max_actors
        } else {
            size
        };

        self.positions.resize(size, Vec3::ZERO);
        self.rotations.resize(size, Quat::IDENTITY);
        self.scales.resize(size, Vec3::ONE);
        self.frames.resize(size, UVec2::ZERO);
        self.times.resize(size, 0.0);
        self.current_play_times.resize(size, 0.0);
        self.next_play_times.resize(size, 0.0);
    }

    #[must_use]
    pub fn actor(&self, index: usize) -> Transform {
        Transform::new(self.positions[index], self.rotations[index], self.scales[index])
    }

    pub fn set_actor(&mut self, index: usize, transform: &Transform) {
        self.positions[index] = transform.position;
        self.rotations[index] = transform.rotation;
        self.scales[index] = transform.scale;
    }

    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[must_use]
    pub fn rotations(&self) -> &[Quat] {
        &self.rotations
    }

    #[must_use]
    pub fn scales(&self) -> &[Vec3] {
        &self.scales
    }

    #[must_use]
    pub fn frames(&self) -> &[UVec2] {
        &self.frames
    }

    #[must_use]
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    #[must_use]
    pub fn play_times(&self) -> &[f32] {
        &self.current_play_times
    }

    /// Advances every actor and recomputes baked columns for a texture
    /// `texture_width` texels wide.
    pub fn update<V, Q>(&mut self, dt: f32, clip: &Clip<V, Q>, texture_width: usize)
    where
        V: KeyframeSampler<Vec3>,
        Q: KeyframeSampler<Quat>,
    {
        let start = clip.start_time();
        let end = clip.end_time();
        let duration = clip.duration();
        if duration <= 0.0 || texture_width < 2 {
            return;
        }

        self.update_play_times(dt, clip.looping(), start, end);
        self.update_frame_indices(start, duration, texture_width);
        self.update_interpolation_times(start, duration, texture_width);
    }

    fn update_play_times(&mut self, dt: f32, looping: bool, start: f32, end: f32) {
        for (current, next) in self.current_play_times.iter_mut().zip(&mut self.next_play_times) {
            *current = adjust_time(*current + dt, start, end, looping);
            *next = adjust_time(*current + dt, start, end, looping);
        }
    }

    fn update_frame_indices(&mut self, start: f32, duration: f32, texture_width: usize) {
        let last_column = (texture_width - 1) as f32;
        let column = |time: f32| (((time - start) / duration) * last_column) as u32;
        for ((frame, &current), &next) in self
            .frames
            .iter_mut()
            .zip(&self.current_play_times)
            .zip(&self.next_play_times)
        {
            *frame = UVec2::new(column(current), column(next));
        }
    }

    fn update_interpolation_times(&mut self, start: f32, duration: f32, texture_width: usize) {
        let last_column = (texture_width - 1) as f32;
        let column_time = |column: u32| start + duration * (column as f32 / last_column);
        for ((time, frame), &current) in self
            .times
            .iter_mut()
            .zip(&self.frames)
            .zip(&self.current_play_times)
        {
            if frame.x == frame.y {
                *time = 1.0;
                continue;
            }

            let this_time = column_time(frame.x);
            let mut next_time = column_time(frame.y);
            // Next column wrapped around the loop
            if next_time < this_time {
                next_time += duration;
            }
            *time = (current - this_time) / (next_time - this_time);
        }
    }

    /// Spreads actors uniformly across the clip.
    pub fn randomize_times<V, Q, R>(&mut self, clip: &Clip<V, Q>, rng: &mut R)
    where
        V: KeyframeSampler<Vec3>,
        Q: KeyframeSampler<Quat>,
        R: Rng + ?Sized,
    {
        let start = clip.start_time();
        let duration = clip.duration();
        for time in &mut self.current_play_times {
            *time = start + rng.random::<f32>() * duration;
        }
    }

    /// Places actors at random inside `[min, max]`, keeping every new point at
    /// least `radius` away from the points in `existing`. Accepted points are
    /// appended to `existing`.
    ///
    /// After 2000 rejections in a row placement stops and the crowd shrinks to
    /// the actors that were placed.
    pub fn randomize_positions<R>(
        &mut self,
        existing: &mut Vec<Vec3>,
        min: Vec3,
        max: Vec3,
        radius: f32,
        rng: &mut R,
    ) where
        R: Rng + ?Sized,
    {
        let size = self.len();
        let delta = max - min;
        let radius_sq = radius * radius;

        let mut placed = Vec::with_capacity(size);
        let mut failures = 0;
        while placed.len() < size && failures < MAX_PLACEMENT_FAILURES {
            let point = min + delta * Vec3::new(rng.random(), rng.random(), rng.random());
            if existing.iter().any(|p| p.distance_squared(point) < radius_sq) {
                failures += 1;
                continue;
            }
            failures = 0;
            placed.push(point);
            existing.push(point);
        }

        if placed.len() != size {
            log::warn!(
                "Placed only {} of {size} actors after {MAX_PLACEMENT_FAILURES} failed attempts",
                placed.len()
            );
            self.resize(placed.len());
        }
        self.positions.copy_from_slice(&placed);
    }
}
