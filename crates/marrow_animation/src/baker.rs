//! Animation baking for GPU crowd playback.
//!
//! A clip is sampled at evenly spaced times across the width of a square RGBA
//! float texture. Each joint `j` owns three rows: `3j` holds the model-space
//! position, `3j + 1` the rotation and `3j + 2` the scale. Creating the GPU
//! texture from [`AnimTexture::as_bytes`] is up to the renderer.

use glam::{Quat, Vec3, Vec4};
use marrow_core::{MarrowError, Result};

use crate::clip::Clip;
use crate::skeleton::Skeleton;
use crate::tracks::KeyframeSampler;

/// Square grid of RGBA32F texels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimTexture {
    size: usize,
    data: Vec<f32>,
}

impl AnimTexture {
    /// Zeroed `size` x `size` texture.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size * 4],
        }
    }

    /// Resizes and clears the texture.
    pub fn resize(&mut self, size: usize) {
        self.size = size;
        self.data.clear();
        self.data.resize(size * size * 4, 0.0);
    }

    /// Width and height in texels.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Raw bytes for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.size + x) * 4
    }

    /// Stores a vector with `w = 0`.
    pub fn set_texel_vec3(&mut self, x: usize, y: usize, v: Vec3) {
        self.set_texel(x, y, v.extend(0.0));
    }

    pub fn set_texel_quat(&mut self, x: usize, y: usize, q: Quat) {
        self.set_texel(x, y, Vec4::from(q));
    }

    pub fn set_texel(&mut self, x: usize, y: usize, texel: Vec4) {
        let offset = self.offset(x, y);
        texel.write_to_slice(&mut self.data[offset..offset + 4]);
    }

    #[must_use]
    pub fn texel(&self, x: usize, y: usize) -> Vec4 {
        let offset = self.offset(x, y);
        Vec4::from_slice(&self.data[offset..offset + 4])
    }
}

/// Samples `clip` over the bind pose of `skeleton` into `texture`.
///
/// Column `x` holds the clip at `start + duration * x / (size - 1)`. The
/// texture needs at least two columns and three rows per joint.
pub fn bake_animation<V, Q>(skeleton: &Skeleton, clip: &Clip<V, Q>, texture: &mut AnimTexture) -> Result<()>
where
    V: KeyframeSampler<Vec3>,
    Q: KeyframeSampler<Quat>,
{
    let size = texture.size();
    let required = (skeleton.len() * 3).max(2);
    if size < required {
        return Err(MarrowError::TextureTooSmall { size, required });
    }

    let mut pose = skeleton.bind_pose().clone();
    for x in 0..size {
        let t = x as f32 / (size - 1) as f32;
        clip.sample(&mut pose, clip.start_time() + clip.duration() * t);

        for (joint, global) in pose.global_transforms().into_iter().enumerate() {
            let y = joint * 3;
            texture.set_texel_vec3(x, y, global.position);
            texture.set_texel_quat(x, y + 1, global.rotation);
            texture.set_texel_vec3(x, y + 2, global.scale);
        }
    }

    log::debug!(
        "Baked clip '{}' into a {size}x{size} animation texture",
        clip.name()
    );
    Ok(())
}
