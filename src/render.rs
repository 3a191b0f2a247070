use bytemuck::{cast_slice, Pod, Zeroable};
use glam::Vec2;

use crate::{
    emitter::{BlendMode, TextureHandle},
    math::Color,
};

/// One textured quad produced for an active particle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    pub texture: TextureHandle,
    /// Particle position minus the texture pivot.
    pub position: Vec2,
    /// Texture pivot, for hosts that rotate and scale around it.
    pub origin: Vec2,
    pub scale: Vec2,
    /// Degrees.
    pub rotation: f32,
    pub color: Color,
}

/// Drawing target for emitters. Implemented by the host's renderer.
pub trait Canvas {
    fn draw_sprite(&mut self, sprite: &Sprite, blend_mode: BlendMode);
}

/// GPU-ready per-instance data, laid out for a storage buffer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct SpriteInstance {
    pub color: [f32; 4],
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
    _pad0: [f32; 3],
}

impl From<&Sprite> for SpriteInstance {
    fn from(sprite: &Sprite) -> Self {
        Self {
            color: sprite.color.to_array(),
            position: sprite.position,
            scale: sprite.scale,
            rotation: sprite.rotation.to_radians(),
            ..Default::default()
        }
    }
}

/// Consecutive sprites sharing a texture and blend mode.
#[derive(Debug, Clone)]
pub struct SpriteBatch {
    pub texture: TextureHandle,
    pub blend_mode: BlendMode,
    instances: Vec<SpriteInstance>,
}

impl SpriteBatch {
    pub fn instances(&self) -> &[SpriteInstance] {
        &self.instances
    }

    pub fn as_bytes(&self) -> &[u8] {
        cast_slice(self.instances.as_slice())
    }
}

/// [`Canvas`] that collects a frame's sprites into upload-ready batches.
#[derive(Debug, Clone, Default)]
pub struct SpriteBuffer {
    batches: Vec<SpriteBatch>,
}

impl SpriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the batches but keeps their allocation for the next frame.
    pub fn clear(&mut self) {
        self.batches.clear();
    }

    pub fn batches(&self) -> &[SpriteBatch] {
        &self.batches
    }

    pub fn sprite_count(&self) -> usize {
        self.batches.iter().map(|b| b.instances.len()).sum()
    }

    pub fn byte_len(&self) -> usize {
        self.batches.iter().map(|b| b.as_bytes().len()).sum()
    }
}

impl Canvas for SpriteBuffer {
    fn draw_sprite(&mut self, sprite: &Sprite, blend_mode: BlendMode) {
        let instance = SpriteInstance::from(sprite);
        let current = self
            .batches
            .last_mut()
            .filter(|b| b.texture == sprite.texture && b.blend_mode == blend_mode);
        if let Some(batch) = current {
            batch.instances.push(instance);
            return;
        }

        self.batches.push(SpriteBatch {
            texture: sprite.texture,
            blend_mode,
            instances: vec![instance],
        });
    }
}
