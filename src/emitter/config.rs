use glam::Vec2;

use crate::{
    error::{Error, Result},
    math::{Color, FloatRange, IntRange},
    particle::DeactivationRule,
};

/// How sprites are composited onto the target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    Alpha,
    #[default]
    Additive,
    Multiplied,
    AddColors,
    SubtractColors,
}

/// Opaque reference to a texture owned by the host. The engine never loads or frees it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct TextureHandle {
    pub id: u64,
    pub width: u32,
    pub height: u32,
}

impl TextureHandle {
    pub const fn new(id: u64, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn center(&self) -> Vec2 {
        self.size() / 2.
    }
}

/// Everything an [`Emitter`](super::Emitter) needs to spawn and draw particles.
///
/// Angles are in degrees, times in seconds.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    pub origin: Vec2,
    /// Normalized when the config is handed to an emitter.
    pub direction: Vec2,
    pub direction_angle: FloatRange,
    pub velocity_angle: FloatRange,
    pub offset: FloatRange,

    pub velocity: FloatRange,
    pub external_acceleration: Vec2,
    /// Acceleration away from the spawn origin.
    pub origin_acceleration: FloatRange,

    pub start_color: Color,
    pub end_color: Color,
    pub base_scale: Vec2,
    /// Added to `base_scale` per second of age.
    pub scale_increase: Vec2,
    pub base_rotation: f32,
    pub rotation_speed: FloatRange,
    pub texture: TextureHandle,
    pub texture_origin: Vec2,
    pub blend_mode: BlendMode,

    /// Only applied by [`Emitter::reinit`](super::Emitter::reinit).
    pub capacity: usize,
    pub emission_rate: f32,
    pub burst: IntRange,
    /// Lifetime bounds.
    pub age: FloatRange,

    /// Replacing it in place reaches live particles on their emitter's next update.
    pub deactivation_rule: DeactivationRule,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            direction: Vec2::ZERO,
            direction_angle: FloatRange::ZERO,
            velocity_angle: FloatRange::ZERO,
            offset: FloatRange::ZERO,
            velocity: FloatRange::ZERO,
            external_acceleration: Vec2::ZERO,
            origin_acceleration: FloatRange::ZERO,
            start_color: Color::WHITE,
            end_color: Color::WHITE,
            base_scale: Vec2::ONE,
            scale_increase: Vec2::ZERO,
            base_rotation: 0.,
            rotation_speed: FloatRange::ZERO,
            texture: TextureHandle::default(),
            texture_origin: Vec2::ZERO,
            blend_mode: BlendMode::Additive,
            capacity: 50,
            emission_rate: 10.,
            burst: IntRange::splat(1),
            age: FloatRange::splat(0.5),
            deactivation_rule: DeactivationRule::default(),
        }
    }
}

impl EmitterConfig {
    /// Sets the texture and moves the pivot to its center.
    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = texture;
        self.texture_origin = texture.center();
        self
    }

    /// Checks the constraints the engine assumes but does not enforce.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be at least 1".into()));
        }
        if self.emission_rate < 0. {
            return Err(Error::InvalidConfig(format!(
                "negative emission rate {}",
                self.emission_rate
            )));
        }
        if self.age.min < 0. || self.age.max < 0. {
            return Err(Error::InvalidConfig(format!(
                "negative lifetime {}..{}",
                self.age.min, self.age.max
            )));
        }

        let float_ranges = [
            ("direction angle", self.direction_angle),
            ("velocity angle", self.velocity_angle),
            ("offset", self.offset),
            ("velocity", self.velocity),
            ("origin acceleration", self.origin_acceleration),
            ("rotation speed", self.rotation_speed),
            ("life time", self.age),
        ];
        if let Some((name, range)) = float_ranges.iter().find(|(_, r)| !r.is_ordered()) {
            return Err(Error::InvalidConfig(format!(
                "inverted {} range {}..{}",
                name, range.min, range.max
            )));
        }
        if !self.burst.is_ordered() {
            return Err(Error::InvalidConfig(format!(
                "inverted burst range {}..{}",
                self.burst.min, self.burst.max
            )));
        }

        Ok(())
    }
}
