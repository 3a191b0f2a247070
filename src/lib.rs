//! Fixed-capacity 2D particle emitters and a non-owning particle system that
//! drives them once per frame.

pub mod emitter;
pub mod error;
pub mod math;
pub mod particle;
pub mod preset;
pub mod render;
pub mod system;

pub use emitter::{BlendMode, Emitter, EmitterConfig, SharedEmitter, TextureHandle};
pub use error::{Error, Result};
pub use math::{Color, FloatRange, IntRange};
pub use particle::{AgeLimit, DeactivationRule, Deactivator, Particle};
pub use system::ParticleSystem;
