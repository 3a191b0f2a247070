mod config;

use std::{cell::RefCell, rc::Rc, time::SystemTime};

use glam::Vec2;
use log::{debug, info};
use rand::prelude::*;
use rand_pcg::Pcg64Mcg;

pub use config::{BlendMode, EmitterConfig, TextureHandle};

use crate::{
    error::Result,
    math::linear_fade,
    particle::Particle,
    render::{Canvas, Sprite},
};

/// Emitter owned by the host and referenced by any number of particle systems.
pub type SharedEmitter = Rc<RefCell<Emitter>>;

/// A point source owning a fixed pool of particle slots.
///
/// Inactive slots are reused in array order. The pool never reorders or compacts.
#[derive(Debug)]
pub struct Emitter {
    config: EmitterConfig,
    particles: Vec<Particle>,
    is_emitting: bool,
    /// Fractional particles owed by continuous emission.
    pending_emission: f32,
    rng: Pcg64Mcg,
}

impl Emitter {
    pub fn new(config: EmitterConfig) -> Result<Self> {
        let seed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        info!("Seeded emitter RNG with {}", seed);
        Self::with_seed(config, seed)
    }

    /// Fails with [`Error::Allocation`](crate::error::Error::Allocation) when
    /// the pool cannot be allocated.
    pub fn with_seed(mut config: EmitterConfig, seed: u64) -> Result<Self> {
        config.direction = config.direction.normalize_or_zero();
        let mut particles = Vec::new();
        particles.try_reserve_exact(config.capacity)?;
        particles.resize_with(config.capacity, || {
            Particle::new(config.deactivation_rule.clone())
        });

        Ok(Self {
            config,
            particles,
            is_emitting: false,
            pending_emission: 0.,
            rng: Pcg64Mcg::seed_from_u64(seed),
        })
    }

    pub fn shared(self) -> SharedEmitter {
        Rc::new(RefCell::new(self))
    }

    /// Replaces the config, resizing the pool to the new capacity.
    ///
    /// Particles in surviving slots keep their state and pick up the new
    /// deactivation rule. On error nothing is changed.
    pub fn reinit(&mut self, mut config: EmitterConfig) -> Result<()> {
        let current = self.particles.len();
        if config.capacity > current {
            self.particles
                .try_reserve_exact(config.capacity - current)?;
            self.particles
                .resize_with(config.capacity, || Particle::new(config.deactivation_rule.clone()));
        } else if config.capacity < current {
            self.particles.truncate(config.capacity);
            self.particles.shrink_to_fit();
        }
        if current != config.capacity {
            debug!("Resized particle pool from {} to {}", current, config.capacity);
        }

        config.direction = config.direction.normalize_or_zero();
        for particle in &mut self.particles {
            particle.set_rule(config.deactivation_rule.clone());
        }
        self.config = config;

        Ok(())
    }

    pub fn start(&mut self) {
        self.is_emitting = true;
    }

    pub fn stop(&mut self) {
        self.is_emitting = false;
    }

    /// Spawns a sampled number of particles into free slots, regardless of
    /// whether the emitter is emitting. Returns how many were spawned, which may
    /// be fewer than sampled when the pool runs out of free slots.
    pub fn burst(&mut self) -> usize {
        let requested = self.config.burst.sample(&mut self.rng).max(0) as usize;
        let mut emitted = 0;

        for particle in self.particles.iter_mut() {
            if emitted >= requested {
                break;
            }
            if !particle.is_active() {
                particle.init(&self.config, &mut self.rng);
                emitted += 1;
            }
        }

        emitted
    }

    /// Advances every slot by `dt` seconds, spawning owed particles into free slots.
    ///
    /// Returns the number of slots processed as active this frame. Particles
    /// retired during this call are included.
    pub fn update(&mut self, dt: f32) -> usize {
        let mut emit_now = 0;
        if self.is_emitting {
            self.pending_emission += dt * self.config.emission_rate;
            emit_now = self.pending_emission.floor().max(0.) as usize;
        }

        let rule = &self.config.deactivation_rule;
        let mut count = 0;
        for particle in self.particles.iter_mut() {
            if !particle.rule().ptr_eq(rule) {
                particle.set_rule(rule.clone());
            }
            if particle.is_active() {
                particle.update(dt);
                count += 1;
            } else if emit_now > 0 {
                particle.init(&self.config, &mut self.rng);
                particle.update(dt);
                emit_now -= 1;
                self.pending_emission -= 1.;
                count += 1;
            }
        }

        count
    }

    /// Draws every active particle with the current texture, pivot, scale and colors.
    pub fn draw<C>(&self, canvas: &mut C, blend_mode: BlendMode)
    where
        C: Canvas + ?Sized,
    {
        let config = &self.config;
        for particle in self.particles.iter().filter(|p| p.is_active()) {
            let age = particle.age();
            let sprite = Sprite {
                texture: config.texture,
                position: particle.position() - config.texture_origin,
                origin: config.texture_origin,
                scale: config.base_scale + config.scale_increase * age,
                rotation: config.base_rotation + particle.rotation_speed() * age,
                color: linear_fade(
                    config.start_color,
                    config.end_color,
                    particle.life_fraction(),
                ),
            };
            canvas.draw_sprite(&sprite, blend_mode);
        }
    }

    pub fn draw_configured<C>(&self, canvas: &mut C)
    where
        C: Canvas + ?Sized,
    {
        self.draw(canvas, self.config.blend_mode);
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Direct field access. A changed `capacity` only takes effect through
    /// [`Emitter::reinit`]; a replaced `deactivation_rule` reaches every slot
    /// on the next [`Emitter::update`].
    pub fn config_mut(&mut self) -> &mut EmitterConfig {
        &mut self.config
    }

    /// Affects spawns from now on, not particles already alive.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.config.origin = origin;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_active()).count()
    }

    pub fn is_emitting(&self) -> bool {
        self.is_emitting
    }

    pub fn pending_emission(&self) -> f32 {
        self.pending_emission
    }
}
