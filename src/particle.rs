use std::{fmt, rc::Rc};

use glam::Vec2;
use rand::Rng;

use crate::{emitter::EmitterConfig, math::rotate_degrees};

pub trait Deactivator {
    fn should_deactivate(&self, particle: &Particle) -> bool;
}

/// Retires a particle once its age exceeds its time to live.
#[derive(Debug, Copy, Clone, Default)]
pub struct AgeLimit;

impl Deactivator for AgeLimit {
    fn should_deactivate(&self, particle: &Particle) -> bool {
        particle.age > particle.time_to_live
    }
}

impl<F> Deactivator for F
where
    F: Fn(&Particle) -> bool,
{
    fn should_deactivate(&self, particle: &Particle) -> bool {
        self(particle)
    }
}

/// Shared handle to a [`Deactivator`]. Cloned into every particle slot of an emitter.
#[derive(Clone)]
pub struct DeactivationRule(Rc<dyn Deactivator>);

impl DeactivationRule {
    pub fn new(deactivator: impl Deactivator + 'static) -> Self {
        Self(Rc::new(deactivator))
    }

    pub fn age_limit() -> Self {
        Self::new(AgeLimit)
    }

    pub fn should_deactivate(&self, particle: &Particle) -> bool {
        self.0.should_deactivate(particle)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for DeactivationRule {
    fn default() -> Self {
        Self::age_limit()
    }
}

impl fmt::Debug for DeactivationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DeactivationRule")
            .field(&Rc::as_ptr(&self.0))
            .finish()
    }
}

/// A single simulated point. Lives in a fixed slot of an emitter's pool.
#[derive(Debug, Clone)]
pub struct Particle {
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    origin: Vec2,
    radial_acceleration: f32,
    rotation_speed: f32,
    age: f32,
    time_to_live: f32,
    active: bool,
    rule: DeactivationRule,
}

impl Particle {
    /// An inactive particle retired by `rule`.
    pub fn new(rule: DeactivationRule) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            origin: Vec2::ZERO,
            radial_acceleration: 0.,
            rotation_speed: 0.,
            age: 0.,
            time_to_live: 0.,
            active: false,
            rule,
        }
    }

    /// Spawns the particle at `config.origin`.
    ///
    /// It moves along `config.direction` rotated by a sample of
    /// `direction_angle` and then by a sample of `velocity_angle`.
    pub fn init(&mut self, config: &EmitterConfig, rng: &mut impl Rng) {
        let heading = rotate_degrees(config.direction, config.direction_angle.sample(rng));
        let speed = config.velocity.sample(rng);
        let course = rotate_degrees(heading, config.velocity_angle.sample(rng));

        self.origin = config.origin;
        self.position = config.origin;
        self.velocity = course * speed;
        self.acceleration = config.external_acceleration;
        self.radial_acceleration = config.origin_acceleration.sample(rng);
        self.rotation_speed = config.rotation_speed.sample(rng);
        self.time_to_live = config.age.sample(rng);
        self.age = 0.;
        self.active = true;
    }

    /// A particle retired by this call does not move.
    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }

        self.age += dt;

        if self.rule.should_deactivate(self) {
            self.active = false;
            return;
        }

        let outward = (self.position - self.origin).normalize_or_zero();
        let acceleration = self.acceleration + outward * self.radial_acceleration;

        // Velocity first, then position.
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn radial_acceleration(&self) -> f32 {
        self.radial_acceleration
    }

    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn time_to_live(&self) -> f32 {
        self.time_to_live
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `age / time_to_live`, clamped to `[0, 1]`.
    pub fn life_fraction(&self) -> f32 {
        if self.time_to_live <= 0. {
            return 1.;
        }
        (self.age / self.time_to_live).clamp(0., 1.)
    }

    pub fn rule(&self) -> &DeactivationRule {
        &self.rule
    }

    pub fn set_rule(&mut self, rule: DeactivationRule) {
        self.rule = rule;
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(DeactivationRule::default())
    }
}
