use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use glam::Vec2;
use log::{debug, warn};

use crate::{
    emitter::{BlendMode, Emitter, SharedEmitter},
    error::Result,
    render::Canvas,
};

/// Broadcasts lifecycle operations to a set of emitters it does not own.
///
/// Emitters are held weakly: dropping the host's last handle silently removes
/// the emitter from every broadcast. Registration order is not preserved
/// across [`ParticleSystem::deregister`].
#[derive(Debug, Default)]
pub struct ParticleSystem {
    emitters: Vec<Weak<RefCell<Emitter>>>,
    origin: Vec2,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `emitter` to the system. Duplicates are not detected.
    ///
    /// Storage doubles when full; if that fails the system is unchanged.
    pub fn register(&mut self, emitter: &SharedEmitter) -> Result<()> {
        if self.emitters.len() == self.emitters.capacity() {
            let additional = self.emitters.capacity().max(1);
            self.emitters.try_reserve_exact(additional)?;
        }
        self.emitters.push(Rc::downgrade(emitter));
        debug!("Registered emitter #{}", self.emitters.len() - 1);

        Ok(())
    }

    /// Removes the first registration of `emitter` by identity, moving the
    /// last registration into its slot. Returns whether it was found.
    pub fn deregister(&mut self, emitter: &SharedEmitter) -> bool {
        let target = Rc::as_ptr(emitter);
        match self.emitters.iter().position(|e| e.as_ptr() == target) {
            Some(index) => {
                self.emitters.swap_remove(index);
                debug!("Deregistered emitter #{}", index);
                true
            }
            None => false,
        }
    }

    /// Number of registrations, including emitters the host has since dropped.
    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn contains(&self, emitter: &SharedEmitter) -> bool {
        let target = Rc::as_ptr(emitter);
        self.emitters.iter().any(|e| e.as_ptr() == target)
    }

    /// Live emitters in registration slot order.
    pub fn emitters(&self) -> impl Iterator<Item = SharedEmitter> + '_ {
        self.emitters.iter().filter_map(Weak::upgrade)
    }

    /// Drops registrations whose emitter no longer exists. Returns how many were dropped.
    pub fn prune(&mut self) -> usize {
        let before = self.emitters.len();
        self.emitters.retain(|e| e.strong_count() > 0);
        before - self.emitters.len()
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Moves the spawn point of every emitter. Live particles are unaffected.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
        self.for_each_mut(|e| e.set_origin(origin));
    }

    pub fn start(&mut self) {
        self.for_each_mut(Emitter::start);
    }

    pub fn stop(&mut self) {
        self.for_each_mut(Emitter::stop);
    }

    /// Bursts every emitter. Returns the total number of particles spawned.
    pub fn burst(&mut self) -> usize {
        let mut emitted = 0;
        self.for_each_mut(|e| emitted += e.burst());
        emitted
    }

    /// Updates every emitter and returns the sum of their active counts.
    pub fn update(&mut self, dt: f32) -> usize {
        let mut count = 0;
        self.for_each_mut(|e| count += e.update(dt));
        count
    }

    pub fn draw<C>(&self, canvas: &mut C, blend_mode: BlendMode)
    where
        C: Canvas + ?Sized,
    {
        for (index, emitter) in self.emitters.iter().enumerate() {
            let Some(emitter) = emitter.upgrade() else {
                continue;
            };
            match emitter.try_borrow() {
                Ok(emitter) => emitter.draw(canvas, blend_mode),
                Err(_) => warn!("Skipped drawing emitter #{}: mutably borrowed", index),
            };
        }
    }

    /// Sum of active particles over all live emitters.
    pub fn active_count(&self) -> usize {
        self.emitters()
            .map(|e| e.try_borrow().map_or(0, |e| e.active_count()))
            .sum()
    }

    fn for_each_mut(&self, mut f: impl FnMut(&mut Emitter)) {
        for (index, emitter) in self.emitters.iter().enumerate() {
            let Some(emitter) = emitter.upgrade() else {
                continue;
            };
            match emitter.try_borrow_mut() {
                Ok(mut emitter) => f(&mut *emitter),
                Err(_) => warn!("Skipped emitter #{}: already borrowed", index),
            };
        }
    }
}
