//! Fixed-capacity effect pools
//!
//! Particles and debris shards are recycled, never allocated per frame. All
//! storage (slots, free list, active list) is reserved up front; `emit` only
//! hands out what is free and quietly emits fewer when the pool runs dry.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::motion::{MotionRules, integrate};
use crate::{heading_vector, rand_between};

/// How a slot fades over its life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeCurve {
    /// Opacity follows remaining life, size stays fixed (sparks)
    #[default]
    Opacity,
    /// Opacity follows remaining life and the shard shrinks to 40% (debris)
    OpacityAndScale,
}

/// Randomisation ranges for one burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burst {
    /// Radial speed range
    pub speed: (f32, f32),
    /// Lifetime range (seconds)
    pub life: (f32, f32),
    /// Base size range
    pub size: (f32, f32),
    /// Angular velocity range (radians/sec)
    pub spin: (f32, f32),
    /// RGB colour for the renderer
    pub tint: u32,
}

impl Default for Burst {
    fn default() -> Self {
        Self {
            speed: (8.0, 24.0),
            life: (0.35, 0.8),
            size: (0.25, 0.9),
            spin: (0.0, 0.0),
            tint: 0xffcc88,
        }
    }
}

/// One pooled effect object
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EffectSlot {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left
    pub life: f32,
    /// Lifetime it was emitted with
    pub ttl: f32,
    pub size: f32,
    pub rotation: f32,
    pub spin: f32,
    pub tint: u32,
    /// Derived each frame from the remaining-life fraction
    pub opacity: f32,
    pub scale: f32,
}

impl EffectSlot {
    /// Remaining-life fraction in [0, 1]
    pub fn life_fraction(&self) -> f32 {
        if self.ttl > 0.0 {
            (self.life / self.ttl).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// A fixed-size recycler for effect slots
#[derive(Debug, Clone, Default)]
pub struct EffectPool {
    slots: Vec<EffectSlot>,
    /// Indices of idle slots
    free: Vec<usize>,
    /// Indices of slots currently lent out
    active: Vec<usize>,
    rules: MotionRules,
    fade: FadeCurve,
}

impl EffectPool {
    pub fn new(capacity: usize, rules: MotionRules, fade: FadeCurve) -> Self {
        Self {
            slots: vec![EffectSlot::default(); capacity],
            // Pop from the back hands out low indices first
            free: (0..capacity).rev().collect(),
            active: Vec::with_capacity(capacity),
            rules,
            fade,
        }
    }

    /// Spark pool: no wrap, opacity fade
    pub fn particles(capacity: usize) -> Self {
        Self::new(capacity, MotionRules::BALLISTIC, FadeCurve::Opacity)
    }

    /// Debris pool: wraps at arena edges, fades and shrinks
    pub fn debris(capacity: usize) -> Self {
        Self::new(capacity, MotionRules::DRIFT, FadeCurve::OpacityAndScale)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Lend out up to `count` slots at `origin`. Returns how many were emitted.
    pub fn emit<R: Rng + ?Sized>(
        &mut self,
        origin: Vec2,
        count: usize,
        burst: &Burst,
        rng: &mut R,
    ) -> usize {
        let mut emitted = 0;
        while emitted < count {
            let Some(index) = self.free.pop() else {
                break;
            };

            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rand_between(rng, burst.speed.0, burst.speed.1);
            let ttl = rand_between(rng, burst.life.0, burst.life.1);
            let size = rand_between(rng, burst.size.0, burst.size.1);
            let spin = rand_between(rng, burst.spin.0, burst.spin.1);
            let rotation = if burst.spin == (0.0, 0.0) {
                0.0
            } else {
                rng.random_range(0.0..std::f32::consts::TAU)
            };

            self.slots[index] = EffectSlot {
                pos: origin,
                vel: heading_vector(angle) * speed,
                life: ttl,
                ttl,
                size,
                rotation,
                spin,
                tint: burst.tint,
                opacity: 1.0,
                scale: size,
            };
            self.active.push(index);
            emitted += 1;
        }
        emitted
    }

    /// Age every active slot; expired ones go back on the free list
    pub fn advance(&mut self, dt: f32) {
        let mut i = self.active.len();
        while i > 0 {
            i -= 1;
            let index = self.active[i];
            let slot = &mut self.slots[index];
            slot.life -= dt;
            if slot.life <= 0.0 {
                slot.opacity = 0.0;
                self.active.swap_remove(i);
                self.free.push(index);
                continue;
            }

            integrate(slot, Vec2::ZERO, &self.rules, dt);
            slot.rotation += slot.spin * dt;

            let t = slot.life_fraction();
            slot.opacity = t;
            slot.scale = match self.fade {
                FadeCurve::Opacity => slot.size,
                FadeCurve::OpacityAndScale => slot.size * (0.4 + 0.6 * t),
            };
        }
    }

    /// Return every slot to the pool
    pub fn clear(&mut self) {
        for index in self.active.drain(..) {
            self.slots[index].opacity = 0.0;
            self.free.push(index);
        }
    }

    /// Slots currently lent out (for rendering)
    pub fn iter_active(&self) -> impl Iterator<Item = &EffectSlot> + '_ {
        self.active.iter().map(|&i| &self.slots[i])
    }
}
