//! Vector Drift - a wrap-around arena shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, motion, collisions, waves, upgrades, effect pools)
//! - `settings`: Presentation preferences (effect density, screen shake)

pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings};

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the simulation accepts (seconds)
    pub const MAX_FRAME_DT: f32 = 0.033;

    /// Arena dimensions (centred on the origin, wraps on every edge)
    pub const ARENA_WIDTH: f32 = 90.0;
    pub const ARENA_HEIGHT: f32 = 60.0;

    /// Ship handling
    pub const SHIP_RADIUS: f32 = 1.0;
    pub const SHIP_ACCEL: f32 = 40.0;
    pub const SHIP_MAX_SPEED: f32 = 40.0;
    /// Per-update velocity retention
    pub const SHIP_FRICTION: f32 = 0.98;
    /// Turn rate (radians/sec)
    pub const SHIP_TURN_RATE: f32 = 3.2;
    /// Seconds between shots at fire-rate multiplier 1.0
    pub const SHIP_FIRE_INTERVAL: f32 = 0.16;
    /// Bullets leave the ship this far ahead of its centre
    pub const SHIP_MUZZLE_OFFSET: f32 = 1.4;
    /// Side-bullet angle for spread shot (radians)
    pub const SPREAD_ANGLE: f32 = 0.18;
    /// Grace period at the start of a run (seconds)
    pub const SPAWN_INVULNERABILITY: f32 = 2.0;
    /// Grace period after a shield charge absorbs a hit (seconds)
    pub const SHIELD_GRACE: f32 = 1.0;

    /// Player bullets
    pub const BULLET_SPEED: f32 = 70.0;
    pub const BULLET_LIFE: f32 = 1.1;
    pub const BULLET_RADIUS: f32 = 0.4;

    /// Asteroids
    pub const ASTEROID_BASE_SPEED: f32 = 8.0;
    /// Collision radius relative to the visual radius
    pub const ASTEROID_HITBOX_SCALE: f32 = 0.9;
    /// Fraction of the parent's velocity each child keeps
    pub const CHILD_VELOCITY_INHERIT: f32 = 0.2;
    /// Extra asteroid speed per wave
    pub const WAVE_SPEED_BONUS: f32 = 0.3;
    /// Large asteroids in wave n: BASE + n
    pub const WAVE_BASE_ASTEROIDS: u32 = 3;

    /// Hunter enemies
    pub const ENEMY_RADIUS: f32 = 1.2;
    pub const ENEMY_ACCEL: f32 = 20.0;
    pub const ENEMY_MAX_SPEED: f32 = 26.0;
    pub const ENEMY_FIRE_INTERVAL: f32 = 0.9;
    pub const ENEMY_FIRST_SHOT_MIN: f32 = 0.2;
    pub const ENEMY_FIRE_RANGE: f32 = 45.0;
    pub const ENEMY_MUZZLE_OFFSET: f32 = 1.2;
    pub const ENEMY_PREFERRED_DIST: f32 = 14.0;
    /// Sideways component of the hunter's steering
    pub const ENEMY_STRAFE: f32 = 0.35;
    pub const ENEMY_SCORE: u32 = 150;
    pub const ENEMY_BULLET_SPEED: f32 = 55.0;
    pub const ENEMY_BULLET_LIFE: f32 = 1.6;
    pub const ENEMY_BULLET_RADIUS: f32 = 0.35;
    /// First wave that brings hunters
    pub const ENEMY_FIRST_WAVE: u32 = 3;
    pub const MAX_ENEMIES_PER_WAVE: u32 = 4;

    /// Telegraph delay before a hunter appears: MIN + [0, JITTER)
    pub const BEACON_DELAY_MIN: f32 = 1.1;
    pub const BEACON_DELAY_JITTER: f32 = 0.4;

    /// Combo scoring
    pub const COMBO_WINDOW: f32 = 2.3;
    /// Fixed decay step, independent of the frame delta
    pub const COMBO_DECAY_STEP: f32 = 0.25;
    /// Score bonus per combo step above 1
    pub const COMBO_BONUS: f64 = 0.2;

    /// Upgrades
    pub const UPGRADE_CHOICES: usize = 3;
    pub const RAPID_FIRE_MULTIPLIER: f32 = 1.3;
    pub const ENGINE_BOOST_MULTIPLIER: f32 = 1.2;
    pub const PIERCE_CHARGES: u8 = 1;

    /// Effect pool capacities at the default quality preset
    pub const PARTICLE_POOL_SIZE: usize = 350;
    pub const DEBRIS_POOL_SIZE: usize = 260;
}

/// Wrap a position into the arena (teleport to the opposite edge).
///
/// Points exactly on an edge are left alone, so wrapping is idempotent.
#[inline]
pub fn wrap_position(mut pos: Vec2) -> Vec2 {
    use consts::{ARENA_HEIGHT, ARENA_WIDTH};
    let hw = ARENA_WIDTH * 0.5;
    let hh = ARENA_HEIGHT * 0.5;
    if pos.x > hw {
        pos.x = -hw;
    } else if pos.x < -hw {
        pos.x = hw;
    }
    if pos.y > hh {
        pos.y = -hh;
    } else if pos.y < -hh {
        pos.y = hh;
    }
    pos
}

/// Unit vector for a heading angle
#[inline]
pub fn heading_vector(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Normalize angle to [-PI, PI)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while angle >= PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}

/// Clamp velocity magnitude, preserving direction
#[inline]
pub fn clamp_speed(vel: Vec2, max: f32) -> Vec2 {
    vel.clamp_length_max(max)
}

/// Uniform sample in [min, max); returns `min` for an empty range
#[inline]
pub fn rand_between<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// Random -1.0 or 1.0
#[inline]
pub fn rand_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { 1.0 } else { -1.0 }
}
