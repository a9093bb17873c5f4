//! Motion integration
//!
//! One integrator for everything that moves: acceleration, speed clamp,
//! friction, then position and toroidal wrap.

use glam::Vec2;

use super::pool::EffectSlot;
use super::state::{Asteroid, Bullet, Enemy, Ship};
use crate::consts::*;
use crate::{clamp_speed, heading_vector, wrap_position};

/// Anything with a position and a velocity
pub trait Body {
    /// Position and velocity, mutably
    fn kinematics_mut(&mut self) -> (&mut Vec2, &mut Vec2);
}

/// Per-entity integration rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionRules {
    /// Velocity retained per update (1.0 = no friction)
    pub friction: f32,
    /// Speed cap, if any
    pub max_speed: Option<f32>,
    /// Teleport across arena edges
    pub wrap: bool,
}

impl MotionRules {
    /// Free drift with wrap (asteroids, bullets, debris)
    pub const DRIFT: Self = Self {
        friction: 1.0,
        max_speed: None,
        wrap: true,
    };

    /// Free drift, no wrap (particles)
    pub const BALLISTIC: Self = Self {
        friction: 1.0,
        max_speed: None,
        wrap: false,
    };

    /// Ship handling at the given engine multiplier
    pub fn ship(engine_mul: f32) -> Self {
        Self {
            friction: SHIP_FRICTION,
            max_speed: Some(SHIP_MAX_SPEED * engine_mul),
            wrap: true,
        }
    }

    /// Hunter handling
    pub const ENEMY: Self = Self {
        friction: 1.0,
        max_speed: Some(ENEMY_MAX_SPEED),
        wrap: true,
    };
}

impl Default for MotionRules {
    fn default() -> Self {
        MotionRules::BALLISTIC
    }
}

/// Advance a body by one step
pub fn integrate<B: Body + ?Sized>(body: &mut B, accel: Vec2, rules: &MotionRules, dt: f32) {
    let (pos, vel) = body.kinematics_mut();
    *vel += accel * dt;
    if let Some(max) = rules.max_speed {
        *vel = clamp_speed(*vel, max);
    }
    *vel *= rules.friction;
    *pos += *vel * dt;
    if rules.wrap {
        *pos = wrap_position(*pos);
    }
}

impl Ship {
    /// Apply turn input and return the thrust acceleration for this step
    pub fn steer(
        &mut self,
        turn_left: bool,
        turn_right: bool,
        thrust: bool,
        engine_mul: f32,
        dt: f32,
    ) -> Vec2 {
        if turn_left {
            self.heading += SHIP_TURN_RATE * dt;
        }
        if turn_right {
            self.heading -= SHIP_TURN_RATE * dt;
        }
        self.thrusting = thrust;
        if thrust {
            heading_vector(self.heading) * SHIP_ACCEL * engine_mul
        } else {
            Vec2::ZERO
        }
    }
}

impl Enemy {
    /// Hold the preferred range from `target` while strafing around it.
    ///
    /// Also turns the hunter to face the target. Returns the acceleration and
    /// the distance to the target.
    pub fn steer_toward(&mut self, target: Vec2) -> (Vec2, f32) {
        let delta = target - self.pos;
        let dist = delta.length() + 1e-3;
        let dir = delta / dist;
        let toward = if dist > ENEMY_PREFERRED_DIST { 1.0 } else { -1.0 };
        let strafe = dir.perp() * ENEMY_STRAFE;
        self.heading = delta.y.atan2(delta.x);
        ((dir * toward + strafe) * ENEMY_ACCEL, dist)
    }
}

impl Body for Ship {
    fn kinematics_mut(&mut self) -> (&mut Vec2, &mut Vec2) {
        (&mut self.pos, &mut self.vel)
    }
}

impl Body for Asteroid {
    fn kinematics_mut(&mut self) -> (&mut Vec2, &mut Vec2) {
        (&mut self.pos, &mut self.vel)
    }
}

impl Body for Bullet {
    fn kinematics_mut(&mut self) -> (&mut Vec2, &mut Vec2) {
        (&mut self.pos, &mut self.vel)
    }
}

impl Body for Enemy {
    fn kinematics_mut(&mut self) -> (&mut Vec2, &mut Vec2) {
        (&mut self.pos, &mut self.vel)
    }
}

impl Body for EffectSlot {
    fn kinematics_mut(&mut self) -> (&mut Vec2, &mut Vec2) {
        (&mut self.pos, &mut self.vel)
    }
}
