//! Per-frame simulation tick
//!
//! One variable-delta gameplay update per rendered frame, clamped by
//! `FrameClock`. Gameplay only advances while the run is live; effects keep
//! animating through the upgrade gate and after game over.

use glam::Vec2;
use rand::Rng;

use super::collision::resolve_collisions;
use super::motion::{MotionRules, integrate};
use super::pool::Burst;
use super::spawn;
use super::state::{Bullet, GameEvent, GamePhase, GameState};
use super::upgrade;
use crate::consts::*;
use crate::normalize_angle;

/// Engine exhaust puffs
const EXHAUST: Burst = Burst {
    speed: (10.0, 18.0),
    life: (0.15, 0.28),
    size: (0.18, 0.35),
    spin: (0.0, 0.0),
    tint: 0x88bbff,
};

/// Muzzle flash on each shot
const MUZZLE_FLASH: Burst = Burst {
    speed: (10.0, 26.0),
    life: (0.08, 0.18),
    size: (0.18, 0.5),
    spin: (0.0, 0.0),
    tint: 0xffe6aa,
};

/// Input intents for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
    /// Held fire; shots are paced by the cooldown
    pub fire: bool,
    /// Start a fresh run (edge-triggered)
    pub restart: bool,
    /// Pick an option from the open upgrade offer (edge-triggered)
    pub choose_upgrade: Option<usize>,
}

/// Turns wall-clock timestamps into clamped frame deltas
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous call, clamped to [0, MAX_FRAME_DT].
    /// The first call returns 0.
    pub fn delta(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (now - last) as f32,
            None => 0.0,
        };
        self.last = Some(now);
        dt.clamp(0.0, MAX_FRAME_DT)
    }
}

/// Advance the run by one frame.
///
/// Events left undrained from the previous frame are dropped; after the call
/// `events()` holds only what this frame raised (plus `RunStarted` on restart).
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.restart {
        state.reset();
    } else {
        state.clear_events();
    }
    if let Some(index) = input.choose_upgrade {
        upgrade::choose(state, index);
    }

    if state.phase == GamePhase::Running {
        update(state, input, dt);
    }

    if state.phase != GamePhase::GameOver {
        spawn::advance_beacons(state, dt);
    }

    // Presentation keeps moving whatever the phase
    state.shake.advance(dt, &mut state.rng);
    state.particles.advance(dt);
    state.debris.advance(dt);
}

/// One gameplay update
fn update(state: &mut GameState, input: &TickInput, dt: f32) {
    state.invulnerability = (state.invulnerability - dt).max(0.0);

    update_ship(state, input, dt);
    update_bullets(state, dt);

    for asteroid in &mut state.entities.asteroids {
        integrate(asteroid, Vec2::ZERO, &MotionRules::DRIFT, dt);
        asteroid.rotation += asteroid.spin * dt;
    }

    update_enemies(state, dt);

    resolve_collisions(state);

    // Wave cleared once the rocks are gone; hunters don't hold the gate
    if state.phase == GamePhase::Running && state.entities.asteroids.is_empty() {
        upgrade::open_gate(state);
    }

    state.combo.advance(dt);
    state.elapsed += dt as f64;
}

fn update_ship(state: &mut GameState, input: &TickInput, dt: f32) {
    let engine_mul = state.mods.engine_mul;
    let ship = &mut state.ship;
    let accel = ship.steer(input.turn_left, input.turn_right, input.thrust, engine_mul, dt);
    integrate(ship, accel, &MotionRules::ship(engine_mul), dt);

    if state.ship.thrusting && state.rng.random_bool(0.5) {
        let tail = state.ship.nose(-1.2);
        state.emit_particles(tail, 2, &EXHAUST);
    }

    state.ship.fire_cooldown = (state.ship.fire_cooldown - dt).max(0.0);
    if input.fire && state.ship.fire_cooldown <= 0.0 {
        fire(state);
    }
}

/// Player volley: one bullet, or three with spread shot
fn fire(state: &mut GameState) {
    state.ship.fire_cooldown = state.mods.fire_interval();

    let origin = state.ship.nose(SHIP_MUZZLE_OFFSET);
    let heading = state.ship.heading;
    let inherit = state.ship.vel;
    let pierce = state.mods.pierce_charges();

    let offsets: &[f32] = if state.mods.spread {
        &[-SPREAD_ANGLE, 0.0, SPREAD_ANGLE]
    } else {
        &[0.0]
    };
    for offset in offsets {
        let id = state.next_entity_id();
        let bullet = Bullet::player(id, origin, heading + offset, inherit, pierce);
        state.entities.bullets.push(bullet);
    }

    state.kick_shake(0.15, 0.06);
    let flash = state.ship.nose(1.2);
    state.emit_particles(flash, 6, &MUZZLE_FLASH);
    state.push_event(GameEvent::ShotFired {
        pos: origin,
        bullets: offsets.len() as u8,
    });
}

fn update_bullets(state: &mut GameState, dt: f32) {
    let entities = &mut state.entities;
    for bullet in entities
        .bullets
        .iter_mut()
        .chain(entities.enemy_bullets.iter_mut())
    {
        bullet.ttl -= dt;
        if bullet.ttl <= 0.0 {
            bullet.alive = false;
            continue;
        }
        integrate(bullet, Vec2::ZERO, &MotionRules::DRIFT, dt);
    }
    entities.bullets.retain(|b| b.alive);
    entities.enemy_bullets.retain(|b| b.alive);
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let target = state.ship.pos;
    for i in 0..state.entities.enemies.len() {
        let enemy = &mut state.entities.enemies[i];
        let (accel, dist) = enemy.steer_toward(target);
        integrate(enemy, accel, &MotionRules::ENEMY, dt);

        enemy.fire_cooldown -= dt;
        if enemy.fire_cooldown > 0.0 || dist >= ENEMY_FIRE_RANGE {
            continue;
        }
        enemy.fire_cooldown = ENEMY_FIRE_INTERVAL;
        let heading = enemy.heading;
        let muzzle = enemy.pos + crate::heading_vector(heading) * ENEMY_MUZZLE_OFFSET;

        let id = state.next_entity_id();
        state
            .entities
            .enemy_bullets
            .push(Bullet::enemy(id, muzzle, heading));
    }
}

/// Demo pilot: swing toward the nearest target, shoot when lined up and
/// take the first upgrade on offer.
pub fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput::default();

    if state.phase == GamePhase::UpgradeChoice {
        input.choose_upgrade = Some(0);
        return input;
    }
    if state.phase != GamePhase::Running {
        return input;
    }

    let ship = &state.ship;
    let targets = state
        .entities
        .asteroids
        .iter()
        .map(|a| a.pos)
        .chain(state.entities.enemies.iter().map(|e| e.pos));
    let Some(target) = targets.min_by(|a, b| {
        a.distance_squared(ship.pos)
            .total_cmp(&b.distance_squared(ship.pos))
    }) else {
        return input;
    };

    let delta = target - ship.pos;
    let aim = normalize_angle(delta.y.atan2(delta.x) - ship.heading);
    input.turn_left = aim > 0.05;
    input.turn_right = aim < -0.05;
    input.fire = aim.abs() < 0.3;
    input.thrust = aim.abs() < 0.5 && delta.length() > 25.0;
    input
}
