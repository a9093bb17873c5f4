//! Wave composition and spawning
//!
//! Waves start with a ring of large asteroids drifting inward. From wave 3
//! hunters join, each announced by a beacon that counts down before the
//! hunter appears at the beacon's position.

use glam::Vec2;
use serde::Serialize;

use super::state::{Asteroid, AsteroidSize, Enemy, GameEvent, GameState};
use crate::consts::*;
use crate::{heading_vector, rand_sign};

/// Telegraph marker for an incoming hunter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Beacon {
    pub id: u32,
    /// Where the hunter will appear
    pub pos: Vec2,
    /// Seconds until it appears
    pub remaining: f32,
    /// Seconds since the beacon went up (drives the ring animation)
    pub elapsed: f32,
}

impl Beacon {
    /// Expanding ring scale
    pub fn ring_scale(&self) -> f32 {
        0.2 + self.elapsed * 3.0
    }

    /// Ring fades as it expands
    pub fn ring_opacity(&self) -> f32 {
        (0.9 - self.elapsed * 0.7).max(0.0)
    }
}

/// Scheduled hunter arrivals
#[derive(Debug, Clone, Default)]
pub struct SpawnDirector {
    pub beacons: Vec<Beacon>,
}

impl SpawnDirector {
    pub fn schedule(&mut self, beacon: Beacon) {
        self.beacons.push(beacon);
    }

    pub fn pending(&self) -> usize {
        self.beacons.len()
    }
}

/// Large asteroids in a wave
pub fn asteroids_for_wave(wave: u32) -> u32 {
    WAVE_BASE_ASTEROIDS + wave
}

/// Hunters scheduled for a wave
pub fn enemies_for_wave(wave: u32) -> u32 {
    if wave < ENEMY_FIRST_WAVE {
        return 0;
    }
    (1 + (wave - 2) / 2).min(MAX_ENEMIES_PER_WAVE)
}

/// Populate the current wave: large asteroids now, hunters via beacons
pub fn spawn_wave(state: &mut GameState) {
    let wave = state.wave;
    let count = asteroids_for_wave(wave);

    for _ in 0..count {
        let x = rand_sign(&mut state.rng)
            * state.rand_range(ARENA_WIDTH * 0.25, ARENA_WIDTH * 0.45);
        let y = rand_sign(&mut state.rng)
            * state.rand_range(ARENA_HEIGHT * 0.25, ARENA_HEIGHT * 0.45);
        // Aim roughly back at the centre
        let angle = (-y).atan2(-x) + state.rand_range(-0.6, 0.6);
        let speed = ASTEROID_BASE_SPEED * state.rand_range(0.6, 1.2)
            + wave as f32 * WAVE_SPEED_BONUS;
        let spin = state.rand_range(-1.0, 1.0);

        let id = state.next_entity_id();
        let mut asteroid = Asteroid::new(
            id,
            AsteroidSize::Large,
            Vec2::new(x, y),
            heading_vector(angle) * speed,
            spin,
        );
        asteroid.rotation = state.rand_range(0.0, std::f32::consts::TAU);
        state.entities.asteroids.push(asteroid);
    }

    log::info!("Wave {}: {} asteroids", wave, count);
    state.push_event(GameEvent::WaveStarted {
        wave,
        asteroids: count,
    });

    schedule_enemies(state);
}

fn schedule_enemies(state: &mut GameState) {
    let count = enemies_for_wave(state.wave);
    for _ in 0..count {
        let x = rand_sign(&mut state.rng)
            * state.rand_range(ARENA_WIDTH * 0.35, ARENA_WIDTH * 0.48);
        let y = rand_sign(&mut state.rng)
            * state.rand_range(ARENA_HEIGHT * 0.35, ARENA_HEIGHT * 0.48);
        let delay = BEACON_DELAY_MIN + state.rand_range(0.0, BEACON_DELAY_JITTER);
        schedule_beacon(state, Vec2::new(x, y), delay);
    }
}

/// Put up a beacon that turns into a hunter after `delay` seconds
pub fn schedule_beacon(state: &mut GameState, pos: Vec2, delay: f32) {
    let id = state.next_entity_id();
    state.director.schedule(Beacon {
        id,
        pos,
        remaining: delay,
        elapsed: 0.0,
    });
    log::debug!("Beacon {} at ({:.1}, {:.1}), {:.2}s", id, pos.x, pos.y, delay);
    state.push_event(GameEvent::EnemyTelegraphed { pos, delay });
}

/// Count beacons down; each expired beacon becomes exactly one hunter
pub fn advance_beacons(state: &mut GameState, dt: f32) {
    let mut i = 0;
    while i < state.director.beacons.len() {
        let beacon = &mut state.director.beacons[i];
        beacon.remaining -= dt;
        beacon.elapsed += dt;
        if beacon.remaining <= 0.0 {
            let beacon = state.director.beacons.swap_remove(i);
            spawn_enemy(state, beacon.pos);
        } else {
            i += 1;
        }
    }
}

/// Create a hunter at `pos`
pub fn spawn_enemy(state: &mut GameState, pos: Vec2) {
    let id = state.next_entity_id();
    let cooldown = state.rand_range(ENEMY_FIRST_SHOT_MIN, ENEMY_FIRE_INTERVAL);
    state.entities.enemies.push(Enemy::new(id, pos, cooldown));
    log::debug!("Hunter {} spawned at ({:.1}, {:.1})", id, pos.x, pos.y);
    state.push_event(GameEvent::EnemySpawned { pos });
}

/// Break `parent` into its next-size children, appended to the live set.
///
/// Terminal sizes produce nothing. Returns the number of children.
pub fn split_asteroid(state: &mut GameState, parent: &Asteroid) -> usize {
    let Some(next) = parent.size.next() else {
        return 0;
    };

    let count = parent.size.child_count();
    for _ in 0..count {
        let angle = state.rand_range(0.0, std::f32::consts::TAU);
        let speed = state.rand_range(ASTEROID_BASE_SPEED * 0.6, ASTEROID_BASE_SPEED * 1.2);
        let vel = heading_vector(angle) * speed + parent.vel * CHILD_VELOCITY_INHERIT;
        let spin = state.rand_range(-1.0, 1.0);

        let id = state.next_entity_id();
        let mut child = Asteroid::new(id, next, parent.pos, vel, spin);
        child.rotation = state.rand_range(0.0, std::f32::consts::TAU);
        state.entities.asteroids.push(child);
    }
    count
}
