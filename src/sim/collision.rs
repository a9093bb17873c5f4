//! Collision detection and response
//!
//! Circle-vs-circle only. Four passes per frame, in order: player bullets vs
//! asteroids, player bullets vs hunters, asteroids vs ship, hunters and their
//! bullets vs ship. Kills are marked dead during the passes and compacted at
//! the end, so nothing is skipped or visited twice.

use glam::Vec2;

use super::pool::Burst;
use super::spawn;
use super::state::{Bullet, GameEvent, GamePhase, GameState, HIT_ASTEROID, HIT_ENEMY};
use crate::consts::*;

/// Sparks from a shattered asteroid
pub const ASTEROID_SPARKS: Burst = Burst {
    speed: (12.0, 36.0),
    life: (0.25, 0.6),
    size: (0.25, 1.0),
    spin: (0.0, 0.0),
    tint: 0xaad0ff,
};

/// Sparks from a downed hunter
pub const ENEMY_SPARKS: Burst = Burst {
    speed: (14.0, 34.0),
    life: (0.25, 0.55),
    size: (0.22, 0.8),
    spin: (0.0, 0.0),
    tint: 0xffaaaa,
};

/// Rock shards (debris pool)
pub const DEBRIS_SHARDS: Burst = Burst {
    speed: (6.0, 20.0),
    life: (0.6, 1.3),
    size: (1.0, 1.0),
    spin: (-4.0, 4.0),
    tint: 0x8a93a6,
};

/// Shield flare when a charge eats an asteroid hit
pub const SHIELD_FLARE: Burst = Burst {
    speed: (20.0, 40.0),
    life: (0.2, 0.5),
    size: (0.3, 1.2),
    spin: (0.0, 0.0),
    tint: 0x66ccff,
};

/// Smaller flare for hunter rams and hunter bullets
pub const SHIELD_GLANCE: Burst = Burst {
    speed: (18.0, 36.0),
    life: (0.2, 0.45),
    size: (0.3, 1.0),
    spin: (0.0, 0.0),
    tint: 0x66ccff,
};

/// Hunter debris count base
const ENEMY_DEBRIS: usize = 8;

/// Something that hit the ship, by index into its collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    Asteroid(usize),
    Enemy(usize),
    EnemyBullet(usize),
}

impl Hazard {
    /// Shield feedback: (flare burst, particle count, shake magnitude, shake time)
    fn absorb_feedback(self) -> (&'static Burst, usize, f32, f32) {
        match self {
            Hazard::Asteroid(_) => (&SHIELD_FLARE, 24, 0.8, 0.2),
            Hazard::Enemy(_) => (&SHIELD_GLANCE, 20, 0.6, 0.12),
            Hazard::EnemyBullet(_) => (&SHIELD_GLANCE, 20, 0.5, 0.12),
        }
    }
}

/// Two circles touch iff the squared centre distance is within the summed radii
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) <= reach * reach
}

/// Run every collision pass for this frame, then drop the dead
pub fn resolve_collisions(state: &mut GameState) {
    for bullet in &mut state.entities.bullets {
        bullet.struck = 0;
    }

    player_bullets_vs_asteroids(state);
    player_bullets_vs_enemies(state);
    ship_vs_hazards(state);

    state.entities.prune();
}

/// First live bullet touching the circle that hasn't already hit this kind
fn find_bullet(bullets: &[Bullet], pos: Vec2, radius: f32, kind: u8) -> Option<usize> {
    bullets.iter().position(|b| {
        b.alive && b.struck & kind == 0 && circles_overlap(b.pos, b.radius, pos, radius)
    })
}

fn player_bullets_vs_asteroids(state: &mut GameState) {
    // Children appended during the pass sit past `count` and wait a frame
    let count = state.entities.asteroids.len();
    for i in 0..count {
        let asteroid = state.entities.asteroids[i];
        if !asteroid.alive {
            continue;
        }
        let Some(b) = find_bullet(
            &state.entities.bullets,
            asteroid.pos,
            asteroid.radius,
            HIT_ASTEROID,
        ) else {
            continue;
        };

        let bullet = &mut state.entities.bullets[b];
        bullet.struck |= HIT_ASTEROID;
        bullet.spend();
        destroy_asteroid(state, i, true);
    }
}

fn player_bullets_vs_enemies(state: &mut GameState) {
    for i in 0..state.entities.enemies.len() {
        let enemy = state.entities.enemies[i];
        if !enemy.alive {
            continue;
        }
        let Some(b) = find_bullet(&state.entities.bullets, enemy.pos, enemy.radius, HIT_ENEMY)
        else {
            continue;
        };

        let bullet = &mut state.entities.bullets[b];
        bullet.struck |= HIT_ENEMY;
        bullet.spend();
        destroy_enemy(state, i, true);
    }
}

fn ship_vs_hazards(state: &mut GameState) {
    if !state.ship.alive {
        return;
    }

    let pos = state.ship.pos;
    let radius = state.ship.radius;

    if exposed(state) {
        let hit = state
            .entities
            .asteroids
            .iter()
            .position(|a| a.alive && circles_overlap(a.pos, a.radius, pos, radius));
        if let Some(i) = hit {
            ship_struck(state, Hazard::Asteroid(i));
        }
    }

    if exposed(state) {
        let hit = state
            .entities
            .enemies
            .iter()
            .position(|e| e.alive && circles_overlap(e.pos, e.radius, pos, radius));
        if let Some(i) = hit {
            ship_struck(state, Hazard::Enemy(i));
        }
    }

    if exposed(state) {
        let hit = state
            .entities
            .enemy_bullets
            .iter()
            .position(|b| b.alive && circles_overlap(b.pos, b.radius, pos, radius));
        if let Some(i) = hit {
            ship_struck(state, Hazard::EnemyBullet(i));
        }
    }
}

/// Ship can be hurt right now
fn exposed(state: &GameState) -> bool {
    state.ship.alive && state.invulnerability <= 0.0
}

/// The hazard is spent on impact; a shield charge saves the ship, otherwise
/// the run is over.
fn ship_struck(state: &mut GameState, hazard: Hazard) {
    match hazard {
        Hazard::Asteroid(i) => destroy_asteroid(state, i, false),
        Hazard::Enemy(i) => destroy_enemy(state, i, false),
        Hazard::EnemyBullet(i) => state.entities.enemy_bullets[i].alive = false,
    }

    if state.mods.shields == 0 {
        game_over(state);
        return;
    }

    state.mods.shields -= 1;
    state.invulnerability = SHIELD_GRACE;

    let pos = state.ship.pos;
    let (flare, count, magnitude, duration) = hazard.absorb_feedback();
    state.emit_particles(pos, count, flare);
    state.kick_shake(magnitude, duration);

    log::debug!("Shield absorbed {:?}, {} left", hazard, state.mods.shields);
    state.push_event(GameEvent::ShieldAbsorbed {
        pos,
        shields_left: state.mods.shields,
    });
}

/// Kill asteroid `index`: effects, split, and score when `award` is set
pub fn destroy_asteroid(state: &mut GameState, index: usize, award: bool) {
    let asteroid = state.entities.asteroids[index];
    state.entities.asteroids[index].alive = false;

    let points = if award {
        let points = state.combo.register_kill(asteroid.size.score());
        state.score += points;
        points
    } else {
        0
    };

    state.emit_particles(asteroid.pos, 16, &ASTEROID_SPARKS);
    let shards = (asteroid.size.nominal_radius() * 2.0) as usize;
    state.emit_debris(asteroid.pos, shards, &DEBRIS_SHARDS);
    spawn::split_asteroid(state, &asteroid);
    state.kick_shake(0.5, 0.12);

    state.push_event(GameEvent::AsteroidDestroyed {
        pos: asteroid.pos,
        size: asteroid.size,
        points,
    });
}

/// Kill hunter `index`: effects, and score when `award` is set
pub fn destroy_enemy(state: &mut GameState, index: usize, award: bool) {
    let enemy = state.entities.enemies[index];
    state.entities.enemies[index].alive = false;

    let points = if award {
        let points = state.combo.register_kill(ENEMY_SCORE);
        state.score += points;
        points
    } else {
        0
    };

    state.emit_particles(enemy.pos, 18, &ENEMY_SPARKS);
    state.emit_debris(enemy.pos, ENEMY_DEBRIS, &DEBRIS_SHARDS);
    state.kick_shake(0.6, 0.12);

    state.push_event(GameEvent::EnemyDestroyed {
        pos: enemy.pos,
        points,
    });
}

/// End the run. Only a restart leaves this state.
pub fn game_over(state: &mut GameState) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.phase = GamePhase::GameOver;
    state.ship.alive = false;
    state.ship.thrusting = false;
    state.kick_shake(1.0, 0.5);

    log::info!("Game over on wave {}: final score {}", state.wave, state.score);
    state.push_event(GameEvent::ShipDestroyed {
        pos: state.ship.pos,
        final_score: state.score,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combo::award;
    use crate::sim::state::{Asteroid, AsteroidSize, Enemy};

    /// A run with the field cleared and the ship exposed at the origin
    fn bare_state() -> GameState {
        let mut state = GameState::new(77);
        state.entities.asteroids.clear();
        state.invulnerability = 0.0;
        state.drain_events().for_each(drop);
        state
    }

    fn add_asteroid(state: &mut GameState, size: AsteroidSize, pos: Vec2) {
        let id = state.next_entity_id();
        state
            .entities
            .asteroids
            .push(Asteroid::new(id, size, pos, Vec2::ZERO, 0.0));
    }

    fn add_bullet(state: &mut GameState, pos: Vec2, pierce: u8) {
        let id = state.next_entity_id();
        let bullet = Bullet::player(id, pos, 0.0, Vec2::ZERO, pierce);
        state.entities.bullets.push(bullet);
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 1.0, Vec2::new(2.0, 0.0), 1.0)); // touching
        assert!(!circles_overlap(Vec2::ZERO, 1.0, Vec2::new(2.01, 0.0), 1.0));
        assert!(circles_overlap(Vec2::new(3.0, 4.0), 2.5, Vec2::ZERO, 2.5));
    }

    #[test]
    fn test_simultaneous_hits_all_resolve() {
        let mut state = bare_state();
        add_asteroid(&mut state, AsteroidSize::Small, Vec2::new(-20.0, 10.0));
        add_asteroid(&mut state, AsteroidSize::Small, Vec2::new(20.0, 10.0));
        add_bullet(&mut state, Vec2::new(-20.0, 10.0), 0);
        add_bullet(&mut state, Vec2::new(20.0, 10.0), 0);

        resolve_collisions(&mut state);

        assert!(state.entities.asteroids.is_empty());
        assert!(state.entities.bullets.is_empty());
        assert_eq!(state.combo.multiplier, 3);
        assert_eq!(state.score, award(100, 2) + award(100, 3));
    }

    #[test]
    fn test_one_bullet_one_asteroid_per_frame() {
        let mut state = bare_state();
        add_asteroid(&mut state, AsteroidSize::Small, Vec2::new(10.0, 10.0));
        add_asteroid(&mut state, AsteroidSize::Small, Vec2::new(10.5, 10.0));
        add_bullet(&mut state, Vec2::new(10.25, 10.0), 3);

        resolve_collisions(&mut state);
        assert_eq!(state.entities.asteroids.len(), 1);
        assert_eq!(state.entities.bullets[0].pierce, 2);

        // Next frame it takes the other one
        resolve_collisions(&mut state);
        assert!(state.entities.asteroids.is_empty());
        assert_eq!(state.entities.bullets[0].pierce, 1);
    }

    #[test]
    fn test_children_wait_a_frame() {
        let mut state = bare_state();
        add_asteroid(&mut state, AsteroidSize::Large, Vec2::new(-15.0, -15.0));
        add_bullet(&mut state, Vec2::new(-15.0, -15.0), 0);
        add_bullet(&mut state, Vec2::new(-15.0, -15.0), 0);

        resolve_collisions(&mut state);

        let asteroids = &state.entities.asteroids;
        assert_eq!(asteroids.len(), 2);
        assert!(asteroids.iter().all(|a| a.size == AsteroidSize::Medium));
        // The second bullet was not consumed by a child spawned this frame
        assert_eq!(state.entities.bullets.len(), 1);
    }

    #[test]
    fn test_pierce_survives_k_hits() {
        for k in 0..4u8 {
            let mut state = bare_state();
            add_bullet(&mut state, Vec2::new(12.0, -12.0), k);

            for hit in 0..=k {
                add_asteroid(&mut state, AsteroidSize::Small, Vec2::new(12.0, -12.0));
                resolve_collisions(&mut state);
                let alive = !state.entities.bullets.is_empty();
                assert_eq!(alive, hit < k, "pierce {} after hit {}", k, hit + 1);
            }
        }
    }

    #[test]
    fn test_bullet_kills_enemy() {
        let mut state = bare_state();
        let id = state.next_entity_id();
        state
            .entities
            .enemies
            .push(Enemy::new(id, Vec2::new(8.0, 8.0), 1.0));
        add_bullet(&mut state, Vec2::new(8.5, 8.0), 0);

        resolve_collisions(&mut state);

        assert!(state.entities.enemies.is_empty());
        assert!(state.entities.bullets.is_empty());
        assert_eq!(state.score, award(ENEMY_SCORE, 2));
        assert!(
            state
                .events()
                .iter()
                .any(|e| matches!(e, GameEvent::EnemyDestroyed { .. }))
        );
        assert!(state.particles.active_count() > 0);
        assert!(state.debris.active_count() > 0);
    }

    #[test]
    fn test_bullet_can_hit_asteroid_and_enemy_same_frame() {
        let mut state = bare_state();
        let spot = Vec2::new(-8.0, 8.0);
        add_asteroid(&mut state, AsteroidSize::Small, spot);
        let id = state.next_entity_id();
        state.entities.enemies.push(Enemy::new(id, spot, 1.0));
        add_bullet(&mut state, spot, 1);

        resolve_collisions(&mut state);
        assert!(state.entities.asteroids.is_empty());
        assert!(state.entities.enemies.is_empty());
        assert!(state.entities.bullets.is_empty());
    }

    #[test]
    fn test_shield_absorbs_then_grace() {
        let mut state = bare_state();
        state.mods.shields = 2;
        add_asteroid(&mut state, AsteroidSize::Small, Vec2::new(0.5, 0.0));

        resolve_collisions(&mut state);
        assert_eq!(state.mods.shields, 1);
        assert!(state.invulnerability > 0.0);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.ship.alive);
        // The rock is spent on the shield, no score for it
        assert!(state.entities.asteroids.is_empty());
        assert_eq!(state.score, 0);

        // During grace nothing touches the ship
        add_asteroid(&mut state, AsteroidSize::Small, Vec2::new(-0.5, 0.0));
        resolve_collisions(&mut state);
        assert_eq!(state.mods.shields, 1);
        assert_eq!(state.entities.asteroids.len(), 1);
    }

    #[test]
    fn test_absorbed_rock_children_clear_ship_before_grace_ends() {
        use crate::sim::tick::{TickInput, tick};

        let mut state = bare_state();
        state.mods.shields = 1;
        add_asteroid(&mut state, AsteroidSize::Large, Vec2::ZERO);

        resolve_collisions(&mut state);
        assert_eq!(state.mods.shields, 0);
        // The children start right on top of the ship
        let children = &state.entities.asteroids;
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|a| {
            a.size == AsteroidSize::Medium
                && circles_overlap(a.pos, a.radius, state.ship.pos, state.ship.radius)
        }));

        // Sit still through the grace window and a while after it
        let dt = 1.0 / 60.0;
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), dt);
        }
        assert_eq!(state.invulnerability, 0.0);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.ship.alive);
        assert_eq!(state.entities.asteroids.len(), 2);
    }

    #[test]
    fn test_one_shield_per_frame() {
        let mut state = bare_state();
        state.mods.shields = 3;
        add_asteroid(&mut state, AsteroidSize::Small, Vec2::ZERO);
        let id = state.next_entity_id();
        state.entities.enemies.push(Enemy::new(id, Vec2::ZERO, 1.0));

        resolve_collisions(&mut state);
        assert_eq!(state.mods.shields, 2);
        assert_eq!(state.entities.enemies.len(), 1);
    }

    #[test]
    fn test_unshielded_hit_ends_run() {
        let mut state = bare_state();
        add_asteroid(&mut state, AsteroidSize::Medium, Vec2::new(1.0, 1.0));

        resolve_collisions(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!state.ship.alive);
        assert!(state.shake.is_active());
        assert!(
            state
                .events()
                .iter()
                .any(|e| matches!(e, GameEvent::ShipDestroyed { .. }))
        );
    }

    #[test]
    fn test_enemy_bullet_absorbed_and_removed() {
        let mut state = bare_state();
        state.mods.shields = 1;
        let id = state.next_entity_id();
        state
            .entities
            .enemy_bullets
            .push(Bullet::enemy(id, Vec2::new(0.3, 0.3), 0.0));

        resolve_collisions(&mut state);
        assert!(state.entities.enemy_bullets.is_empty());
        assert_eq!(state.mods.shields, 0);
        assert!(state.ship.alive);

        // Same shot again once grace runs out is fatal
        state.invulnerability = 0.0;
        let id = state.next_entity_id();
        state
            .entities
            .enemy_bullets
            .push(Bullet::enemy(id, Vec2::new(0.3, 0.3), 0.0));
        resolve_collisions(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_invulnerable_ship_ignores_hazards() {
        let mut state = bare_state();
        state.invulnerability = 0.5;
        add_asteroid(&mut state, AsteroidSize::Large, Vec2::ZERO);
        resolve_collisions(&mut state);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.entities.asteroids.len(), 1);
    }
}
