//! Game state and core simulation types
//!
//! Everything the run owns lives here. Nothing in this module is persisted;
//! a restart rebuilds the run from a fresh seed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combo::ComboState;
use super::pool::{Burst, EffectPool};
use super::spawn::{self, SpawnDirector};
use super::upgrade::{UpgradeKind, UpgradeModifiers, UpgradeOffer};
use crate::consts::*;
use crate::settings::Settings;
use crate::{heading_vector, rand_between};

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Wave cleared; gameplay frozen until an upgrade is picked
    UpgradeChoice,
    /// Ship destroyed; only a restart leaves this phase
    GameOver,
}

/// Asteroid size classes, largest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    /// Size of the children produced by splitting (None = terminal)
    pub fn next(self) -> Option<Self> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Medium),
            AsteroidSize::Medium => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }

    /// Number of children produced by splitting
    pub fn child_count(self) -> usize {
        match self {
            AsteroidSize::Large | AsteroidSize::Medium => 2,
            AsteroidSize::Small => 0,
        }
    }

    /// Visual radius
    pub fn nominal_radius(self) -> f32 {
        match self {
            AsteroidSize::Large => 6.0,
            AsteroidSize::Medium => 3.5,
            AsteroidSize::Small => 2.0,
        }
    }

    /// Collision radius
    pub fn radius(self) -> f32 {
        self.nominal_radius() * ASTEROID_HITBOX_SCALE
    }

    /// Base score before the combo multiplier
    pub fn score(self) -> u32 {
        match self {
            AsteroidSize::Large => 20,
            AsteroidSize::Medium => 50,
            AsteroidSize::Small => 100,
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing angle (radians, 0 = +X)
    pub heading: f32,
    pub radius: f32,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
    pub alive: bool,
    /// Engine lit this frame (for the exhaust trail)
    pub thrusting: bool,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            heading: std::f32::consts::FRAC_PI_2, // Facing up
            radius: SHIP_RADIUS,
            fire_cooldown: 0.0,
            alive: true,
            thrusting: false,
        }
    }
}

impl Ship {
    /// Put the ship back at the centre, at rest, facing up
    pub fn respawn(&mut self) {
        self.pos = Vec2::ZERO;
        self.vel = Vec2::ZERO;
        self.heading = std::f32::consts::FRAC_PI_2;
        self.fire_cooldown = 0.0;
        self.alive = true;
        self.thrusting = false;
    }

    /// Point `offset` units ahead of the ship's centre
    pub fn nose(&self, offset: f32) -> Vec2 {
        self.pos + heading_vector(self.heading) * offset
    }
}

/// An asteroid
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub size: AsteroidSize,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Current rotation (visual only)
    pub rotation: f32,
    /// Angular velocity (radians/sec)
    pub spin: f32,
    pub radius: f32,
    pub alive: bool,
}

impl Asteroid {
    pub fn new(id: u32, size: AsteroidSize, pos: Vec2, vel: Vec2, spin: f32) -> Self {
        Self {
            id,
            size,
            pos,
            vel,
            rotation: 0.0,
            spin,
            radius: size.radius(),
            alive: true,
        }
    }
}

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// A projectile
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub owner: BulletOwner,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left before the bullet fizzles
    pub ttl: f32,
    pub radius: f32,
    /// Extra targets this bullet may pass through
    pub pierce: u8,
    pub alive: bool,
    /// Target kinds already struck this frame (bitmask of `HIT_*`)
    #[serde(skip)]
    pub(crate) struck: u8,
}

pub(crate) const HIT_ASTEROID: u8 = 1 << 0;
pub(crate) const HIT_ENEMY: u8 = 1 << 1;

impl Bullet {
    /// Player bullet fired along `dir`, carrying the shooter's velocity
    pub fn player(id: u32, pos: Vec2, dir: f32, inherit: Vec2, pierce: u8) -> Self {
        Self {
            id,
            owner: BulletOwner::Player,
            pos,
            vel: heading_vector(dir) * BULLET_SPEED + inherit,
            ttl: BULLET_LIFE,
            radius: BULLET_RADIUS,
            pierce,
            alive: true,
            struck: 0,
        }
    }

    /// Hunter bullet fired along `dir`
    pub fn enemy(id: u32, pos: Vec2, dir: f32) -> Self {
        Self {
            id,
            owner: BulletOwner::Enemy,
            pos,
            vel: heading_vector(dir) * ENEMY_BULLET_SPEED,
            ttl: ENEMY_BULLET_LIFE,
            radius: ENEMY_BULLET_RADIUS,
            pierce: 0,
            alive: true,
            struck: 0,
        }
    }

    /// Register a hit. Returns true if the bullet survives it.
    pub fn spend(&mut self) -> bool {
        if self.pierce > 0 {
            self.pierce -= 1;
            true
        } else {
            self.alive = false;
            false
        }
    }
}

/// A hunter enemy
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing angle (always toward the ship)
    pub heading: f32,
    pub radius: f32,
    pub fire_cooldown: f32,
    pub alive: bool,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, fire_cooldown: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            heading: 0.0,
            radius: ENEMY_RADIUS,
            fire_cooldown,
            alive: true,
        }
    }
}

/// Camera shake impulse
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CameraShake {
    pub magnitude: f32,
    /// Seconds of shake left
    pub remaining: f32,
    /// Camera offset for this frame
    pub offset: Vec2,
}

impl CameraShake {
    /// Add an impulse; stronger or longer requests win
    pub fn kick(&mut self, magnitude: f32, duration: f32) {
        self.magnitude = self.magnitude.max(magnitude);
        self.remaining = self.remaining.max(duration);
    }

    /// Decay and pick this frame's offset
    pub fn advance<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        if self.remaining > 0.0 {
            self.remaining -= dt;
            let t = rng.random_range(0.0..std::f32::consts::TAU);
            self.offset = heading_vector(t) * self.magnitude;
        } else {
            self.remaining = 0.0;
            self.magnitude = 0.0;
            self.offset = Vec2::ZERO;
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// Notifications for presentation hooks (audio, HUD pops)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GameEvent {
    RunStarted { seed: u64 },
    WaveStarted { wave: u32, asteroids: u32 },
    ShotFired { pos: Vec2, bullets: u8 },
    AsteroidDestroyed { pos: Vec2, size: AsteroidSize, points: u64 },
    EnemyDestroyed { pos: Vec2, points: u64 },
    EnemyTelegraphed { pos: Vec2, delay: f32 },
    EnemySpawned { pos: Vec2 },
    ShieldAbsorbed { pos: Vec2, shields_left: u32 },
    ShipDestroyed { pos: Vec2, final_score: u64 },
    UpgradeOffered { options: [UpgradeKind; UPGRADE_CHOICES] },
    UpgradeChosen { kind: UpgradeKind },
}

/// Live entity collections (exclusively mutated by the update pass)
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
}

impl EntityStore {
    /// Drop everything marked dead
    pub fn prune(&mut self) {
        self.asteroids.retain(|a| a.alive);
        self.bullets.retain(|b| b.alive);
        self.enemy_bullets.retain(|b| b.alive);
        self.enemies.retain(|e| e.alive);
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed this run was started from
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Current wave (1-based)
    pub wave: u32,
    pub score: u64,
    /// Seconds of invulnerability left
    pub invulnerability: f32,
    /// Gameplay seconds simulated this run (frozen while paused)
    pub elapsed: f64,
    pub ship: Ship,
    pub entities: EntityStore,
    pub director: SpawnDirector,
    pub combo: ComboState,
    pub mods: UpgradeModifiers,
    /// Options on the table while the upgrade gate is open
    pub upgrade_offer: Option<UpgradeOffer>,
    pub shake: CameraShake,
    /// Visual particles (not gameplay-affecting)
    pub particles: EffectPool,
    /// Visual debris shards (wrap, never collide)
    pub debris: EffectPool,
    shake_enabled: bool,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new run with default settings
    pub fn new(seed: u64) -> Self {
        Self::with_settings(seed, &Settings::default())
    }

    /// Create a new run, sizing effect pools from the settings
    pub fn with_settings(seed: u64, settings: &Settings) -> Self {
        Self::start(
            seed,
            Ship::default(),
            EffectPool::particles(settings.particle_capacity()),
            EffectPool::debris(settings.debris_capacity()),
            settings.effective_screen_shake(),
        )
    }

    fn start(
        seed: u64,
        ship: Ship,
        particles: EffectPool,
        debris: EffectPool,
        shake_enabled: bool,
    ) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            wave: 1,
            score: 0,
            invulnerability: SPAWN_INVULNERABILITY,
            elapsed: 0.0,
            ship,
            entities: EntityStore::default(),
            director: SpawnDirector::default(),
            combo: ComboState::default(),
            mods: UpgradeModifiers::default(),
            upgrade_offer: None,
            shake: CameraShake::default(),
            particles,
            debris,
            shake_enabled,
            events: Vec::new(),
            next_id: 1,
        };

        state.push_event(GameEvent::RunStarted { seed });
        spawn::spawn_wave(&mut state);

        state
    }

    /// Throw the run away and start over at wave 1.
    ///
    /// Safe at any point: entity collections and beacons are rebuilt, pooled
    /// slots are returned and the pools themselves are reused.
    pub fn reset(&mut self) {
        let seed = self.rng.random::<u64>();

        let mut particles = std::mem::take(&mut self.particles);
        let mut debris = std::mem::take(&mut self.debris);
        particles.clear();
        debris.clear();

        let mut ship = self.ship;
        ship.respawn();

        log::info!("Restarting run (seed {})", seed);
        *self = Self::start(seed, ship, particles, debris, self.shake_enabled);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Shield ring visible (grace window or banked charges)
    pub fn shield_visible(&self) -> bool {
        self.invulnerability > 0.0 || self.mods.shields > 0
    }

    /// Events raised since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Hand this frame's events to the presentation layer
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    /// Forget last frame's undrained events
    pub(crate) fn clear_events(&mut self) {
        self.events.clear();
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Screen shake, unless the player turned it off
    pub fn kick_shake(&mut self, magnitude: f32, duration: f32) {
        if self.shake_enabled {
            self.shake.kick(magnitude, duration);
        }
    }

    /// Spray particles from the shared pool
    pub fn emit_particles(&mut self, origin: Vec2, count: usize, burst: &Burst) -> usize {
        self.particles.emit(origin, count, burst, &mut self.rng)
    }

    /// Spray `base..2*base` debris shards
    pub fn emit_debris(&mut self, origin: Vec2, base: usize, burst: &Burst) -> usize {
        let count = base + if base > 0 { self.rng.random_range(0..base) } else { 0 };
        self.debris.emit(origin, count, burst, &mut self.rng)
    }

    /// Uniform sample from the run's RNG
    pub fn rand_range(&mut self, min: f32, max: f32) -> f32 {
        rand_between(&mut self.rng, min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asteroid_size_chain() {
        assert_eq!(AsteroidSize::Large.next(), Some(AsteroidSize::Medium));
        assert_eq!(AsteroidSize::Medium.next(), Some(AsteroidSize::Small));
        assert_eq!(AsteroidSize::Small.next(), None);
        assert_eq!(AsteroidSize::Small.child_count(), 0);
        assert!(AsteroidSize::Large.radius() > AsteroidSize::Medium.radius());
        assert!(AsteroidSize::Medium.radius() > AsteroidSize::Small.radius());
    }

    #[test]
    fn test_new_run() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.wave, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.entities.asteroids.len(), 4);
        assert!(state.entities.enemies.is_empty());
        assert!(state.director.beacons.is_empty());
        assert!(state.invulnerability > 0.0);
        assert!(state.ship.alive);
        assert!(
            state
                .entities
                .asteroids
                .iter()
                .all(|a| a.size == AsteroidSize::Large)
        );
    }

    #[test]
    fn test_bullet_spend() {
        let mut b = Bullet::player(1, Vec2::ZERO, 0.0, Vec2::ZERO, 1);
        assert!(b.spend());
        assert!(b.alive);
        assert!(!b.spend());
        assert!(!b.alive);
    }

    #[test]
    fn test_reset_rebuilds_run() {
        let mut state = GameState::new(11);
        state.score = 999;
        state.wave = 6;
        state.phase = GamePhase::GameOver;
        state.mods.shields = 3;
        state.ship.alive = false;
        state.ship.pos = Vec2::new(10.0, 5.0);
        let id = state.next_entity_id();
        state.entities.enemies.push(Enemy::new(id, Vec2::ONE, 0.5));
        state.emit_particles(Vec2::ZERO, 20, &Burst::default());
        let capacity = state.particles.capacity();

        state.reset();

        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.wave, 1);
        assert_eq!(state.mods, UpgradeModifiers::default());
        assert!(state.ship.alive);
        assert_eq!(state.ship.pos, Vec2::ZERO);
        assert!(state.entities.enemies.is_empty());
        assert_eq!(state.entities.asteroids.len(), 4);
        assert_eq!(state.particles.active_count(), 0);
        assert_eq!(state.particles.capacity(), capacity);
    }

    #[test]
    fn test_camera_shake_decays() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut shake = CameraShake::default();
        shake.kick(0.5, 0.1);
        shake.kick(0.2, 0.05); // weaker request doesn't shrink it
        assert_eq!(shake.magnitude, 0.5);
        assert_eq!(shake.remaining, 0.1);

        shake.advance(0.016, &mut rng);
        assert!((shake.offset.length() - 0.5).abs() < 1e-4);

        for _ in 0..10 {
            shake.advance(0.016, &mut rng);
        }
        assert!(!shake.is_active());
        assert_eq!(shake.offset, Vec2::ZERO);
    }
}
