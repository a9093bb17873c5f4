//! Simulation module
//!
//! All gameplay logic lives here. This module has no rendering or platform
//! dependencies:
//! - One update pass per frame, clamped timestep
//! - Seeded RNG per run
//! - Presentation reads committed post-frame state only

pub mod collision;
pub mod combo;
pub mod motion;
pub mod pool;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod upgrade;

pub use collision::{Hazard, circles_overlap, resolve_collisions};
pub use combo::ComboState;
pub use motion::{Body, MotionRules, integrate};
pub use pool::{Burst, EffectPool, EffectSlot, FadeCurve};
pub use snapshot::{FrameSnapshot, HudView, UpgradeOptionView};
pub use spawn::{Beacon, SpawnDirector, spawn_wave};
pub use state::{
    Asteroid, AsteroidSize, Bullet, BulletOwner, CameraShake, Enemy, EntityStore, GameEvent,
    GamePhase, GameState, Ship,
};
pub use tick::{FrameClock, TickInput, autopilot, tick};
pub use upgrade::{UpgradeKind, UpgradeModifiers, UpgradeOffer};
