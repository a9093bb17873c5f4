//! Read-only frame view for presentation
//!
//! Renderers and HUDs consume a borrowed snapshot of the committed post-frame
//! state; nothing here can mutate the run.

use glam::Vec2;
use serde::Serialize;

use super::pool::EffectSlot;
use super::spawn::Beacon;
use super::state::{Asteroid, Bullet, Enemy, GamePhase, GameState, Ship};

/// HUD numbers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HudView {
    pub score: u64,
    pub wave: u32,
    pub combo: u32,
    pub shields: u32,
}

/// One upgrade card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpgradeOptionView {
    pub label: &'static str,
    pub description: &'static str,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot<'a> {
    pub phase: GamePhase,
    pub ship: &'a Ship,
    pub asteroids: &'a [Asteroid],
    pub enemies: &'a [Enemy],
    pub bullets: &'a [Bullet],
    pub enemy_bullets: &'a [Bullet],
    pub beacons: &'a [Beacon],
    pub particles: Vec<&'a EffectSlot>,
    pub debris: Vec<&'a EffectSlot>,
    pub camera_offset: Vec2,
    pub hud: HudView,
    /// Cards on the table while the upgrade gate is open
    pub upgrade_options: Vec<UpgradeOptionView>,
    pub shield_visible: bool,
    pub game_over: bool,
    pub final_score: Option<u64>,
}

impl GameState {
    /// Borrow a presentation view of the current frame
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        let upgrade_options: Vec<UpgradeOptionView> = self
            .upgrade_offer
            .map(|offer| {
                offer
                    .options
                    .iter()
                    .map(|kind| UpgradeOptionView {
                        label: kind.label(),
                        description: kind.description(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let game_over = self.is_game_over();

        FrameSnapshot {
            phase: self.phase,
            ship: &self.ship,
            asteroids: &self.entities.asteroids,
            enemies: &self.entities.enemies,
            bullets: &self.entities.bullets,
            enemy_bullets: &self.entities.enemy_bullets,
            beacons: &self.director.beacons,
            particles: self.particles.iter_active().collect(),
            debris: self.debris.iter_active().collect(),
            camera_offset: self.shake.offset,
            hud: HudView {
                score: self.score,
                wave: self.wave,
                combo: self.combo.multiplier,
                shields: self.mods.shields,
            },
            upgrade_options,
            shield_visible: self.shield_visible(),
            game_over,
            final_score: game_over.then_some(self.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::game_over;
    use crate::sim::upgrade::open_gate;

    #[test]
    fn test_snapshot_of_fresh_run() {
        let state = GameState::new(31);
        let snap = state.snapshot();
        assert_eq!(snap.phase, GamePhase::Running);
        assert_eq!(snap.asteroids.len(), 4);
        assert!(snap.upgrade_options.is_empty());
        assert!(snap.shield_visible); // spawn grace
        assert!(!snap.game_over);
        assert_eq!(snap.final_score, None);
        assert_eq!(
            snap.hud,
            HudView {
                score: 0,
                wave: 1,
                combo: 1,
                shields: 0
            }
        );
    }

    #[test]
    fn test_snapshot_lists_upgrade_cards() {
        let mut state = GameState::new(32);
        open_gate(&mut state);
        let snap = state.snapshot();
        assert_eq!(snap.upgrade_options.len(), 3);
        assert!(snap.upgrade_options.iter().all(|o| !o.label.is_empty()));
    }

    #[test]
    fn test_snapshot_game_over() {
        let mut state = GameState::new(33);
        state.score = 4321;
        game_over(&mut state);
        let snap = state.snapshot();
        assert!(snap.game_over);
        assert_eq!(snap.final_score, Some(4321));
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(34);
        let json = serde_json::to_value(state.snapshot()).expect("snapshot serializes");
        assert_eq!(json["hud"]["wave"], 1);
        assert_eq!(json["asteroids"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["phase"], "Running");
        assert!(json["final_score"].is_null());
    }
}
