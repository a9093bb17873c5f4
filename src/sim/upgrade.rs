//! Between-wave upgrades
//!
//! Clearing a wave opens the gate: gameplay freezes and three distinct
//! modifiers go on the table. Picking one applies it for the rest of the run
//! and starts the next wave.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::spawn;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Upgrade candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    SpreadShot,
    PiercingRounds,
    RapidFire,
    EngineBoost,
    ShieldCharge,
}

impl UpgradeKind {
    /// Every candidate, in menu order
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::SpreadShot,
        UpgradeKind::PiercingRounds,
        UpgradeKind::RapidFire,
        UpgradeKind::EngineBoost,
        UpgradeKind::ShieldCharge,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            UpgradeKind::SpreadShot => "Spread Shot",
            UpgradeKind::PiercingRounds => "Piercing Rounds",
            UpgradeKind::RapidFire => "Rapid Fire",
            UpgradeKind::EngineBoost => "Engine Boost",
            UpgradeKind::ShieldCharge => "Shield Charge",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UpgradeKind::SpreadShot => "+2 side bullets",
            UpgradeKind::PiercingRounds => "Bullets pierce 1 target",
            UpgradeKind::RapidFire => "Fire rate +30%",
            UpgradeKind::EngineBoost => "Accel/Speed +20%",
            UpgradeKind::ShieldCharge => "Gain a 1-hit shield",
        }
    }

    /// Apply this upgrade to the run's modifiers
    pub fn apply(&self, mods: &mut UpgradeModifiers) {
        match self {
            UpgradeKind::SpreadShot => mods.spread = true,
            UpgradeKind::PiercingRounds => mods.pierce = true,
            UpgradeKind::RapidFire => mods.fire_rate_mul *= RAPID_FIRE_MULTIPLIER,
            UpgradeKind::EngineBoost => mods.engine_mul *= ENGINE_BOOST_MULTIPLIER,
            UpgradeKind::ShieldCharge => mods.shields += 1,
        }
    }
}

/// Permanent modifiers for the current run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeModifiers {
    pub fire_rate_mul: f32,
    /// Scales ship acceleration and top speed
    pub engine_mul: f32,
    pub spread: bool,
    pub pierce: bool,
    /// Banked one-hit shields
    pub shields: u32,
}

impl Default for UpgradeModifiers {
    fn default() -> Self {
        Self {
            fire_rate_mul: 1.0,
            engine_mul: 1.0,
            spread: false,
            pierce: false,
            shields: 0,
        }
    }
}

impl UpgradeModifiers {
    /// Seconds between shots
    pub fn fire_interval(&self) -> f32 {
        SHIP_FIRE_INTERVAL / self.fire_rate_mul
    }

    /// Pierce charges carried by each new bullet
    pub fn pierce_charges(&self) -> u8 {
        if self.pierce { PIERCE_CHARGES } else { 0 }
    }
}

/// Options on offer while the gate is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeOffer {
    pub options: [UpgradeKind; UPGRADE_CHOICES],
}

impl UpgradeOffer {
    /// Draw distinct options without replacement
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut pool = UpgradeKind::ALL;
        let mut remaining = pool.len();
        let mut options = [UpgradeKind::SpreadShot; UPGRADE_CHOICES];
        for slot in options.iter_mut() {
            let pick = rng.random_range(0..remaining);
            *slot = pool[pick];
            remaining -= 1;
            pool.swap(pick, remaining);
        }
        Self { options }
    }

    pub fn get(&self, index: usize) -> Option<UpgradeKind> {
        self.options.get(index).copied()
    }
}

/// Freeze gameplay and put three upgrades on the table.
///
/// No-op unless the run is live.
pub fn open_gate(state: &mut GameState) {
    if state.phase != GamePhase::Running {
        return;
    }
    let offer = UpgradeOffer::roll(&mut state.rng);
    log::info!(
        "Wave {} cleared, offering: {}",
        state.wave,
        offer
            .options
            .iter()
            .map(|o| o.label())
            .collect::<Vec<_>>()
            .join(", ")
    );
    state.phase = GamePhase::UpgradeChoice;
    state.upgrade_offer = Some(offer);
    state.push_event(GameEvent::UpgradeOffered {
        options: offer.options,
    });
}

/// Take option `index` from the open offer and start the next wave.
///
/// Returns the applied upgrade, or None if the gate is closed or the index
/// is not on offer.
pub fn choose(state: &mut GameState, index: usize) -> Option<UpgradeKind> {
    if state.phase != GamePhase::UpgradeChoice {
        return None;
    }
    let kind = state.upgrade_offer?.get(index)?;

    kind.apply(&mut state.mods);
    log::info!("Upgrade chosen: {} ({})", kind.label(), kind.description());
    state.push_event(GameEvent::UpgradeChosen { kind });

    state.upgrade_offer = None;
    state.phase = GamePhase::Running;
    state.wave += 1;
    spawn::spawn_wave(state);
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_offer_is_distinct() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..200 {
            let offer = UpgradeOffer::roll(&mut rng);
            let [a, b, c] = offer.options;
            assert!(a != b && b != c && a != c, "duplicate in {:?}", offer);
        }
    }

    #[test]
    fn test_every_upgrade_gets_offered() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.extend(UpgradeOffer::roll(&mut rng).options);
        }
        assert_eq!(seen.len(), UpgradeKind::ALL.len());
    }

    #[test]
    fn test_stacking_rules() {
        let mut mods = UpgradeModifiers::default();
        UpgradeKind::RapidFire.apply(&mut mods);
        UpgradeKind::RapidFire.apply(&mut mods);
        assert!((mods.fire_rate_mul - 1.69).abs() < 1e-5);
        assert!((mods.fire_interval() - SHIP_FIRE_INTERVAL / 1.69).abs() < 1e-6);

        UpgradeKind::EngineBoost.apply(&mut mods);
        assert!((mods.engine_mul - 1.2).abs() < 1e-6);

        UpgradeKind::ShieldCharge.apply(&mut mods);
        UpgradeKind::ShieldCharge.apply(&mut mods);
        assert_eq!(mods.shields, 2);

        UpgradeKind::PiercingRounds.apply(&mut mods);
        UpgradeKind::PiercingRounds.apply(&mut mods);
        assert!(mods.pierce);
        assert_eq!(mods.pierce_charges(), PIERCE_CHARGES);

        UpgradeKind::SpreadShot.apply(&mut mods);
        let once = mods;
        UpgradeKind::SpreadShot.apply(&mut mods);
        assert_eq!(mods, once);
    }

    #[test]
    fn test_gate_round_trip() {
        let mut state = GameState::new(21);
        state.entities.asteroids.clear();
        open_gate(&mut state);
        assert_eq!(state.phase, GamePhase::UpgradeChoice);
        let offer = state.upgrade_offer.expect("offer on the table");

        // Opening twice does not re-roll
        open_gate(&mut state);
        assert_eq!(state.upgrade_offer, Some(offer));

        // Out-of-range pick is ignored
        assert_eq!(choose(&mut state, 3), None);
        assert_eq!(state.phase, GamePhase::UpgradeChoice);

        let picked = choose(&mut state, 1);
        assert_eq!(picked, Some(offer.options[1]));
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.wave, 2);
        assert_eq!(state.entities.asteroids.len(), 5);
        assert!(state.upgrade_offer.is_none());

        // Gate closed: further picks do nothing
        assert_eq!(choose(&mut state, 0), None);
        assert_eq!(state.wave, 2);
    }
}
