//! Combo scoring
//!
//! Every kill bumps the multiplier and refills the window. The window drains
//! in fixed steps, independent of the frame delta, and lapsing drops the
//! multiplier back to 1.

use serde::{Deserialize, Serialize};

use crate::consts::{COMBO_BONUS, COMBO_DECAY_STEP, COMBO_WINDOW};

/// Hit-streak multiplier with a decaying window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    /// Current multiplier (always >= 1)
    pub multiplier: u32,
    /// Seconds left in the window
    pub remaining: f32,
    /// Time banked toward the next decay step
    accumulator: f32,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            multiplier: 1,
            remaining: 0.0,
            accumulator: 0.0,
        }
    }
}

/// Points for a kill worth `base` at `multiplier`
pub fn award(base: u32, multiplier: u32) -> u64 {
    let bonus = 1.0 + COMBO_BONUS * (multiplier.max(1) - 1) as f64;
    (base as f64 * bonus).round() as u64
}

impl ComboState {
    /// Register a kill and return the points it earns
    pub fn register_kill(&mut self, base: u32) -> u64 {
        self.multiplier += 1;
        self.remaining = COMBO_WINDOW;
        award(base, self.multiplier)
    }

    /// Bank `dt` seconds and run any decay steps that came due.
    ///
    /// Only call while the run is live; pauses must not drain the window.
    pub fn advance(&mut self, dt: f32) {
        self.accumulator += dt;
        while self.accumulator >= COMBO_DECAY_STEP {
            self.accumulator -= COMBO_DECAY_STEP;
            self.decay_step();
        }
    }

    fn decay_step(&mut self) {
        if self.remaining > 0.0 {
            self.remaining -= COMBO_DECAY_STEP;
            if self.remaining <= 0.0 {
                self.remaining = 0.0;
                self.multiplier = 1;
            }
        }
    }
}
