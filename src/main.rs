//! Vector Drift - headless driver
//!
//! Runs a seeded demo game with the autopilot at a simulated 60 Hz and prints
//! the final frame as JSON.
//!
//! Usage: vector-drift [seed] [settings.json]

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

#[cfg(not(target_arch = "wasm32"))]
use vector_drift::Settings;
#[cfg(not(target_arch = "wasm32"))]
use vector_drift::sim::{FrameClock, GameEvent, GameState, autopilot, tick};

/// Simulated display refresh
#[cfg(not(target_arch = "wasm32"))]
const FRAME_TIME: f64 = 1.0 / 60.0;
/// Give up after this much simulated time
#[cfg(not(target_arch = "wasm32"))]
const MAX_SECONDS: f64 = 180.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Vector Drift (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            log::warn!("Ignoring bad seed argument: {}", e);
            1
        }
        None => 1,
    };
    let settings = match args.next() {
        Some(path) => Settings::load_or_default(Path::new(&path)),
        None => Settings::default(),
    };
    log::info!(
        "Seed {}, quality {}, particles {}, shake {}",
        seed,
        settings.quality.as_str(),
        settings.particles,
        settings.effective_screen_shake()
    );

    let mut state = GameState::with_settings(seed, &settings);
    let mut clock = FrameClock::new();
    let mut now = 0.0;
    let mut frames: u64 = 0;
    report(&mut state);

    while now < MAX_SECONDS && !state.is_game_over() {
        let dt = clock.delta(now);
        let input = autopilot(&state);
        tick(&mut state, &input, dt);

        report(&mut state);

        now += FRAME_TIME;
        frames += 1;
    }

    log::info!(
        "Stopped after {} frames ({:.1}s simulated)",
        frames,
        state.elapsed
    );

    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
    println!("wave {}, score {}", state.wave, state.score);
}

/// Print the interesting events raised since the last frame
#[cfg(not(target_arch = "wasm32"))]
fn report(state: &mut GameState) {
    for event in state.drain_events() {
        match event {
            GameEvent::WaveStarted { wave, asteroids } => {
                println!("wave {} ({} asteroids)", wave, asteroids)
            }
            GameEvent::UpgradeChosen { kind } => println!("  upgrade: {}", kind.label()),
            GameEvent::ShieldAbsorbed { shields_left, .. } => {
                println!("  shield absorbed a hit ({} left)", shields_left)
            }
            _ => {}
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless driver on wasm; embed the library instead
}
