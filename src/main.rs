//! Skill Cooldowns demo entry point
//!
//! Plays a seeded, scripted session against the demo ability set: jittered frame
//! times drive the fixed-step loop, random key presses request activations. Run
//! with `RUST_LOG=debug` to see every activation, rejection and expiry.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use skill_cooldowns::consts::SWEEP_START_TOP;
use skill_cooldowns::host::FixedStepper;
use skill_cooldowns::{ActivationResult, CooldownManager, CooldownSettings};

/// Simulated session length
const SESSION_MS: f64 = 20_000.0;
/// Chance of a key press on any frame
const PRESS_CHANCE: f64 = 0.08;

fn main() {
    env_logger::init();
    log::info!("Skill Cooldowns demo starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(12345);

    if let Err(e) = run(seed) {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

fn run(seed: u64) -> skill_cooldowns::Result<()> {
    let settings = CooldownSettings::demo();
    let mut manager = CooldownManager::from_settings(&settings)?;
    let mut stepper = FixedStepper::default();
    let mut rng = Pcg32::seed_from_u64(seed);
    log::info!("Session seeded with {}", seed);

    let ids: Vec<String> = manager
        .abilities()
        .iter()
        .map(|a| a.id.as_str().to_string())
        .collect();

    let mut now = 0.0;
    let mut frames = 0u64;
    while now < SESSION_MS {
        // 60 Hz with jitter, occasional long hitch
        let frame_ms = if rng.random_bool(0.01) {
            rng.random_range(80.0..250.0)
        } else {
            rng.random_range(12.0..22.0)
        };
        now += frame_ms;
        frames += 1;

        // Advance first, then handle this frame's input
        stepper.drive(&mut manager, frame_ms);

        if rng.random_bool(PRESS_CHANCE) {
            let id = &ids[rng.random_range(0..ids.len())];
            match manager.try_activate(id, now)? {
                ActivationResult::Activated => log::info!("[{:>7.0}ms] {} fired", now, id),
                ActivationResult::RejectedOnCooldown { .. } => {
                    log::info!("[{:>7.0}ms] {} on cooldown ({})", now, id, manager.countdown_label(id)?)
                }
                ActivationResult::RejectedGlobalLock { remaining_ms } => {
                    log::info!("[{:>7.0}ms] {} locked for {:.0}ms", now, id, remaining_ms)
                }
            }
        }

        for event in manager.drain_events() {
            log::debug!("{:?}", event);
        }

        if frames % 120 == 0 {
            print_overlay(&manager, &ids)?;
        }
    }

    let snapshot = manager.snapshot();
    println!(
        "\nSession over after {} frames / {} ticks",
        frames,
        stepper.ticks()
    );
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Could not serialize snapshot: {}", e),
    }

    manager.reset();
    log::info!("Scene torn down, {} uses remain", manager.total_count());
    Ok(())
}

/// Text stand-in for the radial cooldown overlay
fn print_overlay(manager: &CooldownManager, ids: &[String]) -> skill_cooldowns::Result<()> {
    let mut line = String::new();
    for id in ids {
        let progress = manager.progress(id)?;
        let sweep = manager.sweep_angle(id, SWEEP_START_TOP, true)? - SWEEP_START_TOP;
        line.push_str(&format!(
            "{}:{:>5} {:>3.0}% ({:>3.0}°)  ",
            id,
            manager.countdown_label(id)?,
            progress * 100.0,
            sweep.to_degrees()
        ));
    }
    println!("{}", line.trim_end());
    Ok(())
}
