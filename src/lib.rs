//! Skill Cooldowns - tick-driven ability cooldown manager
//!
//! Core modules:
//! - `cooldown`: Deterministic cooldown core (registry, clock, gate, ledger, projector)
//! - `settings`: Data-driven ability catalog and lock policy
//! - `host`: Fixed-step host loop helper
//! - `error`: Typed failures for registration and lookups

pub mod cooldown;
pub mod error;
pub mod host;
pub mod settings;

pub use cooldown::{ActivationResult, CooldownEvent, CooldownManager, CooldownSnapshot};
pub use error::{CooldownError, Result};
pub use settings::CooldownSettings;

use glam::Vec2;

/// Cooldown configuration constants
pub mod consts {
    /// Logical tick length used by the fixed-step host loop (60 Hz)
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the host loop accepts before clamping (tab switches, debugger stops)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Usage history kept per ability
    pub const DEFAULT_LEDGER_CAPACITY: usize = 64;
    /// Window during which a special ability locks all others
    pub const DEFAULT_GLOBAL_LOCK_MS: f64 = 2000.0;

    /// Conventional sweep start: 12 o'clock in screen space (y down)
    pub const SWEEP_START_TOP: f32 = -std::f32::consts::FRAC_PI_2;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Wrap an angle into [-PI, PI)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid may round up to TAU for tiny negative inputs
    if wrapped >= PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Clamp a raw tick delta: negative, NaN and infinite values become 0
#[inline]
pub fn sanitize_delta(delta_ms: f64) -> f64 {
    if delta_ms.is_finite() && delta_ms > 0.0 {
        delta_ms
    } else {
        0.0
    }
}
