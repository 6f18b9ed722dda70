//! Optional activation policies consulted by the trigger gate
//!
//! Nothing here is active unless a policy is installed on the manager.

use std::fmt::Debug;

use super::registry::AbilityId;
use crate::error::{CooldownError, Result};

/// Extra gating rule layered over per-ability cooldowns
pub trait ActivationPolicy: Debug + Send {
    /// Time (ms) left on a lock blocking `id` at `now`, or `None` if allowed
    fn lock_remaining(&self, id: &str, now: f64) -> Option<f64>;

    fn is_globally_locked(&self, id: &str, now: f64) -> bool {
        self.lock_remaining(id, now).is_some()
    }

    /// Called after `id` was successfully activated at `now`
    fn on_activated(&mut self, id: &str, now: f64);

    /// Drop any lock in progress (session restart)
    fn reset(&mut self);
}

/// Activating the special ability locks every other ability for a fixed window.
///
/// The window is measured on the caller's activation timestamps, not on ticks.
#[derive(Debug, Clone)]
pub struct SpecialAbilityLock {
    special: AbilityId,
    window_ms: f64,
    locked_until: Option<f64>,
}

impl SpecialAbilityLock {
    pub fn new(special: impl Into<AbilityId>, window_ms: f64) -> Result<Self> {
        if !window_ms.is_finite() || window_ms <= 0.0 {
            return Err(CooldownError::InvalidLockWindow(window_ms));
        }
        Ok(Self {
            special: special.into(),
            window_ms,
            locked_until: None,
        })
    }

    pub fn special(&self) -> &AbilityId {
        &self.special
    }

    pub fn window_ms(&self) -> f64 {
        self.window_ms
    }
}

impl ActivationPolicy for SpecialAbilityLock {
    fn lock_remaining(&self, id: &str, now: f64) -> Option<f64> {
        if id == self.special.as_str() {
            return None;
        }
        self.locked_until
            .map(|until| until - now)
            .filter(|left| *left > 0.0)
    }

    fn on_activated(&mut self, id: &str, now: f64) {
        if id == self.special.as_str() && now.is_finite() {
            self.locked_until = Some(now + self.window_ms);
            log::debug!("{} locks other abilities until {}ms", id, now + self.window_ms);
        }
    }

    fn reset(&mut self) {
        self.locked_until = None;
    }
}
