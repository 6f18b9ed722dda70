//! Per-ability countdown state
//!
//! The clock is pull-based: the host loop calls [`CooldownClock::advance`] once per
//! tick with the measured delta. There are no timers or callbacks; expiries are
//! returned to the caller.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::registry::{Ability, AbilityId};
use crate::error::{CooldownError, Result};
use crate::sanitize_delta;

/// Upper bound of progress while running, so only Ready reports exactly 1
const MAX_RUNNING_PROGRESS: f64 = 1.0 - f64::EPSILON;

/// Residue below this counts as expired. Summing fractional ticks (e.g. 1000/60)
/// leaves rounding crumbs around 1e-12ms that must not delay expiry by a tick.
pub const EXPIRY_EPSILON_MS: f64 = 1e-6;

/// Countdown state for one ability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooldownState {
    pub id: AbilityId,
    pub base_cooldown_ms: f64,
    /// Always within [0, base_cooldown_ms]
    remaining_ms: f64,
}

impl CooldownState {
    fn ready(ability: &Ability) -> Self {
        Self {
            id: ability.id.clone(),
            base_cooldown_ms: ability.base_cooldown_ms,
            remaining_ms: 0.0,
        }
    }

    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }

    pub fn is_on_cooldown(&self) -> bool {
        self.remaining_ms > 0.0
    }

    pub fn is_ready(&self) -> bool {
        !self.is_on_cooldown()
    }

    /// Elapsed share of the cooldown window: 0 right after activation, 1 when ready
    pub fn progress(&self) -> f64 {
        if self.is_ready() {
            return 1.0;
        }
        (1.0 - self.remaining_ms / self.base_cooldown_ms).clamp(0.0, MAX_RUNNING_PROGRESS)
    }

    /// Decrease by `delta_ms`, returns true on the transition to zero
    fn tick(&mut self, delta_ms: f64) -> bool {
        if !self.is_on_cooldown() {
            return false;
        }
        self.remaining_ms -= delta_ms;
        if self.remaining_ms <= EXPIRY_EPSILON_MS {
            self.remaining_ms = 0.0;
        }
        self.remaining_ms == 0.0
    }
}

/// Owns every [`CooldownState`]; iteration follows registration order
#[derive(Debug, Clone, Default)]
pub struct CooldownClock {
    states: Vec<CooldownState>,
    index: HashMap<AbilityId, usize>,
}

impl CooldownClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an ability in the Ready state
    pub fn track(&mut self, ability: &Ability) -> Result<()> {
        if self.index.contains_key(&ability.id) {
            return Err(CooldownError::DuplicateId(ability.id.clone()));
        }
        self.index.insert(ability.id.clone(), self.states.len());
        self.states.push(CooldownState::ready(ability));
        Ok(())
    }

    /// Put an ability on cooldown for `duration_ms`, clamped to its base window.
    ///
    /// Eligibility is not checked here. A zero or NaN duration leaves the state
    /// untouched: it never cuts a running cooldown short, since that would drop
    /// its expiry. Use [`CooldownClock::reset_one`] to end one early.
    pub fn start(&mut self, id: &str, duration_ms: f64) -> Result<()> {
        let state = self.state_mut(id)?;
        let duration = if duration_ms.is_nan() {
            0.0
        } else {
            duration_ms.clamp(0.0, state.base_cooldown_ms)
        };
        if duration > 0.0 {
            state.remaining_ms = duration;
        }
        Ok(())
    }

    /// Advance every running cooldown by `delta_ms`.
    ///
    /// Returns the ids whose remaining time crossed from positive to zero during
    /// this call, in registration order. Negative, NaN and infinite deltas are a no-op.
    pub fn advance(&mut self, delta_ms: f64) -> Vec<AbilityId> {
        let delta = sanitize_delta(delta_ms);
        if delta == 0.0 {
            return Vec::new();
        }

        let mut expired = Vec::new();
        for state in &mut self.states {
            if state.tick(delta) {
                expired.push(state.id.clone());
            }
        }
        expired
    }

    pub fn remaining(&self, id: &str) -> Result<f64> {
        self.state(id).map(CooldownState::remaining_ms)
    }

    pub fn is_ready(&self, id: &str) -> Result<bool> {
        self.state(id).map(CooldownState::is_ready)
    }

    pub fn state(&self, id: &str) -> Result<&CooldownState> {
        self.index
            .get(id)
            .map(|&slot| &self.states[slot])
            .ok_or_else(|| CooldownError::UnknownAbility(id.into()))
    }

    fn state_mut(&mut self, id: &str) -> Result<&mut CooldownState> {
        match self.index.get(id) {
            Some(&slot) => Ok(&mut self.states[slot]),
            None => Err(CooldownError::UnknownAbility(id.into())),
        }
    }

    pub fn states(&self) -> &[CooldownState] {
        &self.states
    }

    /// Number of abilities currently on cooldown
    pub fn active_count(&self) -> usize {
        self.states.iter().filter(|s| s.is_on_cooldown()).count()
    }

    /// Force one ability back to Ready. Returns true if it was on cooldown,
    /// in which case the caller must treat it as an expiry.
    pub fn reset_one(&mut self, id: &str) -> Result<bool> {
        let state = self.state_mut(id)?;
        let was_running = state.is_on_cooldown();
        state.remaining_ms = 0.0;
        Ok(was_running)
    }

    /// Force every ability back to Ready, returning those that were running
    pub fn reset_all(&mut self) -> Vec<AbilityId> {
        let mut expired = Vec::new();
        for state in &mut self.states {
            if state.is_on_cooldown() {
                state.remaining_ms = 0.0;
                expired.push(state.id.clone());
            }
        }
        expired
    }
}
