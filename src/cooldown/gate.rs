//! Activation arbitration
//!
//! The gate borrows the clock and ledger for the duration of one request. It owns
//! neither, and a failed lookup leaves both untouched.

use serde::{Deserialize, Serialize};

use super::clock::CooldownClock;
use super::ledger::UsageLedger;
use super::lock::ActivationPolicy;
use super::registry::AbilityRegistry;
use crate::error::Result;

/// Outcome of an activation request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationResult {
    /// Cooldown started and usage recorded
    Activated,
    /// The ability's own cooldown is still running
    RejectedOnCooldown { remaining_ms: f64 },
    /// An installed policy (special-ability lock) blocks the ability
    RejectedGlobalLock { remaining_ms: f64 },
}

impl ActivationResult {
    pub fn is_activated(&self) -> bool {
        matches!(self, ActivationResult::Activated)
    }

    /// Time left before a retry could succeed (0 when activated)
    pub fn remaining_ms(&self) -> f64 {
        match *self {
            ActivationResult::Activated => 0.0,
            ActivationResult::RejectedOnCooldown { remaining_ms }
            | ActivationResult::RejectedGlobalLock { remaining_ms } => remaining_ms,
        }
    }
}

pub struct TriggerGate<'a> {
    registry: &'a AbilityRegistry,
    clock: &'a mut CooldownClock,
    ledger: &'a mut UsageLedger,
    policy: Option<&'a mut (dyn ActivationPolicy + 'static)>,
}

impl<'a> TriggerGate<'a> {
    pub fn new(
        registry: &'a AbilityRegistry,
        clock: &'a mut CooldownClock,
        ledger: &'a mut UsageLedger,
    ) -> Self {
        Self {
            registry,
            clock,
            ledger,
            policy: None,
        }
    }

    /// Consult `policy` before every activation
    pub fn with_policy(mut self, policy: Option<&'a mut (dyn ActivationPolicy + 'static)>) -> Self {
        self.policy = policy;
        self
    }

    /// Try to fire `id` at timestamp `now`.
    ///
    /// Order: unknown id (error), own cooldown, policy lock. Rejections change nothing.
    pub fn try_activate(&mut self, id: &str, now: f64) -> Result<ActivationResult> {
        let ability = self.registry.get(id)?;
        let base_cooldown_ms = ability.base_cooldown_ms;
        let ability_id = ability.id.clone();

        let remaining_ms = self.clock.remaining(id)?;
        if remaining_ms > 0.0 {
            return Ok(ActivationResult::RejectedOnCooldown { remaining_ms });
        }

        if let Some(policy) = self.policy.as_deref() {
            if let Some(remaining_ms) = policy.lock_remaining(id, now) {
                return Ok(ActivationResult::RejectedGlobalLock { remaining_ms });
            }
        }

        self.clock.start(id, base_cooldown_ms)?;
        self.ledger.record(&ability_id, now);
        if let Some(policy) = self.policy.as_deref_mut() {
            policy.on_activated(id, now);
        }
        Ok(ActivationResult::Activated)
    }
}
