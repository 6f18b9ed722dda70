//! Deterministic cooldown core
//!
//! All cooldown logic lives here. This module must stay pure and deterministic:
//! - Time only moves through `advance(delta_ms)` from the host loop
//! - No timers, threads or callbacks
//! - Stable iteration order (registration order)
//! - No rendering or platform dependencies

pub mod clock;
pub mod gate;
pub mod ledger;
pub mod lock;
pub mod manager;
pub mod projector;
pub mod registry;

pub use clock::{CooldownClock, CooldownState, EXPIRY_EPSILON_MS};
pub use gate::{ActivationResult, TriggerGate};
pub use ledger::{UsageLedger, UsageRecord};
pub use lock::{ActivationPolicy, SpecialAbilityLock};
pub use manager::{
    AbilitySnapshot, CooldownEvent, CooldownManager, CooldownSnapshot, MAX_PENDING_EVENTS,
    RejectReason,
};
pub use projector::{ProgressProjector, sweep_end};
pub use registry::{Ability, AbilityId, AbilityRegistry};
