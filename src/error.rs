//! Error types
//!
//! Every failure is local and recoverable. A rejected activation is not an
//! error; see `ActivationResult`.

use thiserror::Error;

use crate::cooldown::AbilityId;

#[derive(Debug, Error)]
pub enum CooldownError {
    /// Query or activation referencing an id that was never registered
    #[error("unknown ability: {0}")]
    UnknownAbility(AbilityId),

    #[error("ability already registered: {0}")]
    DuplicateId(AbilityId),

    /// Base cooldown must be positive and finite
    #[error("invalid cooldown duration for {id}: {duration_ms}ms")]
    InvalidDuration { id: AbilityId, duration_ms: f64 },

    #[error("invalid global lock window: {0}ms")]
    InvalidLockWindow(f64),

    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CooldownError>;
