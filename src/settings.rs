//! Cooldown settings
//!
//! Data-driven ability catalog, loaded from JSON. Saving the result anywhere is
//! the host's business.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GLOBAL_LOCK_MS, DEFAULT_LEDGER_CAPACITY};
use crate::cooldown::AbilityId;
use crate::error::Result;

/// One ability entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilitySettings {
    pub id: AbilityId,
    pub base_cooldown_ms: f64,
}

impl AbilitySettings {
    pub fn new(id: impl Into<AbilityId>, base_cooldown_ms: f64) -> Self {
        Self {
            id: id.into(),
            base_cooldown_ms,
        }
    }
}

/// Special ability that locks all others for `window_ms` after use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalLockSettings {
    pub special_id: AbilityId,
    #[serde(default = "default_lock_window")]
    pub window_ms: f64,
}

fn default_lock_window() -> f64 {
    DEFAULT_GLOBAL_LOCK_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownSettings {
    /// Usage records kept per ability
    pub ledger_capacity: usize,
    pub abilities: Vec<AbilitySettings>,
    /// Disabled unless present
    pub global_lock: Option<GlobalLockSettings>,
}

impl Default for CooldownSettings {
    fn default() -> Self {
        Self {
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
            abilities: Vec::new(),
            global_lock: None,
        }
    }
}

impl CooldownSettings {
    /// Five staggered skills (1s..5s) plus an ultimate that locks the rest
    pub fn demo() -> Self {
        let mut abilities: Vec<AbilitySettings> = (1..=5)
            .map(|i| AbilitySettings::new(format!("skill{}", i), i as f64 * 1000.0))
            .collect();
        abilities.push(AbilitySettings::new("ultimate", 8000.0));

        Self {
            abilities,
            global_lock: Some(GlobalLockSettings {
                special_id: "ultimate".into(),
                window_ms: DEFAULT_GLOBAL_LOCK_MS,
            }),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings = serde_json::from_str(json)?;
        log::info!("Loaded cooldown settings");
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Effective ledger capacity (never below 1)
    pub fn effective_ledger_capacity(&self) -> usize {
        self.ledger_capacity.max(1)
    }
}
