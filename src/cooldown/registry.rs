//! Static ability catalog
//!
//! Abilities are registered once at setup and never change afterwards.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CooldownError, Result};

/// Stable key of an ability (e.g. "fire", "dash")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbilityId(String);

impl AbilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for AbilityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AbilityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AbilityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Immutable ability definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub id: AbilityId,
    /// Full cooldown window (ms), always positive and finite
    pub base_cooldown_ms: f64,
}

/// Catalog of abilities in registration order
#[derive(Debug, Clone, Default)]
pub struct AbilityRegistry {
    abilities: Vec<Ability>,
    index: HashMap<AbilityId, usize>,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ability. Rejects non-positive or non-finite durations and duplicate ids.
    pub fn register(&mut self, id: impl Into<AbilityId>, base_cooldown_ms: f64) -> Result<&Ability> {
        let id = id.into();
        if !base_cooldown_ms.is_finite() || base_cooldown_ms <= 0.0 {
            return Err(CooldownError::InvalidDuration {
                id,
                duration_ms: base_cooldown_ms,
            });
        }
        if self.index.contains_key(&id) {
            return Err(CooldownError::DuplicateId(id));
        }

        let slot = self.abilities.len();
        self.index.insert(id.clone(), slot);
        self.abilities.push(Ability {
            id,
            base_cooldown_ms,
        });
        Ok(&self.abilities[slot])
    }

    pub fn get(&self, id: &str) -> Result<&Ability> {
        self.index
            .get(id)
            .map(|&slot| &self.abilities[slot])
            .ok_or_else(|| CooldownError::UnknownAbility(id.into()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All abilities, in insertion order
    pub fn list(&self) -> &[Ability] {
        &self.abilities
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}
