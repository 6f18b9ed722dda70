//! Bounded activation log
//!
//! Each ability keeps its most recent `capacity` records (oldest evicted first).
//! Activation counters are independent of eviction.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::registry::AbilityId;

/// One successful activation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub ability_id: AbilityId,
    /// Caller-supplied timestamp (ms)
    pub timestamp: f64,
    /// Ledger-wide, strictly increasing
    pub sequence_index: u64,
}

#[derive(Debug, Clone)]
pub struct UsageLedger {
    capacity: usize,
    history: HashMap<AbilityId, VecDeque<UsageRecord>>,
    counts: HashMap<AbilityId, u64>,
    total: u64,
    next_sequence: u64,
}

impl Default for UsageLedger {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_LEDGER_CAPACITY)
    }
}

impl UsageLedger {
    /// Create a ledger keeping `capacity` records per ability (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            history: HashMap::new(),
            counts: HashMap::new(),
            total: 0,
            next_sequence: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a record, evicting the ability's oldest one once over capacity
    pub fn record(&mut self, id: &AbilityId, timestamp: f64) -> UsageRecord {
        let record = UsageRecord {
            ability_id: id.clone(),
            timestamp,
            sequence_index: self.next_sequence,
        };
        self.next_sequence += 1;

        let capacity = self.capacity;
        let ring = self
            .history
            .entry(id.clone())
            .or_insert_with(|| VecDeque::with_capacity(capacity));
        ring.push_back(record.clone());
        if ring.len() > capacity {
            ring.pop_front();
        }

        *self.counts.entry(id.clone()).or_insert(0) += 1;
        self.total += 1;
        record
    }

    /// Activations ever recorded for `id` (0 if never used)
    pub fn count_for(&self, id: &str) -> u64 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn total_count(&self) -> u64 {
        self.total
    }

    /// Most recent records for `id`, newest first, at most `limit`
    pub fn history(&self, id: &str, limit: usize) -> Vec<&UsageRecord> {
        self.history
            .get(id)
            .map(|ring| ring.iter().rev().take(limit).collect())
            .unwrap_or_default()
    }

    /// Most recent record for `id`
    pub fn last(&self, id: &str) -> Option<&UsageRecord> {
        self.history.get(id).and_then(|ring| ring.back())
    }

    /// Drop all records and counters (session restart)
    pub fn clear(&mut self) {
        self.history.clear();
        self.counts.clear();
        self.total = 0;
        self.next_sequence = 0;
    }
}
