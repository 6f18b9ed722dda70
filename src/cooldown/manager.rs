//! Cooldown manager
//!
//! Owns the registry, clock, ledger and optional activation policy, and exposes
//! them through explicit methods. Hosts keep one manager per scene.
//!
//! Tick ordering: call [`CooldownManager::advance`] for the tick before handling
//! that tick's activation requests.

use std::collections::{HashMap, VecDeque};

use glam::Vec2;
use serde::Serialize;

use super::clock::CooldownClock;
use super::gate::{ActivationResult, TriggerGate};
use super::ledger::{UsageLedger, UsageRecord};
use super::lock::{ActivationPolicy, SpecialAbilityLock};
use super::projector::ProgressProjector;
use super::registry::{Ability, AbilityId, AbilityRegistry};
use crate::error::Result;
use crate::settings::CooldownSettings;

/// Maximum undrained events kept; oldest are dropped first
pub const MAX_PENDING_EVENTS: usize = 256;

/// Why an activation was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    OnCooldown,
    GlobalLock,
}

/// Notifications for hosts and renderers, drained with [`CooldownManager::drain_events`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CooldownEvent {
    Activated { id: AbilityId, timestamp: f64 },
    Rejected { id: AbilityId, reason: RejectReason, remaining_ms: f64 },
    /// Remaining time reached zero (natural or administrative), fired once per cooldown
    Expired { id: AbilityId },
    /// Whole session reset
    Reset,
}

/// Per-ability row of a [`CooldownSnapshot`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbilitySnapshot {
    pub id: AbilityId,
    pub base_cooldown_ms: f64,
    pub remaining_ms: f64,
    pub progress: f64,
    pub ready: bool,
    pub uses: u64,
    pub rejections: u64,
}

/// Read-only view of the whole manager, for inspection and debug overlays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CooldownSnapshot {
    pub abilities: Vec<AbilitySnapshot>,
    pub active_cooldowns: usize,
    pub total_uses: u64,
    pub total_rejections: u64,
}

#[derive(Debug)]
pub struct CooldownManager {
    registry: AbilityRegistry,
    clock: CooldownClock,
    ledger: UsageLedger,
    policy: Option<Box<dyn ActivationPolicy>>,
    rejections: HashMap<AbilityId, u64>,
    events: VecDeque<CooldownEvent>,
}

impl Default for CooldownManager {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_LEDGER_CAPACITY)
    }
}

impl CooldownManager {
    /// Empty manager without any activation policy
    pub fn new(ledger_capacity: usize) -> Self {
        Self {
            registry: AbilityRegistry::new(),
            clock: CooldownClock::new(),
            ledger: UsageLedger::new(ledger_capacity),
            policy: None,
            rejections: HashMap::new(),
            events: VecDeque::new(),
        }
    }

    /// Build from settings, registering every ability and the optional lock
    pub fn from_settings(settings: &CooldownSettings) -> Result<Self> {
        let mut manager = Self::new(settings.effective_ledger_capacity());
        for ability in &settings.abilities {
            manager.register(ability.id.as_str(), ability.base_cooldown_ms)?;
        }
        if let Some(lock) = &settings.global_lock {
            let policy = SpecialAbilityLock::new(lock.special_id.as_str(), lock.window_ms)?;
            if !manager.registry.contains(lock.special_id.as_str()) {
                log::warn!("Global lock special ability '{}' is not registered", lock.special_id);
            }
            manager.set_policy(Some(Box::new(policy)));
        }
        Ok(manager)
    }

    pub fn with_policy(mut self, policy: impl ActivationPolicy + 'static) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    pub fn set_policy(&mut self, policy: Option<Box<dyn ActivationPolicy>>) {
        self.policy = policy;
    }

    pub fn has_policy(&self) -> bool {
        self.policy.is_some()
    }

    /// Register an ability; it starts Ready
    pub fn register(&mut self, id: impl Into<AbilityId>, base_cooldown_ms: f64) -> Result<()> {
        let ability = self.registry.register(id, base_cooldown_ms)?;
        self.clock.track(ability)?;
        log::info!("Registered ability '{}' ({}ms)", ability.id, ability.base_cooldown_ms);
        Ok(())
    }

    pub fn ability(&self, id: &str) -> Result<&Ability> {
        self.registry.get(id)
    }

    pub fn abilities(&self) -> &[Ability] {
        self.registry.list()
    }

    /// Request activation of `id` at timestamp `now` (ms)
    pub fn try_activate(&mut self, id: &str, now: f64) -> Result<ActivationResult> {
        let result = TriggerGate::new(&self.registry, &mut self.clock, &mut self.ledger)
            .with_policy(self.policy.as_deref_mut())
            .try_activate(id, now)?;

        // Gate succeeded, so `id` is registered
        let ability_id = self.registry.get(id)?.id.clone();
        match result {
            ActivationResult::Activated => {
                log::debug!("Activated '{}' at {}ms", id, now);
                self.push_event(CooldownEvent::Activated {
                    id: ability_id,
                    timestamp: now,
                });
            }
            ActivationResult::RejectedOnCooldown { remaining_ms } => {
                self.note_rejection(ability_id, RejectReason::OnCooldown, remaining_ms);
            }
            ActivationResult::RejectedGlobalLock { remaining_ms } => {
                self.note_rejection(ability_id, RejectReason::GlobalLock, remaining_ms);
            }
        }
        Ok(result)
    }

    fn note_rejection(&mut self, id: AbilityId, reason: RejectReason, remaining_ms: f64) {
        log::debug!("Rejected '{}' ({:?}, {:.0}ms left)", id, reason, remaining_ms);
        *self.rejections.entry(id.clone()).or_insert(0) += 1;
        self.push_event(CooldownEvent::Rejected {
            id,
            reason,
            remaining_ms,
        });
    }

    /// Advance all cooldowns by one tick; returns abilities that just became ready
    pub fn advance(&mut self, delta_ms: f64) -> Vec<AbilityId> {
        let expired = self.clock.advance(delta_ms);
        for id in &expired {
            log::debug!("'{}' ready", id);
            self.push_event(CooldownEvent::Expired { id: id.clone() });
        }
        expired
    }

    pub fn remaining(&self, id: &str) -> Result<f64> {
        self.clock.remaining(id)
    }

    pub fn is_ready(&self, id: &str) -> Result<bool> {
        self.clock.is_ready(id)
    }

    pub fn progress(&self, id: &str) -> Result<f64> {
        self.projector().progress(id)
    }

    pub fn sweep_angle(&self, id: &str, start_angle: f32, clockwise: bool) -> Result<f32> {
        self.projector().sweep_angle(id, start_angle, clockwise)
    }

    pub fn sweep_angle_wrapped(
        &self,
        id: &str,
        start_angle: f32,
        clockwise: bool,
    ) -> Result<f32> {
        self.projector().sweep_angle_wrapped(id, start_angle, clockwise)
    }

    pub fn sweep_endpoint(
        &self,
        id: &str,
        center: Vec2,
        radius: f32,
        start_angle: f32,
        clockwise: bool,
    ) -> Result<Vec2> {
        self.projector()
            .sweep_endpoint(id, center, radius, start_angle, clockwise)
    }

    pub fn countdown_label(&self, id: &str) -> Result<String> {
        self.projector().countdown_label(id)
    }

    pub fn projector(&self) -> ProgressProjector<'_> {
        ProgressProjector::new(&self.clock)
    }

    pub fn clock(&self) -> &CooldownClock {
        &self.clock
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    pub fn count_for(&self, id: &str) -> u64 {
        self.ledger.count_for(id)
    }

    pub fn total_count(&self) -> u64 {
        self.ledger.total_count()
    }

    pub fn history(&self, id: &str, limit: usize) -> Vec<&UsageRecord> {
        self.ledger.history(id, limit)
    }

    pub fn rejections_for(&self, id: &str) -> u64 {
        self.rejections.get(id).copied().unwrap_or(0)
    }

    pub fn total_rejections(&self) -> u64 {
        self.rejections.values().sum()
    }

    pub fn active_count(&self) -> usize {
        self.clock.active_count()
    }

    /// Administrative reset of one ability. A running cooldown expires exactly
    /// as if it had run out; returns whether it was running.
    pub fn reset_ability(&mut self, id: &str) -> Result<bool> {
        let was_running = self.clock.reset_one(id)?;
        if was_running {
            let ability_id = self.registry.get(id)?.id.clone();
            log::debug!("'{}' reset to ready", ability_id);
            self.push_event(CooldownEvent::Expired { id: ability_id });
        }
        Ok(was_running)
    }

    /// Scene teardown / session restart: every ability back to Ready, ledger,
    /// rejection counters and policy cleared. Registrations are kept.
    pub fn reset(&mut self) {
        for id in self.clock.reset_all() {
            self.push_event(CooldownEvent::Expired { id });
        }
        self.ledger.clear();
        self.rejections.clear();
        if let Some(policy) = self.policy.as_deref_mut() {
            policy.reset();
        }
        self.push_event(CooldownEvent::Reset);
        log::info!("Cooldown session reset ({} abilities)", self.registry.len());
    }

    /// Take all pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<CooldownEvent> {
        self.events.drain(..).collect()
    }

    fn push_event(&mut self, event: CooldownEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn snapshot(&self) -> CooldownSnapshot {
        let abilities = self
            .clock
            .states()
            .iter()
            .map(|state| AbilitySnapshot {
                id: state.id.clone(),
                base_cooldown_ms: state.base_cooldown_ms,
                remaining_ms: state.remaining_ms(),
                progress: state.progress(),
                ready: state.is_ready(),
                uses: self.ledger.count_for(state.id.as_str()),
                rejections: self.rejections_for(state.id.as_str()),
            })
            .collect();

        CooldownSnapshot {
            abilities,
            active_cooldowns: self.clock.active_count(),
            total_uses: self.ledger.total_count(),
            total_rejections: self.total_rejections(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CooldownError;
    use crate::settings::{AbilitySettings, GlobalLockSettings};
    use proptest::prelude::*;

    fn expired_count(events: &[CooldownEvent], id: &str) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, CooldownEvent::Expired { id: eid } if eid.as_str() == id))
            .count()
    }

    #[test]
    fn test_fire_cycle() {
        let mut manager = CooldownManager::default();
        manager.register("fire", 1000.0).unwrap();

        let result = manager.try_activate("fire", 0.0).unwrap();
        assert_eq!(result, ActivationResult::Activated);
        assert_eq!(manager.remaining("fire").unwrap(), 1000.0);
        assert_eq!(manager.progress("fire").unwrap(), 0.0);

        manager.advance(500.0);
        assert_eq!(manager.remaining("fire").unwrap(), 500.0);
        assert_eq!(manager.progress("fire").unwrap(), 0.5);
        // Half the circle left from 3 o'clock, either way round, wraps to 9 o'clock
        let wrapped = manager.sweep_angle_wrapped("fire", 0.0, false).unwrap();
        assert!((wrapped.abs() - std::f32::consts::PI).abs() < 1e-5);

        let expired = manager.advance(500.0);
        assert_eq!(expired, vec![AbilityId::from("fire")]);
        assert_eq!(manager.remaining("fire").unwrap(), 0.0);
        assert!(manager.is_ready("fire").unwrap());

        manager.advance(500.0);
        let events = manager.drain_events();
        assert_eq!(expired_count(&events, "fire"), 1);
    }

    #[test]
    fn test_double_press_rejected() {
        let mut manager = CooldownManager::default();
        manager.register("fire", 1000.0).unwrap();

        manager.try_activate("fire", 0.0).unwrap();
        let second = manager.try_activate("fire", 0.0).unwrap();
        assert_eq!(
            second,
            ActivationResult::RejectedOnCooldown { remaining_ms: 1000.0 }
        );
        assert_eq!(manager.remaining("fire").unwrap(), 1000.0);
        assert_eq!(manager.count_for("fire"), 1);
        assert_eq!(manager.rejections_for("fire"), 1);
    }

    #[test]
    fn test_staggered_cooldowns() {
        let mut manager = CooldownManager::default();
        let ids = ["s1", "s2", "s3", "s4", "s5"];
        for (i, id) in ids.iter().enumerate() {
            manager.register(*id, (i as f64 + 1.0) * 1000.0).unwrap();
        }
        for id in ids {
            assert!(manager.try_activate(id, 0.0).unwrap().is_activated());
        }

        let expired = manager.advance(1000.0);
        assert_eq!(expired, vec![AbilityId::from("s1")]);
        assert!(manager.is_ready("s1").unwrap());
        for (i, id) in ids.iter().enumerate().skip(1) {
            let base = (i as f64 + 1.0) * 1000.0;
            assert!(!manager.is_ready(id).unwrap());
            assert_eq!(manager.remaining(id).unwrap(), base - 1000.0);
        }
        assert_eq!(manager.active_count(), 4);
    }

    #[test]
    fn test_history_after_repeated_use() {
        let mut manager = CooldownManager::new(8);
        manager.register("fire", 100.0).unwrap();
        for i in 0..5 {
            let now = i as f64 * 100.0;
            assert!(manager.try_activate("fire", now).unwrap().is_activated());
            manager.advance(100.0);
        }

        let recent = manager.history("fire", 3);
        assert_eq!(recent.len(), 3);
        let stamps: Vec<f64> = recent.iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, [400.0, 300.0, 200.0]);
        assert!(recent[0].sequence_index > recent[1].sequence_index);
        assert_eq!(manager.count_for("fire"), 5);
    }

    #[test]
    fn test_negative_delta_is_noop() {
        let mut manager = CooldownManager::default();
        manager.register("fire", 1000.0).unwrap();
        manager.register("ice", 10.0).unwrap();
        manager.try_activate("fire", 0.0).unwrap();
        manager.try_activate("ice", 0.0).unwrap();
        manager.drain_events();

        let expired = manager.advance(-50.0);
        assert!(expired.is_empty());
        assert_eq!(manager.remaining("fire").unwrap(), 1000.0);
        assert_eq!(manager.remaining("ice").unwrap(), 10.0);
        assert!(manager.drain_events().is_empty());
    }

    #[test]
    fn test_unknown_activation_leaves_state_untouched() {
        let mut manager = CooldownManager::default();
        manager.register("fire", 1000.0).unwrap();
        manager.try_activate("fire", 0.0).unwrap();
        manager.advance(200.0);
        let before = manager.snapshot();
        manager.drain_events();

        let err = manager.try_activate("unknown", 10.0).unwrap_err();
        assert!(matches!(err, CooldownError::UnknownAbility(_)));
        assert_eq!(manager.snapshot(), before);
        assert!(manager.drain_events().is_empty());
    }

    #[test]
    fn test_reset_ability_fires_expiry_once() {
        let mut manager = CooldownManager::default();
        manager.register("fire", 1000.0).unwrap();
        manager.try_activate("fire", 0.0).unwrap();
        manager.drain_events();

        assert!(manager.reset_ability("fire").unwrap());
        assert!(!manager.reset_ability("fire").unwrap());
        manager.advance(1000.0);

        let events = manager.drain_events();
        assert_eq!(expired_count(&events, "fire"), 1);
        assert!(manager.try_activate("fire", 10.0).unwrap().is_activated());
    }

    #[test]
    fn test_session_reset() {
        let mut manager = CooldownManager::default()
            .with_policy(SpecialAbilityLock::new("ultimate", 2000.0).unwrap());
        manager.register("fire", 1000.0).unwrap();
        manager.register("ultimate", 5000.0).unwrap();
        manager.try_activate("ultimate", 0.0).unwrap();
        manager.try_activate("fire", 0.0).unwrap();
        manager.drain_events();

        manager.reset();
        let events = manager.drain_events();
        assert_eq!(expired_count(&events, "ultimate"), 1);
        assert_eq!(events.last(), Some(&CooldownEvent::Reset));

        assert!(manager.is_ready("ultimate").unwrap());
        assert_eq!(manager.total_count(), 0);
        assert_eq!(manager.total_rejections(), 0);
        assert!(manager.history("ultimate", 10).is_empty());
        // Lock released as well
        assert!(manager.try_activate("fire", 1.0).unwrap().is_activated());
    }

    #[test]
    fn test_global_lock_from_settings() {
        let settings = CooldownSettings {
            abilities: vec![
                AbilitySettings::new("fire", 500.0),
                AbilitySettings::new("ultimate", 8000.0),
            ],
            global_lock: Some(GlobalLockSettings {
                special_id: "ultimate".into(),
                window_ms: 2000.0,
            }),
            ..Default::default()
        };
        let mut manager = CooldownManager::from_settings(&settings).unwrap();
        assert!(manager.has_policy());

        manager.try_activate("ultimate", 1000.0).unwrap();
        let blocked = manager.try_activate("fire", 1500.0).unwrap();
        assert_eq!(
            blocked,
            ActivationResult::RejectedGlobalLock { remaining_ms: 1500.0 }
        );
        assert!(manager.is_ready("fire").unwrap());
        assert_eq!(manager.rejections_for("fire"), 1);

        assert!(manager.try_activate("fire", 3000.0).unwrap().is_activated());
    }

    #[test]
    fn test_no_lock_by_default() {
        let mut manager = CooldownManager::default();
        manager.register("fire", 500.0).unwrap();
        manager.register("ultimate", 8000.0).unwrap();
        manager.try_activate("ultimate", 0.0).unwrap();
        assert!(manager.try_activate("fire", 1.0).unwrap().is_activated());
    }

    #[test]
    fn test_from_settings_propagates_errors() {
        let settings = CooldownSettings {
            abilities: vec![AbilitySettings::new("fire", 500.0), AbilitySettings::new("fire", 1.0)],
            ..Default::default()
        };
        assert!(matches!(
            CooldownManager::from_settings(&settings),
            Err(CooldownError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut manager = CooldownManager::default();
        manager.register("fire", 1000.0).unwrap();
        manager.try_activate("fire", 0.0).unwrap();
        manager.try_activate("fire", 1.0).unwrap();
        manager.advance(250.0);

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.active_cooldowns, 1);
        assert_eq!(snapshot.total_uses, 1);
        assert_eq!(snapshot.total_rejections, 1);
        assert_eq!(snapshot.abilities[0].remaining_ms, 750.0);
        assert_eq!(snapshot.abilities[0].progress, 0.25);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["abilities"][0]["id"], "fire");
        assert_eq!(json["total_uses"], 1);
    }

    #[test]
    fn test_event_queue_is_bounded() {
        let mut manager = CooldownManager::default();
        manager.register("fire", 1000.0).unwrap();
        manager.try_activate("fire", 0.0).unwrap();
        for _ in 0..(MAX_PENDING_EVENTS + 10) {
            manager.try_activate("fire", 0.0).unwrap();
        }
        let events = manager.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        assert!(matches!(events[0], CooldownEvent::Rejected { .. }));
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_under_random_play(
            ops in prop::collection::vec((0usize..4, -50i32..400, any::<bool>()), 1..120),
        ) {
            let bases = [("a", 300.0), ("b", 750.0), ("c", 1200.0), ("d", 90.0)];
            let mut manager = CooldownManager::new(5);
            for (id, base) in bases {
                manager.register(id, base).unwrap();
            }

            let mut now = 0.0;
            for (pick, delta, press) in ops {
                let delta = delta as f64;
                manager.advance(delta);
                now += delta.max(0.0);
                if press {
                    let id = bases[pick].0;
                    let before = manager.remaining(id).unwrap();
                    let result = manager.try_activate(id, now).unwrap();
                    if !result.is_activated() {
                        prop_assert_eq!(manager.remaining(id).unwrap(), before);
                        prop_assert_eq!(result.remaining_ms(), before);
                    }
                }

                let mut sum = 0;
                for (id, base) in bases {
                    let remaining = manager.remaining(id).unwrap();
                    prop_assert!((0.0..=base).contains(&remaining));
                    prop_assert_eq!(manager.progress(id).unwrap() == 1.0, manager.is_ready(id).unwrap());
                    prop_assert!(manager.history(id, usize::MAX).len() <= 5);
                    sum += manager.count_for(id);
                }
                prop_assert_eq!(manager.total_count(), sum);
            }
        }
    }
}
