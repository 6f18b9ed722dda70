//! Fixed-step host loop helper
//!
//! Turns measured frame deltas into whole logical ticks of `consts::TICK_MS`, so
//! cooldowns advance identically whatever the frame rate.

use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, TICK_MS};
use crate::cooldown::{AbilityId, CooldownManager};
use crate::sanitize_delta;

#[derive(Debug, Clone)]
pub struct FixedStepper {
    step_ms: f64,
    max_substeps: u32,
    accumulator: f64,
    ticks: u64,
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new(TICK_MS, MAX_SUBSTEPS)
    }
}

impl FixedStepper {
    pub fn new(step_ms: f64, max_substeps: u32) -> Self {
        let step_ms = if step_ms.is_finite() && step_ms > 0.0 {
            step_ms
        } else {
            TICK_MS
        };
        Self {
            step_ms,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            ticks: 0,
        }
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    /// Total ticks emitted since creation or the last reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Leftover time not yet turned into a tick
    pub fn pending_ms(&self) -> f64 {
        self.accumulator
    }

    /// Feed one frame delta, returns how many ticks to run now
    pub fn push_frame(&mut self, frame_ms: f64) -> u32 {
        let frame = sanitize_delta(frame_ms).min(MAX_FRAME_MS);
        self.accumulator += frame;

        let mut substeps = 0;
        while self.accumulator >= self.step_ms && substeps < self.max_substeps {
            self.accumulator -= self.step_ms;
            substeps += 1;
        }
        // Drop backlog beyond the substep cap instead of spiralling
        if substeps == self.max_substeps && self.accumulator >= self.step_ms {
            log::debug!("Dropping {:.1}ms of tick backlog", self.accumulator);
            self.accumulator %= self.step_ms;
        }

        self.ticks += substeps as u64;
        substeps
    }

    /// Feed one frame and advance `manager` tick by tick, collecting expiries
    pub fn drive(&mut self, manager: &mut CooldownManager, frame_ms: f64) -> Vec<AbilityId> {
        let steps = self.push_frame(frame_ms);
        let mut expired = Vec::new();
        for _ in 0..steps {
            expired.extend(manager.advance(self.step_ms));
        }
        expired
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.ticks = 0;
    }
}
