//! Read-only projections of cooldown state for renderers
//!
//! Nothing in here mutates the clock. Angles follow screen space (y down), so a
//! clockwise sweep increases the angle.

use glam::Vec2;

use super::clock::CooldownClock;
use crate::error::Result;
use crate::{normalize_angle, polar_to_cartesian};

pub struct ProgressProjector<'a> {
    clock: &'a CooldownClock,
}

impl<'a> ProgressProjector<'a> {
    pub fn new(clock: &'a CooldownClock) -> Self {
        Self { clock }
    }

    /// `1 - remaining / base`: exactly 0 right after activation, exactly 1 when ready
    pub fn progress(&self, id: &str) -> Result<f64> {
        self.clock.state(id).map(|state| state.progress())
    }

    /// End angle of the radial mask covering the remaining cooldown.
    ///
    /// The mask spans `TAU * (1 - progress)` from `start_angle`, so this equals
    /// `start_angle` when ready and `start_angle ± TAU` right after activation.
    /// The result is not normalized.
    pub fn sweep_angle(&self, id: &str, start_angle: f32, clockwise: bool) -> Result<f32> {
        let progress = self.progress(id)?;
        Ok(sweep_end(start_angle, progress, clockwise))
    }

    /// [`Self::sweep_angle`] wrapped into [-PI, PI), for renderers that expect
    /// canonical angles. Ready and freshly started collapse to the same value here.
    pub fn sweep_angle_wrapped(
        &self,
        id: &str,
        start_angle: f32,
        clockwise: bool,
    ) -> Result<f32> {
        self.sweep_angle(id, start_angle, clockwise).map(normalize_angle)
    }

    /// Point on a circle of `radius` around `center` where the mask ends
    pub fn sweep_endpoint(
        &self,
        id: &str,
        center: Vec2,
        radius: f32,
        start_angle: f32,
        clockwise: bool,
    ) -> Result<Vec2> {
        let angle = self.sweep_angle(id, start_angle, clockwise)?;
        Ok(center + polar_to_cartesian(radius, angle))
    }

    /// Countdown text: "1.5s" while running, "Ready" otherwise
    pub fn countdown_label(&self, id: &str) -> Result<String> {
        let state = self.clock.state(id)?;
        if state.is_ready() {
            return Ok("Ready".to_string());
        }
        Ok(format!("{:.1}s", state.remaining_ms() / 1000.0))
    }
}

/// Mask end angle for a given progress value
#[inline]
pub fn sweep_end(start_angle: f32, progress: f64, clockwise: bool) -> f32 {
    let span = std::f32::consts::TAU * (1.0 - progress.clamp(0.0, 1.0)) as f32;
    if clockwise {
        start_angle + span
    } else {
        start_angle - span
    }
}
