//! Per-frame simulation tick
//!
//! Advances every entity by one variable timestep. Order within a tick:
//! controls, aircraft, explosions, timed launch, missiles.

use serde::{Deserialize, Serialize};

use super::explosion::Explosion;
use super::sites::Tint;
use super::state::SimState;
use crate::consts::MAX_FRAME_DT;

/// Simulation control applied at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimControl {
    /// Shorten the launch interval
    Faster,
    /// Lengthen the launch interval
    Slower,
    /// Restore the default launch interval
    ResetIntensity,
    /// Fire a salvo
    Burst,
}

/// Controls for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Applied one by one, in arrival order
    pub controls: Vec<SimControl>,
    /// Pause toggle
    pub toggle_pause: bool,
}

impl TickInput {
    pub fn with_controls(controls: impl IntoIterator<Item = SimControl>) -> Self {
        Self {
            controls: controls.into_iter().collect(),
            toggle_pause: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty() && !self.toggle_pause
    }
}

/// What happened during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Missiles launched (timed or burst)
    pub launched: usize,
    /// Missiles that reached their target and spawned an explosion
    pub detonated: usize,
    /// Explosions that finished and were removed
    pub expired: usize,
}

/// Clamp a raw frame delta to [0, MAX_FRAME_DT]
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Advance the simulation by `dt` seconds
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) -> TickReport {
    let dt = clamp_dt(dt);
    let mut report = TickReport::default();

    if input.toggle_pause {
        state.toggle_pause();
    }
    for control in &input.controls {
        match control {
            SimControl::Faster => state.faster(),
            SimControl::Slower => state.slower(),
            SimControl::ResetIntensity => state.reset_intensity(),
            SimControl::Burst => report.launched += state.burst(),
        }
    }

    // Launches queued while paused stay frozen at the pad
    if state.paused {
        return report;
    }

    state.elapsed += dt as f64;

    for craft in &mut state.aircraft {
        craft.update(dt);
    }

    for explosion in &mut state.explosions {
        explosion.update(dt);
    }
    let before = state.explosions.len();
    state.explosions.retain(|e| !e.is_finished());
    report.expired = before - state.explosions.len();

    state.time_since_launch += dt;
    if state.time_since_launch >= state.launch_interval {
        state.time_since_launch = 0.0;
        state.spawn_random();
        report.launched += 1;
    }

    // Spawn before removal: each missile finishing this tick leaves exactly one explosion
    let mut impacts = Vec::new();
    for missile in &mut state.missiles {
        if missile.update(dt) {
            impacts.push(missile.impact_point());
        }
    }
    for origin in impacts {
        let id = state.next_entity_id();
        state.explosions.push(Explosion::new(id, origin, Tint::Cyan));
        report.detonated += 1;
    }
    state.missiles.retain(|m| !m.is_finished());

    if report != TickReport::default() {
        log::debug!(
            "t={:.2}s launched={} detonated={} expired={} in_flight={} explosions={}",
            state.elapsed,
            report.launched,
            report.detonated,
            report.expired,
            state.missiles.len(),
            state.explosions.len()
        );
    }

    report
}
