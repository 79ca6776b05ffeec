//! Patrol aircraft flying closed holding loops

use serde::{Deserialize, Serialize};

use super::sites::Tint;
use crate::consts::AIRCRAFT_LOOP_SAMPLES;
use crate::geo::Coordinate;

/// Loop samples kept behind the head for the fading trail
pub const AIRCRAFT_TRAIL_LENGTH: usize = 18;

/// Holding-pattern parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopParams {
    pub center: Coordinate,
    /// Loop radius in degrees
    pub radius_deg: f64,
    /// Seconds per lap
    pub period: f32,
}

/// An aircraft circling forever
#[derive(Debug, Clone)]
pub struct Aircraft {
    pub id: u32,
    pub tint: Tint,
    params: LoopParams,
    /// Fraction of the current lap in [0, 1)
    progress: f32,
    path: Vec<Coordinate>,
}

/// Sample a closed loop around `center`
///
/// The last sample does not repeat the first; the loop closes implicitly.
pub fn build_loop(center: Coordinate, radius_deg: f64, samples: usize) -> Vec<Coordinate> {
    (0..samples)
        .map(|i| {
            let angle = i as f64 / samples as f64 * std::f64::consts::TAU;
            Coordinate::new(
                center.lat() + radius_deg * angle.sin(),
                center.lon() + radius_deg * angle.cos(),
            )
        })
        .collect()
}

impl Aircraft {
    pub fn new(id: u32, params: LoopParams, tint: Tint) -> Self {
        Self {
            id,
            tint,
            params,
            progress: 0.0,
            path: build_loop(params.center, params.radius_deg, AIRCRAFT_LOOP_SAMPLES),
        }
    }

    /// Advance around the loop, wrapping at a full lap
    pub fn update(&mut self, dt: f32) {
        if self.params.period <= 0.0 || self.path.is_empty() || dt <= 0.0 {
            return;
        }
        self.progress = (self.progress + dt / self.params.period).rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negatives
        if self.progress >= 1.0 {
            self.progress = 0.0;
        }
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn params(&self) -> &LoopParams {
        &self.params
    }

    #[inline]
    pub fn path(&self) -> &[Coordinate] {
        &self.path
    }

    fn head_index(&self) -> usize {
        let count = self.path.len();
        ((self.progress * (count.saturating_sub(1)) as f32) as usize).min(count.saturating_sub(1))
    }

    /// Current position on the loop
    pub fn head(&self) -> Coordinate {
        self.path
            .get(self.head_index())
            .copied()
            .unwrap_or(self.params.center)
    }

    /// Recent positions, oldest first, ending at the head
    pub fn trail(&self) -> Vec<Coordinate> {
        let count = self.path.len();
        if count == 0 {
            return Vec::new();
        }
        let head = self.head_index();
        let len = AIRCRAFT_TRAIL_LENGTH.min(count);
        (0..len)
            .map(|k| self.path[(head + count - (len - 1 - k)) % count])
            .collect()
    }
}
