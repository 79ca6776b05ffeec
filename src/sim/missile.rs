//! Missile entity
//!
//! One type for every launch platform; the platform only changes the icon
//! drawn at the launch point.

use serde::{Deserialize, Serialize};

use super::sites::Tint;
use crate::consts::MISSILE_PATH_SAMPLES;
use crate::geo::{Coordinate, compute_path};

/// Launch platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleKind {
    /// Land-based silo
    Surface,
    /// Ballistic missile submarine
    Submarine,
}

/// A missile in flight along a precomputed great-circle path
#[derive(Debug, Clone)]
pub struct Missile {
    pub id: u32,
    pub kind: VehicleKind,
    pub tint: Tint,
    start: Coordinate,
    end: Coordinate,
    /// 0.0 at launch, 1.0 at impact
    progress: f32,
    /// Seconds of flight
    duration: f32,
    path: Vec<Coordinate>,
}

impl Missile {
    /// Create a missile and compute its path
    ///
    /// Non-positive or non-finite durations are replaced by a tiny positive one
    /// so the missile still lands on its first update.
    pub fn new(
        id: u32,
        start: Coordinate,
        end: Coordinate,
        tint: Tint,
        kind: VehicleKind,
        duration: f32,
    ) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            f32::EPSILON
        };
        Self {
            id,
            kind,
            tint,
            start,
            end,
            progress: 0.0,
            duration,
            path: compute_path(start, end, MISSILE_PATH_SAMPLES),
        }
    }

    /// Advance flight by `dt` seconds
    ///
    /// Returns true only on the update that reaches impact. Negative `dt`
    /// is ignored so progress never goes backwards.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.is_finished() {
            return false;
        }
        self.progress = (self.progress + dt.max(0.0) / self.duration).min(1.0);
        self.is_finished()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }

    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn start(&self) -> Coordinate {
        self.start
    }

    /// Impact point (last path sample)
    #[inline]
    pub fn impact_point(&self) -> Coordinate {
        self.path.last().copied().unwrap_or(self.end)
    }

    #[inline]
    pub fn path(&self) -> &[Coordinate] {
        &self.path
    }

    /// Prefix of the path already flown
    pub fn visible_path(&self) -> &[Coordinate] {
        let n = ((self.progress * self.path.len() as f32) as usize).min(self.path.len());
        &self.path[..n]
    }

    /// Current warhead position
    pub fn head(&self) -> Coordinate {
        if self.path.is_empty() {
            return self.start;
        }
        let idx = (self.progress * (self.path.len() - 1) as f32) as usize;
        self.path[idx.min(self.path.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MISSILE_FLIGHT_SECONDS;
    use proptest::prelude::*;

    fn moscow_to_london() -> Missile {
        Missile::new(
            1,
            Coordinate::new(55.7558, 37.6173),
            Coordinate::new(51.5074, -0.1278),
            Tint::Cyan,
            VehicleKind::Surface,
            MISSILE_FLIGHT_SECONDS,
        )
    }

    #[test]
    fn test_new_missile() {
        let m = moscow_to_london();
        assert_eq!(m.path().len(), MISSILE_PATH_SAMPLES);
        assert_eq!(m.progress(), 0.0);
        assert!(!m.is_finished());
        assert!(m.visible_path().is_empty());
        assert_eq!(m.head(), m.start());
    }

    #[test]
    fn test_finishes_exactly_once() {
        let mut m = moscow_to_london();
        let mut transitions = 0;
        for _ in 0..200 {
            if m.update(0.1) {
                transitions += 1;
            }
        }
        assert_eq!(transitions, 1);
        assert_eq!(m.progress(), 1.0);
        assert!(m.is_finished());
        assert_eq!(m.visible_path().len(), MISSILE_PATH_SAMPLES);
        assert_eq!(m.head(), m.impact_point());
    }

    #[test]
    fn test_large_dt_clamps() {
        let mut m = moscow_to_london();
        assert!(m.update(1000.0));
        assert_eq!(m.progress(), 1.0);
        assert!(!m.update(1000.0));
    }

    #[test]
    fn test_negative_dt_ignored() {
        let mut m = moscow_to_london();
        m.update(6.0);
        let p = m.progress();
        assert!(!m.update(-3.0));
        assert_eq!(m.progress(), p);
    }

    #[test]
    fn test_bad_duration() {
        let mut m = Missile::new(
            7,
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 10.0),
            Tint::Red,
            VehicleKind::Submarine,
            0.0,
        );
        assert!(m.duration() > 0.0);
        assert!(m.update(0.016));
    }

    proptest! {
        #[test]
        fn prop_progress_monotonic(dts in proptest::collection::vec(-1.0f32..2.0, 1..100)) {
            let mut m = moscow_to_london();
            let mut last = m.progress();
            let mut finished_calls = 0;
            for dt in dts {
                if m.update(dt) {
                    finished_calls += 1;
                }
                prop_assert!(m.progress() >= last);
                prop_assert!(m.progress() <= 1.0);
                last = m.progress();
            }
            prop_assert!(finished_calls <= 1);
        }
    }
}
