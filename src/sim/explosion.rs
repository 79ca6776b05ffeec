//! Impact explosions: staggered expanding rings plus a short central flash

use serde::{Deserialize, Serialize};

use super::sites::Tint;
use crate::consts::EXPLOSION_DURATION;
use crate::geo::Coordinate;

/// Seconds the central flash lasts
pub const FLASH_DURATION: f32 = 0.5;

/// One expanding ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    /// Seconds after detonation before the ring appears
    pub delay: f32,
    /// Pixel radius at the end of the ring's life
    pub max_radius: f32,
}

/// Ring set shared by every explosion
pub const RINGS: [Ring; 4] = [
    Ring { delay: 0.0, max_radius: 50.0 },
    Ring { delay: 0.3, max_radius: 50.0 },
    Ring { delay: 0.6, max_radius: 50.0 },
    Ring { delay: 0.9, max_radius: 50.0 },
];

/// Draw parameters for one ring at the current age
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingState {
    pub radius: f32,
    pub alpha: f32,
}

/// Draw parameters for the central flash
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlashState {
    pub radius: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct Explosion {
    pub id: u32,
    pub origin: Coordinate,
    pub tint: Tint,
    age: f32,
    duration: f32,
}

impl Explosion {
    pub fn new(id: u32, origin: Coordinate, tint: Tint) -> Self {
        Self {
            id,
            origin,
            tint,
            age: 0.0,
            duration: EXPLOSION_DURATION,
        }
    }

    /// Age the explosion; negative `dt` is ignored
    pub fn update(&mut self, dt: f32) {
        self.age += dt.max(0.0);
    }

    #[inline]
    pub fn age(&self) -> f32 {
        self.age
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.age >= self.duration
    }

    /// Ring `i` is visible iff `0 <= age - delay <= duration - delay`
    ///
    /// Each ring grows linearly to its max radius while its alpha fades to
    /// zero, finishing together with the explosion.
    pub fn ring_states(&self) -> impl Iterator<Item = RingState> + '_ {
        RINGS.iter().filter_map(move |ring| {
            let ring_age = self.age - ring.delay;
            let span = self.duration - ring.delay;
            if ring_age < 0.0 || ring_age > span || span <= 0.0 {
                return None;
            }
            let t = ring_age / span;
            Some(RingState {
                radius: t * ring.max_radius,
                alpha: 1.0 - t,
            })
        })
    }

    /// Central flash, present only during the first half second
    pub fn flash(&self) -> Option<FlashState> {
        (self.age < FLASH_DURATION).then(|| FlashState {
            radius: 5.0 + self.age * 10.0,
            alpha: 1.0 - self.age / FLASH_DURATION,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boom() -> Explosion {
        Explosion::new(3, Coordinate::new(51.5, -0.12), Tint::Cyan)
    }

    #[test]
    fn test_rings_stagger_in() {
        let mut e = boom();
        assert_eq!(e.ring_states().count(), 1);
        e.update(0.35);
        assert_eq!(e.ring_states().count(), 2);
        e.update(0.6);
        assert_eq!(e.ring_states().count(), 4);
    }

    #[test]
    fn test_ring_growth_and_fade() {
        let mut e = boom();
        e.update(1.25);
        let first = e.ring_states().next().unwrap();
        assert!((first.radius - 25.0).abs() < 1e-4);
        assert!((first.alpha - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_flash_window() {
        let mut e = boom();
        let f = e.flash().unwrap();
        assert_eq!(f.alpha, 1.0);
        assert_eq!(f.radius, 5.0);
        e.update(0.25);
        let f = e.flash().unwrap();
        assert!((f.alpha - 0.5).abs() < 1e-6);
        e.update(0.25);
        assert!(e.flash().is_none());
    }

    #[test]
    fn test_finishes_at_duration() {
        let mut e = boom();
        e.update(2.4);
        assert!(!e.is_finished());
        e.update(0.1);
        assert!(e.is_finished());
        e.update(0.1);
        assert_eq!(e.ring_states().count(), 0);
    }

    #[test]
    fn test_age_monotonic() {
        let mut e = boom();
        e.update(1.0);
        e.update(-5.0);
        assert_eq!(e.age(), 1.0);
    }
}
