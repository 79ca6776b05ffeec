//! Geographic coordinate type

use serde::{Deserialize, Serialize};

use crate::{clamp_latitude, normalize_longitude};

/// A point on the globe in degrees
///
/// Latitude is kept in [-90, 90] and longitude in (-180, 180]. Fields are
/// private so a produced coordinate cannot drift out of range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Build a coordinate, clamping latitude and wrapping longitude
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: clamp_latitude(lat),
            lon: normalize_longitude(lon),
        }
    }

    /// For static tables whose values are already in range
    pub(crate) const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// True if both components are within `eps` degrees of `other`
    pub fn approx_eq(&self, other: &Coordinate, eps: f64) -> bool {
        (self.lat - other.lat).abs() <= eps && (self.lon - other.lon).abs() <= eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes() {
        let c = Coordinate::new(95.0, 190.0);
        assert_eq!(c.lat(), 90.0);
        assert!((c.lon() - -170.0).abs() < 1e-9);

        let c = Coordinate::new(-91.0, -180.0);
        assert_eq!(c.lat(), -90.0);
        assert_eq!(c.lon(), 180.0);
    }

    #[test]
    fn test_approx_eq() {
        let a = Coordinate::new(55.7558, 37.6173);
        let b = Coordinate::new(55.76, 37.62);
        assert!(a.approx_eq(&b, 0.01));
        assert!(!a.approx_eq(&b, 0.001));
    }
}
