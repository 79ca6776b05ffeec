//! Static launch and target dataset
//!
//! Read-only tables of named cities, the east/west target split, and
//! ocean launch positions for submarines.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Phosphor tint of an entity, resolved to RGB by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tint {
    Cyan,
    DimCyan,
    DarkerCyan,
    Red,
    White,
}

/// Which side of the map a target list covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Americas and the Atlantic rim
    West,
    /// Europe, Russia, Asia, Oceania
    East,
}

impl Side {
    pub fn targets(&self) -> &'static [Site] {
        match self {
            Side::West => WESTERN_TARGETS,
            Side::East => EASTERN_TARGETS,
        }
    }
}

/// A named point on the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub name: &'static str,
    pub position: Coordinate,
}

const fn site(name: &'static str, lat: f64, lon: f64) -> Site {
    Site {
        name,
        position: Coordinate::new_unchecked(lat, lon),
    }
}

/// Cities used for surface-to-surface launches
pub const TARGET_LOCATIONS: &[Site] = &[
    site("Moscow", 55.7558, 37.6173),
    site("Beijing", 39.9042, 116.4074),
    site("Tokyo", 35.6762, 139.6503),
    site("London", 51.5074, -0.1278),
    site("Paris", 48.8566, 2.3522),
    site("Berlin", 52.5200, 13.4050),
    site("Washington DC", 38.9072, -77.0369),
    site("New York", 40.7128, -74.0060),
    site("Los Angeles", 34.0522, -118.2437),
    site("Chicago", 41.8781, -87.6298),
    site("Houston", 29.7604, -95.3698),
    site("Phoenix", 33.4484, -112.0740),
    site("San Francisco", 37.7749, -122.4194),
    site("Seattle", 47.6062, -122.3321),
    site("Miami", 25.7617, -80.1918),
    site("San Diego", 32.7157, -117.1611),
    site("Boston", 42.3601, -71.0589),
    site("Denver", 39.7392, -104.9903),
    site("Portland", 45.5152, -122.6784),
    site("Austin", 30.2672, -97.7431),
];

pub const WESTERN_TARGETS: &[Site] = &[
    site("Washington DC", 38.9, -77.0),
    site("New York", 40.71, -74.0),
    site("Los Angeles", 34.05, -118.24),
    site("Reykjavik", 64.13, -21.89),
    site("Buenos Aires", -34.6, -58.38),
];

pub const EASTERN_TARGETS: &[Site] = &[
    site("Moscow", 55.75, 37.62),
    site("London", 51.5, -0.12),
    site("Tokyo", 35.68, 139.76),
    site("Beijing", 39.9, 116.4),
    site("Sydney", -33.86, 151.2),
    site("Delhi", 28.61, 77.21),
    site("Stockholm", 59.33, 18.07),
];

/// Ocean launch positions for submarines
pub const SUBMARINE_POINTS: &[Site] = &[
    site("North Atlantic", 35.0, -45.0),
    site("Mid Atlantic", 45.0, -30.0),
    site("Iceland Gap", 60.0, -20.0),
    site("North Pacific", 40.0, 160.0),
    site("Central Pacific", 25.0, -155.0),
    site("Northeast Pacific", 50.0, -140.0),
    site("Indian Ocean", 10.0, 65.0),
    site("South Indian Ocean", -30.0, 40.0),
    site("Barents Sea", 70.0, 40.0),
    site("Bering Sea", 55.0, 170.0),
    site("Caribbean", 15.0, -60.0),
    site("South Atlantic", -45.0, -60.0),
];

/// Targets whose missiles are drawn red
const RED_TARGETS: &[Coordinate] = &[
    Coordinate::new_unchecked(55.7558, 37.6173),
    Coordinate::new_unchecked(35.6762, 139.6503),
];

/// Matching tolerance for [`color_for_target`] (degrees)
const TARGET_MATCH_EPSILON: f64 = 0.01;

/// Missiles inbound on Moscow or Tokyo are red, everything else cyan
pub fn color_for_target(target: Coordinate) -> Tint {
    if RED_TARGETS
        .iter()
        .any(|t| t.approx_eq(&target, TARGET_MATCH_EPSILON))
    {
        Tint::Red
    } else {
        Tint::Cyan
    }
}
