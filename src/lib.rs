//! WarGames Map - a command-center situation display
//!
//! Core modules:
//! - `geo`: Geodesic paths, map projection, antimeridian segmentation
//! - `sim`: Entity state machines and the per-frame simulation tick
//! - `renderer`: Phosphor-glow scene drawing and the CRT post-process chain (WebGPU)
//! - `settings`: Display preferences and tuning
//! - `command`: Control-event routing between a front-end and the core

pub mod command;
pub mod geo;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use command::{CommandCenter, ControlEvent};
pub use geo::{Coordinate, Viewport};
pub use settings::{CrtMode, Settings};

/// Display configuration constants
pub mod consts {
    /// Largest frame delta the simulation will accept (prevents catch-up bursts after a stall)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Samples per missile trajectory
    pub const MISSILE_PATH_SAMPLES: usize = 220;
    /// Samples per aircraft holding loop
    pub const AIRCRAFT_LOOP_SAMPLES: usize = 240;

    /// Seconds from launch to impact
    pub const MISSILE_FLIGHT_SECONDS: f32 = 12.0;
    /// Seconds an explosion stays on screen
    pub const EXPLOSION_DURATION: f32 = 2.5;

    /// Launch cadence (seconds between launches)
    pub const DEFAULT_LAUNCH_INTERVAL: f32 = 2.0;
    pub const MIN_LAUNCH_INTERVAL: f32 = 0.3;
    pub const MAX_LAUNCH_INTERVAL: f32 = 10.0;
    pub const LAUNCH_INTERVAL_STEP: f32 = 0.5;
    /// One launch in four comes from a submarine
    pub const SUBMARINE_LAUNCH_CHANCE: f64 = 0.25;

    /// Burst mode launches
    pub const BURST_SURFACE_LAUNCHES: usize = 5;
    pub const BURST_SUBMARINE_LAUNCHES: usize = 3;

    /// Aircraft created at startup
    pub const AIRCRAFT_COUNT: usize = 12;

    /// Default phosphor glow layers for trails
    pub const GLOW_LAYERS: u32 = 5;

    /// Reference canvas the icon sizes were tuned against
    pub const REFERENCE_WIDTH: u32 = 1920;
    pub const REFERENCE_HEIGHT: u32 = 1080;
}

/// Normalize a longitude to (-180, 180]
#[inline]
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

/// Clamp a latitude to [-90, 90]
#[inline]
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-90.0, 90.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_longitude() {
        assert_eq!(normalize_longitude(0.0), 0.0);
        assert_eq!(normalize_longitude(180.0), 180.0);
        assert_eq!(normalize_longitude(-180.0), 180.0);
        assert!((normalize_longitude(190.0) - -170.0).abs() < 1e-9);
        assert!((normalize_longitude(-190.0) - 170.0).abs() < 1e-9);
        assert!((normalize_longitude(540.0) - 180.0).abs() < 1e-9);
    }
}
