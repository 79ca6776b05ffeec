//! Display settings and preferences
//!
//! Stored as JSON next to the binary; any missing or unreadable file falls
//! back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::GLOW_LAYERS;
use crate::sim::SimConfig;

/// CRT post-processing level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CrtMode {
    Off,
    Light,
    #[default]
    Full,
}

impl CrtMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrtMode::Off => "Off",
            CrtMode::Light => "Light",
            CrtMode::Full => "Full",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Some(CrtMode::Off),
            "light" | "lite" => Some(CrtMode::Light),
            "full" => Some(CrtMode::Full),
            _ => None,
        }
    }

    /// Cycle order: Off -> Light -> Full -> Off
    pub fn next(&self) -> Self {
        match self {
            CrtMode::Off => CrtMode::Light,
            CrtMode::Light => CrtMode::Full,
            CrtMode::Full => CrtMode::Off,
        }
    }
}

/// Effect strengths for one CRT mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrtParams {
    /// Barrel distortion `k` (FULL only)
    pub barrel_strength: f32,
    /// Chromatic aberration intensity (FULL only)
    pub chromatic_intensity: f32,
    pub noise: f32,
    pub bloom: f32,
    pub flicker: f32,
}

impl CrtParams {
    /// Everything disabled
    pub const OFF: CrtParams = CrtParams {
        barrel_strength: 0.0,
        chromatic_intensity: 0.0,
        noise: 0.0,
        bloom: 0.0,
        flicker: 0.0,
    };

    pub const LIGHT: CrtParams = CrtParams {
        barrel_strength: 0.0,
        chromatic_intensity: 0.0,
        noise: 0.02,
        bloom: 0.0,
        flicker: 0.0,
    };

    pub const FULL: CrtParams = CrtParams {
        barrel_strength: 0.08,
        chromatic_intensity: 1.8,
        noise: 0.03,
        bloom: 0.35,
        flicker: 0.02,
    };
}

/// Display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// CRT mode at startup
    pub crt_mode: CrtMode,
    /// Glow layers for missile trails and borders
    pub glow_layers: u32,
    /// Draw the latitude/longitude grid
    pub graticule: bool,
    /// RNG seed for the simulation
    pub seed: u64,

    // === Simulation ===
    pub sim: SimConfig,

    // === CRT ===
    pub crt_light: CrtParams,
    pub crt_full: CrtParams,

    // === Accessibility ===
    /// Reduced motion (no screen flicker)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            crt_mode: CrtMode::Full,
            glow_layers: GLOW_LAYERS,
            graticule: true,
            seed: 1983,
            sim: SimConfig::default(),
            crt_light: CrtParams::LIGHT,
            crt_full: CrtParams::FULL,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Simulation tunables
    pub fn sim_config(&self) -> SimConfig {
        self.sim.clone()
    }

    /// Effective CRT strengths for `mode` (respects reduced_motion)
    pub fn crt_params(&self, mode: CrtMode) -> CrtParams {
        let mut params = match mode {
            CrtMode::Off => CrtParams::OFF,
            CrtMode::Light => self.crt_light,
            CrtMode::Full => self.crt_full,
        };
        if self.reduced_motion {
            params.flicker = 0.0;
        }
        params
    }

    /// Glow layer count, at least one
    pub fn effective_glow_layers(&self) -> u32 {
        self.glow_layers.max(1)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("wargames-map-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_crt_mode_strings() {
        for mode in [CrtMode::Off, CrtMode::Light, CrtMode::Full] {
            assert_eq!(CrtMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(CrtMode::from_str("LITE"), Some(CrtMode::Light));
        assert_eq!(CrtMode::from_str("scanlines"), None);
    }

    #[test]
    fn test_crt_mode_cycle() {
        let mut mode = CrtMode::Full;
        let mut seen = Vec::new();
        for _ in 0..3 {
            mode = mode.next();
            seen.push(mode);
        }
        assert_eq!(seen, vec![CrtMode::Off, CrtMode::Light, CrtMode::Full]);
    }

    #[test]
    fn test_crt_params_per_mode() {
        let s = Settings::default();
        assert_eq!(s.crt_params(CrtMode::Off), CrtParams::OFF);
        let light = s.crt_params(CrtMode::Light);
        assert_eq!((light.noise, light.bloom, light.flicker), (0.02, 0.0, 0.0));
        let full = s.crt_params(CrtMode::Full);
        assert_eq!((full.noise, full.bloom, full.flicker), (0.03, 0.35, 0.02));
        assert_eq!(full.barrel_strength, 0.08);
    }

    #[test]
    fn test_reduced_motion_disables_flicker() {
        let s = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert_eq!(s.crt_params(CrtMode::Full).flicker, 0.0);
        assert_eq!(s.crt_params(CrtMode::Full).bloom, 0.35);
    }

    #[test]
    fn test_save_load_file() {
        let path = temp_path("roundtrip");
        let s = Settings {
            crt_mode: CrtMode::Light,
            glow_layers: 3,
            ..Settings::default()
        };
        s.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, s);
    }

    #[test]
    fn test_missing_and_malformed_fall_back() {
        assert_eq!(Settings::load_from(temp_path("missing")), Settings::default());

        let path = temp_path("malformed");
        std::fs::write(&path, "{ not json").unwrap();
        let loaded = Settings::load_from(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let s: Settings = serde_json::from_str(r#"{ "crt_mode": "Off" }"#).unwrap();
        assert_eq!(s.crt_mode, CrtMode::Off);
        assert_eq!(s.glow_layers, GLOW_LAYERS);
    }
}
