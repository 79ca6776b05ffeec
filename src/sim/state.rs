//! Simulation context and entity collections
//!
//! `SimState` is the single writer of all entity state. Views read it
//! immutably after each tick.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aircraft::{Aircraft, LoopParams};
use super::explosion::Explosion;
use super::missile::{Missile, VehicleKind};
use super::sites::{SUBMARINE_POINTS, Side, Site, TARGET_LOCATIONS, Tint, color_for_target};
use crate::consts::*;
use crate::geo::Coordinate;

/// Tunables for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seconds between timed launches at startup and after a reset
    pub default_launch_interval: f32,
    /// Missile flight time in seconds
    pub missile_duration: f32,
    /// Probability a timed launch comes from a submarine
    pub submarine_chance: f64,
    /// Aircraft created at startup
    pub aircraft_count: usize,
    pub burst_surface: usize,
    pub burst_submarine: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            default_launch_interval: DEFAULT_LAUNCH_INTERVAL,
            missile_duration: MISSILE_FLIGHT_SECONDS,
            submarine_chance: SUBMARINE_LAUNCH_CHANCE,
            aircraft_count: AIRCRAFT_COUNT,
            burst_surface: BURST_SURFACE_LAUNCHES,
            burst_submarine: BURST_SUBMARINE_LAUNCHES,
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub config: SimConfig,
    rng: Pcg32,
    /// Missiles in flight (launch order)
    pub missiles: Vec<Missile>,
    /// Active explosions (detonation order)
    pub explosions: Vec<Explosion>,
    /// Patrol aircraft, created once
    pub aircraft: Vec<Aircraft>,
    /// Seconds between timed launches
    pub launch_interval: f32,
    /// Seconds accumulated toward the next timed launch
    pub time_since_launch: f32,
    pub paused: bool,
    /// Simulated seconds (excludes paused time)
    pub elapsed: f64,
    next_id: u32,
}

impl SimState {
    /// Create a run with the given seed; aircraft are placed immediately
    pub fn new(seed: u64, config: SimConfig) -> Self {
        let interval = clamp_interval(config.default_launch_interval);
        let mut state = Self {
            seed,
            config,
            rng: Pcg32::seed_from_u64(seed),
            missiles: Vec::new(),
            explosions: Vec::new(),
            aircraft: Vec::new(),
            launch_interval: interval,
            // First timed launch fires on the first tick
            time_since_launch: interval,
            paused: false,
            elapsed: 0.0,
            next_id: 1,
        };
        state.spawn_aircraft();
        state
    }

    /// Restart from the original seed
    pub fn reset(&mut self) {
        *self = Self::new(self.seed, self.config.clone());
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn spawn_aircraft(&mut self) {
        for _ in 0..self.config.aircraft_count {
            let params = LoopParams {
                center: Coordinate::new(
                    self.rng.random_range(-60.0..=60.0),
                    self.rng.random_range(-180.0..=180.0),
                ),
                radius_deg: self.rng.random_range(3.0..=12.0),
                period: self.rng.random_range(20.0..=60.0),
            };
            let id = self.next_entity_id();
            self.aircraft.push(Aircraft::new(id, params, Tint::DimCyan));
        }
    }

    fn pick(&mut self, sites: &'static [Site]) -> &'static Site {
        &sites[self.rng.random_range(0..sites.len())]
    }

    /// Launch a missile between two distinct cities
    pub fn spawn_surface(&mut self) -> u32 {
        let start = self.pick(TARGET_LOCATIONS);
        let mut end = self.pick(TARGET_LOCATIONS);
        while end.name == start.name {
            end = self.pick(TARGET_LOCATIONS);
        }
        log::debug!("Surface launch {} -> {}", start.name, end.name);
        self.launch(start.position, end.position, VehicleKind::Surface)
    }

    /// Launch from a random ocean point at the east or west target list
    pub fn spawn_submarine(&mut self) -> u32 {
        let start = self.pick(SUBMARINE_POINTS);
        let side = if self.rng.random_bool(0.5) {
            Side::East
        } else {
            Side::West
        };
        let end = self.pick(side.targets());
        log::debug!("Submarine launch {} -> {} ({:?})", start.name, end.name, side);
        self.launch(start.position, end.position, VehicleKind::Submarine)
    }

    /// Timed launch: submarine with the configured chance, surface otherwise
    pub fn spawn_random(&mut self) -> u32 {
        let chance = self.config.submarine_chance.clamp(0.0, 1.0);
        if self.rng.random_bool(chance) {
            self.spawn_submarine()
        } else {
            self.spawn_surface()
        }
    }

    /// Salvo of surface and submarine launches; returns how many were launched
    pub fn burst(&mut self) -> usize {
        let (surface, submarine) = (self.config.burst_surface, self.config.burst_submarine);
        for _ in 0..surface {
            self.spawn_surface();
        }
        for _ in 0..submarine {
            self.spawn_submarine();
        }
        log::info!("Burst launch: {surface} surface, {submarine} submarine");
        surface + submarine
    }

    fn launch(&mut self, start: Coordinate, end: Coordinate, kind: VehicleKind) -> u32 {
        let id = self.next_entity_id();
        let tint = color_for_target(end);
        let duration = self.config.missile_duration;
        self.missiles
            .push(Missile::new(id, start, end, tint, kind, duration));
        id
    }

    /// Shorten the launch interval by one step
    pub fn faster(&mut self) {
        self.launch_interval = clamp_interval(self.launch_interval - LAUNCH_INTERVAL_STEP);
        log::info!("Launch interval: {:.1}s", self.launch_interval);
    }

    /// Lengthen the launch interval by one step
    pub fn slower(&mut self) {
        self.launch_interval = clamp_interval(self.launch_interval + LAUNCH_INTERVAL_STEP);
        log::info!("Launch interval: {:.1}s", self.launch_interval);
    }

    pub fn reset_intensity(&mut self) {
        self.launch_interval = clamp_interval(self.config.default_launch_interval);
        log::info!("Launch interval reset to {:.1}s", self.launch_interval);
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
    }
}

fn clamp_interval(seconds: f32) -> f32 {
    if seconds.is_finite() {
        seconds.clamp(MIN_LAUNCH_INTERVAL, MAX_LAUNCH_INTERVAL)
    } else {
        DEFAULT_LAUNCH_INTERVAL
    }
}
