//! Deterministic simulation module
//!
//! All entity animation lives here. This module must stay pure:
//! - Seeded RNG only
//! - Stable iteration order (launch / detonation order)
//! - No rendering or platform dependencies

pub mod aircraft;
pub mod explosion;
pub mod missile;
pub mod sites;
pub mod state;
pub mod tick;

pub use aircraft::{Aircraft, LoopParams};
pub use explosion::{Explosion, FlashState, RingState};
pub use missile::{Missile, VehicleKind};
pub use sites::{Side, Site, Tint, color_for_target};
pub use state::{SimConfig, SimState};
pub use tick::{SimControl, TickInput, TickReport, tick};
