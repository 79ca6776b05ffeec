//! Geographic math
//!
//! Everything here is pure and GPU-free:
//! - Great-circle sampling between two coordinates
//! - Equirectangular projection into global or zoomed regional views
//! - Splitting polylines where they wrap across the antimeridian

pub mod coord;
pub mod geodesic;
pub mod projection;
pub mod segment;

pub use coord::Coordinate;
pub use geodesic::compute_path;
pub use projection::{Projector, Viewport, is_visible, project, visible_runs};
pub use segment::{split_geo_path, split_screen_path};
