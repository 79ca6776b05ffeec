//! Equirectangular projection into pixel space
//!
//! Global view maps the whole globe onto the canvas. A regional view shows
//! `360/zoom` by `180/zoom` degrees around a center coordinate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::coord::Coordinate;
use crate::consts::REFERENCE_WIDTH;

/// Regional sub-window over the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Coordinate,
    zoom: f64,
}

impl Viewport {
    /// Zoom below 1 (wider than the globe) is clamped to 1
    pub fn new(center: Coordinate, zoom: f64) -> Self {
        Self {
            center,
            zoom: if zoom.is_finite() { zoom.max(1.0) } else { 1.0 },
        }
    }

    #[inline]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Visible longitude span in degrees
    #[inline]
    pub fn lon_span(&self) -> f64 {
        360.0 / self.zoom
    }

    /// Visible latitude span in degrees
    #[inline]
    pub fn lat_span(&self) -> f64 {
        180.0 / self.zoom
    }
}

/// Map a coordinate to pixel space (origin top-left, y down)
pub fn project(coord: Coordinate, width: u32, height: u32, viewport: Option<&Viewport>) -> Vec2 {
    let (w, h) = (width as f64, height as f64);
    match viewport {
        None => {
            let x = (coord.lon() + 180.0) / 360.0 * w;
            let y = (90.0 - coord.lat()) / 180.0 * h;
            Vec2::new(x as f32, y as f32)
        }
        Some(vp) => {
            // Offsets normalized to [-1, 1] across the visible span
            let nx = (coord.lon() - vp.center.lon()) / (vp.lon_span() * 0.5);
            let ny = (coord.lat() - vp.center.lat()) / (vp.lat_span() * 0.5);
            let x = (nx + 1.0) * 0.5 * w;
            let y = (1.0 - ny) * 0.5 * h;
            Vec2::new(x as f32, y as f32)
        }
    }
}

/// Whether a coordinate falls inside the viewport span plus `margin_deg`
///
/// Always true for the global view. No wrap-around: a regional view
/// centered near the antimeridian does not see the far side.
pub fn is_visible(coord: Coordinate, viewport: Option<&Viewport>, margin_deg: f64) -> bool {
    let Some(vp) = viewport else {
        return true;
    };
    let half_lon = vp.lon_span() * 0.5 + margin_deg;
    let half_lat = vp.lat_span() * 0.5 + margin_deg;
    (coord.lon() - vp.center.lon()).abs() <= half_lon
        && (coord.lat() - vp.center.lat()).abs() <= half_lat
}

/// Split a path into maximal runs of visible samples
///
/// Runs shorter than two samples cannot be drawn as lines and are dropped.
pub fn visible_runs<'a>(
    path: &'a [Coordinate],
    viewport: Option<&Viewport>,
    margin_deg: f64,
) -> Vec<&'a [Coordinate]> {
    if viewport.is_none() {
        return if path.len() >= 2 { vec![path] } else { Vec::new() };
    }

    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;
    for (i, c) in path.iter().enumerate() {
        let visible = is_visible(*c, viewport, margin_deg);
        match (visible, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(s)) => {
                if i - s >= 2 {
                    runs.push(&path[s..i]);
                }
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = run_start {
        if path.len() - s >= 2 {
            runs.push(&path[s..]);
        }
    }
    runs
}

/// Canvas size plus optional viewport, the projection state of one map view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    pub width: u32,
    pub height: u32,
    pub viewport: Option<Viewport>,
}

impl Projector {
    pub fn new(width: u32, height: u32, viewport: Option<Viewport>) -> Self {
        Self {
            width,
            height,
            viewport,
        }
    }

    #[inline]
    pub fn project(&self, coord: Coordinate) -> Vec2 {
        project(coord, self.width, self.height, self.viewport.as_ref())
    }

    pub fn project_path(&self, path: &[Coordinate]) -> Vec<Vec2> {
        path.iter().map(|c| self.project(*c)).collect()
    }

    #[inline]
    pub fn is_visible(&self, coord: Coordinate, margin_deg: f64) -> bool {
        is_visible(coord, self.viewport.as_ref(), margin_deg)
    }

    /// Icon scale relative to the reference canvas width
    pub fn icon_scale(&self) -> f32 {
        (self.width as f32 / REFERENCE_WIDTH as f32).max(0.25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_global_projection_corners() {
        let (w, h) = (1920, 1080);
        assert!(approx(project(Coordinate::new(90.0, -179.999_999), w, h, None), Vec2::new(0.0, 0.0)));
        assert!(approx(project(Coordinate::new(0.0, 0.0), w, h, None), Vec2::new(960.0, 540.0)));
        assert!(approx(project(Coordinate::new(-90.0, 180.0), w, h, None), Vec2::new(1920.0, 1080.0)));
    }

    #[test]
    fn test_regional_center_maps_to_canvas_center() {
        let vp = Viewport::new(Coordinate::new(50.0, 10.0), 4.0);
        let p = project(Coordinate::new(50.0, 10.0), 800, 600, Some(&vp));
        assert!(approx(p, Vec2::new(400.0, 300.0)));
    }

    #[test]
    fn test_regional_span_edges() {
        // zoom 4 shows 90 x 45 degrees
        let vp = Viewport::new(Coordinate::new(0.0, 0.0), 4.0);
        let top_left = project(Coordinate::new(22.5, -45.0), 800, 600, Some(&vp));
        let bottom_right = project(Coordinate::new(-22.5, 45.0), 800, 600, Some(&vp));
        assert!(approx(top_left, Vec2::new(0.0, 0.0)));
        assert!(approx(bottom_right, Vec2::new(800.0, 600.0)));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let vp = Viewport::new(Coordinate::new(0.0, 0.0), 0.25);
        assert_eq!(vp.zoom(), 1.0);
        let vp = Viewport::new(Coordinate::new(0.0, 0.0), f64::NAN);
        assert_eq!(vp.zoom(), 1.0);
    }

    #[test]
    fn test_is_visible() {
        let vp = Viewport::new(Coordinate::new(0.0, 0.0), 4.0);
        assert!(is_visible(Coordinate::new(10.0, 40.0), Some(&vp), 0.0));
        assert!(!is_visible(Coordinate::new(10.0, 50.0), Some(&vp), 0.0));
        assert!(is_visible(Coordinate::new(10.0, 50.0), Some(&vp), 10.0));
        assert!(is_visible(Coordinate::new(-89.0, 179.0), None, 0.0));
    }

    #[test]
    fn test_visible_runs() {
        let vp = Viewport::new(Coordinate::new(0.0, 0.0), 4.0);
        let path: Vec<Coordinate> = [0.0, 10.0, 20.0, 60.0, 70.0, 30.0, 20.0, 10.0, 80.0]
            .iter()
            .map(|lon| Coordinate::new(0.0, *lon))
            .collect();
        let runs = visible_runs(&path, Some(&vp), 0.0);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 3);
        assert_eq!(runs[1].len(), 3);

        assert_eq!(visible_runs(&path, None, 0.0).len(), 1);
        assert!(visible_runs(&path[..1], None, 0.0).is_empty());
    }

    #[test]
    fn test_projector_matches_free_function() {
        let vp = Viewport::new(Coordinate::new(45.0, 10.0), 3.0);
        let projector = Projector::new(1280, 720, Some(vp));
        let c = Coordinate::new(48.8566, 2.3522);
        assert_eq!(projector.project(c), project(c, 1280, 720, Some(&vp)));
        assert_eq!(projector.project_path(&[c, c]).len(), 2);
    }
}
