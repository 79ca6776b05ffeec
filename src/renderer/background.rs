//! Background map layers
//!
//! Boundary data is parsed by the caller; this module only projects and
//! draws polylines it is handed.

use serde::{Deserialize, Serialize};

use super::glow::GlowRenderer;
use super::vertex::colors::{self, with_alpha};
use crate::geo::{Coordinate, Projector, split_geo_path, split_screen_path, visible_runs};

/// Extra degrees around a regional view before geometry is culled
pub const CULL_MARGIN_DEG: f64 = 5.0;

/// Something drawn underneath the entities
pub trait BackgroundLayer {
    fn draw(&self, glow: &mut GlowRenderer, projector: &Projector);
}

/// Project a geographic polyline and draw each unbroken piece with glow
pub fn draw_geo_polyline(
    glow: &mut GlowRenderer,
    projector: &Projector,
    coords: &[Coordinate],
    color: [f32; 4],
    layers: u32,
) {
    for geo_segment in split_geo_path(coords) {
        for run in visible_runs(&geo_segment, projector.viewport.as_ref(), CULL_MARGIN_DEG) {
            let screen = projector.project_path(run);
            for piece in split_screen_path(&screen, projector.width as f32) {
                glow.draw_path_with_glow(&piece, color, layers);
            }
        }
    }
}

/// Latitude/longitude grid
///
/// Lines are sampled once at construction and reused by every view.
#[derive(Debug, Clone, PartialEq)]
pub struct Graticule {
    pub color: [f32; 4],
    lines: Vec<Vec<Coordinate>>,
}

impl Default for Graticule {
    fn default() -> Self {
        Self::new(15.0, 30.0, 5.0, with_alpha(colors::DARKER_CYAN, 0.35))
    }
}

impl Graticule {
    /// Parallels every `lat_step`, meridians every `lon_step`, each line
    /// sampled every `resolution` degrees
    pub fn new(lat_step: f64, lon_step: f64, resolution: f64, color: [f32; 4]) -> Self {
        Self {
            color,
            lines: grid_lines(lat_step, lon_step, resolution),
        }
    }

    /// Grid lines as geographic polylines (parallels first, then meridians)
    pub fn lines(&self) -> &[Vec<Coordinate>] {
        &self.lines
    }
}

fn grid_lines(lat_step: f64, lon_step: f64, resolution: f64) -> Vec<Vec<Coordinate>> {
    let mut lines = Vec::new();
    if lat_step <= 0.0 || lon_step <= 0.0 || resolution <= 0.0 {
        return lines;
    }

    let samples = |from: f64, to: f64| -> Vec<f64> {
        let n = ((to - from) / resolution).ceil() as usize;
        (0..=n)
            .map(|i| (from + i as f64 * resolution).min(to))
            .collect()
    };

    // Parallels strictly inside the poles
    let mut lat = -90.0 + lat_step;
    while lat < 90.0 - 1e-9 {
        // Stay off +/-180 exactly so the line does not wrap onto itself
        let lons = samples(-179.999, 179.999);
        lines.push(lons.iter().map(|lon| Coordinate::new(lat, *lon)).collect());
        lat += lat_step;
    }

    let mut lon = -180.0;
    while lon < 180.0 - 1e-9 {
        let lats = samples(-90.0, 90.0);
        lines.push(lats.iter().map(|lat| Coordinate::new(*lat, lon)).collect());
        lon += lon_step;
    }
    lines
}

impl BackgroundLayer for Graticule {
    fn draw(&self, glow: &mut GlowRenderer, projector: &Projector) {
        for line in &self.lines {
            draw_geo_polyline(glow, projector, line, self.color, 1);
        }
    }
}

/// What a boundary polyline represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryKind {
    Coastline,
    Border,
}

/// One parsed boundary polyline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Country or feature name
    pub name: String,
    pub kind: BoundaryKind,
    pub points: Vec<Coordinate>,
}

/// Coastlines and country borders
///
/// Borders whose name contains a highlighted string are drawn red, after
/// everything else.
#[derive(Debug, Clone)]
pub struct BoundaryMap {
    boundaries: Vec<Boundary>,
    highlighted: Vec<String>,
    pub glow_layers: u32,
}

impl BoundaryMap {
    pub fn new(boundaries: Vec<Boundary>) -> Self {
        log::info!("Boundary map: {} polylines", boundaries.len());
        Self {
            boundaries,
            highlighted: vec!["russia".to_string(), "japan".to_string()],
            glow_layers: 3,
        }
    }

    /// Replace the highlighted names (case-insensitive substring match)
    pub fn with_highlighted(mut self, names: &[&str]) -> Self {
        self.highlighted = names.iter().map(|n| n.to_lowercase()).collect();
        self
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn is_highlighted(&self, b: &Boundary) -> bool {
        if b.kind != BoundaryKind::Border {
            return false;
        }
        let name = b.name.to_lowercase();
        self.highlighted.iter().any(|h| name.contains(h.as_str()))
    }

    /// Boundaries in draw order: coastlines, plain borders, highlighted borders
    pub fn draw_order(&self) -> Vec<&Boundary> {
        let coast = self
            .boundaries
            .iter()
            .filter(|b| b.kind == BoundaryKind::Coastline);
        let plain = self
            .boundaries
            .iter()
            .filter(|b| b.kind == BoundaryKind::Border && !self.is_highlighted(b));
        let red = self.boundaries.iter().filter(|b| self.is_highlighted(b));
        coast.chain(plain).chain(red).collect()
    }

    fn color_for(&self, b: &Boundary) -> [f32; 4] {
        if self.is_highlighted(b) {
            colors::RED
        } else {
            match b.kind {
                BoundaryKind::Coastline => colors::DIM_CYAN,
                BoundaryKind::Border => colors::DARKER_CYAN,
            }
        }
    }
}

impl BackgroundLayer for BoundaryMap {
    fn draw(&self, glow: &mut GlowRenderer, projector: &Projector) {
        for b in self.draw_order() {
            draw_geo_polyline(glow, projector, &b.points, self.color_for(b), self.glow_layers);
        }
    }
}

/// Layers drawn bottom to top
impl BackgroundLayer for [Box<dyn BackgroundLayer>] {
    fn draw(&self, glow: &mut GlowRenderer, projector: &Projector) {
        for layer in self {
            layer.draw(glow, projector);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Viewport;

    fn border(name: &str, lons: &[f64]) -> Boundary {
        Boundary {
            name: name.to_string(),
            kind: BoundaryKind::Border,
            points: lons.iter().map(|lon| Coordinate::new(40.0, *lon)).collect(),
        }
    }

    #[test]
    fn test_graticule_line_counts() {
        let g = Graticule::default();
        let lines = g.lines();
        // 11 parallels (-75..=75 step 15) + 12 meridians (-180..150 step 30)
        assert_eq!(lines.len(), 23);
        assert!(lines.iter().all(|l| l.len() >= 2));
    }

    #[test]
    fn test_custom_graticule_and_reuse() {
        let g = Graticule::new(30.0, 60.0, 10.0, colors::DIM_CYAN);
        // 5 parallels (-60..=60 step 30) + 6 meridians (-180..120 step 60)
        assert_eq!(g.lines().len(), 11);
        assert!(Graticule::new(0.0, 30.0, 5.0, colors::DIM_CYAN).lines().is_empty());

        let projector = Projector::new(800, 400, None);
        let mut first = GlowRenderer::new();
        let mut second = GlowRenderer::new();
        g.draw(&mut first, &projector);
        g.draw(&mut second, &projector);
        assert_eq!(first.vertex_count(), second.vertex_count());
        assert_eq!(g.lines().len(), 11);
    }

    #[test]
    fn test_graticule_draws_globally() {
        let mut glow = GlowRenderer::new();
        Graticule::default().draw(&mut glow, &Projector::new(1920, 1080, None));
        assert!(!glow.is_empty());
    }

    #[test]
    fn test_highlight_order() {
        let map = BoundaryMap::new(vec![
            border("Russian Federation", &[30.0, 40.0]),
            border("France", &[0.0, 5.0]),
            Boundary {
                name: "coast".into(),
                kind: BoundaryKind::Coastline,
                points: vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)],
            },
            border("JAPAN", &[135.0, 140.0]),
        ]);
        let names: Vec<&str> = map.draw_order().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["coast", "France", "Russian Federation", "JAPAN"]);
        assert_eq!(map.color_for(&map.boundaries[0]), colors::RED);
        assert_eq!(map.color_for(&map.boundaries[1]), colors::DARKER_CYAN);
    }

    #[test]
    fn test_boundary_across_antimeridian_is_split() {
        let map = BoundaryMap::new(vec![border("Fiji", &[177.0, 179.0, -179.0, -177.0])]);
        let mut glow = GlowRenderer::new();
        map.draw(&mut glow, &Projector::new(1000, 500, None));
        // Two 1-segment pieces, 3 glow layers, 6 vertices per quad
        assert_eq!(glow.vertex_count(), 2 * 3 * 6);
    }

    #[test]
    fn test_regional_culling() {
        let map = BoundaryMap::new(vec![border("Chile", &[-70.0, -71.0, -72.0])]);
        let vp = Viewport::new(Coordinate::new(50.0, 10.0), 6.0);
        let mut glow = GlowRenderer::new();
        map.draw(&mut glow, &Projector::new(800, 600, Some(vp)));
        assert!(glow.is_empty());
    }
}
