//! Vector icons: launch platforms, warhead blips, target markers, aircraft tags
//!
//! Outlines are stored as pixel offsets at the reference canvas size and
//! scaled per view.

use glam::Vec2;

use super::glow::GlowRenderer;
use super::vertex::colors::with_alpha;
use crate::sim::VehicleKind;

/// Glow layers for icon outlines
const ICON_GLOW_LAYERS: u32 = 3;

/// Outline set for one launch platform
#[derive(Debug)]
pub struct Icon {
    /// Closed polygons
    pub outlines: &'static [&'static [[f32; 2]]],
    /// Open strokes
    pub strokes: &'static [&'static [[f32; 2]]],
}

// Upward triangle of size 12 (12 * sin 60 = 10.392)
const SILO_TRIANGLE: [[f32; 2]; 3] = [[0.0, -12.0], [-10.392, 6.0], [10.392, 6.0]];

const SUB_HULL: [[f32; 2]; 8] = [
    [-12.0, 0.0],
    [-10.0, -3.0],
    [-6.0, -4.0],
    [6.0, -4.0],
    [10.0, -3.0],
    [12.0, 0.0],
    [10.0, 2.0],
    [-10.0, 2.0],
];

// Conning tower for a hull of size 8: half width 0.25, from 0.5 to 1.1 above the waterline
const SUB_TOWER: [[f32; 2]; 4] = [[-2.0, -4.0], [-2.0, -8.8], [2.0, -8.8], [2.0, -4.0]];

const SUB_PERISCOPE: [[f32; 2]; 2] = [[0.0, -8.8], [0.0, -11.2]];

pub static SURFACE_ICON: Icon = Icon {
    outlines: &[&SILO_TRIANGLE],
    strokes: &[],
};

pub static SUBMARINE_ICON: Icon = Icon {
    outlines: &[&SUB_HULL, &SUB_TOWER],
    strokes: &[&SUB_PERISCOPE],
};

/// Icon table keyed by launch platform
pub fn icon_for(kind: VehicleKind) -> &'static Icon {
    match kind {
        VehicleKind::Surface => &SURFACE_ICON,
        VehicleKind::Submarine => &SUBMARINE_ICON,
    }
}

fn place(points: &[[f32; 2]], pos: Vec2, scale: f32) -> Vec<Vec2> {
    points
        .iter()
        .map(|p| pos + Vec2::new(p[0], p[1]) * scale)
        .collect()
}

/// Draw the launch icon for `kind` centered at `pos`
pub fn draw_vehicle_icon(
    glow: &mut GlowRenderer,
    kind: VehicleKind,
    pos: Vec2,
    color: [f32; 4],
    scale: f32,
) {
    let icon = icon_for(kind);
    for outline in icon.outlines {
        glow.draw_polygon_with_glow(&place(outline, pos, scale), color, ICON_GLOW_LAYERS);
    }
    for stroke in icon.strokes {
        glow.draw_path_with_glow(&place(stroke, pos, scale), color, ICON_GLOW_LAYERS);
    }
}

/// Blip radius at the reference size
pub const BLIP_RADIUS: f32 = 4.0;

/// Warhead position: two soft halos under a solid dot
pub fn draw_head_blip(glow: &mut GlowRenderer, pos: Vec2, color: [f32; 4], scale: f32) {
    for (extra, alpha) in [(6.0, 40.0 / 255.0), (3.0, 80.0 / 255.0)] {
        glow.fill_circle(pos, (BLIP_RADIUS + extra) * scale, with_alpha(color, alpha));
    }
    glow.fill_circle(pos, BLIP_RADIUS * scale, color);
}

/// Pulsing target marker radius and alpha, shown from 85% of the flight
pub fn target_pulse(progress: f32) -> Option<(f32, f32)> {
    if !(0.85..1.0).contains(&progress) {
        return None;
    }
    let pulse = 0.5 + 0.5 * (progress * 20.0).sin();
    Some((10.0 + pulse * 5.0, 0.5 + pulse * 0.5))
}

pub fn draw_target_marker(
    glow: &mut GlowRenderer,
    target: Vec2,
    progress: f32,
    color: [f32; 4],
    scale: f32,
) {
    if let Some((radius, alpha)) = target_pulse(progress) {
        glow.draw_circle_with_glow(target, radius * scale, with_alpha(color, alpha), 3);
    }
}

/// Aircraft head: glowing dot, leader line and a small ident box
pub fn draw_aircraft(glow: &mut GlowRenderer, head: Vec2, color: [f32; 4], scale: f32) {
    glow.draw_circle_with_glow(head, 3.0 * scale, color, 3);

    let tag_color = with_alpha(color, 0.8);
    let tag = head + Vec2::new(10.0, -8.0) * scale;
    let (w, h) = (10.0 * scale, 6.0 * scale);
    glow.draw_line_with_glow(head, tag, tag_color, 2);
    let tag_box = [
        tag,
        tag + Vec2::new(w, 0.0),
        tag + Vec2::new(w, h),
        tag + Vec2::new(0.0, h),
    ];
    glow.draw_polygon_with_glow(&tag_box, tag_color, 2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_table() {
        assert_eq!(icon_for(VehicleKind::Surface).outlines.len(), 1);
        assert_eq!(icon_for(VehicleKind::Submarine).outlines.len(), 2);
        assert_eq!(icon_for(VehicleKind::Submarine).strokes.len(), 1);
    }

    #[test]
    fn test_target_pulse_window() {
        assert!(target_pulse(0.5).is_none());
        assert!(target_pulse(1.0).is_none());
        let (r, a) = target_pulse(0.9).unwrap();
        assert!((10.0..=15.0).contains(&r));
        assert!((0.5..=1.0).contains(&a));
    }

    #[test]
    fn test_icons_emit_geometry() {
        for kind in [VehicleKind::Surface, VehicleKind::Submarine] {
            let mut glow = GlowRenderer::new();
            draw_vehicle_icon(&mut glow, kind, Vec2::new(100.0, 100.0), [1.0; 4], 1.0);
            assert!(!glow.is_empty());
        }
    }

    #[test]
    fn test_scaled_placement() {
        let pts = place(&SILO_TRIANGLE, Vec2::new(10.0, 10.0), 0.5);
        assert_eq!(pts[0], Vec2::new(10.0, 4.0));
    }
}
