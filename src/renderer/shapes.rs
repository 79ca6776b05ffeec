//! Triangle generation for 2D primitives
//!
//! Everything here emits triangle lists in pixel space. GPU line primitives
//! have no width, so lines are expanded to quads.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;

/// Segments used for circle outlines
pub const CIRCLE_SEGMENTS: u32 = 32;

/// Push a quad of `width` pixels centered on the segment a-b
pub fn line_quad(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, width: f32, color: [f32; 4]) {
    let dir = (b - a).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);
    // Extend past the ends so consecutive quads overlap at joints
    let ext = dir * (width * 0.5);
    let (a, b) = (a - ext, b + ext);

    let v1a = a + perp;
    let v1b = a - perp;
    let v2a = b + perp;
    let v2b = b - perp;

    out.push(Vertex::new(v1a.x, v1a.y, color));
    out.push(Vertex::new(v1b.x, v1b.y, color));
    out.push(Vertex::new(v2a.x, v2a.y, color));

    out.push(Vertex::new(v2a.x, v2a.y, color));
    out.push(Vertex::new(v1b.x, v1b.y, color));
    out.push(Vertex::new(v2b.x, v2b.y, color));
}

/// Open polyline of uniform width
pub fn polyline(out: &mut Vec<Vertex>, points: &[Vec2], width: f32, color: [f32; 4]) {
    for pair in points.windows(2) {
        line_quad(out, pair[0], pair[1], width, color);
    }
}

/// Polyline whose alpha fades from `tail_alpha` at the first point to full at the last
pub fn fading_polyline(
    out: &mut Vec<Vertex>,
    points: &[Vec2],
    width: f32,
    color: [f32; 4],
    tail_alpha: f32,
) {
    if points.len() < 2 {
        return;
    }
    let n = (points.len() - 1) as f32;
    for (i, pair) in points.windows(2).enumerate() {
        let t = (i as f32 + 1.0) / n;
        let alpha = tail_alpha + (1.0 - tail_alpha) * t;
        let c = [color[0], color[1], color[2], color[3] * alpha];
        line_quad(out, pair[0], pair[1], width, c);
    }
}

/// Filled circle
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        // Triangle from center to edge
        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        out.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }
}

/// Hollow circle band; the inner radius is clamped at zero
pub fn ring(
    out: &mut Vec<Vertex>,
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) {
    let inner_radius = inner_radius.max(0.0);
    if outer_radius <= inner_radius {
        return;
    }

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        let (s1, c1) = theta1.sin_cos();
        let (s2, c2) = theta2.sin_cos();

        let inner1 = center + Vec2::new(c1, s1) * inner_radius;
        let outer1 = center + Vec2::new(c1, s1) * outer_radius;
        let inner2 = center + Vec2::new(c2, s2) * inner_radius;
        let outer2 = center + Vec2::new(c2, s2) * outer_radius;

        // Two triangles per segment
        out.push(Vertex::new(inner1.x, inner1.y, color));
        out.push(Vertex::new(outer1.x, outer1.y, color));
        out.push(Vertex::new(inner2.x, inner2.y, color));

        out.push(Vertex::new(inner2.x, inner2.y, color));
        out.push(Vertex::new(outer1.x, outer1.y, color));
        out.push(Vertex::new(outer2.x, outer2.y, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_quad_width() {
        let mut v = Vec::new();
        line_quad(&mut v, Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 2.0, [1.0; 4]);
        assert_eq!(v.len(), 6);
        let ys: Vec<f32> = v.iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| (y.abs() - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_zero_length_line_skipped() {
        let mut v = Vec::new();
        line_quad(&mut v, Vec2::ONE, Vec2::ONE, 2.0, [1.0; 4]);
        assert!(v.is_empty());
    }

    #[test]
    fn test_ring_and_circle_counts() {
        let mut v = Vec::new();
        ring(&mut v, Vec2::ZERO, 4.0, 6.0, [1.0; 4], CIRCLE_SEGMENTS);
        assert_eq!(v.len(), (CIRCLE_SEGMENTS * 6) as usize);
        v.clear();
        circle(&mut v, Vec2::ZERO, 4.0, [1.0; 4], 16);
        assert_eq!(v.len(), 48);
    }

    #[test]
    fn test_fading_polyline_alpha_ramp() {
        let mut v = Vec::new();
        let pts = [Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(20.0, 0.0)];
        fading_polyline(&mut v, &pts, 1.0, [1.0; 4], 0.0);
        assert_eq!(v.len(), 12);
        assert!(v[0].color[3] < v[6].color[3]);
        assert_eq!(v[6].color[3], 1.0);
    }
}
