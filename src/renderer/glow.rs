//! Phosphor glow drawing
//!
//! Each glowing primitive is drawn once per layer, from layer `layers-1` down
//! to layer 0. Outer layers are faint; layer 0 carries the full color.
//! Geometry is recorded into batches tagged with a blend mode and the GPU
//! side decides how each mode blends.

use glam::Vec2;

use super::shapes::{self, CIRCLE_SEGMENTS};
use super::vertex::Vertex;
use super::vertex::colors::with_alpha;

/// How a batch combines with what is already in the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Light accumulates (phosphor)
    Additive,
    /// Regular over-compositing (overlays)
    Alpha,
}

/// Vertices sharing one blend mode, in draw order
#[derive(Debug, Clone)]
pub struct Batch {
    pub blend: BlendMode,
    pub vertices: Vec<Vertex>,
}

/// Alpha factor and line width of glow layer `i` out of `layers`
///
/// Layer 0 is drawn at full strength; the others split 30% of it.
#[inline]
pub fn glow_layer(i: u32, layers: u32) -> (f32, f32) {
    let alpha = if i == 0 { 1.0 } else { 0.3 / layers as f32 };
    let width = 1.0 + (layers - i) as f32 * 0.8;
    (alpha, width)
}

/// Layers in draw order (highest index first)
fn layer_order(layers: u32) -> impl Iterator<Item = (f32, f32)> {
    (0..layers).rev().map(move |i| glow_layer(i, layers))
}

/// Records glowing primitives as pixel-space triangles
#[derive(Debug, Clone)]
pub struct GlowRenderer {
    batches: Vec<Batch>,
    blend: BlendMode,
}

impl Default for GlowRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlowRenderer {
    /// Starts in additive mode
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
            blend: BlendMode::Additive,
        }
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    /// Subsequent primitives use `mode`
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(|b| b.vertices.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }

    /// Vertex sink for the current blend mode, opening a batch on change
    fn sink(&mut self) -> &mut Vec<Vertex> {
        let blend = self.blend;
        let reuse = self.batches.last().is_some_and(|b| b.blend == blend);
        if !reuse {
            self.batches.push(Batch {
                blend,
                vertices: Vec::new(),
            });
        }
        let last = self.batches.len() - 1;
        &mut self.batches[last].vertices
    }

    pub fn draw_line(&mut self, a: Vec2, b: Vec2, color: [f32; 4], width: f32) {
        shapes::line_quad(self.sink(), a, b, width, color);
    }

    /// Circle outline
    pub fn draw_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4], width: f32) {
        let half = width * 0.5;
        shapes::ring(
            self.sink(),
            center,
            radius - half,
            radius + half,
            color,
            CIRCLE_SEGMENTS,
        );
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        shapes::circle(self.sink(), center, radius, color, CIRCLE_SEGMENTS);
    }

    pub fn draw_path(&mut self, points: &[Vec2], color: [f32; 4], width: f32) {
        shapes::polyline(self.sink(), points, width, color);
    }

    /// Path that fades toward its first point
    pub fn draw_fading_path(&mut self, points: &[Vec2], color: [f32; 4], width: f32) {
        shapes::fading_polyline(self.sink(), points, width, color, 0.0);
    }

    pub fn draw_line_with_glow(&mut self, a: Vec2, b: Vec2, color: [f32; 4], layers: u32) {
        for (alpha, width) in layer_order(layers) {
            self.draw_line(a, b, with_alpha(color, alpha), width);
        }
    }

    pub fn draw_circle_with_glow(&mut self, center: Vec2, radius: f32, color: [f32; 4], layers: u32) {
        for (alpha, width) in layer_order(layers) {
            self.draw_circle(center, radius, with_alpha(color, alpha), width);
        }
    }

    /// Paths with fewer than two points draw nothing
    pub fn draw_path_with_glow(&mut self, points: &[Vec2], color: [f32; 4], layers: u32) {
        if points.len() < 2 {
            return;
        }
        for (alpha, width) in layer_order(layers) {
            self.draw_path(points, with_alpha(color, alpha), width);
        }
    }

    /// Closed outline (last point joins the first)
    pub fn draw_polygon_with_glow(&mut self, points: &[Vec2], color: [f32; 4], layers: u32) {
        if points.len() < 2 {
            return;
        }
        let mut closed = Vec::with_capacity(points.len() + 1);
        closed.extend_from_slice(points);
        closed.push(points[0]);
        self.draw_path_with_glow(&closed, color, layers);
    }
}
