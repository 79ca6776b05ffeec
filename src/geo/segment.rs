//! Antimeridian segmentation
//!
//! A path that crosses lon ±180 would otherwise draw a line across the whole
//! map. These helpers break polylines at such jumps without stitching.

use glam::Vec2;

use super::coord::Coordinate;

/// Split `points` wherever `crosses(prev, next)` is true
///
/// The current segment closes before the crossing and a new one starts at
/// the point after it. Segments with fewer than two points are dropped.
pub fn split_by<T: Copy>(points: &[T], mut crosses: impl FnMut(&T, &T) -> bool) -> Vec<Vec<T>> {
    let mut segments = Vec::new();
    let Some(first) = points.first() else {
        return segments;
    };

    let mut current = vec![*first];
    for pair in points.windows(2) {
        if crosses(&pair[0], &pair[1]) {
            if current.len() >= 2 {
                segments.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
        current.push(pair[1]);
    }
    if current.len() >= 2 {
        segments.push(current);
    }
    segments
}

/// Split a projected polyline where |dx| exceeds half the canvas width
pub fn split_screen_path(points: &[Vec2], canvas_width: f32) -> Vec<Vec<Vec2>> {
    let threshold = canvas_width * 0.5;
    split_by(points, |a, b| (b.x - a.x).abs() > threshold)
}

/// Split a geographic polyline where |dlon| exceeds 180 degrees
pub fn split_geo_path(coords: &[Coordinate]) -> Vec<Vec<Coordinate>> {
    split_by(coords, |a, b| (b.lon() - a.lon()).abs() > 180.0)
}
