//! CPU-side CRT math: overlay masks, flicker, blur weights
//!
//! Masks are built once per output resolution and uploaded as RGBA8
//! textures. The helpers here are also the reference for the shader math.

use glam::Vec2;

/// Separable 5-tap Gaussian, center tap first
pub const BLOOM_WEIGHTS: [f32; 5] = [0.227027, 0.194595, 0.121622, 0.054054, 0.016216];

/// Scanline darkening: every third row is dimmed to this value
pub const SCANLINE_DIM: u8 = 200;

/// Blur weights packed for a uniform buffer (vec4 stride)
pub fn packed_bloom_weights() -> [[f32; 4]; 2] {
    let w = BLOOM_WEIGHTS;
    [[w[0], w[1], w[2], w[3]], [w[4], 0.0, 0.0, 0.0]]
}

/// RGBA8 scanline mask, rows with `y % 3 == 0` dimmed
pub fn scanline_mask(width: u32, height: u32) -> Vec<u8> {
    let mut data = vec![255u8; width as usize * height as usize * 4];
    let row_bytes = width as usize * 4;
    for y in (0..height as usize).step_by(3) {
        for px in data[y * row_bytes..(y + 1) * row_bytes].chunks_exact_mut(4) {
            px[0] = SCANLINE_DIM;
            px[1] = SCANLINE_DIM;
            px[2] = SCANLINE_DIM;
        }
    }
    data
}

/// Vignette brightness at pixel (x, y): `1 - clamp(d / maxd)^1.8 * 0.6`
pub fn vignette_value(x: u32, y: u32, width: u32, height: u32) -> f32 {
    let cx = width as f32 * 0.5;
    let cy = height as f32 * 0.5;
    let max_d = (cx * cx + cy * cy).sqrt();
    if max_d <= 0.0 {
        return 1.0;
    }
    let d = (Vec2::new(x as f32 - cx, y as f32 - cy).length() / max_d).clamp(0.0, 1.0);
    (1.0 - d.powf(1.8) * 0.6).clamp(0.0, 1.0)
}

/// RGBA8 vignette mask
pub fn vignette_mask(width: u32, height: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let c = (vignette_value(x, y, width, height) * 255.0) as u8;
            data.extend_from_slice(&[c, c, c, 255]);
        }
    }
    data
}

/// Brightness multiplier for screen flicker at time `t`
pub fn flicker_factor(t: f32, intensity: f32) -> f32 {
    1.0 + (t * 120.0).sin() * intensity + 0.5 * (t * 67.0).sin() * intensity
}

/// Barrel distortion source position for a centered coordinate `c` in [-1, 1]^2
///
/// CPU reference for `fs_barrel` in `filters.wgsl`; only the tests call it.
pub fn barrel_source(c: Vec2, strength: f32) -> Vec2 {
    c * (1.0 + c.length_squared() * strength)
}

/// Chromatic aberration channel offset at `uv`
///
/// CPU reference for `fs_chromatic` in `filters.wgsl`; only the tests call it.
pub fn chromatic_offset(uv: Vec2, intensity: f32) -> Vec2 {
    (uv - Vec2::splat(0.5)) * intensity * 0.01
}
