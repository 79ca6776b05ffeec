//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex with position and color
///
/// Positions are in pixels while a scene is being built and are converted
/// to clip space right before upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Phosphor palette
pub mod colors {
    use crate::sim::Tint;

    pub const CYAN: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
    pub const DIM_CYAN: [f32; 4] = [0.0, 0.4, 0.4, 1.0];
    pub const DARKER_CYAN: [f32; 4] = [0.0, 0.3, 0.3, 1.0];
    pub const RED: [f32; 4] = [1.0, 0.196, 0.196, 1.0]; // 255, 50, 50
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    pub fn tint(t: Tint) -> [f32; 4] {
        match t {
            Tint::Cyan => CYAN,
            Tint::DimCyan => DIM_CYAN,
            Tint::DarkerCyan => DARKER_CYAN,
            Tint::Red => RED,
            Tint::White => WHITE,
        }
    }

    /// Same color with alpha multiplied by `a`
    #[inline]
    pub fn with_alpha(c: [f32; 4], a: f32) -> [f32; 4] {
        [c[0], c[1], c[2], c[3] * a]
    }
}
