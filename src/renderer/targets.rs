//! Offscreen textures owned by one map view
//!
//! A view always has a scene target. When the CRT stage is available it also
//! owns the ping-pong buffers and the two overlay masks, allocated together
//! so mode switches never touch the allocator.

use super::error::{RenderError, check_size};
use super::masks::{scanline_mask, vignette_mask};
use super::scene::OFFSCREEN_FORMAT;

/// Texture plus its default view
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl RenderTarget {
    /// Color target that later passes sample from
    pub fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        Self::with_usage(
            device,
            label,
            width,
            height,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        )
    }

    fn with_usage(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Sampled-only texture filled from RGBA8 bytes
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Self {
        let target = Self::with_usage(
            device,
            label,
            width,
            height,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        target
    }
}

/// Intermediate buffers and masks for the CRT chain
pub struct CrtTargets {
    pub post_a: RenderTarget,
    pub post_b: RenderTarget,
    pub bloom_a: RenderTarget,
    pub bloom_b: RenderTarget,
    pub scanline: RenderTarget,
    pub vignette: RenderTarget,
}

impl CrtTargets {
    pub const TEXTURE_COUNT: usize = 6;

    fn new(device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) -> Self {
        Self {
            post_a: RenderTarget::new(device, "post_a", width, height),
            post_b: RenderTarget::new(device, "post_b", width, height),
            bloom_a: RenderTarget::new(device, "bloom_a", width, height),
            bloom_b: RenderTarget::new(device, "bloom_b", width, height),
            scanline: RenderTarget::from_rgba8(
                device,
                queue,
                "scanline_mask",
                width,
                height,
                &scanline_mask(width, height),
            ),
            vignette: RenderTarget::from_rgba8(
                device,
                queue,
                "vignette_mask",
                width,
                height,
                &vignette_mask(width, height),
            ),
        }
    }
}

/// Every texture a view renders through, sized to its output
pub struct ViewTargets {
    pub width: u32,
    pub height: u32,
    pub scene: RenderTarget,
    pub crt: Option<CrtTargets>,
}

impl ViewTargets {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        with_crt: bool,
    ) -> Result<Self, RenderError> {
        check_size(device, "view", width, height)?;
        let scene = RenderTarget::new(device, "scene", width, height);
        let crt = with_crt.then(|| CrtTargets::new(device, queue, width, height));
        log::debug!(
            "Allocated view targets {}x{} (crt: {})",
            width,
            height,
            crt.is_some()
        );
        Ok(Self {
            width,
            height,
            scene,
            crt,
        })
    }

    /// Number of textures held by this view
    pub fn texture_count(&self) -> usize {
        1 + if self.crt.is_some() {
            CrtTargets::TEXTURE_COUNT
        } else {
            0
        }
    }
}
