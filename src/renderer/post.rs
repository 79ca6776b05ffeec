//! CRT post-processing chain
//!
//! FULL: barrel -> chromatic -> bloom H -> bloom V -> composite
//! LIGHT: composite only, with the scene bound in the bloom slot
//!
//! Composite is the only pass that writes the caller's output. Every other
//! pass ping-pongs between the view's offscreen targets.

use bytemuck::{Pod, Zeroable};

use super::blit::{
    fullscreen_pass, fullscreen_pipeline, fullscreen_shader, linear_sampler, sampler_entry,
    texture_entry,
};
use super::error::{RenderError, capture_validation, check_output_format};
use super::masks::{flicker_factor, packed_bloom_weights};
use super::scene::OFFSCREEN_FORMAT;
use super::targets::ViewTargets;
use crate::settings::{CrtMode, CrtParams};

/// Textures sampled by the composite pass
const COMPOSITE_TEXTURES: u32 = 4;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FilterUniform {
    params: [f32; 4],       // offset 0
    weights: [[f32; 4]; 2], // offset 16
}

impl FilterUniform {
    fn scalar(value: f32) -> Self {
        Self {
            params: [value, 0.0, 0.0, 0.0],
            weights: [[0.0; 4]; 2],
        }
    }

    fn blur(direction: [f32; 2], width: u32, height: u32) -> Self {
        Self {
            params: [
                direction[0],
                direction[1],
                1.0 / width as f32,
                1.0 / height as f32,
            ],
            weights: packed_bloom_weights(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct CompositeUniform {
    resolution: [f32; 2], // offset 0
    time: f32,            // offset 8
    noise: f32,           // offset 12
    bloom: f32,           // offset 16
    flicker: f32,         // offset 20
    _pad: [f32; 2],       // pad to 32 bytes
}

impl CompositeUniform {
    fn new(width: u32, height: u32, time: f32, params: &CrtParams) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            time,
            noise: params.noise,
            bloom: params.bloom,
            flicker: flicker_factor(time, params.flicker),
            _pad: [0.0; 2],
        }
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_buffer<T: Pod>(device: &wgpu::Device, label: &str) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: std::mem::size_of::<T>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Per-view bind groups and uniforms, built once per target allocation
pub struct PostBindings {
    barrel: wgpu::BindGroup,
    chromatic: wgpu::BindGroup,
    blur_h: wgpu::BindGroup,
    blur_v: wgpu::BindGroup,
    composite_light: wgpu::BindGroup,
    composite_full: wgpu::BindGroup,
    barrel_uniform: wgpu::Buffer,
    chromatic_uniform: wgpu::Buffer,
    composite_uniform: wgpu::Buffer,
    width: u32,
    height: u32,
}

/// WGSL fragment sources of the CRT stage
///
/// Each is appended to the shared fullscreen vertex shader.
#[derive(Debug, Clone, Copy)]
pub struct PostShaders<'a> {
    /// `fs_barrel`, `fs_chromatic` and `fs_blur`
    pub filters: &'a str,
    /// `fs_main` of the composite pass
    pub composite: &'a str,
}

impl Default for PostShaders<'static> {
    fn default() -> Self {
        Self {
            filters: include_str!("filters.wgsl"),
            composite: include_str!("composite.wgsl"),
        }
    }
}

struct PostPipelines {
    barrel: wgpu::RenderPipeline,
    chromatic: wgpu::RenderPipeline,
    blur: wgpu::RenderPipeline,
    composite: wgpu::RenderPipeline,
}

/// Pipelines, layouts and sampler shared by every view
pub struct PostProcessor {
    filter_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    barrel: wgpu::RenderPipeline,
    chromatic: wgpu::RenderPipeline,
    blur: wgpu::RenderPipeline,
    composite: wgpu::RenderPipeline,
}

impl PostProcessor {
    /// Build the CRT stage from the bundled shaders
    pub async fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self, RenderError> {
        Self::with_shaders(device, output_format, PostShaders::default()).await
    }

    /// Build the CRT stage from the given sources
    ///
    /// A parse or validation failure is returned as [`RenderError::Shader`].
    pub async fn with_shaders(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        shaders: PostShaders<'_>,
    ) -> Result<Self, RenderError> {
        check_output_format(output_format)?;
        if device.limits().max_sampled_textures_per_shader_stage < COMPOSITE_TEXTURES {
            return Err(RenderError::MissingCapability(
                "four sampled textures per fragment stage",
            ));
        }

        let filter_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("crt_filter_layout"),
            entries: &[texture_entry(0), sampler_entry(1), uniform_entry(2)],
        });
        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("crt_composite_layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                sampler_entry(4),
                uniform_entry(5),
            ],
        });

        let pipelines = capture_validation(device, "crt", || {
            Self::pipelines(device, &filter_layout, &composite_layout, shaders, output_format)
        })
        .await?;
        log::info!("CRT pipelines created for {:?}", output_format);

        Ok(Self {
            filter_layout,
            composite_layout,
            sampler: linear_sampler(device, "crt_sampler"),
            barrel: pipelines.barrel,
            chromatic: pipelines.chromatic,
            blur: pipelines.blur,
            composite: pipelines.composite,
        })
    }

    fn pipelines(
        device: &wgpu::Device,
        filter_layout: &wgpu::BindGroupLayout,
        composite_layout: &wgpu::BindGroupLayout,
        shaders: PostShaders<'_>,
        output_format: wgpu::TextureFormat,
    ) -> PostPipelines {
        let filters = fullscreen_shader(device, "crt_filters", shaders.filters);
        let composite = fullscreen_shader(device, "crt_composite", shaders.composite);
        let filter = |label: &str, entry: &str| {
            fullscreen_pipeline(device, label, filter_layout, &filters, entry, OFFSCREEN_FORMAT)
        };

        PostPipelines {
            barrel: filter("crt_barrel", "fs_barrel"),
            chromatic: filter("crt_chromatic", "fs_chromatic"),
            blur: filter("crt_blur", "fs_blur"),
            composite: fullscreen_pipeline(
                device,
                "crt_composite",
                composite_layout,
                &composite,
                "fs_main",
                output_format,
            ),
        }
    }

    fn filter_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        source: &wgpu::TextureView,
        uniform: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.filter_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: uniform.as_entire_binding(),
                },
            ],
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn composite_group(
        &self,
        device: &wgpu::Device,
        label: &str,
        scene: &wgpu::TextureView,
        bloom: &wgpu::TextureView,
        scanline: &wgpu::TextureView,
        vignette: &wgpu::TextureView,
        uniform: &wgpu::Buffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.composite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(scene),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(bloom),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(scanline),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(vignette),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: uniform.as_entire_binding(),
                },
            ],
        })
    }

    /// Bind groups for both CRT modes of one view
    ///
    /// Returns `None` when the view was allocated without CRT targets.
    pub fn bind_view(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        targets: &ViewTargets,
    ) -> Option<PostBindings> {
        let crt = targets.crt.as_ref()?;
        let (w, h) = (targets.width, targets.height);

        let barrel_uniform = uniform_buffer::<FilterUniform>(device, "crt_barrel_uniform");
        let chromatic_uniform = uniform_buffer::<FilterUniform>(device, "crt_chromatic_uniform");
        let blur_h_uniform = uniform_buffer::<FilterUniform>(device, "crt_blur_h_uniform");
        let blur_v_uniform = uniform_buffer::<FilterUniform>(device, "crt_blur_v_uniform");
        let composite_uniform = uniform_buffer::<CompositeUniform>(device, "crt_composite_uniform");

        queue.write_buffer(
            &blur_h_uniform,
            0,
            bytemuck::bytes_of(&FilterUniform::blur([1.0, 0.0], w, h)),
        );
        queue.write_buffer(
            &blur_v_uniform,
            0,
            bytemuck::bytes_of(&FilterUniform::blur([0.0, 1.0], w, h)),
        );

        Some(PostBindings {
            barrel: self.filter_group(device, "crt_barrel", &targets.scene.view, &barrel_uniform),
            chromatic: self.filter_group(
                device,
                "crt_chromatic",
                &crt.post_a.view,
                &chromatic_uniform,
            ),
            blur_h: self.filter_group(device, "crt_blur_h", &crt.post_b.view, &blur_h_uniform),
            blur_v: self.filter_group(device, "crt_blur_v", &crt.bloom_a.view, &blur_v_uniform),
            composite_light: self.composite_group(
                device,
                "crt_composite_light",
                &targets.scene.view,
                &targets.scene.view,
                &crt.scanline.view,
                &crt.vignette.view,
                &composite_uniform,
            ),
            composite_full: self.composite_group(
                device,
                "crt_composite_full",
                &crt.post_b.view,
                &crt.bloom_b.view,
                &crt.scanline.view,
                &crt.vignette.view,
                &composite_uniform,
            ),
            barrel_uniform,
            chromatic_uniform,
            composite_uniform,
            width: w,
            height: h,
        })
    }

    /// Record the chain for `mode` into `encoder`, ending in `output`
    ///
    /// `Off` records nothing; the caller blits instead.
    #[allow(clippy::too_many_arguments)]
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        queue: &wgpu::Queue,
        bindings: &PostBindings,
        targets: &ViewTargets,
        mode: CrtMode,
        params: &CrtParams,
        time: f32,
        output: &wgpu::TextureView,
    ) {
        let Some(crt) = targets.crt.as_ref() else {
            return;
        };
        if mode == CrtMode::Off {
            return;
        }
        let composite = CompositeUniform::new(bindings.width, bindings.height, time, params);
        queue.write_buffer(&bindings.composite_uniform, 0, bytemuck::bytes_of(&composite));

        match mode {
            CrtMode::Off => {}
            CrtMode::Light => {
                fullscreen_pass(
                    encoder,
                    "crt_composite_light",
                    &self.composite,
                    &bindings.composite_light,
                    output,
                );
            }
            CrtMode::Full => {
                queue.write_buffer(
                    &bindings.barrel_uniform,
                    0,
                    bytemuck::bytes_of(&FilterUniform::scalar(params.barrel_strength)),
                );
                queue.write_buffer(
                    &bindings.chromatic_uniform,
                    0,
                    bytemuck::bytes_of(&FilterUniform::scalar(params.chromatic_intensity)),
                );
                fullscreen_pass(encoder, "crt_barrel", &self.barrel, &bindings.barrel, &crt.post_a.view);
                fullscreen_pass(
                    encoder,
                    "crt_chromatic",
                    &self.chromatic,
                    &bindings.chromatic,
                    &crt.post_b.view,
                );
                fullscreen_pass(encoder, "crt_blur_h", &self.blur, &bindings.blur_h, &crt.bloom_a.view);
                fullscreen_pass(encoder, "crt_blur_v", &self.blur, &bindings.blur_v, &crt.bloom_b.view);
                fullscreen_pass(
                    encoder,
                    "crt_composite_full",
                    &self.composite,
                    &bindings.composite_full,
                    output,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layouts_match_shader() {
        assert_eq!(std::mem::size_of::<FilterUniform>(), 48);
        assert_eq!(std::mem::size_of::<CompositeUniform>(), 32);
    }

    #[test]
    fn test_blur_uniform_texel_size() {
        let u = FilterUniform::blur([0.0, 1.0], 800, 400);
        assert_eq!(u.params, [0.0, 1.0, 1.0 / 800.0, 1.0 / 400.0]);
        assert_eq!(u.weights, packed_bloom_weights());
    }

    #[test]
    fn test_composite_uniform_flicker_precomputed() {
        let light = CompositeUniform::new(640, 480, 2.5, &CrtParams::LIGHT);
        assert_eq!(light.flicker, 1.0);
        assert_eq!(light.bloom, 0.0);
        let full = CompositeUniform::new(640, 480, 2.5, &CrtParams::FULL);
        assert_eq!(full.flicker, flicker_factor(2.5, 0.02));
        assert_eq!(full.resolution, [640.0, 480.0]);
    }
}
