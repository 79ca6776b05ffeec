//! WebGPU rendering module
//!
//! Each map view draws the shared simulation state into its own offscreen
//! scene target with additive phosphor glow, then either copies it to the
//! caller's output or runs it through the CRT chain.

pub mod background;
pub mod blit;
pub mod error;
pub mod glow;
pub mod icons;
pub mod masks;
pub mod post;
pub mod scene;
pub mod shapes;
pub mod targets;
pub mod vertex;
pub mod view;

pub use background::{BackgroundLayer, Boundary, BoundaryKind, BoundaryMap, Graticule};
pub use error::RenderError;
pub use glow::{BlendMode, GlowRenderer};
pub use post::PostShaders;
pub use scene::build_scene;
pub use view::{MapView, ViewId};

use blit::Blitter;
use error::check_output_format;
use post::PostProcessor;
use scene::ScenePipeline;

use crate::geo::{Projector, Viewport};
use crate::settings::{CrtMode, CrtParams, Settings};
use crate::sim::SimState;

/// What one `render_view` call drew
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub vertices: usize,
    pub batches: usize,
    /// Mode actually used
    pub mode: CrtMode,
}

/// Request a device without a surface (tests, offline rendering)
pub async fn request_headless_device() -> Result<(wgpu::Device, wgpu::Queue), RenderError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await?;
    log::info!("Adapter: {:?}", adapter.get_info());

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("wargames-map-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        })
        .await?;
    Ok((device, queue))
}

/// Owns the pipelines and every view; draws one view per call
pub struct MapRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    output_format: wgpu::TextureFormat,
    scene: ScenePipeline,
    blitter: Blitter,
    /// `None` when the CRT stage failed to set up
    post: Option<PostProcessor>,
    mode: CrtMode,
    light: CrtParams,
    full: CrtParams,
    glow_layers: u32,
    background: Vec<Box<dyn BackgroundLayer>>,
    views: Vec<MapView>,
    /// Textures allocated over the renderer's lifetime
    allocations: usize,
}

impl MapRenderer {
    /// Build the shared pipelines
    ///
    /// A scene or blit failure is returned. A CRT failure is logged and the
    /// renderer stays in `Off`.
    pub async fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        output_format: wgpu::TextureFormat,
        settings: &Settings,
    ) -> Result<Self, RenderError> {
        Self::with_post_shaders(device, queue, output_format, settings, PostShaders::default())
            .await
    }

    /// Like [`MapRenderer::new`] with caller-supplied CRT shader sources
    pub async fn with_post_shaders(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        output_format: wgpu::TextureFormat,
        settings: &Settings,
        post_shaders: PostShaders<'_>,
    ) -> Result<Self, RenderError> {
        check_output_format(output_format)?;
        let scene = ScenePipeline::new(device).await?;
        let blitter = Blitter::new(device, output_format).await?;

        let post = match PostProcessor::with_shaders(device, output_format, post_shaders).await {
            Ok(post) => Some(post),
            Err(e) => {
                log::warn!("CRT effects unavailable, rendering without them: {}", e);
                None
            }
        };
        let mode = if post.is_some() {
            settings.crt_mode
        } else {
            CrtMode::Off
        };

        let mut background: Vec<Box<dyn BackgroundLayer>> = Vec::new();
        if settings.graticule {
            background.push(Box::new(Graticule::default()));
        }

        log::info!(
            "Map renderer ready: output {:?}, CRT {}",
            output_format,
            mode.as_str()
        );
        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            output_format,
            scene,
            blitter,
            post,
            mode,
            light: settings.crt_params(CrtMode::Light),
            full: settings.crt_params(CrtMode::Full),
            glow_layers: settings.effective_glow_layers(),
            background,
            views: Vec::new(),
            allocations: 0,
        })
    }

    pub fn output_format(&self) -> wgpu::TextureFormat {
        self.output_format
    }

    /// Whether the CRT stage is available at all
    pub fn has_post(&self) -> bool {
        self.post.is_some()
    }

    /// Layers are drawn in insertion order, under the entities
    pub fn add_background(&mut self, layer: Box<dyn BackgroundLayer>) {
        self.background.push(layer);
    }

    pub fn add_view(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        viewport: Option<Viewport>,
    ) -> Result<ViewId, RenderError> {
        let view = MapView::new(
            &self.device,
            &self.queue,
            name,
            Projector::new(width, height, viewport),
            &self.blitter,
            self.post.as_ref(),
        )?;
        self.allocations += view.texture_count();
        self.views.push(view);
        Ok(ViewId(self.views.len() - 1))
    }

    /// Reallocate a view's targets; same-size calls are ignored
    pub fn resize_view(&mut self, id: ViewId, width: u32, height: u32) -> Result<(), RenderError> {
        let view = self
            .views
            .get_mut(id.0)
            .ok_or(RenderError::UnknownView(id.0))?;
        if view.size() == (width, height) {
            return Ok(());
        }
        view.resize(
            &self.device,
            &self.queue,
            width,
            height,
            &self.blitter,
            self.post.as_ref(),
        )?;
        self.allocations += view.texture_count();
        Ok(())
    }

    pub fn view(&self, id: ViewId) -> Option<&MapView> {
        self.views.get(id.0)
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn texture_allocations(&self) -> usize {
        self.allocations
    }

    pub fn mode(&self) -> CrtMode {
        self.mode
    }

    /// Switch CRT mode; returns the mode now in effect
    pub fn set_mode(&mut self, mode: CrtMode) -> CrtMode {
        self.mode = if self.post.is_none() && mode != CrtMode::Off {
            log::warn!("CRT mode {} unavailable, staying Off", mode.as_str());
            CrtMode::Off
        } else {
            mode
        };
        log::info!("CRT mode: {}", self.mode.as_str());
        self.mode
    }

    pub fn cycle_mode(&mut self) -> CrtMode {
        self.set_mode(self.mode.next())
    }

    /// Draw `state` through view `id` into `output`
    ///
    /// `output` must match the size the view was allocated with.
    pub fn render_view(
        &mut self,
        id: ViewId,
        state: &SimState,
        time: f32,
        output: &wgpu::TextureView,
    ) -> Result<FrameStats, RenderError> {
        let view = self.views.get(id.0).ok_or(RenderError::UnknownView(id.0))?;
        let projector = *view.projector();
        let glow = build_scene(state, self.background.as_slice(), &projector, self.glow_layers);
        let ranges = self.scene.upload(
            &self.device,
            &self.queue,
            &glow,
            projector.width,
            projector.height,
        );

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("map_view_encoder"),
            });
        self.scene
            .encode(&mut encoder, &view.targets().scene.view, &ranges);

        let mode = match (self.post.as_ref(), view.post_bindings(), self.mode) {
            (Some(post), Some(bindings), mode @ (CrtMode::Light | CrtMode::Full)) => {
                let params = if mode == CrtMode::Full {
                    &self.full
                } else {
                    &self.light
                };
                post.encode(
                    &mut encoder,
                    &self.queue,
                    bindings,
                    view.targets(),
                    mode,
                    params,
                    time,
                    output,
                );
                mode
            }
            _ => {
                self.blitter.encode(&mut encoder, view.blit_group(), output);
                CrtMode::Off
            }
        };

        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(FrameStats {
            vertices: glow.vertex_count(),
            batches: ranges.len(),
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::sim::{SimConfig, TickInput, tick};

    const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    fn gpu() -> Option<(wgpu::Device, wgpu::Queue)> {
        match pollster::block_on(request_headless_device()) {
            Ok(pair) => Some(pair),
            Err(e) => {
                eprintln!("skipping GPU test: {e}");
                None
            }
        }
    }

    fn default_renderer(device: &wgpu::Device, queue: &wgpu::Queue) -> MapRenderer {
        pollster::block_on(MapRenderer::new(
            device,
            queue,
            OUTPUT_FORMAT,
            &Settings::default(),
        ))
        .unwrap()
    }

    /// Composite pass referencing an undefined identifier
    const BROKEN_COMPOSITE: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return clamp(colour_typo, vec4<f32>(0.0), vec4<f32>(1.0));
}
"#;

    fn output(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("test_output"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: OUTPUT_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn state() -> SimState {
        let mut state = SimState::new(11, SimConfig::default());
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), 0.1);
        }
        state
    }

    #[test]
    fn test_mode_switch_does_not_reallocate() {
        let Some((device, queue)) = gpu() else {
            return;
        };
        let mut renderer = default_renderer(&device, &queue);
        let id = renderer.add_view("global", 320, 180, None).unwrap();
        let out = output(&device, 320, 180);
        let state = state();
        let allocated = renderer.texture_allocations();

        for mode in [CrtMode::Full, CrtMode::Off, CrtMode::Full, CrtMode::Light] {
            renderer.set_mode(mode);
            let stats = renderer.render_view(id, &state, 1.0, &out).unwrap();
            assert!(stats.vertices > 0);
            if renderer.has_post() {
                assert_eq!(stats.mode, mode);
            } else {
                assert_eq!(stats.mode, CrtMode::Off);
            }
        }
        assert_eq!(renderer.texture_allocations(), allocated);
    }

    #[test]
    fn test_resize_replaces_targets() {
        let Some((device, queue)) = gpu() else {
            return;
        };
        let mut renderer = default_renderer(&device, &queue);
        let vp = Viewport::new(Coordinate::new(50.0, 10.0), 4.0);
        let id = renderer.add_view("europe", 200, 100, Some(vp)).unwrap();
        let before = renderer.texture_allocations();

        renderer.resize_view(id, 200, 100).unwrap();
        assert_eq!(renderer.texture_allocations(), before);

        renderer.resize_view(id, 300, 150).unwrap();
        assert_eq!(renderer.texture_allocations(), before * 2);
        let view = renderer.view(id).unwrap();
        assert_eq!(view.size(), (300, 150));
        assert_eq!(view.viewport(), Some(&vp));

        let out = output(&device, 300, 150);
        assert!(renderer.render_view(id, &state(), 0.5, &out).is_ok());
    }

    #[test]
    fn test_setup_errors() {
        let Some((device, queue)) = gpu() else {
            return;
        };
        let depth = pollster::block_on(MapRenderer::new(
            &device,
            &queue,
            wgpu::TextureFormat::Depth32Float,
            &Settings::default(),
        ));
        assert!(matches!(depth, Err(RenderError::UnsupportedFormat(_))));

        let mut renderer = default_renderer(&device, &queue);
        assert!(matches!(
            renderer.add_view("empty", 0, 10, None),
            Err(RenderError::ZeroSized { .. })
        ));
        assert!(matches!(
            renderer.resize_view(ViewId(4), 10, 10),
            Err(RenderError::UnknownView(4))
        ));
    }

    #[test]
    fn test_broken_crt_shader_is_reported() {
        let Some((device, _queue)) = gpu() else {
            return;
        };
        let shaders = PostShaders {
            composite: BROKEN_COMPOSITE,
            ..PostShaders::default()
        };
        match pollster::block_on(PostProcessor::with_shaders(&device, OUTPUT_FORMAT, shaders)) {
            Err(RenderError::Shader { stage, message }) => {
                assert_eq!(stage, "crt");
                assert!(message.contains("colour_typo"), "{message}");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("broken composite shader was accepted"),
        }
    }

    #[test]
    fn test_broken_crt_shader_degrades_to_off() {
        let Some((device, queue)) = gpu() else {
            return;
        };
        let shaders = PostShaders {
            composite: BROKEN_COMPOSITE,
            ..PostShaders::default()
        };
        let mut renderer = pollster::block_on(MapRenderer::with_post_shaders(
            &device,
            &queue,
            OUTPUT_FORMAT,
            &Settings::default(),
            shaders,
        ))
        .unwrap();
        assert!(!renderer.has_post());
        assert_eq!(renderer.mode(), CrtMode::Off);
        assert_eq!(renderer.set_mode(CrtMode::Full), CrtMode::Off);

        let id = renderer.add_view("global", 160, 80, None).unwrap();
        let out = output(&device, 160, 80);
        let stats = renderer.render_view(id, &state(), 0.5, &out).unwrap();
        assert_eq!(stats.mode, CrtMode::Off);
        assert!(stats.vertices > 0);
    }
}
