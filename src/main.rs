//! WarGames map entry point
//!
//! Native headless runner: drives the simulation with a scripted sequence of
//! control events and renders a global and a regional view offscreen.
//!
//! Usage: `wargames-map [settings.json] [boundaries.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use wargames_map::renderer::{Boundary, BoundaryMap, MapRenderer, RenderError, ViewId};
    use wargames_map::sim::{SimState, tick};
    use wargames_map::{CommandCenter, ControlEvent, Coordinate, Settings, Viewport};

    const FRAMES: u32 = 600;
    const FRAME_DT: f32 = 1.0 / 60.0;
    const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    /// Events fired at fixed frames
    const SCRIPT: &[(u32, ControlEvent)] = &[
        (60, ControlEvent::Burst),
        (120, ControlEvent::Faster),
        (121, ControlEvent::Faster),
        (200, ControlEvent::CycleCrtMode),
        (260, ControlEvent::TogglePause),
        (300, ControlEvent::TogglePause),
        (360, ControlEvent::CycleCrtMode),
        (420, ControlEvent::Slower),
        (480, ControlEvent::ResetIntensity),
        (540, ControlEvent::Burst),
        (FRAMES - 1, ControlEvent::Quit),
    ];

    struct Output {
        id: ViewId,
        view: wgpu::TextureView,
    }

    fn output_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("frame_output"),
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

    fn load_boundaries(path: &str) -> Option<Vec<Boundary>> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Cannot read boundaries {}: {}", path, e);
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(boundaries) => Some(boundaries),
            Err(e) => {
                log::warn!("Ignoring malformed boundaries {}: {}", path, e);
                None
            }
        }
    }

    pub fn run() -> Result<(), RenderError> {
        let args: Vec<String> = std::env::args().collect();
        let settings_path = args.get(1).map(String::as_str).unwrap_or("wargames_map.json");
        let settings = Settings::load_from(settings_path);

        let (device, queue) = pollster::block_on(wargames_map::renderer::request_headless_device())?;
        let mut renderer =
            pollster::block_on(MapRenderer::new(&device, &queue, OUTPUT_FORMAT, &settings))?;
        if let Some(boundaries) = args.get(2).and_then(|p| load_boundaries(p)) {
            renderer.add_background(Box::new(BoundaryMap::new(boundaries)));
        }

        let europe = Viewport::new(Coordinate::new(50.0, 10.0), 4.0);
        let outputs = [
            Output {
                id: renderer.add_view("global", 1280, 640, None)?,
                view: output_texture(&device, 1280, 640),
            },
            Output {
                id: renderer.add_view("europe", 640, 360, Some(europe))?,
                view: output_texture(&device, 640, 360),
            },
        ];

        let mut commands = CommandCenter::new(renderer.mode());
        let mut state = SimState::new(settings.seed, settings.sim_config());
        let (mut launched, mut detonated, mut peak_in_flight, mut vertices) = (0, 0, 0, 0);
        let mut frames = 0;

        log::info!("WarGames map (headless) starting: {} frames", FRAMES);
        while !commands.should_quit() && frames < FRAMES {
            for (_, event) in SCRIPT.iter().filter(|(f, _)| *f == frames) {
                commands.handle(*event);
            }
            if commands.crt_mode() != renderer.mode() {
                let applied = renderer.set_mode(commands.crt_mode());
                commands.set_crt_mode(applied);
            }

            let report = tick(&mut state, &commands.take_input(), FRAME_DT);
            launched += report.launched;
            detonated += report.detonated;
            peak_in_flight = peak_in_flight.max(state.missiles.len());

            let time = state.elapsed as f32;
            for out in &outputs {
                vertices += renderer.render_view(out.id, &state, time, &out.view)?.vertices;
            }
            frames += 1;
        }

        log::info!(
            "Ran {} frames ({:.1}s simulated): launched={} detonated={} peak_in_flight={} vertices={} crt={} textures={}",
            frames,
            state.elapsed,
            launched,
            detonated,
            peak_in_flight,
            vertices,
            renderer.mode().as_str(),
            renderer.texture_allocations()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web builds embed the library; there is no standalone entry point
}
