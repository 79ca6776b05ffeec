//! Entity scene: builds the per-view glow geometry and draws it offscreen
//!
//! Draw order is fixed: background, aircraft, missiles, explosions, then an
//! alpha-blended overlay. Everything but the overlay accumulates additively.

use std::ops::Range;

use glam::Vec2;

use super::background::{BackgroundLayer, CULL_MARGIN_DEG, draw_geo_polyline};
use super::error::{RenderError, capture_validation};
use super::glow::{BlendMode, GlowRenderer};
use super::icons::{draw_aircraft, draw_head_blip, draw_target_marker, draw_vehicle_icon};
use super::vertex::Vertex;
use super::vertex::colors::{self, with_alpha};
use crate::geo::{Projector, split_geo_path, split_screen_path, visible_runs};
use crate::sim::{Aircraft, Explosion, Missile, SimState};

/// Format of every offscreen target
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

const RING_GLOW_LAYERS: u32 = 4;
const FLASH_GLOW_LAYERS: u32 = 5;
const TRAIL_WIDTH: f32 = 1.5;

fn draw_aircraft_entity(glow: &mut GlowRenderer, projector: &Projector, aircraft: &Aircraft) {
    let color = colors::tint(aircraft.tint);
    let scale = projector.icon_scale();

    for geo_segment in split_geo_path(&aircraft.trail()) {
        for run in visible_runs(&geo_segment, projector.viewport.as_ref(), CULL_MARGIN_DEG) {
            let screen = projector.project_path(run);
            for piece in split_screen_path(&screen, projector.width as f32) {
                glow.draw_fading_path(&piece, color, TRAIL_WIDTH * scale);
            }
        }
    }

    let head = aircraft.head();
    if projector.is_visible(head, 0.0) {
        draw_aircraft(glow, projector.project(head), color, scale);
    }
}

fn draw_missile(glow: &mut GlowRenderer, projector: &Projector, missile: &Missile, layers: u32) {
    let color = colors::tint(missile.tint);
    let scale = projector.icon_scale();

    if projector.is_visible(missile.start(), 0.0) {
        draw_vehicle_icon(glow, missile.kind, projector.project(missile.start()), color, scale);
    }

    draw_geo_polyline(glow, projector, missile.visible_path(), color, layers);

    if !missile.is_finished() && projector.is_visible(missile.head(), 0.0) {
        draw_head_blip(glow, projector.project(missile.head()), color, scale);
    }

    let target = missile.impact_point();
    if projector.is_visible(target, 0.0) {
        draw_target_marker(glow, projector.project(target), missile.progress(), color, scale);
    }
}

fn draw_explosion(glow: &mut GlowRenderer, projector: &Projector, explosion: &Explosion) {
    if !projector.is_visible(explosion.origin, CULL_MARGIN_DEG) {
        return;
    }
    let color = colors::tint(explosion.tint);
    let scale = projector.icon_scale();
    let pos = projector.project(explosion.origin);

    for ring in explosion.ring_states() {
        glow.draw_circle_with_glow(
            pos,
            ring.radius * scale,
            with_alpha(color, ring.alpha),
            RING_GLOW_LAYERS,
        );
    }
    if let Some(flash) = explosion.flash() {
        let radius = flash.radius * scale;
        glow.draw_circle_with_glow(pos, radius, with_alpha(color, flash.alpha), FLASH_GLOW_LAYERS);
        glow.fill_circle(pos, radius, with_alpha(colors::WHITE, flash.alpha));
    }
}

/// Frame around a regional view
fn draw_overlay(glow: &mut GlowRenderer, projector: &Projector) {
    if projector.viewport.is_none() {
        return;
    }
    let inset = 4.0 * projector.icon_scale();
    let (w, h) = (projector.width as f32, projector.height as f32);
    let frame = [
        Vec2::new(inset, inset),
        Vec2::new(w - inset, inset),
        Vec2::new(w - inset, h - inset),
        Vec2::new(inset, h - inset),
    ];
    glow.set_blend_mode(BlendMode::Alpha);
    glow.draw_polygon_with_glow(&frame, with_alpha(colors::DIM_CYAN, 0.6), 1);
}

/// Build all geometry for one view of the simulation
///
/// Reads the state immutably; several views can be built from one tick.
pub fn build_scene<B: BackgroundLayer + ?Sized>(
    state: &SimState,
    background: &B,
    projector: &Projector,
    layers: u32,
) -> GlowRenderer {
    let mut glow = GlowRenderer::new();
    glow.set_blend_mode(BlendMode::Additive);

    background.draw(&mut glow, projector);
    for aircraft in &state.aircraft {
        draw_aircraft_entity(&mut glow, projector, aircraft);
    }
    for missile in &state.missiles {
        draw_missile(&mut glow, projector, missile, layers);
    }
    for explosion in &state.explosions {
        draw_explosion(&mut glow, projector, explosion);
    }
    draw_overlay(&mut glow, projector);
    glow
}

/// Pixel coordinates (origin top-left) to clip space
pub fn to_clip(vertices: &[Vertex], width: u32, height: u32) -> Vec<Vertex> {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    vertices
        .iter()
        .map(|v| {
            Vertex::new(
                v.position[0] / w * 2.0 - 1.0,
                1.0 - v.position[1] / h * 2.0,
                v.color,
            )
        })
        .collect()
}

/// Uploaded batch: blend mode plus vertex range in the shared buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRange {
    pub blend: BlendMode,
    pub vertices: Range<u32>,
}

/// Additive and alpha pipelines drawing glow batches into an offscreen target
pub struct ScenePipeline {
    additive: wgpu::RenderPipeline,
    alpha: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    /// Buffer capacity in vertices
    capacity: u64,
}

const INITIAL_VERTEX_CAPACITY: u64 = 16 * 1024;

fn vertex_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("scene_vertices"),
        size: capacity * std::mem::size_of::<Vertex>() as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Light accumulates: `src * src_alpha + dst`
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

impl ScenePipeline {
    pub async fn new(device: &wgpu::Device) -> Result<Self, RenderError> {
        let (additive, alpha) =
            capture_validation(device, "scene", || Self::pipelines(device)).await?;
        log::info!("Scene pipelines created");

        Ok(Self {
            additive,
            alpha,
            vertex_buffer: vertex_buffer(device, INITIAL_VERTEX_CAPACITY),
            capacity: INITIAL_VERTEX_CAPACITY,
        })
    }

    fn pipelines(device: &wgpu::Device) -> (wgpu::RenderPipeline, wgpu::RenderPipeline) {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let make = |label: &str, blend: wgpu::BlendState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: OFFSCREEN_FORMAT,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        (
            make("scene_additive", ADDITIVE_BLENDING),
            make("scene_alpha", wgpu::BlendState::ALPHA_BLENDING),
        )
    }

    /// Copy every batch into the vertex buffer, growing it when needed
    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        glow: &GlowRenderer,
        width: u32,
        height: u32,
    ) -> Vec<DrawRange> {
        let needed = glow.vertex_count() as u64;
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            log::debug!("Growing scene vertex buffer to {capacity} vertices");
            self.vertex_buffer = vertex_buffer(device, capacity);
            self.capacity = capacity;
        }

        let mut clip = Vec::with_capacity(needed as usize);
        let mut ranges = Vec::with_capacity(glow.batches().len());
        for batch in glow.batches() {
            let start = clip.len() as u32;
            clip.extend(to_clip(&batch.vertices, width, height));
            let end = clip.len() as u32;
            if end > start {
                ranges.push(DrawRange {
                    blend: batch.blend,
                    vertices: start..end,
                });
            }
        }
        if !clip.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&clip));
        }
        ranges
    }

    /// Clear `target` to the background and draw the uploaded ranges
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        ranges: &[DrawRange],
    ) {
        let bg = colors::BACKGROUND;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: bg[0] as f64,
                        g: bg[1] as f64,
                        b: bg[2] as f64,
                        a: bg[3] as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        for range in ranges {
            let pipeline = match range.blend {
                BlendMode::Additive => &self.additive,
                BlendMode::Alpha => &self.alpha,
            };
            pass.set_pipeline(pipeline);
            pass.draw(range.vertices.clone(), 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Coordinate, Viewport};
    use crate::renderer::background::Graticule;
    use crate::sim::{SimConfig, TickInput, tick};

    fn busy_state() -> SimState {
        let mut state = SimState::new(7, SimConfig::default());
        state.burst();
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), 0.1);
        }
        state
    }

    #[test]
    fn test_to_clip_corners() {
        let v = [
            Vertex::new(0.0, 0.0, [1.0; 4]),
            Vertex::new(200.0, 100.0, [1.0; 4]),
        ];
        let clip = to_clip(&v, 200, 100);
        assert_eq!(clip[0].position, [-1.0, 1.0]);
        assert_eq!(clip[1].position, [1.0, -1.0]);
    }

    #[test]
    fn test_build_scene_deterministic() {
        let a = busy_state();
        let b = busy_state();
        let projector = Projector::new(1280, 720, None);
        let ga = build_scene(&a, &Graticule::default(), &projector, 5);
        let gb = build_scene(&b, &Graticule::default(), &projector, 5);
        assert_eq!(ga.vertex_count(), gb.vertex_count());
        let va: Vec<Vertex> = ga.batches().iter().flat_map(|x| x.vertices.clone()).collect();
        let vb: Vec<Vertex> = gb.batches().iter().flat_map(|x| x.vertices.clone()).collect();
        assert_eq!(va, vb);
    }

    #[test]
    fn test_global_scene_is_all_additive() {
        let state = busy_state();
        let glow = build_scene(&state, &Graticule::default(), &Projector::new(800, 400, None), 5);
        assert!(!glow.is_empty());
        assert!(glow.batches().iter().all(|b| b.blend == BlendMode::Additive));
    }

    #[test]
    fn test_regional_scene_ends_with_overlay() {
        let state = busy_state();
        let vp = Viewport::new(Coordinate::new(50.0, 10.0), 4.0);
        let glow = build_scene(&state, &Graticule::default(), &Projector::new(800, 600, Some(vp)), 5);
        let last = glow.batches().last().map(|b| b.blend);
        assert_eq!(last, Some(BlendMode::Alpha));
    }

    #[test]
    fn test_regional_view_draws_less() {
        let state = busy_state();
        let global = build_scene(&state, &Graticule::default(), &Projector::new(800, 600, None), 5);
        let vp = Viewport::new(Coordinate::new(-45.0, -120.0), 8.0);
        let regional = build_scene(&state, &Graticule::default(), &Projector::new(800, 600, Some(vp)), 5);
        assert!(regional.vertex_count() < global.vertex_count());
    }
}
