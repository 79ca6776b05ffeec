//! One rendered map: a projection plus the GPU resources sized for it

use super::blit::Blitter;
use super::error::RenderError;
use super::post::{PostBindings, PostProcessor};
use super::targets::ViewTargets;
use crate::geo::{Projector, Viewport};

/// Handle returned by `MapRenderer::add_view`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub usize);

/// A global or regional map drawn into its own targets
pub struct MapView {
    pub name: String,
    projector: Projector,
    targets: ViewTargets,
    blit: wgpu::BindGroup,
    post: Option<PostBindings>,
}

impl MapView {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        projector: Projector,
        blitter: &Blitter,
        post: Option<&PostProcessor>,
    ) -> Result<Self, RenderError> {
        let targets = ViewTargets::new(
            device,
            queue,
            projector.width,
            projector.height,
            post.is_some(),
        )?;
        let blit = blitter.bind(device, &targets.scene.view);
        let post = post.and_then(|p| p.bind_view(device, queue, &targets));
        log::info!(
            "View '{}' {}x{} ({})",
            name,
            projector.width,
            projector.height,
            match projector.viewport {
                Some(vp) => format!(
                    "regional {:.1},{:.1} x{}",
                    vp.center.lat(),
                    vp.center.lon(),
                    vp.zoom()
                ),
                None => "global".to_string(),
            }
        );
        Ok(Self {
            name: name.to_string(),
            projector,
            targets,
            blit,
            post,
        })
    }

    /// Rebuild every target at a new size
    ///
    /// The old targets and bind groups are dropped together, so nothing can
    /// keep sampling the previous size.
    pub(crate) fn resize(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        blitter: &Blitter,
        post: Option<&PostProcessor>,
    ) -> Result<(), RenderError> {
        let projector = Projector::new(width, height, self.projector.viewport);
        let rebuilt = Self::new(device, queue, &self.name, projector, blitter, post)?;
        *self = rebuilt;
        Ok(())
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.projector.viewport.as_ref()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.targets.width, self.targets.height)
    }

    pub fn texture_count(&self) -> usize {
        self.targets.texture_count()
    }

    pub(crate) fn targets(&self) -> &ViewTargets {
        &self.targets
    }

    pub(crate) fn blit_group(&self) -> &wgpu::BindGroup {
        &self.blit
    }

    pub(crate) fn post_bindings(&self) -> Option<&PostBindings> {
        self.post.as_ref()
    }
}
