//! A renderer with no output surface, used to drive the orrery without a GPU.

use std::path::Path;

use orrery_scene::{
    Camera, Material, PrimitiveHandle, RecordingRenderer, RenderError, Renderer, Shape, Transform,
    TextureStatus,
};
use tracing::{debug, trace};

/// Textures resolve on the second poll, mimicking an asynchronous loader.
const TEXTURE_LATENCY: u32 = 1;

/// Tracks the mirrored scene without drawing it.
///
/// The call log is cleared after every draw so long runs stay bounded.
#[derive(Debug)]
pub struct HeadlessRenderer {
    inner: RecordingRenderer,
    missing_textures: usize,
}

impl HeadlessRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let mut inner = RecordingRenderer::new().with_texture_latency(TEXTURE_LATENCY);
        inner.resize(width, height)?;
        Ok(Self {
            inner,
            missing_textures: 0,
        })
    }

    pub fn draw_count(&self) -> u64 {
        self.inner.draw_count()
    }

    pub fn primitive_count(&self) -> usize {
        self.inner.primitive_count()
    }

    /// Texture requests whose image file was not found on disk.
    pub fn missing_textures(&self) -> usize {
        self.missing_textures
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.inner.size()
    }
}

impl Renderer for HeadlessRenderer {
    fn create_primitive(
        &mut self,
        shape: Shape,
        material: Material,
    ) -> Result<PrimitiveHandle, RenderError> {
        self.inner.create_primitive(shape, material)
    }

    fn attach_child(
        &mut self,
        parent: PrimitiveHandle,
        child: PrimitiveHandle,
    ) -> Result<(), RenderError> {
        self.inner.attach_child(parent, child)
    }

    fn set_local_transform(
        &mut self,
        handle: PrimitiveHandle,
        transform: &Transform,
    ) -> Result<(), RenderError> {
        self.inner.set_local_transform(handle, transform)
    }

    fn set_visibility(&mut self, handle: PrimitiveHandle, visible: bool) -> Result<(), RenderError> {
        self.inner.set_visibility(handle, visible)
    }

    fn set_ambient_intensity(&mut self, intensity: f32) -> Result<(), RenderError> {
        debug!("Ambient intensity {intensity}");
        self.inner.set_ambient_intensity(intensity)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.inner.resize(width, height)
    }

    /// Images are never decoded; a missing file is only noted.
    fn load_texture(&mut self, key: &str, path: &Path) -> Result<(), RenderError> {
        if !path.is_file() {
            debug!("Texture '{key}' has no image at {}", path.display());
            self.missing_textures += 1;
        }
        self.inner.load_texture(key, path)
    }

    fn poll_texture(&mut self, key: &str) -> TextureStatus {
        self.inner.poll_texture(key)
    }

    fn draw(&mut self, scene: PrimitiveHandle, camera: &Camera) -> Result<(), RenderError> {
        self.inner.draw(scene, camera)?;
        trace!("Frame {} drawn from {}", self.inner.draw_count(), camera.position);
        self.inner.clear_calls();
        Ok(())
    }
}
