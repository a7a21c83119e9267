//! The renderer boundary.
//!
//! The core creates opaque primitives, mirrors its transform tree onto them,
//! and asks for a draw once per frame. It never reads renderer state back.

use std::path::Path;

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::camera::Camera;
use crate::graph::Transform;
use crate::texture::TextureStatus;

/// Opaque handle to a renderer-owned primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveHandle(pub u64);

/// Geometry requested from the renderer.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Transform-only node with nothing to draw.
    Group,
    /// UV sphere.
    Sphere { radius: f32, segments: u32 },
    /// Flat annulus in the local XY plane.
    Ring {
        inner_radius: f32,
        outer_radius: f32,
        segments: u32,
    },
    /// Closed polyline.
    LineLoop { points: Vec<Vec3> },
    /// Omnidirectional light.
    PointLight {
        intensity: f32,
        range: f32,
        decay: f32,
    },
}

/// Shading model for a primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Ignores lights (the star, rings, belts).
    Unlit,
    /// Responds to the star light and ambient fill.
    Lit,
    /// Line color only.
    Line,
}

/// Material description handed to the renderer with each primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub shading: Shading,
    /// Texture key, resolved beforehand through [`TextureSet`](crate::TextureSet).
    pub texture: Option<String>,
    /// 0xRRGGBB.
    pub color: u32,
    pub line_width: f32,
    pub double_sided: bool,
    pub transparent: bool,
}

impl Material {
    /// No texture, no shading. Used for groups and lights.
    pub fn none() -> Self {
        Self {
            shading: Shading::Unlit,
            texture: None,
            color: 0xffffff,
            line_width: 1.0,
            double_sided: false,
            transparent: false,
        }
    }

    pub fn unlit(texture: &str) -> Self {
        Self {
            texture: Some(texture.to_string()),
            ..Self::none()
        }
    }

    pub fn lit(texture: &str) -> Self {
        Self {
            shading: Shading::Lit,
            ..Self::unlit(texture)
        }
    }

    /// Double-sided unlit texture for rings and belts.
    pub fn disc(texture: &str, transparent: bool) -> Self {
        Self {
            double_sided: true,
            transparent,
            ..Self::unlit(texture)
        }
    }

    pub fn line(color: u32, width: f32) -> Self {
        Self {
            shading: Shading::Line,
            color,
            line_width: width,
            ..Self::none()
        }
    }
}

/// Failures at the renderer boundary. Never retried.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown primitive handle {0:?}")]
    UnknownHandle(PrimitiveHandle),

    #[error("texture '{key}' failed: {reason}")]
    Texture { key: String, reason: String },

    #[error("renderer backend failure: {0}")]
    Backend(String),
}

/// Calls the core makes into the external renderer.
pub trait Renderer {
    /// Create a primitive. New primitives are unparented and visible.
    fn create_primitive(
        &mut self,
        shape: Shape,
        material: Material,
    ) -> Result<PrimitiveHandle, RenderError>;

    /// Parent `child` under `parent` on the renderer side.
    fn attach_child(
        &mut self,
        parent: PrimitiveHandle,
        child: PrimitiveHandle,
    ) -> Result<(), RenderError>;

    /// Replace the local transform of a primitive.
    fn set_local_transform(
        &mut self,
        handle: PrimitiveHandle,
        transform: &Transform,
    ) -> Result<(), RenderError>;

    fn set_visibility(&mut self, handle: PrimitiveHandle, visible: bool)
    -> Result<(), RenderError>;

    /// Ambient fill light level.
    fn set_ambient_intensity(&mut self, intensity: f32) -> Result<(), RenderError>;

    /// Output dimensions in pixels.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError>;

    /// Start loading an image. Resolution is reported by [`Renderer::poll_texture`].
    fn load_texture(&mut self, key: &str, path: &Path) -> Result<(), RenderError>;

    fn poll_texture(&mut self, key: &str) -> TextureStatus;

    /// Draw the tree rooted at `scene` from `camera`.
    fn draw(&mut self, scene: PrimitiveHandle, camera: &Camera) -> Result<(), RenderError>;
}

/// One call received by a [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCall {
    Create {
        handle: PrimitiveHandle,
        shape: Shape,
        material: Material,
    },
    Attach {
        parent: PrimitiveHandle,
        child: PrimitiveHandle,
    },
    SetTransform {
        handle: PrimitiveHandle,
        transform: Transform,
    },
    SetVisibility {
        handle: PrimitiveHandle,
        visible: bool,
    },
    SetAmbient(f32),
    Resize {
        width: u32,
        height: u32,
    },
    LoadTexture {
        key: String,
    },
    Draw {
        scene: PrimitiveHandle,
        camera_position: Vec3,
    },
}

/// In-memory renderer that records every boundary call.
///
/// Textures resolve after `texture_latency` polls, or fail when their key was
/// passed to [`RecordingRenderer::fail_texture`].
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
    next_handle: u64,
    live: FxHashSet<PrimitiveHandle>,
    transforms: FxHashMap<PrimitiveHandle, Transform>,
    visibility: FxHashMap<PrimitiveHandle, bool>,
    parents: FxHashMap<PrimitiveHandle, PrimitiveHandle>,
    textures: FxHashMap<String, u32>,
    failing_textures: FxHashSet<String>,
    texture_latency: u32,
    ambient: Option<f32>,
    size: Option<(u32, u32)>,
    draws: u64,
    fail_draws: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Textures report `Pending` for this many polls before resolving.
    pub fn with_texture_latency(mut self, polls: u32) -> Self {
        self.texture_latency = polls;
        self
    }

    /// Make the texture with this key fail to load.
    pub fn fail_texture(&mut self, key: &str) {
        self.failing_textures.insert(key.to_string());
    }

    /// Make every subsequent draw return [`RenderError::Backend`].
    pub fn fail_draws(&mut self) {
        self.fail_draws = true;
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub fn primitive_count(&self) -> usize {
        self.live.len()
    }

    pub fn transform_of(&self, handle: PrimitiveHandle) -> Option<&Transform> {
        self.transforms.get(&handle)
    }

    /// Last visibility set for the handle; primitives start visible.
    pub fn is_visible(&self, handle: PrimitiveHandle) -> bool {
        self.visibility.get(&handle).copied().unwrap_or(true)
    }

    pub fn parent_of(&self, handle: PrimitiveHandle) -> Option<PrimitiveHandle> {
        self.parents.get(&handle).copied()
    }

    pub fn ambient(&self) -> Option<f32> {
        self.ambient
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    fn check(&self, handle: PrimitiveHandle) -> Result<(), RenderError> {
        if self.live.contains(&handle) {
            Ok(())
        } else {
            Err(RenderError::UnknownHandle(handle))
        }
    }
}

impl Renderer for RecordingRenderer {
    fn create_primitive(
        &mut self,
        shape: Shape,
        material: Material,
    ) -> Result<PrimitiveHandle, RenderError> {
        let handle = PrimitiveHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle);
        self.calls.push(RenderCall::Create {
            handle,
            shape,
            material,
        });
        Ok(handle)
    }

    fn attach_child(
        &mut self,
        parent: PrimitiveHandle,
        child: PrimitiveHandle,
    ) -> Result<(), RenderError> {
        self.check(parent)?;
        self.check(child)?;
        self.parents.insert(child, parent);
        self.calls.push(RenderCall::Attach { parent, child });
        Ok(())
    }

    fn set_local_transform(
        &mut self,
        handle: PrimitiveHandle,
        transform: &Transform,
    ) -> Result<(), RenderError> {
        self.check(handle)?;
        self.transforms.insert(handle, *transform);
        self.calls.push(RenderCall::SetTransform {
            handle,
            transform: *transform,
        });
        Ok(())
    }

    fn set_visibility(
        &mut self,
        handle: PrimitiveHandle,
        visible: bool,
    ) -> Result<(), RenderError> {
        self.check(handle)?;
        self.visibility.insert(handle, visible);
        self.calls.push(RenderCall::SetVisibility { handle, visible });
        Ok(())
    }

    fn set_ambient_intensity(&mut self, intensity: f32) -> Result<(), RenderError> {
        self.ambient = Some(intensity);
        self.calls.push(RenderCall::SetAmbient(intensity));
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.size = Some((width, height));
        self.calls.push(RenderCall::Resize { width, height });
        Ok(())
    }

    fn load_texture(&mut self, key: &str, _path: &Path) -> Result<(), RenderError> {
        self.textures.insert(key.to_string(), self.texture_latency);
        self.calls.push(RenderCall::LoadTexture {
            key: key.to_string(),
        });
        Ok(())
    }

    fn poll_texture(&mut self, key: &str) -> TextureStatus {
        let Some(remaining) = self.textures.get_mut(key) else {
            return TextureStatus::Failed(format!("texture '{key}' was never requested"));
        };
        if *remaining > 0 {
            *remaining -= 1;
            return TextureStatus::Pending;
        }
        if self.failing_textures.contains(key) {
            TextureStatus::Failed("decode error".to_string())
        } else {
            TextureStatus::Ready
        }
    }

    fn draw(&mut self, scene: PrimitiveHandle, camera: &Camera) -> Result<(), RenderError> {
        if self.fail_draws {
            return Err(RenderError::Backend("device lost".to_string()));
        }
        self.check(scene)?;
        self.draws += 1;
        self.calls.push(RenderCall::Draw {
            scene,
            camera_position: camera.position,
        });
        Ok(())
    }
}
