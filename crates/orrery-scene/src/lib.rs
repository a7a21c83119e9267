//! Scene-side core of the orrery: the transform arena, the hierarchy builder,
//! orbit path geometry, and the boundary to whatever renderer draws it.

pub mod camera;
pub mod graph;
pub mod hierarchy;
pub mod path;
pub mod render;
pub mod texture;

pub use camera::Camera;
pub use graph::{NodeId, SceneGraph, Transform, TransformNode};
pub use hierarchy::{
    Belt, BuildError, BuildSettings, ConfigError, OrbitalEntity, PlacedPath, Selectables,
    SolarSystem, StarEntity,
};
pub use path::OrbitPath;
pub use render::{
    Material, PrimitiveHandle, RecordingRenderer, RenderCall, RenderError, Renderer, Shading,
    Shape,
};
pub use texture::{TextureSet, TextureStatus};
