//! Builds the star system's transform tree from a catalog.
//!
//! Each orbiting body becomes a chain of three nodes:
//!
//! ```text
//! parent ── pivot (inclination, spins to orbit)
//!             └── carrier (offset by orbital distance)
//!                   ├── body (axial tilt, spins on its axis)
//!                   ├── ring (tilt - 90 deg, optional)
//!                   ├── satellite pivots ...
//!                   └── satellite orbit paths ...
//! ```
//!
//! Satellites hang off the host's carrier, so the host's orbit carries them
//! without the host's own spin leaking into their motion.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use orrery_catalog::{BeltRecord, BodyRecord, Catalog};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::graph::{NodeId, SceneGraph};
use crate::path::{DEFAULT_SEGMENTS, OrbitPath};
use crate::render::{Material, PrimitiveHandle, RenderError, Renderer, Shape};
use crate::texture::TextureSet;

/// Name of the root node every top-level pivot hangs from.
pub const SYSTEM_ROOT: &str = "system";

/// Construction constants.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildSettings {
    /// Rendered radius of a body with size ratio 1.
    pub size_unit: f32,
    pub star_radius: f32,
    /// Star self-rotation in radians per reference frame.
    pub star_spin_rate: f32,
    /// Host radius multiplier giving the minimum satellite offset.
    pub proximity_factor: f32,
    pub orbit_segments: u32,
    pub sphere_segments: u32,
    pub ring_segments: u32,
    pub star_light_intensity: f32,
    pub star_light_range: f32,
    pub orbit_color: u32,
    pub orbit_line_width: f32,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            size_unit: 10.0,
            star_radius: 15.0,
            star_spin_rate: 0.004,
            proximity_factor: 2.5,
            orbit_segments: DEFAULT_SEGMENTS,
            sphere_segments: 50,
            ring_segments: 32,
            star_light_intensity: 4.0,
            star_light_range: 800.0,
            orbit_color: 0xffffff,
            orbit_line_width: 3.0,
        }
    }
}

/// A texture the scene needs did not resolve.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{owner} texture '{key}' is not in the resolved texture set")]
    UnresolvedTexture { owner: String, key: String },

    #[error("{body} ring texture '{key}' is not in the resolved texture set")]
    UnresolvedRingTexture { body: String, key: String },
}

/// Why a build failed.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The star: an unrotated system root plus a spinning body and its light.
#[derive(Clone, Debug)]
pub struct StarEntity {
    pub name: String,
    /// System origin; parent of every top-level pivot, never rotated.
    pub root: NodeId,
    pub body: NodeId,
    pub light: NodeId,
    pub spin_rate: f32,
}

/// A body or satellite bound to its node chain.
#[derive(Clone, Debug)]
pub struct OrbitalEntity {
    pub name: String,
    /// Rendered radius at scale 1.
    pub radius: f32,
    /// Carrier offset from the pivot.
    pub distance: f32,
    pub inclination_deg: f32,
    /// Radians per reference frame applied to the pivot.
    pub orbital_rate: f32,
    /// Radians per reference frame applied to the body.
    pub spin_rate: f32,
    pub pivot: NodeId,
    pub carrier: NodeId,
    pub body: NodeId,
    pub ring: Option<NodeId>,
    /// Index into [`SolarSystem::paths`].
    pub path: usize,
    pub satellites: Vec<OrbitalEntity>,
}

impl OrbitalEntity {
    /// Depth-first iterator over this entity and its satellites.
    pub fn iter_tree(&self) -> impl Iterator<Item = &OrbitalEntity> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.satellites.iter().rev());
            Some(next)
        })
    }
}

/// An orbit path placed in the tree.
#[derive(Clone, Debug)]
pub struct PlacedPath {
    /// Entity the path belongs to.
    pub owner: String,
    pub node: NodeId,
    pub path: OrbitPath,
}

/// A flat belt spinning about its normal.
#[derive(Clone, Debug)]
pub struct Belt {
    pub name: String,
    pub node: NodeId,
    pub spin_rate: f32,
}

/// Primitive handles that resolve to a selectable body.
///
/// Filled once during the build; nothing registers afterwards.
#[derive(Clone, Debug, Default)]
pub struct Selectables {
    by_handle: FxHashMap<PrimitiveHandle, String>,
    registrations: usize,
}

impl Selectables {
    fn register(&mut self, handle: PrimitiveHandle, name: &str) {
        self.by_handle.insert(handle, name.to_string());
        self.registrations += 1;
    }

    /// Body name for a picked primitive.
    pub fn resolve(&self, handle: PrimitiveHandle) -> Option<&str> {
        self.by_handle.get(&handle).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    /// Total registrations made, including any that replaced an earlier one.
    pub fn registrations(&self) -> usize {
        self.registrations
    }
}

/// The built star system.
#[derive(Clone, Debug)]
pub struct SolarSystem {
    pub graph: SceneGraph,
    pub star: StarEntity,
    /// Top-level bodies in catalog order.
    pub entities: Vec<OrbitalEntity>,
    pub paths: Vec<PlacedPath>,
    pub belts: Vec<Belt>,
    scene_handle: PrimitiveHandle,
    selectables: Selectables,
    /// Name -> index chain through `entities` and nested `satellites`.
    index: FxHashMap<String, Vec<usize>>,
}

impl SolarSystem {
    /// Build the tree, mirror it on the renderer, and push initial transforms.
    ///
    /// Every texture the catalog references must already be resolved in
    /// `textures`.
    pub fn build<R: Renderer + ?Sized>(
        catalog: &Catalog,
        textures: &TextureSet,
        settings: &BuildSettings,
        renderer: &mut R,
    ) -> Result<Self, BuildError> {
        let mut graph = SceneGraph::new(SYSTEM_ROOT);
        let scene_handle = renderer.create_primitive(Shape::Group, Material::none())?;
        graph.set_handle(graph.root(), scene_handle);

        let mut builder = Builder {
            renderer,
            textures,
            settings,
            graph,
            paths: Vec::new(),
            selectables: Selectables::default(),
            index: FxHashMap::default(),
        };

        let star = builder.star(catalog)?;
        let root = star.root;

        let mut entities = Vec::with_capacity(catalog.bodies.len());
        for (i, record) in catalog.bodies.iter().enumerate() {
            entities.push(builder.orbiter(record, root, record.distance, vec![i])?);
        }

        let belts = catalog
            .belts
            .iter()
            .map(|belt| builder.belt(belt, root))
            .collect::<Result<Vec<_>, _>>()?;

        let Builder {
            renderer,
            mut graph,
            paths,
            selectables,
            index,
            ..
        } = builder;
        let pushed = graph.sync(renderer)?;

        log::info!(
            "Built {} nodes: {} orbiting entities, {} paths, {} belts ({} transforms pushed)",
            graph.len(),
            index.len(),
            paths.len(),
            belts.len(),
            pushed
        );

        Ok(Self {
            graph,
            star,
            entities,
            paths,
            belts,
            scene_handle,
            selectables,
            index,
        })
    }

    /// Primitive of the root node, passed to [`Renderer::draw`].
    pub fn scene_handle(&self) -> PrimitiveHandle {
        self.scene_handle
    }

    pub fn selectables(&self) -> &Selectables {
        &self.selectables
    }

    /// Look up a body or satellite by name.
    pub fn entity(&self, name: &str) -> Option<&OrbitalEntity> {
        let address = self.index.get(name)?;
        let (first, rest) = address.split_first()?;
        let mut entity = self.entities.get(*first)?;
        for &i in rest {
            entity = entity.satellites.get(i)?;
        }
        Some(entity)
    }

    /// Every body and satellite, depth-first in catalog order.
    pub fn iter_entities(&self) -> impl Iterator<Item = &OrbitalEntity> {
        self.entities.iter().flat_map(OrbitalEntity::iter_tree)
    }

    /// Current world position of a body's center.
    pub fn body_world_position(&self, name: &str) -> Option<Vec3> {
        self.entity(name).map(|e| self.graph.world_position(e.body))
    }

    /// Show or hide every orbit path. Returns how many changed.
    pub fn set_paths_visible<R: Renderer + ?Sized>(
        &mut self,
        visible: bool,
        renderer: &mut R,
    ) -> Result<usize, RenderError> {
        let mut changed = 0;
        for placed in &self.paths {
            if self.graph.set_visible(placed.node, visible) {
                if let Some(handle) = self.graph.node(placed.node).handle() {
                    renderer.set_visibility(handle, visible)?;
                }
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Scale every body payload uniformly.
    ///
    /// Rings are siblings of the body under the carrier, so their geometry
    /// keeps its catalog size. Pivot and carrier nodes are untouched, so
    /// orbital radii never change either. Satellite offsets are fixed at build
    /// time from the unscaled host radius, so a large enough scale can draw a
    /// host over its inner moons. Returns how many nodes changed.
    pub fn set_body_scale(&mut self, scale: f32) -> usize {
        let scale = Vec3::splat(scale);
        let targets: Vec<NodeId> = self.iter_entities().map(|e| e.body).collect();
        targets
            .into_iter()
            .filter(|&node| self.graph.set_scale(node, scale))
            .count()
    }
}

struct Builder<'a, R: Renderer + ?Sized> {
    renderer: &'a mut R,
    textures: &'a TextureSet,
    settings: &'a BuildSettings,
    graph: SceneGraph,
    paths: Vec<PlacedPath>,
    selectables: Selectables,
    index: FxHashMap<String, Vec<usize>>,
}

impl<R: Renderer + ?Sized> Builder<'_, R> {
    /// Add a node under `parent` and mirror it as a renderer primitive.
    fn spawn(
        &mut self,
        parent: NodeId,
        name: &str,
        shape: Shape,
        material: Material,
    ) -> Result<NodeId, RenderError> {
        let node = self.graph.add_child(parent, name);
        let handle = self.renderer.create_primitive(shape, material)?;
        self.graph.set_handle(node, handle);
        if let Some(parent_handle) = self.graph.node(parent).handle() {
            self.renderer.attach_child(parent_handle, handle)?;
        }
        Ok(node)
    }

    fn require_texture(&self, owner: &str, key: &str) -> Result<(), ConfigError> {
        if self.textures.is_resolved(key) {
            Ok(())
        } else {
            Err(ConfigError::UnresolvedTexture {
                owner: owner.to_string(),
                key: key.to_string(),
            })
        }
    }

    fn star(&mut self, catalog: &Catalog) -> Result<StarEntity, BuildError> {
        let star = &catalog.star;
        self.require_texture(&star.name, &star.texture)?;
        let root = self.graph.root();
        let body = self.spawn(
            root,
            &star.name,
            Shape::Sphere {
                radius: self.settings.star_radius,
                segments: self.settings.sphere_segments,
            },
            Material::unlit(&star.texture),
        )?;
        let light = self.spawn(
            root,
            &format!("{} light", star.name),
            Shape::PointLight {
                intensity: self.settings.star_light_intensity,
                range: self.settings.star_light_range,
                decay: 1.0,
            },
            Material::none(),
        )?;
        Ok(StarEntity {
            name: star.name.clone(),
            root,
            body,
            light,
            spin_rate: self.settings.star_spin_rate,
        })
    }

    fn orbiter(
        &mut self,
        record: &BodyRecord,
        parent: NodeId,
        distance: f32,
        address: Vec<usize>,
    ) -> Result<OrbitalEntity, BuildError> {
        let name = record.name.as_str();
        self.require_texture(name, &record.texture)?;
        if let Some(ring) = &record.ring
            && !self.textures.is_resolved(&ring.texture)
        {
            return Err(ConfigError::UnresolvedRingTexture {
                body: name.to_string(),
                key: ring.texture.clone(),
            }
            .into());
        }

        let radius = record.size_ratio * self.settings.size_unit;
        let tilt = record.axial_tilt_deg.to_radians();

        let pivot = self.spawn(parent, &format!("{name} pivot"), Shape::Group, Material::none())?;
        self.graph.set_rotation(
            pivot,
            Quat::from_rotation_x(-record.inclination_deg.to_radians()),
        );

        let carrier = self.spawn(pivot, &format!("{name} carrier"), Shape::Group, Material::none())?;
        self.graph
            .set_translation(carrier, Vec3::new(distance, 0.0, 0.0));

        let body = self.spawn(
            carrier,
            name,
            Shape::Sphere {
                radius,
                segments: self.settings.sphere_segments,
            },
            Material::lit(&record.texture),
        )?;
        self.graph.set_rotation(body, Quat::from_rotation_x(tilt));
        if let Some(handle) = self.graph.node(body).handle() {
            self.selectables.register(handle, name);
        }

        let ring = match &record.ring {
            Some(ring) => {
                let node = self.spawn(
                    carrier,
                    &format!("{name} ring"),
                    Shape::Ring {
                        inner_radius: ring.inner_radius,
                        outer_radius: ring.outer_radius,
                        segments: self.settings.ring_segments,
                    },
                    Material::disc(&ring.texture, false),
                )?;
                self.graph
                    .set_rotation(node, Quat::from_rotation_x(tilt - FRAC_PI_2));
                Some(node)
            }
            None => None,
        };

        let path = OrbitPath::generate(distance, record.inclination_deg, self.settings.orbit_segments);
        let path_node = self.spawn(
            parent,
            &format!("{name} orbit"),
            Shape::LineLoop {
                points: path.points().to_vec(),
            },
            Material::line(self.settings.orbit_color, self.settings.orbit_line_width),
        )?;
        let path_index = self.paths.len();
        self.paths.push(PlacedPath {
            owner: name.to_string(),
            node: path_node,
            path,
        });

        self.index.insert(name.to_string(), address.clone());

        let mut satellites = Vec::with_capacity(record.satellites.len());
        for (i, satellite) in record.satellites.iter().enumerate() {
            let offset = radius * self.settings.proximity_factor + satellite.distance;
            let mut sat_address = address.clone();
            sat_address.push(i);
            satellites.push(self.orbiter(satellite, carrier, offset, sat_address)?);
        }

        Ok(OrbitalEntity {
            name: name.to_string(),
            radius,
            distance,
            inclination_deg: record.inclination_deg,
            orbital_rate: record.orbital_angular_rate,
            spin_rate: record.self_rotation_rate,
            pivot,
            carrier,
            body,
            ring,
            path: path_index,
            satellites,
        })
    }

    fn belt(&mut self, belt: &BeltRecord, root: NodeId) -> Result<Belt, BuildError> {
        self.require_texture(&belt.name, &belt.texture)?;
        let node = self.spawn(
            root,
            &belt.name,
            Shape::Ring {
                inner_radius: belt.inner_radius,
                outer_radius: belt.outer_radius,
                segments: self.settings.ring_segments,
            },
            Material::disc(&belt.texture, true),
        )?;
        self.graph.set_rotation(node, Quat::from_rotation_x(FRAC_PI_2));
        Ok(Belt {
            name: belt.name.clone(),
            node,
            spin_rate: belt.spin_rate,
        })
    }
}
