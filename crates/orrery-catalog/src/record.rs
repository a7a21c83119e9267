//! Normalized body records consumed by the hierarchy builder.

/// A body with derived, scene-ready quantities.
///
/// Satellites use the same shape; their `distance` is measured from the host
/// rather than from the star.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyRecord {
    /// Unique name.
    pub name: String,
    /// Texture key into [`Catalog::textures`](crate::Catalog::textures).
    pub texture: String,
    /// Diameter divided by the reference body's diameter.
    pub size_ratio: f32,
    /// Orbital radius in scene units.
    pub distance: f32,
    /// Orbital plane inclination in degrees.
    pub inclination_deg: f32,
    /// Axial tilt in degrees.
    pub axial_tilt_deg: f32,
    /// Radians per reference frame around the host.
    pub orbital_angular_rate: f32,
    /// Radians per reference frame around the spin axis. Negative for retrograde.
    pub self_rotation_rate: f32,
    /// Optional ring.
    pub ring: Option<RingRecord>,
    /// Satellites in document order.
    pub satellites: Vec<SatelliteRecord>,
}

/// Satellites share the body shape.
pub type SatelliteRecord = BodyRecord;

/// A ring around a body, radii in scene units.
#[derive(Clone, Debug, PartialEq)]
pub struct RingRecord {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub texture: String,
}

/// The central star.
#[derive(Clone, Debug, PartialEq)]
pub struct StarRecord {
    pub name: String,
    pub texture: String,
}

/// A flat belt centered on the star.
#[derive(Clone, Debug, PartialEq)]
pub struct BeltRecord {
    pub name: String,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub texture: String,
    /// Radians per reference frame about the belt normal.
    pub spin_rate: f32,
}

impl BodyRecord {
    /// Depth-first iterator over this body and all nested satellites.
    pub fn iter_tree(&self) -> impl Iterator<Item = &BodyRecord> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.satellites.iter().rev());
            Some(next)
        })
    }
}
