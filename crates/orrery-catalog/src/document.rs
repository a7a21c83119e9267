//! Serde shape of the catalog JSON document.
//!
//! Field names follow the published planetary fact-sheet columns. Unknown
//! fields are rejected so typos surface as load errors instead of silent
//! defaults.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Root of the catalog document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogDocument {
    /// Name of the body whose diameter normalizes size ratios.
    pub reference_body: String,
    /// Texture key to image path.
    pub textures: BTreeMap<String, PathBuf>,
    /// The central star.
    pub star: StarDocument,
    /// Bodies orbiting the star, in display order.
    pub bodies: Vec<BodyDocument>,
    /// Flat debris belts around the star.
    #[serde(default)]
    pub belts: Vec<BeltDocument>,
}

/// The central star.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StarDocument {
    pub name: String,
    pub texture: String,
}

/// A body orbiting the star.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodyDocument {
    pub name: String,
    pub texture: String,
    pub diameter_km: f64,
    /// Orbital radius in scene units (millions of km in the stock data).
    pub distance_from_sun_106_km: f64,
    pub orbital_velocity_km_s: f64,
    /// Negative for retrograde rotation.
    pub rotation_period_hours: f64,
    pub orbital_inclination_degrees: f64,
    pub obliquity_to_orbit_degrees: f64,
    #[serde(default)]
    pub ring: Option<RingDocument>,
    #[serde(default)]
    pub satellites: Vec<SatelliteDocument>,
}

/// A body orbiting another body. Its distance is measured from the host.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SatelliteDocument {
    pub name: String,
    pub texture: String,
    pub diameter_km: f64,
    /// Extra clearance beyond the host's proximity radius.
    pub distance_from_planet: f64,
    pub orbital_velocity_km_s: f64,
    pub rotation_period_hours: f64,
    pub orbital_inclination_degrees: f64,
    pub obliquity_to_orbit_degrees: f64,
    #[serde(default)]
    pub ring: Option<RingDocument>,
    #[serde(default)]
    pub satellites: Vec<SatelliteDocument>,
}

/// Ring descriptor, radii in scene units.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RingDocument {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub texture: String,
}

/// A flat belt centered on the star.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeltDocument {
    pub name: String,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub texture: String,
    /// Radians per reference frame about the belt normal.
    pub spin_rate: f64,
}

/// Fields shared by planets and satellites, so derivation is written once.
pub(crate) struct OrbiterFields<'a> {
    pub name: &'a str,
    pub texture: &'a str,
    pub diameter_km: f64,
    pub distance: f64,
    pub orbital_velocity_km_s: f64,
    pub rotation_period_hours: f64,
    pub orbital_inclination_degrees: f64,
    pub obliquity_to_orbit_degrees: f64,
    pub ring: Option<&'a RingDocument>,
    pub satellites: &'a [SatelliteDocument],
}

impl BodyDocument {
    pub(crate) fn fields(&self) -> OrbiterFields<'_> {
        OrbiterFields {
            name: &self.name,
            texture: &self.texture,
            diameter_km: self.diameter_km,
            distance: self.distance_from_sun_106_km,
            orbital_velocity_km_s: self.orbital_velocity_km_s,
            rotation_period_hours: self.rotation_period_hours,
            orbital_inclination_degrees: self.orbital_inclination_degrees,
            obliquity_to_orbit_degrees: self.obliquity_to_orbit_degrees,
            ring: self.ring.as_ref(),
            satellites: &self.satellites,
        }
    }
}

impl SatelliteDocument {
    pub(crate) fn fields(&self) -> OrbiterFields<'_> {
        OrbiterFields {
            name: &self.name,
            texture: &self.texture,
            diameter_km: self.diameter_km,
            distance: self.distance_from_planet,
            orbital_velocity_km_s: self.orbital_velocity_km_s,
            rotation_period_hours: self.rotation_period_hours,
            orbital_inclination_degrees: self.orbital_inclination_degrees,
            obliquity_to_orbit_degrees: self.obliquity_to_orbit_degrees,
            ring: self.ring.as_ref(),
            satellites: &self.satellites,
        }
    }
}
