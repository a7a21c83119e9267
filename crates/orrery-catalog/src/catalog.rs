//! Catalog loading, unit derivation, and validation.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::document::{BeltDocument, CatalogDocument, OrbiterFields, RingDocument};
use crate::error::DataError;
use crate::record::{BeltRecord, BodyRecord, RingRecord, StarRecord};

/// Unit normalization constants applied while loading.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogUnits {
    /// Overrides the document's `reference_body` when set.
    pub reference_body: Option<String>,
    /// Orbital velocity (km/s) divided by this gives radians per reference frame.
    pub velocity_normalization: f64,
}

impl Default for CatalogUnits {
    fn default() -> Self {
        Self {
            reference_body: None,
            velocity_normalization: 10_000.0,
        }
    }
}

/// The body dataset in normalized, scene-ready form.
#[derive(Clone, Debug)]
pub struct Catalog {
    /// Name of the body sizes are relative to.
    pub reference_body: String,
    /// Texture key to image path, as declared in the document.
    pub textures: BTreeMap<String, PathBuf>,
    /// The central star.
    pub star: StarRecord,
    /// Top-level bodies in document order.
    pub bodies: Vec<BodyRecord>,
    /// Debris belts.
    pub belts: Vec<BeltRecord>,
}

impl Catalog {
    /// Read and normalize a catalog document from disk.
    pub fn load(path: &Path, units: &CatalogUnits) -> Result<Self, DataError> {
        let contents = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&contents, units)?;
        log::info!(
            "Loaded catalog {} ({} bodies, {} textures)",
            path.display(),
            catalog.bodies.len(),
            catalog.textures.len()
        );
        Ok(catalog)
    }

    /// Parse and normalize a catalog document held in memory.
    pub fn from_json(json: &str, units: &CatalogUnits) -> Result<Self, DataError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(document, units)
    }

    /// Normalize an already-parsed document.
    pub fn from_document(document: CatalogDocument, units: &CatalogUnits) -> Result<Self, DataError> {
        let reference_name = units
            .reference_body
            .clone()
            .unwrap_or_else(|| document.reference_body.clone());

        // Top level only: satellites never normalize sizes.
        let reference = document
            .bodies
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(&reference_name))
            .ok_or_else(|| DataError::MissingReferenceBody(reference_name.clone()))?;
        let reference_diameter = checked_diameter(&reference.name, reference.diameter_km)?;

        let deriver = Deriver {
            textures: &document.textures,
            reference_diameter,
            velocity_normalization: units.velocity_normalization,
        };

        check_texture(&document.textures, &document.star.name, &document.star.texture)?;
        let star = StarRecord {
            name: document.star.name.clone(),
            texture: document.star.texture.clone(),
        };

        let mut seen = HashSet::new();
        seen.insert(star.name.clone());

        let bodies = document
            .bodies
            .iter()
            .map(|body| deriver.orbiter(body.fields(), &mut seen))
            .collect::<Result<Vec<_>, _>>()?;

        let belts = document
            .belts
            .iter()
            .map(|belt| deriver.belt(belt, &mut seen))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            reference_body: reference.name.clone(),
            textures: document.textures,
            star,
            bodies,
            belts,
        })
    }

    /// Find a body or satellite by exact name.
    pub fn find(&self, name: &str) -> Option<&BodyRecord> {
        self.bodies
            .iter()
            .flat_map(BodyRecord::iter_tree)
            .find(|b| b.name == name)
    }

    /// Every body and satellite, depth-first in document order.
    pub fn iter_all(&self) -> impl Iterator<Item = &BodyRecord> {
        self.bodies.iter().flat_map(BodyRecord::iter_tree)
    }
}

struct Deriver<'a> {
    textures: &'a BTreeMap<String, PathBuf>,
    reference_diameter: f64,
    velocity_normalization: f64,
}

impl Deriver<'_> {
    fn orbiter(
        &self,
        fields: OrbiterFields<'_>,
        seen: &mut HashSet<String>,
    ) -> Result<BodyRecord, DataError> {
        let name = fields.name;
        if !seen.insert(name.to_string()) {
            return Err(DataError::DuplicateName(name.to_string()));
        }
        check_texture(self.textures, name, fields.texture)?;

        let diameter = checked_diameter(name, fields.diameter_km)?;
        let distance = finite(name, "distance", fields.distance)?;
        let velocity = finite(name, "orbital_velocity_km_s", fields.orbital_velocity_km_s)?;
        let period = finite(name, "rotation_period_hours", fields.rotation_period_hours)?;
        let inclination = finite(
            name,
            "orbital_inclination_degrees",
            fields.orbital_inclination_degrees,
        )?;
        let tilt = finite(
            name,
            "obliquity_to_orbit_degrees",
            fields.obliquity_to_orbit_degrees,
        )?;

        if period == 0.0 {
            return Err(DataError::ZeroRotationPeriod(name.to_string()));
        }

        let ring = fields
            .ring
            .map(|ring| self.ring(name, ring))
            .transpose()?;

        let satellites = fields
            .satellites
            .iter()
            .map(|sat| self.orbiter(sat.fields(), seen))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BodyRecord {
            name: name.to_string(),
            texture: fields.texture.to_string(),
            size_ratio: (diameter / self.reference_diameter) as f32,
            distance: distance as f32,
            inclination_deg: inclination as f32,
            axial_tilt_deg: tilt as f32,
            orbital_angular_rate: (velocity / self.velocity_normalization) as f32,
            // Sign carries retrograde rotation.
            self_rotation_rate: (1.0 / period) as f32,
            ring,
            satellites,
        })
    }

    fn ring(&self, owner: &str, ring: &RingDocument) -> Result<RingRecord, DataError> {
        check_texture(self.textures, owner, &ring.texture)?;
        let inner = finite(owner, "ring.inner_radius", ring.inner_radius)?;
        let outer = finite(owner, "ring.outer_radius", ring.outer_radius)?;
        if inner < 0.0 || inner >= outer {
            return Err(DataError::InvalidRing {
                name: owner.to_string(),
                inner,
                outer,
            });
        }
        Ok(RingRecord {
            inner_radius: inner as f32,
            outer_radius: outer as f32,
            texture: ring.texture.clone(),
        })
    }

    fn belt(&self, belt: &BeltDocument, seen: &mut HashSet<String>) -> Result<BeltRecord, DataError> {
        if !seen.insert(belt.name.clone()) {
            return Err(DataError::DuplicateName(belt.name.clone()));
        }
        check_texture(self.textures, &belt.name, &belt.texture)?;
        let inner = finite(&belt.name, "inner_radius", belt.inner_radius)?;
        let outer = finite(&belt.name, "outer_radius", belt.outer_radius)?;
        if inner < 0.0 || inner >= outer {
            return Err(DataError::InvalidRing {
                name: belt.name.clone(),
                inner,
                outer,
            });
        }
        Ok(BeltRecord {
            name: belt.name.clone(),
            inner_radius: inner as f32,
            outer_radius: outer as f32,
            texture: belt.texture.clone(),
            spin_rate: finite(&belt.name, "spin_rate", belt.spin_rate)? as f32,
        })
    }
}

fn check_texture(
    textures: &BTreeMap<String, PathBuf>,
    owner: &str,
    key: &str,
) -> Result<(), DataError> {
    if textures.contains_key(key) {
        Ok(())
    } else {
        Err(DataError::UnknownTexture {
            owner: owner.to_string(),
            key: key.to_string(),
        })
    }
}

fn checked_diameter(name: &str, value: f64) -> Result<f64, DataError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DataError::InvalidDiameter {
            name: name.to_string(),
            value,
        })
    }
}

fn finite(name: &str, field: &'static str, value: f64) -> Result<f64, DataError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DataError::NonFinite {
            name: name.to_string(),
            field,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "reference_body": "Earth",
        "textures": {
            "sun": "image/sun.jpg",
            "earth": "image/earth.png",
            "moon": "image/moon.jpg",
            "venus": "image/venus.jpg",
            "saturn": "image/saturn.png",
            "saturn_ring": "image/saturn_ring.png",
            "belt": "image/asteroid_belt.png"
        },
        "star": { "name": "Sun", "texture": "sun" },
        "bodies": [
            {
                "name": "Venus", "texture": "venus", "diameter_km": 12104,
                "distance_from_sun_106_km": 108.2, "orbital_velocity_km_s": 35.0,
                "rotation_period_hours": -5832.5, "orbital_inclination_degrees": 3.4,
                "obliquity_to_orbit_degrees": 177.4
            },
            {
                "name": "Earth", "texture": "earth", "diameter_km": 12756,
                "distance_from_sun_106_km": 149.6, "orbital_velocity_km_s": 29.8,
                "rotation_period_hours": 23.9, "orbital_inclination_degrees": 0.0,
                "obliquity_to_orbit_degrees": 23.4,
                "satellites": [
                    {
                        "name": "Moon", "texture": "moon", "diameter_km": 3475,
                        "distance_from_planet": 5.0, "orbital_velocity_km_s": 1.0,
                        "rotation_period_hours": 655.7, "orbital_inclination_degrees": 5.1,
                        "obliquity_to_orbit_degrees": 6.7
                    }
                ]
            },
            {
                "name": "Saturn", "texture": "saturn", "diameter_km": 120536,
                "distance_from_sun_106_km": 1432.0, "orbital_velocity_km_s": 9.7,
                "rotation_period_hours": 10.7, "orbital_inclination_degrees": 2.5,
                "obliquity_to_orbit_degrees": 26.7,
                "ring": { "inner_radius": 10, "outer_radius": 20, "texture": "saturn_ring" }
            }
        ],
        "belts": [
            { "name": "Asteroid Belt", "inner_radius": 400, "outer_radius": 450,
              "texture": "belt", "spin_rate": 0.001 }
        ]
    }"#;

    fn load(json: &str) -> Result<Catalog, DataError> {
        Catalog::from_json(json, &CatalogUnits::default())
    }

    #[test]
    fn test_load_preserves_document_order() {
        let catalog = load(SAMPLE).unwrap();
        let names: Vec<_> = catalog.bodies.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Venus", "Earth", "Saturn"]);
        assert_eq!(catalog.reference_body, "Earth");
        assert_eq!(catalog.star.name, "Sun");
        assert_eq!(catalog.belts.len(), 1);
    }

    #[test]
    fn test_unit_derivation() {
        let catalog = load(SAMPLE).unwrap();
        let earth = catalog.find("Earth").unwrap();
        assert_eq!(earth.size_ratio, 1.0);
        assert!((earth.orbital_angular_rate - 29.8 / 10_000.0).abs() < 1e-9);
        assert!((earth.self_rotation_rate - 1.0 / 23.9).abs() < 1e-7);
        assert_eq!(earth.distance, 149.6);

        let saturn = catalog.find("Saturn").unwrap();
        assert!((saturn.size_ratio - (120536.0 / 12756.0) as f32).abs() < 1e-5);
        let ring = saturn.ring.as_ref().unwrap();
        assert_eq!((ring.inner_radius, ring.outer_radius), (10.0, 20.0));
    }

    #[test]
    fn test_retrograde_rotation_keeps_sign() {
        let catalog = load(SAMPLE).unwrap();
        let venus = catalog.find("Venus").unwrap();
        assert!(venus.self_rotation_rate < 0.0);
        assert!((venus.self_rotation_rate + 1.0 / 5832.5).abs() < 1e-9);
    }

    #[test]
    fn test_satellite_distance_is_relative_to_host() {
        let catalog = load(SAMPLE).unwrap();
        let moon = catalog.find("Moon").unwrap();
        assert_eq!(moon.distance, 5.0);
        assert!((moon.size_ratio - (3475.0 / 12756.0) as f32).abs() < 1e-6);
        assert_eq!(catalog.find("Earth").unwrap().satellites.len(), 1);
        assert_eq!(catalog.iter_all().count(), 4);
    }

    #[test]
    fn test_missing_reference_body_fails() {
        let json = SAMPLE.replace(r#""reference_body": "Earth""#, r#""reference_body": "Vulcan""#);
        let err = load(&json).unwrap_err();
        assert!(matches!(err, DataError::MissingReferenceBody(name) if name == "Vulcan"));
    }

    #[test]
    fn test_reference_body_override_and_case() {
        let units = CatalogUnits {
            reference_body: Some("saturn".to_string()),
            ..CatalogUnits::default()
        };
        let catalog = Catalog::from_json(SAMPLE, &units).unwrap();
        assert_eq!(catalog.reference_body, "Saturn");
        assert_eq!(catalog.find("Saturn").unwrap().size_ratio, 1.0);
    }

    #[test]
    fn test_undefined_texture_key_fails() {
        let json = SAMPLE.replace(r#""texture": "saturn_ring""#, r#""texture": "rings""#);
        let err = load(&json).unwrap_err();
        assert!(
            matches!(err, DataError::UnknownTexture { ref owner, ref key } if owner == "Saturn" && key == "rings")
        );
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let json = SAMPLE.replace(r#""diameter_km": 12104"#, r#""diameter_km": 12104, "mass": 4.8"#);
        assert!(matches!(load(&json), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = SAMPLE.replace(r#""obliquity_to_orbit_degrees": 177.4"#, r#""extra_padding": 0"#);
        assert!(matches!(load(&json), Err(DataError::Parse(_))));
    }

    #[test]
    fn test_zero_rotation_period_fails() {
        let json = SAMPLE.replace("-5832.5", "0");
        assert!(matches!(load(&json), Err(DataError::ZeroRotationPeriod(name)) if name == "Venus"));
    }

    #[test]
    fn test_duplicate_name_fails() {
        let json = SAMPLE.replace(r#""name": "Moon""#, r#""name": "Venus""#);
        assert!(matches!(load(&json), Err(DataError::DuplicateName(name)) if name == "Venus"));
    }

    #[test]
    fn test_inverted_ring_fails() {
        let json = SAMPLE.replace(r#""inner_radius": 10, "outer_radius": 20"#, r#""inner_radius": 20, "outer_radius": 10"#);
        assert!(matches!(load(&json), Err(DataError::InvalidRing { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bodies.json");
        std::fs::write(&path, SAMPLE).unwrap();
        let catalog = Catalog::load(&path, &CatalogUnits::default()).unwrap();
        assert_eq!(catalog.bodies.len(), 3);

        let missing = Catalog::load(&dir.path().join("nope.json"), &CatalogUnits::default());
        assert!(matches!(missing, Err(DataError::Io { .. })));
    }
}
