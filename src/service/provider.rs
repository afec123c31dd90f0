//! Element Provider Module
//!
//! Lookup of orbital elements and rotation parameters by object identifier,
//! plus the primary body each orbit is defined relative to.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::Hasher;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, Result};
use crate::orbit::{OrbitalElements, RotationParameters};

/// Mass of the Sun (kg)
const SUN_MASS_KG: f64 = 1.989e30;

// == Body Elements ==
/// Everything needed to propagate one body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyElements {
    pub elements: OrbitalElements,
    pub rotation: RotationParameters,
}

impl BodyElements {
    /// Digest of every element and rotation parameter, bit for bit.
    pub fn fingerprint(&self) -> u64 {
        let e = &self.elements;
        let r = &self.rotation;
        let mut hasher = DefaultHasher::new();
        for value in [
            e.primary_mass_kg,
            e.object_mass_kg,
            e.periapsis_au,
            e.apoapsis_au,
            e.inclination_rad,
            e.node_rad,
            e.arg_periapsis_rad,
            e.mean_anomaly_rad,
            r.rotation_period_hours,
            r.tilt_rad,
            r.spin_longitude_rad,
        ] {
            hasher.write_u64(value.to_bits());
        }
        hasher.write_u8(u8::from(r.tidal_locked));
        hasher.finish()
    }
}

// == Element Provider ==
/// Source of orbital elements, typically backed by durable storage.
pub trait ElementProvider: Send + Sync {
    /// Elements and rotation of `object_id`, or `NotFound`.
    fn lookup(&self, object_id: &str) -> Result<BodyElements>;

    /// Body whose frame `object_id` orbits in; `None` for a root orbit.
    fn primary_of(&self, object_id: &str) -> Result<Option<String>>;
}

// == Body Record ==
/// One catalog row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub id: String,
    #[serde(default)]
    pub primary: Option<String>,
    pub elements: OrbitalElements,
    pub rotation: RotationParameters,
}

// == Catalog Provider ==
/// In-memory element catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogProvider {
    bodies: HashMap<String, BodyRecord>,
}

impl CatalogProvider {
    pub fn new(records: impl IntoIterator<Item = BodyRecord>) -> Self {
        Self {
            bodies: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Parses a JSON array of [`BodyRecord`]s.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<BodyRecord> = serde_json::from_str(json)
            .map_err(|e| OrbitError::Internal(format!("invalid catalog: {}", e)))?;
        Ok(Self::new(records))
    }

    /// Loads a JSON catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            OrbitError::Internal(format!("cannot read catalog {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Built-in catalog: Earth and Mars around the Sun, the Moon around Earth.
    pub fn solar_system() -> Self {
        let earth = BodyRecord {
            id: "earth".to_string(),
            primary: None,
            elements: OrbitalElements {
                primary_mass_kg: SUN_MASS_KG,
                object_mass_kg: 5.972e24,
                periapsis_au: 0.983_29,
                apoapsis_au: 1.016_71,
                inclination_rad: 0.0,
                node_rad: -0.196_5,
                arg_periapsis_rad: 1.993_3,
                mean_anomaly_rad: 6.259_0,
            },
            rotation: RotationParameters::free(23.934_5, 0.409_1, 0.0),
        };
        let moon = BodyRecord {
            id: "moon".to_string(),
            primary: Some("earth".to_string()),
            elements: OrbitalElements {
                primary_mass_kg: 5.972e24,
                object_mass_kg: 7.342e22,
                periapsis_au: 0.002_424_3,
                apoapsis_au: 0.002_711_0,
                inclination_rad: 0.089_8,
                node_rad: 2.183_8,
                arg_periapsis_rad: 5.552_9,
                mean_anomaly_rad: 2.355_6,
            },
            rotation: RotationParameters::tidally_locked(0.026_7, 0.0),
        };
        let mars = BodyRecord {
            id: "mars".to_string(),
            primary: None,
            elements: OrbitalElements {
                primary_mass_kg: SUN_MASS_KG,
                object_mass_kg: 6.417e23,
                periapsis_au: 1.381_5,
                apoapsis_au: 1.666_0,
                inclination_rad: 0.032_3,
                node_rad: 0.865_3,
                arg_periapsis_rad: 5.000_4,
                mean_anomaly_rad: 0.338_2,
            },
            rotation: RotationParameters::free(24.622_9, 0.439_6, 0.0),
        };
        Self::new([earth, moon, mars])
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn record(&self, object_id: &str) -> Result<&BodyRecord> {
        self.bodies
            .get(object_id)
            .ok_or_else(|| OrbitError::NotFound(object_id.to_string()))
    }
}

impl ElementProvider for CatalogProvider {
    fn lookup(&self, object_id: &str) -> Result<BodyElements> {
        let record = self.record(object_id)?;
        Ok(BodyElements {
            elements: record.elements,
            rotation: record.rotation,
        })
    }

    fn primary_of(&self, object_id: &str) -> Result<Option<String>> {
        Ok(self.record(object_id)?.primary.clone())
    }
}
