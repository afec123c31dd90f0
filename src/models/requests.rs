//! Request DTOs for the orbit cache API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::orbit::{OrbitalElements, RotationParameters};

/// Longest accepted object identifier
pub const MAX_OBJECT_ID_LEN: usize = 256;

/// Request body for POST /transforms
///
/// `elements` and `rotation` override the catalog; when either is omitted the
/// catalog entry for `object_id` supplies it.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformsRequest {
    pub object_id: String,
    /// Window start in seconds
    pub start_time: f64,
    /// Window length in seconds
    pub duration: f64,
    /// Samples per second
    pub frequency: f64,
    #[serde(default)]
    pub elements: Option<OrbitalElements>,
    #[serde(default)]
    pub rotation: Option<RotationParameters>,
    /// Wrap `start_time` into one orbital period before querying
    #[serde(default)]
    pub wrap_to_period: bool,
}

impl TransformsRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.object_id.trim().is_empty() {
            return Some("object_id cannot be empty".to_string());
        }
        if self.object_id.len() > MAX_OBJECT_ID_LEN {
            return Some(format!(
                "object_id exceeds maximum length of {} characters",
                MAX_OBJECT_ID_LEN
            ));
        }
        None
    }
}

/// Query string for GET /bodies/:id/position
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PositionQuery {
    /// Time in seconds; defaults to 0
    #[serde(default)]
    pub time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transforms_request_deserialize_minimal() {
        let json = r#"{"object_id": "moon", "start_time": 0, "duration": 60, "frequency": 1}"#;
        let req: TransformsRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.object_id, "moon");
        assert_eq!(req.duration, 60.0);
        assert!(req.elements.is_none());
        assert!(req.rotation.is_none());
        assert!(!req.wrap_to_period);
    }

    #[test]
    fn test_transforms_request_with_overrides() {
        let json = r#"{
            "object_id": "voyager",
            "start_time": 10.5,
            "duration": 5,
            "frequency": 2,
            "elements": {
                "primary_mass_kg": 1.989e30,
                "object_mass_kg": 1000,
                "periapsis_au": 0.98,
                "apoapsis_au": 1.02,
                "inclination_rad": 0,
                "node_rad": 0,
                "arg_periapsis_rad": 0,
                "mean_anomaly_rad": 0
            },
            "rotation": {"tidal_locked": false, "rotation_period_hours": 2.0},
            "wrap_to_period": true
        }"#;
        let req: TransformsRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.elements.unwrap().periapsis_au, 0.98);
        assert_eq!(req.rotation.unwrap().rotation_period_hours, 2.0);
        assert!(req.wrap_to_period);
    }

    #[test]
    fn test_validate_object_id() {
        let json = r#"{"object_id": "  ", "start_time": 0, "duration": 1, "frequency": 1}"#;
        let req: TransformsRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_some());

        let mut req = req;
        req.object_id = "x".repeat(MAX_OBJECT_ID_LEN + 1);
        assert!(req.validate().is_some());

        req.object_id = "earth".to_string();
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_position_query_default_time() {
        let query: PositionQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.time, 0.0);
    }
}
