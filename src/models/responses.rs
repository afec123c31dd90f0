//! Response DTOs for the orbit cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::orbit::{Transform, Vector3};

/// Response body for POST /transforms
#[derive(Debug, Clone, Serialize)]
pub struct TransformsResponse {
    pub object_id: String,
    /// Number of samples returned
    pub count: usize,
    pub samples: Vec<Transform>,
}

impl TransformsResponse {
    pub fn new(object_id: impl Into<String>, samples: Vec<Transform>) -> Self {
        Self {
            object_id: object_id.into(),
            count: samples.len(),
            samples,
        }
    }
}

/// Response body for GET /bodies/:id/position
#[derive(Debug, Clone, Serialize)]
pub struct PositionResponse {
    pub object_id: String,
    pub time: f64,
    /// Bodies whose orbits were summed, innermost first
    pub chain: Vec<String>,
    /// Position in meters
    pub position: Vector3,
    /// Distance from the root primary in meters
    pub distance: f64,
}

impl PositionResponse {
    pub fn new(
        object_id: impl Into<String>,
        time: f64,
        chain: Vec<String>,
        position: Vector3,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            time,
            chain,
            position,
            distance: position.length(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
