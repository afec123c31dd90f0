//! Request and Response models for the orbit cache API
//!
//! DTOs serialized to and from HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{PositionQuery, TransformsRequest};
pub use responses::{
    ErrorResponse, HealthResponse, PositionResponse, StatsResponse, TransformsResponse,
};
