//! API Module
//!
//! HTTP handlers and routing for the orbit cache REST API.
//!
//! # Endpoints
//! - `POST /transforms` - Transforms of one object over a time window
//! - `GET /bodies/:id/position` - Absolute position of a catalogued body
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
