//! Service Module
//!
//! Element providers and the orbit service that feeds them through the
//! propagators and the transform cache.

mod orbit_service;
mod provider;

pub use orbit_service::{propagate_window, OrbitService, TransformRequest, MAX_HIERARCHY_DEPTH};
pub use provider::{BodyElements, BodyRecord, CatalogProvider, ElementProvider};
