//! Orbit Service Module
//!
//! Orchestrates the propagators behind the transform cache: "give me the
//! transforms of object X over window Y at frequency Z".

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheConfig, CacheStats, SampleWindow, TransformCache, WindowQuery};
use crate::error::{OrbitError, Result};
use crate::orbit::{
    round_to_millis, KeplerPropagator, OrbitalElements, OrientationPropagator,
    RotationParameters, Transform, Vector3,
};
use crate::service::{BodyElements, ElementProvider};

/// Deepest primary chain followed when resolving absolute positions
pub const MAX_HIERARCHY_DEPTH: usize = 16;

// == Transform Request ==
/// A transform request with the body's elements supplied inline.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformRequest {
    pub object_id: String,
    pub start_time_s: f64,
    pub duration_s: f64,
    pub frequency_hz: f64,
    pub elements: OrbitalElements,
    pub rotation: RotationParameters,
}

// == Orbit Service ==
/// Owns the transform cache and the element provider.
///
/// One instance is shared by all requesters; callers serialize access
/// (see `AppState`), so at most one computation runs per uncached window.
pub struct OrbitService {
    cache: TransformCache<Transform>,
    provider: Arc<dyn ElementProvider>,
    epoch_s: f64,
}

impl OrbitService {
    // == Constructor ==
    /// # Arguments
    /// * `cache_config` - Cache sizing, TTL, eviction and prefetch tuning
    /// * `provider` - Element lookup collaborator
    /// * `epoch_s` - Reference epoch at which mean anomalies are given
    pub fn new(cache_config: CacheConfig, provider: Arc<dyn ElementProvider>, epoch_s: f64) -> Self {
        Self {
            cache: TransformCache::new(cache_config),
            provider,
            epoch_s,
        }
    }

    pub fn epoch_s(&self) -> f64 {
        self.epoch_s
    }

    // == Get Transforms ==
    /// Transforms over `[start, start + duration)` using the request's elements.
    ///
    /// Elements and rotation are validated before the cache is consulted, so a
    /// bad request fails even when a window for the same key is cached. Cached
    /// windows are only reused for requests carrying identical elements.
    pub fn get_transforms(&mut self, request: &TransformRequest) -> Result<Vec<Transform>> {
        let kepler = KeplerPropagator::new(&request.elements, self.epoch_s)?;
        let orientation = OrientationPropagator::new(&request.rotation, self.epoch_s)?;

        let body = BodyElements {
            elements: request.elements,
            rotation: request.rotation,
        };
        let query = WindowQuery::new(
            request.object_id.clone(),
            request.start_time_s,
            request.duration_s,
            request.frequency_hz,
        )
        .with_fingerprint(body.fingerprint());
        self.cache
            .get_transforms(&query, |window| propagate_window(&kepler, &orientation, window))
    }

    /// Transforms for a catalogued object, resolving its elements through the
    /// provider.
    pub fn get_transforms_for(
        &mut self,
        object_id: &str,
        start_time_s: f64,
        duration_s: f64,
        frequency_hz: f64,
    ) -> Result<Vec<Transform>> {
        let body = self.provider.lookup(object_id)?;
        self.get_transforms(&TransformRequest {
            object_id: object_id.to_string(),
            start_time_s,
            duration_s,
            frequency_hz,
            elements: body.elements,
            rotation: body.rotation,
        })
    }

    /// Fills whichever of `elements` and `rotation` is missing from the
    /// catalog entry of `object_id`.
    pub fn resolve_body(
        &self,
        object_id: &str,
        elements: Option<OrbitalElements>,
        rotation: Option<RotationParameters>,
    ) -> Result<BodyElements> {
        match (elements, rotation) {
            (Some(elements), Some(rotation)) => Ok(BodyElements { elements, rotation }),
            (elements, rotation) => {
                let body = self.provider.lookup(object_id)?;
                Ok(BodyElements {
                    elements: elements.unwrap_or(body.elements),
                    rotation: rotation.unwrap_or(body.rotation),
                })
            }
        }
    }

    /// Kepler propagator for a catalogued object.
    pub fn propagator_for(&self, object_id: &str) -> Result<KeplerPropagator> {
        let body = self.provider.lookup(object_id)?;
        KeplerPropagator::new(&body.elements, self.epoch_s)
    }

    // == Hierarchy ==
    /// `object_id` followed by each successive primary up to a root orbit.
    pub fn primary_chain(&self, object_id: &str) -> Result<Vec<String>> {
        let mut chain = vec![object_id.to_string()];
        while let Some(primary) = self.provider.primary_of(chain[chain.len() - 1].as_str())? {
            if chain.len() >= MAX_HIERARCHY_DEPTH {
                return Err(OrbitError::Validation(format!(
                    "primary chain of {} exceeds {} levels",
                    object_id, MAX_HIERARCHY_DEPTH
                )));
            }
            chain.push(primary);
        }
        Ok(chain)
    }

    /// Position of `object_id` relative to the root of its primary chain,
    /// e.g. a moon's heliocentric position.
    pub fn absolute_position(&self, object_id: &str, time_s: f64) -> Result<Vector3> {
        let chain = self.primary_chain(object_id)?;
        debug!(object = object_id, depth = chain.len(), "resolving absolute position");

        chain.iter().try_fold(Vector3::ZERO, |total, id| {
            Ok(total + self.propagator_for(id)?.position_at(time_s))
        })
    }

    // == Maintenance ==
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Sweeps expired cache entries; returns how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cache.cleanup_expired()
    }
}

// == Propagation Pipeline ==
/// Computes one sample per window time with the Kepler and orientation
/// propagators.
///
/// Tidally locked bodies use the position one interval earlier as the
/// previous position. Sample times are rounded to milliseconds.
pub fn propagate_window(
    kepler: &KeplerPropagator,
    orientation: &OrientationPropagator,
    window: &SampleWindow,
) -> Result<Vec<Transform>> {
    let interval = window.sampling_interval_s;
    let samples: Vec<Transform> = window
        .sample_times()
        .map(|t| {
            let position = kepler.position_at(t);
            let previous = orientation
                .is_tidally_locked()
                .then(|| kepler.position_at(t - interval));
            let rotation = orientation.orientation_at(t, position, previous);
            Transform::new(round_to_millis(t), position, rotation)
        })
        .collect();

    if samples.is_empty() {
        return Err(OrbitError::ComputationFailure(format!(
            "window [{}, {}) at {}s stride has no samples",
            window.start_s,
            window.end_s(),
            interval
        )));
    }
    Ok(samples)
}
