//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::service::OrbitService;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// Expiry is also checked lazily on every lookup; the sweep bounds how long
/// an untouched window keeps its samples in memory.
///
/// # Arguments
/// * `service` - Shared orbit service
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_cleanup_task(
    service: Arc<RwLock<OrbitService>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut service_guard = service.write().await;
                service_guard.cleanup_expired()
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::service::CatalogProvider;

    fn shared_service(ttl: Duration) -> Arc<RwLock<OrbitService>> {
        let config = CacheConfig {
            ttl,
            ..CacheConfig::default()
        };
        Arc::new(RwLock::new(OrbitService::new(
            config,
            Arc::new(CatalogProvider::solar_system()),
            0.0,
        )))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let service = shared_service(Duration::from_millis(500));
        service
            .write()
            .await
            .get_transforms_for("earth", 0.0, 10.0, 1.0)
            .unwrap();

        let handle = spawn_cleanup_task(service.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        {
            let guard = service.read().await;
            let stats = guard.stats();
            assert_eq!(stats.active_entries, 0, "expired entry should be swept");
            assert_eq!(stats.expirations, 1);
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let service = shared_service(Duration::from_secs(3600));
        service
            .write()
            .await
            .get_transforms_for("earth", 0.0, 10.0, 1.0)
            .unwrap();

        let handle = spawn_cleanup_task(service.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(service.read().await.stats().active_entries, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let service = shared_service(Duration::from_secs(300));

        let handle = spawn_cleanup_task(service, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
