//! Cache status for an external health endpoint.

use serde::Serialize;

use super::backend::CacheBackend;

/// Reported cache state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheStatus {
    Up,
    Down,
    Disabled,
}

/// Snapshot handed to the health-check collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheHealth {
    pub enabled: bool,
    pub backend: &'static str,
    pub status: CacheStatus,
    /// Round-trip time of the probe, absent unless the cache is up
    pub latency_ms: Option<f64>,
}

impl CacheHealth {
    /// Probe `backend` once. `enabled` is the configured flag, which may be
    /// on even when startup fell back to the null backend.
    pub async fn probe(backend: &dyn CacheBackend, enabled: bool) -> Self {
        if !enabled {
            return Self {
                enabled,
                backend: backend.name(),
                status: CacheStatus::Disabled,
                latency_ms: None,
            };
        }

        let ping = backend.ping().await;
        Self {
            enabled,
            backend: backend.name(),
            status: if ping.alive {
                CacheStatus::Up
            } else {
                CacheStatus::Down
            },
            latency_ms: ping.alive.then(|| ping.latency.as_secs_f64() * 1000.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCacheBackend, NullCacheBackend};

    #[tokio::test]
    async fn test_disabled_skips_probe() {
        let health = CacheHealth::probe(&NullCacheBackend::new(), false).await;
        assert_eq!(health.status, CacheStatus::Disabled);
        assert_eq!(health.latency_ms, None);
    }

    #[tokio::test]
    async fn test_enabled_but_fell_back_reports_down() {
        let health = CacheHealth::probe(&NullCacheBackend::new(), true).await;
        assert_eq!(health.status, CacheStatus::Down);
        assert_eq!(health.backend, "null");
    }

    #[tokio::test]
    async fn test_live_backend_reports_latency() {
        let health = CacheHealth::probe(&MemoryCacheBackend::new(), true).await;
        assert_eq!(health.status, CacheStatus::Up);
        assert_eq!(health.latency_ms, Some(0.0));

        let json = serde_json::to_value(&health).unwrap();
        assert_eq!(json["status"], "UP");
    }
}
