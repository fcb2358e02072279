//! Startup backend selection.
//!
//! Runs once at process start: builds the remote backend, probes it, and
//! falls back to the null backend on any failure. Nothing downstream ever
//! sees a half-initialized backend.

use std::fmt;
use std::sync::Arc;

use super::backend::SharedCacheBackend;
use super::null::NullCacheBackend;
use super::remote::RemoteCacheBackend;
use super::settings::CacheSettings;

/// Why caching is not serving traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisabledReason {
    /// `CACHE_ENABLED` is off
    TurnedOff,
    /// Caching is on but no endpoint was configured
    MissingEndpoint,
    /// The backend could not be constructed
    ConnectFailed(String),
    /// The backend was built but the probe failed
    ProbeFailed,
}

impl fmt::Display for DisabledReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnedOff => f.write_str("caching disabled by configuration"),
            Self::MissingEndpoint => f.write_str("no cache endpoint configured"),
            Self::ConnectFailed(reason) => write!(f, "connection failed: {reason}"),
            Self::ProbeFailed => f.write_str("connectivity probe failed"),
        }
    }
}

/// Outcome of startup selection.
#[derive(Debug, Clone)]
pub enum CacheSelection {
    Connected(Arc<RemoteCacheBackend>),
    Disabled(DisabledReason),
}

impl CacheSelection {
    /// The backend every consumer should share.
    #[must_use]
    pub fn backend(&self) -> SharedCacheBackend {
        match self {
            Self::Connected(remote) => remote.clone(),
            Self::Disabled(_) => Arc::new(NullCacheBackend::new()),
        }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }
}

/// Pick the backend for this process.
pub async fn select_backend(settings: &CacheSettings) -> CacheSelection {
    if !settings.enabled {
        tracing::info!("Cache disabled via configuration, using null backend");
        return CacheSelection::Disabled(DisabledReason::TurnedOff);
    }

    if !settings.has_endpoint() {
        tracing::warn!("Cache enabled but no endpoint configured, using null backend");
        return CacheSelection::Disabled(DisabledReason::MissingEndpoint);
    }

    let remote = match RemoteCacheBackend::connect(settings.clone()).await {
        Ok(remote) => remote,
        Err(e) => {
            tracing::error!(error = %e, "Cache backend construction failed, using null backend");
            return CacheSelection::Disabled(DisabledReason::ConnectFailed(e.to_string()));
        }
    };

    if !remote.verify().await {
        tracing::error!(
            endpoint = %settings.endpoint,
            "Cache connectivity probe failed, using null backend"
        );
        return CacheSelection::Disabled(DisabledReason::ProbeFailed);
    }

    tracing::info!(
        endpoint = %settings.endpoint,
        port = settings.port,
        ttl_secs = settings.ttl.as_secs(),
        "Cache backend verified"
    );
    CacheSelection::Connected(Arc::new(remote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_disabled_by_configuration() {
        let selection = select_backend(&CacheSettings::default()).await;
        assert!(matches!(
            selection,
            CacheSelection::Disabled(DisabledReason::TurnedOff)
        ));
        assert_eq!(selection.backend().name(), "null");
    }

    #[tokio::test]
    async fn test_missing_endpoint() {
        let settings = CacheSettings {
            enabled: true,
            ..CacheSettings::default()
        };
        let selection = select_backend(&settings).await;
        assert!(matches!(
            selection,
            CacheSelection::Disabled(DisabledReason::MissingEndpoint)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_falls_back_to_null() {
        for abort_on_connect_fail in [true, false] {
            let settings = CacheSettings {
                port: 1,
                abort_on_connect_fail,
                connect_timeout: Duration::from_millis(300),
                ..CacheSettings::local()
            };

            let selection = select_backend(&settings).await;
            assert!(!selection.is_connected());
            assert!(!selection.backend().is_enabled());

            let expected_probe_failure = !abort_on_connect_fail;
            assert_eq!(
                matches!(selection, CacheSelection::Disabled(DisabledReason::ProbeFailed)),
                expected_probe_failure
            );
        }
    }
}
