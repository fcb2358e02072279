//! Read strategy implementations using enum dispatch.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{CacheBackend, CacheBackendExt, CacheKey};
use crate::error::Result;

/// Read strategy enum - determines cache/store access pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Check cache first, fall back to the store on miss and populate
    #[default]
    CacheAside,
    /// Only read from the store
    StoreOnly,
}

impl ReadStrategy {
    /// Strategy suited to `cache`.
    pub fn for_backend(cache: &dyn CacheBackend) -> Self {
        if cache.is_enabled() {
            Self::CacheAside
        } else {
            Self::StoreOnly
        }
    }

    /// Execute a read according to the strategy.
    ///
    /// Cache failures are already absorbed by the backend and show up here as
    /// a miss. Store errors propagate.
    pub async fn read<T, F, Fut>(
        &self,
        cache: &dyn CacheBackend,
        key: &CacheKey,
        ttl: Duration,
        load: F,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        match self {
            Self::CacheAside => {
                let cached: Option<T> = cache.get(key).await;
                if cached.is_some() {
                    tracing::debug!(%key, "Cache hit");
                    return Ok(cached);
                }

                tracing::debug!(%key, "Cache miss, loading from store");
                let loaded = load().await?;

                if let Some(value) = &loaded {
                    cache.set(key, value, ttl).await;
                }

                Ok(loaded)
            }

            Self::StoreOnly => load().await,
        }
    }
}
