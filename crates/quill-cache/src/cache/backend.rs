//! # Cache Backend Contract
//!
//! Key-value operations against a cache store. Implementations must never
//! raise: network and storage failures surface as a miss (`get_raw`), an
//! unacknowledged write (`set_raw`), a no-op (`remove`, `clear`), `false`
//! (`exists`), or a dead ping. Callers therefore never branch on cache
//! failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::keys::{CacheKey, KeyFamily};
use crate::error::CacheError;

/// Result of a liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PingResult {
    pub alive: bool,
    pub latency: Duration,
}

impl PingResult {
    #[must_use]
    pub const fn alive(latency: Duration) -> Self {
        Self {
            alive: true,
            latency,
        }
    }

    #[must_use]
    pub const fn dead() -> Self {
        Self {
            alive: false,
            latency: Duration::ZERO,
        }
    }
}

/// Raw cache operations over JSON-encoded strings.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short backend name for logs and status output.
    fn name(&self) -> &'static str;

    /// Whether this backend can ever serve a hit.
    fn is_enabled(&self) -> bool;

    async fn get_raw(&self, key: &str) -> Option<String>;

    /// Store `value` for `ttl`. Returns `true` once the backend acknowledged it.
    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> bool;

    async fn remove(&self, key: &str);

    async fn exists(&self, key: &str) -> bool;

    /// Delete every key matching the glob `pattern`; returns how many went.
    ///
    /// Cost is proportional to the number of keys scanned, so `pattern` must
    /// be a single family pattern (see [`KeyFamily::pattern`](super::KeyFamily::pattern)).
    async fn clear(&self, pattern: &str) -> u64;

    async fn ping(&self) -> PingResult;
}

/// Shared backend handle injected into every consumer.
pub type SharedCacheBackend = Arc<dyn CacheBackend>;

/// Typed access on top of [`CacheBackend`].
#[async_trait]
pub trait CacheBackendExt: CacheBackend {
    /// Decode the value at `key`. Undecodable values count as a miss.
    async fn get<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        let key = key.to_string();
        let raw = self.get_raw(&key).await?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                let err = CacheError::Deserialization {
                    key,
                    reason: e.to_string(),
                };
                tracing::warn!(error = %err, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Encode and store `value`, reporting anything that kept it out of the
    /// cache. The error is advisory; callers decide whether to fall back.
    async fn put<T>(&self, key: &CacheKey, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize + Sync,
    {
        let key = key.to_string();
        let json = serde_json::to_string(value).map_err(|e| CacheError::Serialization {
            key: key.clone(),
            reason: e.to_string(),
        })?;

        if self.set_raw(&key, json, ttl).await {
            Ok(())
        } else {
            Err(CacheError::Rejected(key))
        }
    }

    /// Fire-and-forget variant of [`put`](Self::put).
    async fn set<T>(&self, key: &CacheKey, value: &T, ttl: Duration)
    where
        T: Serialize + Sync,
    {
        if let Err(e) = self.put(key, value, ttl).await {
            tracing::debug!(error = %e, "Cache population skipped");
        }
    }

    async fn delete(&self, key: &CacheKey) {
        self.remove(&key.to_string()).await;
    }

    /// Drop every entry of one key family. Returns how many keys went.
    async fn invalidate_family(&self, family: KeyFamily) -> u64 {
        let removed = match family {
            // Single key: skip the scan
            KeyFamily::AllPosts => {
                let key = CacheKey::AllPosts.to_string();
                let existed = self.exists(&key).await;
                self.remove(&key).await;
                u64::from(existed)
            }
            _ => self.clear(family.pattern()).await,
        };

        tracing::debug!(family = family.as_str(), removed, "Invalidated cache family");
        removed
    }
}

impl<B: CacheBackend + ?Sized> CacheBackendExt for B {}
