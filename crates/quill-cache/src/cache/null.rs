//! Always-miss backend used when caching is off or the remote store failed
//! its startup probe.

use std::time::Duration;

use async_trait::async_trait;

use super::backend::{CacheBackend, PingResult};

/// Backend that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCacheBackend;

impl NullCacheBackend {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheBackend for NullCacheBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn get_raw(&self, _key: &str) -> Option<String> {
        None
    }

    async fn set_raw(&self, _key: &str, _value: String, _ttl: Duration) -> bool {
        false
    }

    async fn remove(&self, _key: &str) {}

    async fn exists(&self, _key: &str) -> bool {
        false
    }

    async fn clear(&self, _pattern: &str) -> u64 {
        0
    }

    async fn ping(&self) -> PingResult {
        PingResult::dead()
    }
}
