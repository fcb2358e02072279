//! # Remote Cache Backend
//!
//! Redis/Valkey-protocol backend. Construction never panics and every call
//! absorbs its own failures, so a degraded server only ever looks like a
//! cache that misses.
//!
//! Until [`RemoteCacheBackend::verify`] succeeds the instance serves no
//! traffic: reads miss and writes are dropped exactly like the null backend.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;
use url::Url;

use super::backend::{CacheBackend, PingResult};
use super::settings::CacheSettings;
use crate::error::CacheError;

/// Keys requested per SCAN round-trip during a pattern clear.
const SCAN_BATCH: usize = 250;

/// Redis-protocol cache backend with guarded initialization
pub struct RemoteCacheBackend {
    client: Client,
    conn: OnceCell<ConnectionManager>,
    verified: AtomicBool,
    settings: CacheSettings,
}

impl RemoteCacheBackend {
    /// Build a backend from settings.
    ///
    /// With `abort_on_connect_fail` the first connection is opened here and
    /// any failure is returned. Otherwise connecting is deferred to
    /// [`verify`](Self::verify).
    pub async fn connect(settings: CacheSettings) -> Result<Self, CacheError> {
        let url = connection_url(&settings)?;
        let client = Client::open(url.as_str())?;

        let backend = Self {
            client,
            conn: OnceCell::new(),
            verified: AtomicBool::new(false),
            settings,
        };

        if backend.settings.abort_on_connect_fail {
            backend.establish().await?;
        }

        tracing::info!(
            endpoint = %backend.settings.endpoint,
            port = backend.settings.port,
            tls = backend.settings.tls,
            connected = backend.conn.initialized(),
            "Remote cache backend constructed"
        );

        Ok(backend)
    }

    /// One-shot connectivity probe. Only a verified backend serves traffic.
    pub async fn verify(&self) -> bool {
        let verified = match self.establish().await {
            Ok(conn) => {
                let mut conn = conn.clone();
                match self.round_trip(&mut conn).await {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::error!(error = %e, "Cache connectivity probe failed");
                        false
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Cache connection could not be established");
                false
            }
        };

        self.verified.store(verified, Ordering::SeqCst);
        verified
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified.load(Ordering::SeqCst)
    }

    #[must_use]
    pub const fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    async fn establish(&self) -> Result<&ConnectionManager, CacheError> {
        let timeout = self.settings.connect_timeout;
        self.conn
            .get_or_try_init(|| async {
                tokio::time::timeout(timeout, ConnectionManager::new(self.client.clone()))
                    .await
                    .map_err(|_| {
                        CacheError::Unavailable(format!(
                            "connect timed out after {}ms",
                            timeout.as_millis()
                        ))
                    })?
                    .map_err(CacheError::from)
            })
            .await
    }

    /// Connection for serving traffic; `None` until verified.
    fn live_connection(&self) -> Option<ConnectionManager> {
        if !self.is_verified() {
            return None;
        }
        self.conn.get().cloned()
    }

    /// Await a command, bounded by the configured timeout.
    async fn bounded<T, F>(&self, command: F) -> Result<T, CacheError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        let timeout = self.settings.connect_timeout;
        match tokio::time::timeout(timeout, command).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::Unavailable(format!(
                "command timed out after {}ms",
                timeout.as_millis()
            ))),
        }
    }

    async fn round_trip(&self, conn: &mut ConnectionManager) -> Result<Duration, CacheError> {
        let started = Instant::now();
        let cmd = redis::cmd("PING");
        let _: String = self.bounded(cmd.query_async(conn)).await?;
        Ok(started.elapsed())
    }

    async fn scan_and_delete(
        &self,
        conn: &mut ConnectionManager,
        pattern: &str,
    ) -> Result<u64, CacheError> {
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let mut cmd = redis::cmd("SCAN");
            cmd.arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH);
            let (next, batch): (u64, Vec<String>) = self.bounded(cmd.query_async(conn)).await?;

            if !batch.is_empty() {
                let deleted: i64 = self.bounded(conn.del(batch.as_slice())).await?;
                removed += u64::try_from(deleted).unwrap_or_default();
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }
}

#[async_trait]
impl CacheBackend for RemoteCacheBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    async fn get_raw(&self, key: &str) -> Option<String> {
        let mut conn = self.live_connection()?;

        match self.bounded(conn.get::<_, Option<String>>(key)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed");
                None
            }
        }
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> bool {
        let Some(mut conn) = self.live_connection() else {
            return false;
        };

        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        match self.bounded(conn.set_ex::<_, _, ()>(key, value, seconds)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache write failed");
                false
            }
        }
    }

    async fn remove(&self, key: &str) {
        let Some(mut conn) = self.live_connection() else {
            return;
        };

        if let Err(e) = self.bounded(conn.del::<_, i64>(key)).await {
            tracing::warn!(key, error = %e, "Cache delete failed");
        }
    }

    async fn exists(&self, key: &str) -> bool {
        let Some(mut conn) = self.live_connection() else {
            return false;
        };

        match self.bounded(conn.exists::<_, bool>(key)).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache exists check failed");
                false
            }
        }
    }

    async fn clear(&self, pattern: &str) -> u64 {
        let Some(mut conn) = self.live_connection() else {
            return 0;
        };

        match self.scan_and_delete(&mut conn, pattern).await {
            Ok(removed) => {
                tracing::debug!(pattern, removed, "Cleared cache keys");
                removed
            }
            Err(e) => {
                tracing::warn!(pattern, error = %e, "Cache clear failed");
                0
            }
        }
    }

    async fn ping(&self) -> PingResult {
        let Some(conn) = self.conn.get() else {
            return PingResult::dead();
        };
        let mut conn = conn.clone();

        match self.round_trip(&mut conn).await {
            Ok(latency) => {
                self.verified.store(true, Ordering::SeqCst);
                PingResult::alive(latency)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cache ping failed");
                self.verified.store(false, Ordering::SeqCst);
                PingResult::dead()
            }
        }
    }
}

impl fmt::Debug for RemoteCacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCacheBackend")
            .field("endpoint", &self.settings.endpoint)
            .field("port", &self.settings.port)
            .field("tls", &self.settings.tls)
            .field("connected", &self.conn.initialized())
            .field("verified", &self.is_verified())
            .finish_non_exhaustive()
    }
}

/// Build a `redis://` or `rediss://` URL with percent-encoded credentials.
fn connection_url(settings: &CacheSettings) -> Result<Url, CacheError> {
    let invalid = |reason: String| CacheError::Unavailable(format!("invalid cache endpoint: {reason}"));

    let scheme = if settings.tls { "rediss" } else { "redis" };
    let mut url = Url::parse(&format!(
        "{scheme}://{}:{}/",
        settings.endpoint.trim(),
        settings.port
    ))
    .map_err(|e| invalid(e.to_string()))?;

    if let Some(username) = &settings.username {
        url.set_username(username)
            .map_err(|()| invalid("username rejected".to_string()))?;
    }
    if let Some(password) = &settings.password {
        url.set_password(Some(password))
            .map_err(|()| invalid("password rejected".to_string()))?;
    }

    Ok(url)
}
