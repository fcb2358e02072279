//! Process-local backend with TTL expiry and glob clears.
//!
//! Mirrors the remote backend's observable behavior closely enough to test
//! the orchestrator without a server. It can also be taken offline, at which
//! point every call fails the way an unreachable remote does.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use globset::Glob;

use super::backend::{CacheBackend, PingResult};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
}

/// In-process cache backend.
#[derive(Debug, Default)]
pub struct MemoryCacheBackend {
    entries: DashMap<String, Entry>,
    offline: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

impl MemoryCacheBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store. Stored entries survive and reappear
    /// once the backend is brought back online.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.is_live(now))
            .map(|e| e.key().clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> MemoryCacheStats {
        MemoryCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> Option<String> {
        if self.is_offline() {
            tracing::warn!(key, "Memory cache offline, treating read as miss");
            return None;
        }

        let now = Instant::now();
        // The shard guard must be released before removing an expired entry.
        let lookup = self
            .entries
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));

        let value = match lookup {
            Some(Some(value)) => Some(value),
            Some(None) => {
                self.entries.remove_if(key, |_, e| !e.is_live(now));
                None
            }
            None => None,
        };

        let counter = if value.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> bool {
        if self.is_offline() {
            tracing::warn!(key, "Memory cache offline, dropping write");
            return false;
        }

        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: expiry(Instant::now(), ttl),
            },
        );
        self.writes.fetch_add(1, Ordering::Relaxed);
        true
    }

    async fn remove(&self, key: &str) {
        if self.is_offline() {
            return;
        }
        self.entries.remove(key);
    }

    async fn exists(&self, key: &str) -> bool {
        if self.is_offline() {
            return false;
        }
        let now = Instant::now();
        self.entries.get(key).is_some_and(|e| e.is_live(now))
    }

    async fn clear(&self, pattern: &str) -> u64 {
        if self.is_offline() {
            return 0;
        }

        let matcher = match Glob::new(pattern) {
            Ok(glob) => glob.compile_matcher(),
            Err(e) => {
                tracing::warn!(pattern, error = %e, "Invalid cache clear pattern");
                return 0;
            }
        };

        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|e| matcher.is_match(e.key()))
            .map(|e| e.key().clone())
            .collect();

        let mut removed = 0;
        for key in doomed {
            if self.entries.remove(&key).is_some() {
                removed += 1;
            }
        }
        removed
    }

    async fn ping(&self) -> PingResult {
        if self.is_offline() {
            PingResult::dead()
        } else {
            PingResult::alive(Duration::ZERO)
        }
    }
}

/// Writes live at least one second, the floor `SET EX` imposes remotely.
const MIN_TTL: Duration = Duration::from_secs(1);

/// Upper bound on a write's lifetime; keeps the deadline representable.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl.clamp(MIN_TTL, MAX_TTL)).unwrap_or(now)
}
