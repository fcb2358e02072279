//! # Cache Settings
//!
//! Environment-based configuration for the remote cache backend.

use std::env;
use std::fmt;
use std::time::Duration;

const DEFAULT_PORT: u16 = 6379;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3000;
const DEFAULT_EXPIRATION_MINUTES: u64 = 15;

/// Remote cache configuration
#[derive(Clone)]
pub struct CacheSettings {
    /// Master switch; when off the null backend is used
    pub enabled: bool,

    /// Cache host name or address
    pub endpoint: String,

    pub port: u16,

    pub username: Option<String>,

    pub password: Option<String>,

    /// Connect over TLS (`rediss://`)
    pub tls: bool,

    /// Fail construction immediately when the first connection fails.
    /// When off, the connection is deferred to `verify()`.
    pub abort_on_connect_fail: bool,

    /// Applies to connecting and to each command round-trip
    pub connect_timeout: Duration,

    /// Lifetime of every cache entry
    pub ttl: Duration,
}

impl CacheSettings {
    /// Load settings from `CACHE_*` environment variables
    pub fn from_env() -> Self {
        Self {
            enabled: env_flag("CACHE_ENABLED").unwrap_or(false),

            endpoint: env::var("CACHE_ENDPOINT").unwrap_or_default(),

            port: env::var("CACHE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),

            username: env::var("CACHE_USERNAME").ok().filter(|v| !v.is_empty()),

            password: env::var("CACHE_PASSWORD").ok().filter(|v| !v.is_empty()),

            tls: env_flag("CACHE_SSL_ENABLED").unwrap_or(false),

            abort_on_connect_fail: env_flag("CACHE_ABORT_ON_CONNECT_FAIL").unwrap_or(true),

            connect_timeout: Duration::from_millis(
                env::var("CACHE_CONNECT_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            ),

            ttl: Duration::from_secs(
                env::var("CACHE_EXPIRATION_MINUTES")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_EXPIRATION_MINUTES)
                    .saturating_mul(60),
            ),
        }
    }

    /// Settings pointing at a local server with caching switched on
    pub fn local() -> Self {
        Self {
            enabled: true,
            endpoint: "127.0.0.1".to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_endpoint(&self) -> bool {
        !self.endpoint.trim().is_empty()
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            tls: false,
            abort_on_connect_fail: true,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            ttl: Duration::from_secs(60 * DEFAULT_EXPIRATION_MINUTES),
        }
    }
}

impl fmt::Debug for CacheSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheSettings")
            .field("enabled", &self.enabled)
            .field("endpoint", &self.endpoint)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("tls", &self.tls)
            .field("abort_on_connect_fail", &self.abort_on_connect_fail)
            .field("connect_timeout", &self.connect_timeout)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// `None` when unset or unrecognized, so the caller's default applies.
fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
