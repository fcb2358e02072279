//! # Cache Module
//!
//! Backend contract, concrete backends, key naming, and startup selection.

pub mod backend;
pub mod health;
pub mod keys;
pub mod memory;
pub mod null;
pub mod settings;

#[cfg(feature = "redis")]
pub mod factory;
#[cfg(feature = "redis")]
pub mod remote;

pub use backend::{CacheBackend, CacheBackendExt, PingResult, SharedCacheBackend};
pub use health::{CacheHealth, CacheStatus};
pub use keys::{CacheKey, KeyFamily};
pub use memory::{MemoryCacheBackend, MemoryCacheStats};
pub use null::NullCacheBackend;
pub use settings::CacheSettings;

#[cfg(feature = "redis")]
pub use factory::{CacheSelection, DisabledReason, select_backend};
#[cfg(feature = "redis")]
pub use remote::RemoteCacheBackend;
