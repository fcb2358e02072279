//! # Quill Cache
//!
//! Cache layer for the Quill post catalogue.
//!
//! ## Architecture
//!
//! The orchestrator sits between callers and the post store and keeps a
//! key-value cache consistent with it. The cache only accelerates reads: every
//! backend failure degrades to a miss and the store stays authoritative.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application Layer                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   ContentCacheService                        │
//! │        (cache-aside reads, write-through maintenance)        │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │      CacheBackend       │   │          PostStore           │
//! │ (Remote | Null | Memory)│   │      (Source of Truth)       │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```
//!
//! ## Key Families
//!
//! | Family       | Key                          |
//! |--------------|------------------------------|
//! | `PostById`   | `posts:id:{uuid}`            |
//! | `PostBySlug` | `posts:slug:{slug}`          |
//! | `AllPosts`   | `posts:all`                  |
//! | `PagedPosts` | `posts:paged:{page}:{size}`  |
//!
//! ## Features
//!
//! - `redis`: Enable the Redis/Valkey backend and startup selection (default)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quill_cache::{CacheSettings, ContentCacheService, select_backend};
//!
//! let settings = CacheSettings::from_env();
//! let selection = select_backend(&settings).await;
//!
//! let service = ContentCacheService::new(selection.backend(), store, settings.ttl);
//! let post = service.get_by_slug("2025-03-09-hello-world").await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod error;
pub mod repository;
pub mod service;
pub mod strategy;

// Re-export commonly used types
pub use cache::{
    CacheBackend, CacheBackendExt, CacheHealth, CacheKey, CacheSettings, CacheStatus, KeyFamily,
    MemoryCacheBackend, NullCacheBackend, PingResult, SharedCacheBackend,
};
#[cfg(feature = "redis")]
pub use cache::{CacheSelection, DisabledReason, RemoteCacheBackend, select_backend};
pub use error::{CacheError, Result, StoreError};
pub use repository::{InMemoryPostStore, PostStore};
pub use service::ContentCacheService;
pub use strategy::{ReadStrategy, WriteStrategy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
