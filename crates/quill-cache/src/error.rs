//! Error types for the cache layer and the post store contract.
//!
//! [`StoreError`] is authoritative and always reaches the caller.
//! [`CacheError`] never does: backends and the orchestrator log it and carry
//! on as if the cache had missed.

use quill_domain::{DomainError, SlugAsyncError};
use thiserror::Error;

/// Post store errors, propagated unchanged to callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Entity not found: {entity_type} with key {key}")]
    NotFound { entity_type: String, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),
}

impl StoreError {
    pub fn post_not_found(key: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "post".to_string(),
            key: key.to_string(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<SlugAsyncError<Self>> for StoreError {
    fn from(err: SlugAsyncError<Self>) -> Self {
        match err {
            SlugAsyncError::Slug(e) => e.into(),
            SlugAsyncError::Predicate(e) => e,
        }
    }
}

/// Cache layer failures. Recovered locally, never surfaced.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to encode value for key {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Failed to decode cached value for key {key}: {reason}")]
    Deserialization { key: String, reason: String },

    #[error("Cache did not acknowledge write for key {0}")]
    Rejected(String),
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
