//! Write strategy implementations using enum dispatch.

use std::future::Future;

use crate::cache::CacheBackend;
use crate::error::CacheError;

/// Write strategy enum - determines how the cache follows a store write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteStrategy {
    /// Refresh entries in place once the store has committed
    #[default]
    WriteThrough,
    /// No cache interaction
    StoreOnly,
}

impl WriteStrategy {
    /// Strategy suited to `cache`.
    pub fn for_backend(cache: &dyn CacheBackend) -> Self {
        if cache.is_enabled() {
            Self::WriteThrough
        } else {
            Self::StoreOnly
        }
    }

    /// Run cache population after a committed store write.
    ///
    /// - `populate_fn`: refreshes every affected entry
    /// - `invalidate_fn`: drops everything `populate_fn` may have left
    ///   half-updated; runs only if population failed
    pub async fn apply<PopulateFut, InvalidateFut>(
        &self,
        populate_fn: impl FnOnce() -> PopulateFut,
        invalidate_fn: impl FnOnce() -> InvalidateFut,
    ) where
        PopulateFut: Future<Output = Result<(), CacheError>>,
        InvalidateFut: Future<Output = ()>,
    {
        match self {
            Self::WriteThrough => {
                if let Err(e) = populate_fn().await {
                    tracing::warn!(error = %e, "Cache population failed, invalidating affected entries");
                    invalidate_fn().await;
                }
            }

            Self::StoreOnly => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_write_through_success_skips_invalidation() {
        let invalidated = Arc::new(AtomicBool::new(false));
        let flag = invalidated.clone();

        WriteStrategy::WriteThrough
            .apply(
                || async { Ok(()) },
                || async move { flag.store(true, Ordering::SeqCst) },
            )
            .await;

        assert!(!invalidated.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_write_through_failure_invalidates() {
        let invalidated = Arc::new(AtomicBool::new(false));
        let flag = invalidated.clone();

        WriteStrategy::WriteThrough
            .apply(
                || async { Err(CacheError::Rejected("posts:all".into())) },
                || async move { flag.store(true, Ordering::SeqCst) },
            )
            .await;

        assert!(invalidated.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_store_only_touches_nothing() {
        let populated = Arc::new(AtomicBool::new(false));
        let flag = populated.clone();

        WriteStrategy::StoreOnly
            .apply(
                || async move {
                    flag.store(true, Ordering::SeqCst);
                    Ok(())
                },
                || async {},
            )
            .await;

        assert!(!populated.load(Ordering::SeqCst)); // Cache NOT called
    }
}
