//! # Content Cache Service
//!
//! Cache-aside reads and write-through maintenance over a [`PostStore`].
//!
//! Every read checks the cache, falls back to the store on a miss, and
//! populates the entry it missed. Every write commits to the store first,
//! then refreshes the affected entries in place:
//!
//! | Write  | `PostById` / `PostBySlug` | `AllPosts`             | `PagedPosts` |
//! |--------|---------------------------|------------------------|--------------|
//! | create | set                       | merge if cached        | clear family |
//! | update | set (old slug removed)    | replace if cached      | clear family |
//! | delete | remove                    | drop post if cached    | clear family |
//!
//! If any of those steps cannot be applied (encode failure, unacknowledged
//! write) the service removes the post's entries and every derived view
//! instead, so a reader never sees a half-updated set of aliases.
//!
//! Store errors always propagate. Cache errors never do.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quill_domain::{
    DEFAULT_PREVIEW_MAX_LENGTH, NewPost, PageRequest, Post, PostDraft, PostPage, PostPatch,
    generate_preview, generate_unique_slug,
};
use uuid::Uuid;

use crate::cache::{CacheBackendExt, CacheKey, KeyFamily, SharedCacheBackend};
use crate::error::{CacheError, Result, StoreError};
use crate::repository::PostStore;
use crate::strategy::{ReadStrategy, WriteStrategy};

// =============================================================================
// SERVICE
// =============================================================================

/// Keeps the cache consistent with the post store.
pub struct ContentCacheService {
    cache: SharedCacheBackend,
    store: Arc<dyn PostStore>,
    ttl: Duration,
    preview_max_length: usize,
    read_strategy: ReadStrategy,
    write_strategy: WriteStrategy,
}

impl ContentCacheService {
    /// Create a service with strategies matching the backend.
    ///
    /// A backend that can never hit (the null backend) gets `StoreOnly` for
    /// both reads and writes.
    pub fn new(cache: SharedCacheBackend, store: Arc<dyn PostStore>, ttl: Duration) -> Self {
        let read_strategy = ReadStrategy::for_backend(cache.as_ref());
        let write_strategy = WriteStrategy::for_backend(cache.as_ref());
        Self::with_strategies(cache, store, ttl, read_strategy, write_strategy)
    }

    /// Create with custom strategies.
    pub fn with_strategies(
        cache: SharedCacheBackend,
        store: Arc<dyn PostStore>,
        ttl: Duration,
        read_strategy: ReadStrategy,
        write_strategy: WriteStrategy,
    ) -> Self {
        Self {
            cache,
            store,
            ttl,
            preview_max_length: DEFAULT_PREVIEW_MAX_LENGTH,
            read_strategy,
            write_strategy,
        }
    }

    /// Preview length used when content changes on update.
    #[must_use]
    pub fn with_preview_length(mut self, max_chars: usize) -> Self {
        self.preview_max_length = max_chars;
        self
    }

    pub fn cache(&self) -> &SharedCacheBackend {
        &self.cache
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub const fn read_strategy(&self) -> ReadStrategy {
        self.read_strategy
    }

    pub const fn write_strategy(&self) -> WriteStrategy {
        self.write_strategy
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Get a published post by ID.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let post = self
            .read_strategy
            .read(self.cache.as_ref(), &CacheKey::PostById(id), self.ttl, || {
                self.store.get_by_id(id)
            })
            .await?;

        Ok(post.filter(|p| p.is_published))
    }

    /// Get a published post by slug.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let key = CacheKey::PostBySlug(slug.to_string());
        let post = self
            .read_strategy
            .read(self.cache.as_ref(), &key, self.ttl, || {
                self.store.get_by_slug(slug)
            })
            .await?;

        Ok(post.filter(|p| p.is_published))
    }

    /// Get every published post, newest first.
    pub async fn get_all(&self) -> Result<Vec<Post>> {
        let posts = self
            .read_strategy
            .read(self.cache.as_ref(), &CacheKey::AllPosts, self.ttl, || async {
                let posts = self.store.get_all().await?;
                Ok(Some(published_only(posts)))
            })
            .await?;

        Ok(posts.unwrap_or_default())
    }

    /// Get one page of published posts.
    ///
    /// Out-of-range arguments are normalized by [`PageRequest::new`], and the
    /// normalized window is what gets cached.
    pub async fn get_paged(&self, page: u32, size: u32) -> Result<PostPage> {
        let window = PageRequest::new(page, size);
        let result = self
            .read_strategy
            .read(
                self.cache.as_ref(),
                &CacheKey::PagedPosts(window),
                self.ttl,
                || async move { self.store.get_paged(window).await.map(Some) },
            )
            .await?;

        Ok(result.unwrap_or_default())
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Create and publish a post.
    ///
    /// The slug is derived from the publish date and title, and gets a short
    /// hash suffix if the base is taken.
    pub async fn create(&self, draft: PostDraft, preview_max_length: usize) -> Result<Post> {
        draft.validate()?;

        let published_at = Utc::now();
        let slug = generate_unique_slug(&draft.title, published_at.date_naive(), move |candidate| {
            async move { self.store.slug_exists(&candidate).await }
        })
        .await?;

        let new_post = NewPost {
            slug,
            content_preview: generate_preview(&draft.content, preview_max_length),
            title: draft.title,
            content: draft.content,
            author_id: draft.author_id,
            author_name: draft.author_name,
            published_at,
            is_published: true,
        };

        let created = self.store.create(new_post).await?;
        tracing::info!(post_id = %created.id, slug = %created.slug, "Post created");

        let (id, slug) = (created.id, created.slug.as_str());
        self.write_strategy
            .apply(
                || self.cache_created(&created),
                move || async move { self.evict(id, &[slug]).await },
            )
            .await;

        Ok(created)
    }

    /// Apply `patch` to an existing post.
    ///
    /// The slug is regenerated only when the title actually changes, and the
    /// preview only when the content does.
    pub async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Post> {
        patch.validate()?;

        let existing = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| StoreError::post_not_found(id))?;

        let now = Utc::now();
        let mut changed = existing.clone();

        if let Some(title) = patch.title {
            if title != existing.title {
                let current = existing.slug.as_str();
                changed.slug = generate_unique_slug(&title, now.date_naive(), move |candidate| {
                    async move {
                        // Keeping the current slug is never a collision.
                        if candidate == current {
                            return Ok(false);
                        }
                        self.store.slug_exists(&candidate).await
                    }
                })
                .await?;
            }
            changed.title = title;
        }

        if let Some(content) = patch.content {
            changed.content_preview = generate_preview(&content, self.preview_max_length);
            changed.content = content;
        }

        changed.updated_at = Some(now);

        let updated = self.store.update(id, &changed).await?;
        tracing::info!(post_id = %id, slug = %updated.slug, "Post updated");

        let (old, new) = (existing.slug.as_str(), updated.slug.as_str());
        self.write_strategy
            .apply(
                || self.cache_updated(&updated, old),
                move || async move { self.evict(id, &[old, new]).await },
            )
            .await;

        Ok(updated)
    }

    /// Soft-delete a post and drop it from every cached view.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let existing = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| StoreError::post_not_found(id))?;

        self.store.delete(id).await?;
        tracing::info!(post_id = %id, slug = %existing.slug, "Post deleted");

        let slug = existing.slug.as_str();
        self.write_strategy
            .apply(
                || self.cache_deleted(&existing),
                move || async move { self.evict(id, &[slug]).await },
            )
            .await;

        Ok(())
    }

    /// Rebuild every cached post from the store.
    ///
    /// Drops each key family first so entries for posts that vanished from
    /// the store do not linger until expiry. Returns the number of posts
    /// re-cached.
    pub async fn synchronize_all(&self) -> Result<usize> {
        for family in KeyFamily::ALL {
            self.invalidate_family(family).await;
        }

        let posts = published_only(self.store.get_all().await?);

        for post in &posts {
            self.cache
                .set(&CacheKey::PostById(post.id), post, self.ttl)
                .await;
            self.cache
                .set(&CacheKey::PostBySlug(post.slug.clone()), post, self.ttl)
                .await;
        }
        self.cache.set(&CacheKey::AllPosts, &posts, self.ttl).await;

        tracing::info!(count = posts.len(), "Post cache synchronized");
        Ok(posts.len())
    }

    // -------------------------------------------------------------------------
    // Invalidation
    // -------------------------------------------------------------------------

    /// Drop every entry of one key family. Returns how many keys went.
    pub async fn invalidate_family(&self, family: KeyFamily) -> u64 {
        self.cache.invalidate_family(family).await
    }

    /// Drop the list and every page.
    pub async fn invalidate_all_posts(&self) {
        self.cache.delete(&CacheKey::AllPosts).await;
        self.cache.invalidate_family(KeyFamily::PagedPosts).await;
    }

    // -------------------------------------------------------------------------
    // Cache population
    // -------------------------------------------------------------------------

    async fn cache_post(&self, post: &Post) -> std::result::Result<(), CacheError> {
        self.cache
            .put(&CacheKey::PostById(post.id), post, self.ttl)
            .await?;
        self.cache
            .put(&CacheKey::PostBySlug(post.slug.clone()), post, self.ttl)
            .await
    }

    async fn cache_created(&self, post: &Post) -> std::result::Result<(), CacheError> {
        self.cache_post(post).await?;

        // Concurrent writers may race on this read-modify-write; expiry bounds
        // the damage.
        let cached: Option<Vec<Post>> = self.cache.get(&CacheKey::AllPosts).await;
        if let Some(mut posts) = cached {
            match posts.iter().position(|p| p.id == post.id) {
                Some(i) => posts[i] = post.clone(),
                None => posts.insert(0, post.clone()),
            }
            self.cache.put(&CacheKey::AllPosts, &posts, self.ttl).await?;
        }

        self.cache.invalidate_family(KeyFamily::PagedPosts).await;
        Ok(())
    }

    async fn cache_updated(
        &self,
        post: &Post,
        previous_slug: &str,
    ) -> std::result::Result<(), CacheError> {
        if previous_slug != post.slug {
            self.cache
                .delete(&CacheKey::PostBySlug(previous_slug.to_string()))
                .await;
        }
        self.cache_post(post).await?;

        let cached: Option<Vec<Post>> = self.cache.get(&CacheKey::AllPosts).await;
        if let Some(mut posts) = cached {
            if let Some(slot) = posts.iter_mut().find(|p| p.id == post.id) {
                *slot = post.clone();
                self.cache.put(&CacheKey::AllPosts, &posts, self.ttl).await?;
            } else {
                // Cached list predates the post; let the next read rebuild it.
                self.cache.delete(&CacheKey::AllPosts).await;
            }
        }

        self.cache.invalidate_family(KeyFamily::PagedPosts).await;
        Ok(())
    }

    async fn cache_deleted(&self, post: &Post) -> std::result::Result<(), CacheError> {
        self.cache.delete(&CacheKey::PostById(post.id)).await;
        self.cache
            .delete(&CacheKey::PostBySlug(post.slug.clone()))
            .await;

        let cached: Option<Vec<Post>> = self.cache.get(&CacheKey::AllPosts).await;
        if let Some(mut posts) = cached {
            let before = posts.len();
            posts.retain(|p| p.id != post.id);
            if posts.len() != before {
                self.cache.put(&CacheKey::AllPosts, &posts, self.ttl).await?;
            }
        }

        self.cache.invalidate_family(KeyFamily::PagedPosts).await;
        Ok(())
    }

    /// Full invalidation for one post: both aliases plus every derived view.
    async fn evict(&self, id: Uuid, slugs: &[&str]) {
        self.cache.delete(&CacheKey::PostById(id)).await;
        for slug in slugs {
            self.cache
                .delete(&CacheKey::PostBySlug((*slug).to_string()))
                .await;
        }
        self.invalidate_all_posts().await;
    }
}

impl std::fmt::Debug for ContentCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCacheService")
            .field("cache", &self.cache.name())
            .field("ttl", &self.ttl)
            .field("preview_max_length", &self.preview_max_length)
            .field("read_strategy", &self.read_strategy)
            .field("write_strategy", &self.write_strategy)
            .finish_non_exhaustive()
    }
}

fn published_only(posts: Vec<Post>) -> Vec<Post> {
    posts.into_iter().filter(|p| p.is_published).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheBackend, MemoryCacheBackend, NullCacheBackend, PingResult};
    use crate::repository::InMemoryPostStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    /// Memory backend that can be told to stop acknowledging writes while
    /// still honoring deletes.
    #[derive(Default)]
    struct RefusingBackend {
        inner: MemoryCacheBackend,
        refuse: AtomicBool,
    }

    #[async_trait]
    impl CacheBackend for RefusingBackend {
        fn name(&self) -> &'static str {
            "refusing"
        }

        fn is_enabled(&self) -> bool {
            true
        }

        async fn get_raw(&self, key: &str) -> Option<String> {
            self.inner.get_raw(key).await
        }

        async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> bool {
            if self.refuse.load(Ordering::SeqCst) {
                return false;
            }
            self.inner.set_raw(key, value, ttl).await
        }

        async fn remove(&self, key: &str) {
            self.inner.remove(key).await;
        }

        async fn exists(&self, key: &str) -> bool {
            self.inner.exists(key).await
        }

        async fn clear(&self, pattern: &str) -> u64 {
            self.inner.clear(pattern).await
        }

        async fn ping(&self) -> PingResult {
            self.inner.ping().await
        }
    }

    fn service_with(cache: Arc<MemoryCacheBackend>) -> (ContentCacheService, Arc<InMemoryPostStore>) {
        let store = Arc::new(InMemoryPostStore::new());
        let service = ContentCacheService::new(cache, store.clone(), TTL);
        (service, store)
    }

    #[tokio::test]
    async fn test_strategies_follow_backend() {
        let store = Arc::new(InMemoryPostStore::new());
        let service = ContentCacheService::new(Arc::new(NullCacheBackend::new()), store, TTL);
        assert_eq!(service.read_strategy(), ReadStrategy::StoreOnly);
        assert_eq!(service.write_strategy(), WriteStrategy::StoreOnly);

        let (service, _) = service_with(Arc::new(MemoryCacheBackend::new()));
        assert_eq!(service.read_strategy(), ReadStrategy::CacheAside);
        assert_eq!(service.write_strategy(), WriteStrategy::WriteThrough);
    }

    #[tokio::test]
    async fn test_create_populates_both_aliases() {
        let cache = Arc::new(MemoryCacheBackend::new());
        let (service, _) = service_with(cache.clone());

        let post = service
            .create(PostDraft::new("Cache Notes", "<p>body</p>"), 150)
            .await
            .unwrap();

        let by_id: Option<Post> = cache.get(&CacheKey::PostById(post.id)).await;
        let by_slug: Option<Post> = cache.get(&CacheKey::PostBySlug(post.slug.clone())).await;
        assert_eq!(by_id.as_ref(), Some(&post));
        assert_eq!(by_slug.as_ref(), Some(&post));
        assert!(!cache.exists(&CacheKey::AllPosts.to_string()).await);
    }

    #[tokio::test]
    async fn test_create_merges_into_cached_list() {
        let cache = Arc::new(MemoryCacheBackend::new());
        let (service, _) = service_with(cache.clone());

        let first = service.create(PostDraft::new("First Post", "a"), 150).await.unwrap();
        assert_eq!(service.get_all().await.unwrap(), vec![first.clone()]);

        let second = service.create(PostDraft::new("Second Post", "b"), 150).await.unwrap();
        let cached: Option<Vec<Post>> = cache.get(&CacheKey::AllPosts).await;
        assert_eq!(cached, Some(vec![second, first]));
    }

    #[tokio::test]
    async fn test_update_without_title_change_keeps_slug() {
        let cache = Arc::new(MemoryCacheBackend::new());
        let (service, _) = service_with(cache);

        let post = service.create(PostDraft::new("Stable Title", "old"), 150).await.unwrap();
        let updated = service
            .update(post.id, PostPatch::default().title("Stable Title").content("new"))
            .await
            .unwrap();

        assert_eq!(updated.slug, post.slug);
        assert_eq!(updated.content_preview, "new");
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_missing_post_is_not_found() {
        let (service, _) = service_with(Arc::new(MemoryCacheBackend::new()));
        let err = service
            .update(Uuid::new_v4(), PostPatch::default().content("x"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rejected_write_falls_back_to_invalidation() {
        let backend = Arc::new(RefusingBackend::default());
        let store = Arc::new(InMemoryPostStore::new());
        let service = ContentCacheService::new(backend.clone(), store, TTL);

        let post = service.create(PostDraft::new("Fallback Path", "a"), 150).await.unwrap();
        service.get_all().await.unwrap();
        service.get_paged(1, 10).await.unwrap();
        assert_eq!(backend.inner.len(), 4);

        backend.refuse.store(true, Ordering::SeqCst);
        service
            .update(post.id, PostPatch::default().content("b"))
            .await
            .unwrap();

        assert!(backend.inner.is_empty());

        backend.refuse.store(false, Ordering::SeqCst);
        let fresh = service.get_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(fresh.content, "b");
    }

    #[tokio::test]
    async fn test_rejected_create_drops_derived_views() {
        let backend = Arc::new(RefusingBackend::default());
        let store = Arc::new(InMemoryPostStore::new());
        let service = ContentCacheService::new(backend.clone(), store, TTL);

        let first = service.create(PostDraft::new("Early Post", "a"), 150).await.unwrap();
        service.get_all().await.unwrap();
        service.get_paged(1, 10).await.unwrap();
        assert_eq!(backend.inner.len(), 4);

        backend.refuse.store(true, Ordering::SeqCst);
        let second = service.create(PostDraft::new("Late Post", "b"), 150).await.unwrap();

        assert!(!backend.inner.exists(&CacheKey::PostById(second.id).to_string()).await);
        assert!(!backend.inner.exists(&CacheKey::AllPosts.to_string()).await);
        assert!(backend.inner.keys().iter().all(|k| !k.starts_with("posts:paged:")));

        backend.refuse.store(false, Ordering::SeqCst);
        let all = service.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&first) && all.contains(&second));
    }

    #[tokio::test]
    async fn test_rejected_delete_drops_cached_post() {
        let backend = Arc::new(RefusingBackend::default());
        let store = Arc::new(InMemoryPostStore::new());
        let service = ContentCacheService::new(backend.clone(), store, TTL);

        let keep = service.create(PostDraft::new("Keeper", "a"), 150).await.unwrap();
        let gone = service.create(PostDraft::new("Goner", "b"), 150).await.unwrap();
        service.get_all().await.unwrap();

        backend.refuse.store(true, Ordering::SeqCst);
        service.delete(gone.id).await.unwrap();

        assert!(!backend.inner.exists(&CacheKey::PostById(gone.id).to_string()).await);
        assert!(!backend.inner.exists(&CacheKey::PostBySlug(gone.slug.clone()).to_string()).await);
        assert!(!backend.inner.exists(&CacheKey::AllPosts.to_string()).await);

        backend.refuse.store(false, Ordering::SeqCst);
        assert_eq!(service.get_all().await.unwrap(), vec![keep]);
        assert!(service.get_by_slug(&gone.slug).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalidate_family_counts_removed_keys() {
        let cache = Arc::new(MemoryCacheBackend::new());
        let (service, _) = service_with(cache.clone());

        service.create(PostDraft::new("Counted Post", "a"), 150).await.unwrap();
        service.get_paged(1, 10).await.unwrap();
        service.get_paged(2, 10).await.unwrap();
        service.get_all().await.unwrap();

        assert_eq!(service.invalidate_family(KeyFamily::PagedPosts).await, 2);
        assert_eq!(service.invalidate_family(KeyFamily::AllPosts).await, 1);
        assert_eq!(service.invalidate_family(KeyFamily::AllPosts).await, 0);
    }
}
