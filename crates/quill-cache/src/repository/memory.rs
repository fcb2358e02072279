//! In-process post store.
//!
//! Behaves like the SQL store the API runs against: published-only reads,
//! newest first, soft deletes. It can be switched into a failing mode to
//! exercise store-error propagation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use quill_domain::{NewPost, PageRequest, Post, PostPage};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::PostStore;
use crate::error::{Result, StoreError};

/// Post store backed by a vector in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryPostStore {
    posts: RwLock<Vec<Post>>,
    failing: AtomicBool,
    reads: AtomicU64,
}

impl InMemoryPostStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records.
    #[must_use]
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: RwLock::new(posts),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail with a persistence error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of read calls served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence("post store unavailable".to_string()));
        }
        Ok(())
    }

    fn begin_read(&self) -> Result<()> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn published_newest_first(posts: &[Post]) -> Vec<Post> {
        let mut published: Vec<Post> = posts
            .iter()
            .rev()
            .filter(|p| p.is_published)
            .cloned()
            .collect();
        published.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        published
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        self.begin_read()?;
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == id && p.is_published).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        self.begin_read()?;
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .find(|p| p.slug == slug && p.is_published)
            .cloned())
    }

    async fn get_all(&self) -> Result<Vec<Post>> {
        self.begin_read()?;
        let posts = self.posts.read().await;
        Ok(Self::published_newest_first(&posts))
    }

    async fn get_paged(&self, window: PageRequest) -> Result<PostPage> {
        self.begin_read()?;
        let posts = self.posts.read().await;
        let published = Self::published_newest_first(&posts);
        let total_count = published.len() as u64;

        let items = published
            .into_iter()
            .skip(window.offset())
            .take(window.size() as usize)
            .collect();

        Ok(PostPage { items, total_count })
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        self.check()?;
        let created = post.into_post(Uuid::now_v7());
        self.posts.write().await.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, post: &Post) -> Result<Post> {
        self.check()?;
        let mut posts = self.posts.write().await;
        let slot = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::post_not_found(id))?;

        *slot = Post {
            id,
            ..post.clone()
        };
        Ok(slot.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.check()?;
        let mut posts = self.posts.write().await;
        let slot = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::post_not_found(id))?;

        slot.is_published = false;
        slot.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        self.begin_read()?;
        let posts = self.posts.read().await;
        Ok(posts.iter().any(|p| p.slug == slug && p.is_published))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_post(title: &str, minutes_ago: i64) -> NewPost {
        NewPost {
            slug: title.to_lowercase(),
            title: title.to_string(),
            content: String::new(),
            content_preview: String::new(),
            author_id: Uuid::nil(),
            author_name: "ana".to_string(),
            published_at: Utc::now() - Duration::minutes(minutes_ago),
            is_published: true,
        }
    }

    #[tokio::test]
    async fn test_paging_is_newest_first() {
        let store = InMemoryPostStore::new();
        for (i, title) in ["a", "b", "c"].into_iter().enumerate() {
            store.create(new_post(title, 10 - i as i64)).await.unwrap();
        }

        let page = store.get_paged(PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(page.total_count, 3);
        let titles: Vec<_> = page.items.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["c", "b"]);

        let page = store.get_paged(PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_post() {
        let store = InMemoryPostStore::new();
        let post = store.create(new_post("gone", 0)).await.unwrap();

        store.delete(post.id).await.unwrap();
        assert!(store.get_by_id(post.id).await.unwrap().is_none());
        assert!(!store.slug_exists("gone").await.unwrap());
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found() {
        let store = InMemoryPostStore::new();
        let err = store.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let store = InMemoryPostStore::new();
        store.set_failing(true);
        assert!(matches!(
            store.get_all().await,
            Err(StoreError::Persistence(_))
        ));
    }
}
