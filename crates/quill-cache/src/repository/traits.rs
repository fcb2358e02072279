//! # Repository Traits
//!
//! The narrow store contract the cache orchestrator consumes. The store is
//! the single source of truth; implementations decide how conflicts resolve
//! (last write wins at the store).

use async_trait::async_trait;
use quill_domain::{NewPost, PageRequest, Post, PostPage};
use uuid::Uuid;

use crate::error::Result;

// =============================================================================
// POST STORE
// =============================================================================

/// Durable post storage.
///
/// Reads only ever return published posts; `delete` is a soft delete that
/// clears the published flag.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Get a published post by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Post>>;

    /// Get a published post by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Get every published post, newest first
    async fn get_all(&self) -> Result<Vec<Post>>;

    /// Get one window of published posts plus the total count
    async fn get_paged(&self, window: PageRequest) -> Result<PostPage>;

    /// Persist a new post; the store assigns the id
    async fn create(&self, post: NewPost) -> Result<Post>;

    /// Replace the stored post
    async fn update(&self, id: Uuid, post: &Post) -> Result<Post>;

    /// Mark the post unpublished
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Whether a published post already uses `slug`
    async fn slug_exists(&self, slug: &str) -> Result<bool>;
}
