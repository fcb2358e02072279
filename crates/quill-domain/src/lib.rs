//! # Quill Content API - Domain Model
//!
//! Core entities and value objects for the post catalogue served by the
//! content API. These types are shared by the cache layer, the store
//! contract, and anything that renders posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod preview;
pub mod permalink;

pub use preview::{DEFAULT_PREVIEW_MAX_LENGTH, PREVIEW_ELLIPSIS, generate_preview};
pub use permalink::{SlugAsyncError, derive_slug, generate_unique_slug};

// =============================================================================
// ENTITIES
// =============================================================================

/// A published (or soft-deleted) post.
///
/// `id` never changes once the store assigns it. `slug` is regenerated when
/// the title changes, so readers must never assume it is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub content_preview: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub published_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_published: bool,
}

/// A post ready to be persisted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub content_preview: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub published_at: DateTime<Utc>,
    pub is_published: bool,
}

impl NewPost {
    /// Attach a store-generated id.
    #[must_use]
    pub fn into_post(self, id: Uuid) -> Post {
        Post {
            id,
            slug: self.slug,
            title: self.title,
            content: self.content,
            content_preview: self.content_preview,
            author_id: self.author_id,
            author_name: self.author_name,
            published_at: self.published_at,
            updated_at: None,
            is_published: self.is_published,
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Author-supplied input for a new post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author_id: Uuid::nil(),
            author_name: String::new(),
        }
    }

    #[must_use]
    pub fn with_author(mut self, author_id: Uuid, author_name: impl Into<String>) -> Self {
        self.author_id = author_id;
        self.author_name = author_name.into();
        self
    }

    /// Reject drafts that cannot produce a slug.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::EmptyTitle);
        }
        Ok(())
    }
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        match &self.title {
            Some(title) if title.trim().is_empty() => Err(DomainError::EmptyTitle),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 20;

/// A normalized pagination window (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Clamp raw input into a valid window.
    ///
    /// Page numbers below 1 become 1, a zero size falls back to the default,
    /// and sizes above [`MAX_PAGE_SIZE`] are capped.
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        let page = page.max(DEFAULT_PAGE_NUMBER);
        let size = match size {
            0 => DEFAULT_PAGE_SIZE,
            s => s.min(MAX_PAGE_SIZE),
        };
        Self { page, size }
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of items preceding this window.
    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.page as usize - 1) * self.size as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE)
    }
}

/// One pagination window plus the total number of published posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPage {
    pub items: Vec<Post>,
    pub total_count: u64,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Post title must not be empty")]
    EmptyTitle,

    #[error("Cannot derive a slug from '{input}'")]
    UnrepresentableSlug { input: String },

    #[error("Exhausted attempts to find a unique slug for '{base}'")]
    SlugExhausted { base: String },
}
