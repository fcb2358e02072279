//! Cache key naming.
//!
//! Every key belongs to exactly one [`KeyFamily`]. Bulk invalidation always
//! targets a single family pattern so a clear never scans unrelated keys.

use std::fmt;

use quill_domain::PageRequest;
use uuid::Uuid;

const PREFIX: &str = "posts";

/// A single cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    PostById(Uuid),
    PostBySlug(String),
    AllPosts,
    PagedPosts(PageRequest),
}

impl CacheKey {
    #[must_use]
    pub const fn family(&self) -> KeyFamily {
        match self {
            Self::PostById(_) => KeyFamily::PostById,
            Self::PostBySlug(_) => KeyFamily::PostBySlug,
            Self::AllPosts => KeyFamily::AllPosts,
            Self::PagedPosts(_) => KeyFamily::PagedPosts,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PostById(id) => write!(f, "{PREFIX}:id:{id}"),
            Self::PostBySlug(slug) => write!(f, "{PREFIX}:slug:{slug}"),
            Self::AllPosts => write!(f, "{PREFIX}:all"),
            Self::PagedPosts(window) => {
                write!(f, "{PREFIX}:paged:{}:{}", window.page(), window.size())
            }
        }
    }
}

/// A set of keys invalidated as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    PostById,
    PostBySlug,
    AllPosts,
    PagedPosts,
}

impl KeyFamily {
    pub const ALL: [Self; 4] = [
        Self::PostById,
        Self::PostBySlug,
        Self::AllPosts,
        Self::PagedPosts,
    ];

    /// Glob matching every key of this family and nothing else.
    #[must_use]
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::PostById => "posts:id:*",
            Self::PostBySlug => "posts:slug:*",
            Self::AllPosts => "posts:all",
            Self::PagedPosts => "posts:paged:*",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PostById => "post-by-id",
            Self::PostBySlug => "post-by-slug",
            Self::AllPosts => "all-posts",
            Self::PagedPosts => "paged-posts",
        }
    }
}

impl std::str::FromStr for KeyFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.as_str() == s)
            .ok_or_else(|| format!("unknown key family '{s}'"))
    }
}
