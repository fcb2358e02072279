//! Shared fixtures for service-level tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use fake::Fake;
use fake::faker::lorem::en::{Paragraph, Words};
use fake::faker::name::en::Name;
use quill_cache::{
    ContentCacheService, InMemoryPostStore, MemoryCacheBackend, SharedCacheBackend,
};
use quill_domain::PostDraft;
use uuid::Uuid;

pub const TTL: Duration = Duration::from_secs(60);

/// Service wired to an in-process cache and store, both inspectable.
pub struct Harness {
    pub service: Arc<ContentCacheService>,
    pub cache: Arc<MemoryCacheBackend>,
    pub store: Arc<InMemoryPostStore>,
}

pub fn harness() -> Harness {
    let cache = Arc::new(MemoryCacheBackend::new());
    let store = Arc::new(InMemoryPostStore::new());
    let service = Arc::new(ContentCacheService::new(cache.clone(), store.clone(), TTL));
    Harness {
        service,
        cache,
        store,
    }
}

/// Service over an arbitrary backend.
pub fn service_over(cache: SharedCacheBackend) -> (ContentCacheService, Arc<InMemoryPostStore>) {
    let store = Arc::new(InMemoryPostStore::new());
    (ContentCacheService::new(cache, store.clone(), TTL), store)
}

/// A draft with a random multi-word title and HTML body.
pub fn draft() -> PostDraft {
    let words: Vec<String> = Words(3..6).fake();
    let paragraph: String = Paragraph(2..4).fake();
    PostDraft::new(words.join(" "), format!("<p>{paragraph}</p>"))
        .with_author(Uuid::new_v4(), Name().fake::<String>())
}
