//! Slug generation for post permalinks.
//!
//! A base slug is the slugified `"{date}-{title}"`. When the base collides
//! with an existing post, a short SHA-256-derived suffix is appended instead
//! of reusing the taken slug.

use std::future::Future;

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::DomainError;

/// Candidates tried after the base slug before giving up.
const MAX_SUFFIX_ATTEMPTS: usize = 8;

/// Hex digits kept from the digest.
const SUFFIX_LEN: usize = 6;

/// Errors from slug generation with an async uniqueness check.
#[derive(Debug, thiserror::Error)]
pub enum SlugAsyncError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] DomainError),
    #[error(transparent)]
    Predicate(E),
}

/// Derive the base slug for `title` published on `date`.
pub fn derive_slug(title: &str, date: NaiveDate) -> Result<String, DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::EmptyTitle);
    }

    let candidate = ::slug::slugify(format!("{}-{title}", date.format("%Y-%m-%d")));
    let has_title_part = candidate.len() > "yyyy-mm-dd".len();

    if !has_title_part {
        return Err(DomainError::UnrepresentableSlug {
            input: title.to_string(),
        });
    }

    Ok(candidate)
}

/// Append a hash suffix to `base`.
///
/// The digest mixes the attempt number with a random nonce so two writers
/// racing on the same title do not derive the same candidate.
fn disambiguate(base: &str, attempt: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(base.as_bytes());
    hasher.update(attempt.to_le_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("{base}-{}", &digest[..SUFFIX_LEN])
}

/// Produce a slug that `is_taken` reports as free.
///
/// `is_taken` is typically a store lookup; its errors are passed through
/// untouched as [`SlugAsyncError::Predicate`].
pub async fn generate_unique_slug<F, Fut, E>(
    title: &str,
    date: NaiveDate,
    mut is_taken: F,
) -> Result<String, SlugAsyncError<E>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(title, date)?;

    if !is_taken(base.clone()).await.map_err(SlugAsyncError::Predicate)? {
        return Ok(base);
    }

    for attempt in 1..=MAX_SUFFIX_ATTEMPTS {
        let candidate = disambiguate(&base, attempt);
        if !is_taken(candidate.clone())
            .await
            .map_err(SlugAsyncError::Predicate)?
        {
            return Ok(candidate);
        }
    }

    Err(DomainError::SlugExhausted { base }.into())
}
