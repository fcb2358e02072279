//! End-to-end publishing scenarios.

mod common;

use common::{draft, harness};
use quill_domain::{PostDraft, PostPatch};
use tokio_test::assert_ok;

#[tokio::test]
async fn test_preview_and_slug_lookup() {
    let h = harness();

    let post = assert_ok!(
        h.service
            .create(PostDraft::new("Hello World", "<p>Hello World</p>"), 5)
            .await
    );

    assert_eq!(post.content_preview, "Hello...");
    assert_eq!(
        post.slug,
        format!("{}-hello-world", post.published_at.format("%Y-%m-%d"))
    );

    let found = assert_ok!(h.service.get_by_slug(&post.slug).await).unwrap();
    assert_eq!(found.id, post.id);
}

#[tokio::test]
async fn test_duplicate_titles_get_suffixed_slugs() {
    let h = harness();

    let first = assert_ok!(h.service.create(PostDraft::new("Same Title", "a"), 150).await);
    let second = assert_ok!(h.service.create(PostDraft::new("Same Title", "b"), 150).await);

    assert_ne!(first.slug, second.slug);
    let suffix = second
        .slug
        .strip_prefix(&format!("{}-", first.slug))
        .unwrap();
    assert_eq!(suffix.len(), 6);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));

    assert_eq!(
        assert_ok!(h.service.get_by_slug(&second.slug).await).map(|p| p.id),
        Some(second.id)
    );
}

#[tokio::test]
async fn test_paged_total_tracks_new_posts() {
    let h = harness();
    for _ in 0..3 {
        assert_ok!(h.service.create(draft(), 150).await);
    }

    let before = assert_ok!(h.service.get_paged(1, 10).await);
    assert_eq!(before.total_count, 3);

    let fresh = assert_ok!(h.service.create(draft(), 150).await);

    let after = assert_ok!(h.service.get_paged(1, 10).await);
    assert_eq!(after.total_count, 4);
    assert_eq!(after.items.first().map(|p| p.id), Some(fresh.id));
}

#[tokio::test]
async fn test_content_edit_refreshes_preview_only() {
    let h = harness();
    let post = assert_ok!(h.service.create(PostDraft::new("Edit Me", "<b>old</b>"), 150).await);

    let long_body = format!("<p>{}</p>", "word ".repeat(60));
    let updated = assert_ok!(
        h.service
            .update(post.id, PostPatch::default().content(long_body))
            .await
    );

    assert_eq!(updated.slug, post.slug);
    assert_eq!(updated.title, post.title);
    // Default preview length on update
    assert_eq!(updated.content_preview.chars().count(), 150 + 3);
    assert!(updated.content_preview.ends_with("..."));
}
