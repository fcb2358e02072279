//! Plain-text previews of post bodies.

use std::sync::LazyLock;

use regex::Regex;

/// Preview length used when the caller does not pick one.
pub const DEFAULT_PREVIEW_MAX_LENGTH: usize = 150;

/// Appended to previews that were cut short.
pub const PREVIEW_ELLIPSIS: &str = "...";

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("<.*?>").expect("tag pattern is a valid regex"));

/// Strip markup from `content` and keep at most `max_chars` characters.
///
/// Truncation counts characters, not bytes, so multi-byte text is never
/// split mid-codepoint.
#[must_use]
pub fn generate_preview(content: &str, max_chars: usize) -> String {
    if content.is_empty() {
        return String::new();
    }

    let text = TAG_PATTERN.replace_all(content, "");
    if text.chars().count() <= max_chars {
        return text.into_owned();
    }

    let mut preview: String = text.chars().take(max_chars).collect();
    preview.push_str(PREVIEW_ELLIPSIS);
    preview
}
