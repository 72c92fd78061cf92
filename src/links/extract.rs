// src/links/extract.rs
// =============================================================================
// Pulls http/https links out of free-form PR descriptions.
//
// PR bodies are mostly markdown, but we deliberately do NOT parse markdown
// here: a link is anything that starts with http:// or https:// and runs up
// to the first whitespace or bracket-ish delimiter. Whether the result is a
// real URL is the classifier's problem.
// =============================================================================

use regex::Regex;
use std::sync::LazyLock;

// Characters that end a link: whitespace plus the markdown/HTML brackets
// and the inline-code backtick.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>()\[\]`]+").expect("link pattern is valid"));

/// Returns every link in `text`, in the order they appear.
///
/// Duplicates are kept. `None` and empty text give an empty vector.
///
/// Example:
///   "see [shot](https://example.com/a.png)" -> ["https://example.com/a.png"]
pub fn extract_links(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };

    LINK_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
