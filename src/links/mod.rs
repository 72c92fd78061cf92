// src/links/mod.rs
// =============================================================================
// Everything that happens to a link after it leaves a PR body.
//
// Submodules:
// - extract: finds http(s) links in free-form text
// - classify: decides the media type of one link (HEAD probe + fallback)
// - mime: static extension table used by the fallback
// - dispatch: classifies a whole page of links with bounded concurrency
// =============================================================================

mod classify;
mod dispatch;
mod extract;
mod mime;

pub use classify::{Classifier, HttpClassifier, MediaCategory};
pub use dispatch::{classify_batch, ClassifiedLink, ExtractedLink};
pub use extract::extract_links;
