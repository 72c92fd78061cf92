// src/links/classify.rs
// =============================================================================
// Figures out what kind of media a link points at.
//
// How it works:
// 1. Clean the raw link (whitespace and stray brackets/backticks)
// 2. Refuse loopback hosts and anything that isn't http(s) -> "invalid"
// 3. Send one HEAD request (redirects followed, short timeout) and read
//    the Content-Type header
// 4. If the request fails, guess from the file extension instead
//
// Classification never fails from the caller's point of view: every link
// ends up with some category, "unknown" when nothing else fits.
//
// Rust concepts:
// - Traits: the dispatcher only knows about `Classifier`, not reqwest
// - async-trait: async methods in a trait object-friendly way
// =============================================================================

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::mime::content_type_for_path;
use crate::error::{ClassifyError, ProbeError};

/// Characters the extractor may leave stuck to either end of a link.
const STRAY_DELIMITERS: &[char] = &['`', '[', ']', '(', ')', '<', '>'];

/// Host tokens that are never probed.
const LOOPBACK_TOKENS: &[&str] = &["localhost", "127.0.0.1", "[::1]", "0.0.0.0"];

/// Coarse media bucket recorded in the `media_type` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCategory {
    Image,
    Audio,
    Video,
    Text,
    /// Loopback host or not an http(s) link
    Invalid,
    /// Nothing could be determined
    Unknown,
    /// Primary type token of any other content type, e.g. "application"
    Other(String),
}

impl MediaCategory {
    /// Maps a Content-Type header value to a category.
    ///
    /// Substring checks come first, so "application/xhtml+xml" is text.
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.trim().to_ascii_lowercase();

        if content_type.contains("image") {
            Self::Image
        } else if content_type.contains("audio") {
            Self::Audio
        } else if content_type.contains("video") {
            Self::Video
        } else if content_type.contains("text") || content_type.contains("html") {
            Self::Text
        } else {
            let primary = content_type
                .split(['/', ';'])
                .next()
                .unwrap_or_default()
                .trim();
            if primary.is_empty() {
                Self::Unknown
            } else {
                Self::Other(primary.to_string())
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Text => "text",
            Self::Invalid => "invalid",
            Self::Unknown => "unknown",
            Self::Other(primary) => primary,
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can put a link into a media bucket.
///
/// An `Err` means this one link failed; the dispatcher records it as
/// `MediaCategory::Unknown` and keeps going.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, link: &str) -> Result<MediaCategory, ClassifyError>;
}

/// Classifier backed by real HEAD requests.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
}

impl HttpClassifier {
    /// Builds a classifier whose probes give up after `timeout`.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(concat!("pr-media-scan/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Uses an already configured client (timeouts, DNS overrides...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Runs the full classification for one raw link.
    pub async fn classify_link(&self, raw: &str) -> MediaCategory {
        let link = clean_link(raw);

        if is_loopback(link) || !has_http_scheme(link) {
            return MediaCategory::Invalid;
        }

        match self.probe(link).await {
            Ok(Some(content_type)) => MediaCategory::from_content_type(&content_type),
            Ok(None) => MediaCategory::Unknown,
            Err(e) => {
                debug!(link, error = %e, "probe failed, guessing from extension");
                guess_from_extension(link)
            }
        }
    }

    // One HEAD request. Ok(None) = answered, but without a Content-Type.
    async fn probe(&self, link: &str) -> Result<Option<String>, ProbeError> {
        let response = self.client.head(link).send().await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string);

        Ok(content_type)
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, link: &str) -> Result<MediaCategory, ClassifyError> {
        Ok(self.classify_link(link).await)
    }
}

/// Trims whitespace, then any stray delimiters, from both ends.
pub fn clean_link(raw: &str) -> &str {
    raw.trim().trim_matches(STRAY_DELIMITERS).trim()
}

/// True when the link names a loopback host anywhere in it.
pub fn is_loopback(link: &str) -> bool {
    let lower = link.to_ascii_lowercase();
    LOOPBACK_TOKENS.iter().any(|token| lower.contains(token))
}

fn has_http_scheme(link: &str) -> bool {
    let lower = link.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Category derived from the link's path extension alone.
pub fn guess_from_extension(link: &str) -> MediaCategory {
    let path = path_component(link);

    match content_type_for_path(&path) {
        Some(content_type) => MediaCategory::from_content_type(content_type),
        None => MediaCategory::Unknown,
    }
}

// Path of the link. Falls back to a plain string split when the URL
// does not parse, so "http://bad host/x.png" still has a path.
fn path_component(link: &str) -> String {
    if let Ok(url) = Url::parse(link) {
        return url.path().to_string();
    }

    let after_scheme = link.split_once("://").map_or(link, |(_, rest)| rest);
    let path = after_scheme
        .find('/')
        .map_or("", |start| &after_scheme[start..]);
    path.split(['?', '#']).next().unwrap_or_default().to_string()
}
