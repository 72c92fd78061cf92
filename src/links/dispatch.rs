// src/links/dispatch.rs
// =============================================================================
// Classifies one page's worth of links with a cap on concurrent probes.
//
// This is the same trick link-guardian's checker uses: turn the work into a
// stream of futures and let `buffer_unordered(n)` keep at most n of them in
// flight. Results come back in completion order, which is fine because every
// result carries its own PR.
//
// A unit that errors (or even panics) becomes "unknown"; it never takes the
// rest of the batch down with it.
// =============================================================================

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use serde::{Serialize, Serializer};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::classify::{clean_link, Classifier, MediaCategory};
use crate::github::{PullRequest, RepoId};

/// Hosts that count as "the hosting provider" for the isGithub column.
const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// A raw link together with the PR whose body it came from.
#[derive(Debug, Clone)]
pub struct ExtractedLink {
    pub origin: Arc<PullRequest>,
    pub link: String,
}

/// One row of the output table.
///
/// Field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedLink {
    pub repo: String,
    pub pr_link: String,
    pub pr_title: String,
    pub link: String,
    #[serde(serialize_with = "serialize_category")]
    pub media_type: MediaCategory,
    #[serde(rename = "isGithub")]
    pub is_github: bool,
}

impl ClassifiedLink {
    pub fn new(repo: &RepoId, extracted: ExtractedLink, media_type: MediaCategory) -> Self {
        let is_github = is_github_link(&extracted.link);
        Self {
            repo: repo.to_string(),
            pr_link: repo.pull_request_url(extracted.origin.number),
            pr_title: extracted.origin.title.clone(),
            link: extracted.link,
            media_type,
            is_github,
        }
    }
}

fn serialize_category<S: Serializer>(category: &MediaCategory, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(category.as_str())
}

/// True when the link's host is github.com itself.
///
/// Subdomains such as gist.github.com or raw.githubusercontent.com don't count.
pub fn is_github_link(link: &str) -> bool {
    Url::parse(clean_link(link))
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| GITHUB_HOSTS.contains(&host.as_str()))
}

/// Classifies every link in `batch`, at most `concurrency` at a time.
///
/// Returns once every unit has finished; the output is in completion order
/// and has exactly one row per input link.
pub async fn classify_batch<C>(
    classifier: &C,
    repo: &RepoId,
    batch: Vec<ExtractedLink>,
    concurrency: usize,
) -> Vec<ClassifiedLink>
where
    C: Classifier + ?Sized,
{
    let units = batch.into_iter().map(move |extracted| async move {
        let outcome = AssertUnwindSafe(classifier.classify(&extracted.link))
            .catch_unwind()
            .await;
        (extracted, outcome)
    });

    stream::iter(units)
        .buffer_unordered(concurrency.max(1))
        .map(|(extracted, outcome)| {
            let media_type = match outcome {
                Ok(Ok(category)) => category,
                Ok(Err(e)) => {
                    debug!(error = %e, "classification failed");
                    MediaCategory::Unknown
                }
                Err(_) => {
                    debug!(link = %extracted.link, "classifier panicked");
                    MediaCategory::Unknown
                }
            };
            ClassifiedLink::new(repo, extracted, media_type)
        })
        .collect()
        .await
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Arc<PullRequest>?
//    - One PR body usually holds several links
//    - Arc lets every ExtractedLink point at the same PR without copying
//      its title around
//
// 2. Why catch_unwind?
//    - A panic inside one classification would otherwise tear down the
//      whole batch
//    - AssertUnwindSafe tells the compiler we accept that the classifier
//      may be left half-way through a call
//
// 3. Why `?Sized` on C?
//    - So callers can pass a `&dyn Classifier` as well as a concrete type
// -----------------------------------------------------------------------------
