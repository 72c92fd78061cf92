// src/error.rs
// =============================================================================
// Error types shared across the scan.
//
// Two very different kinds of failure exist:
// - QueryError: the GitHub API said no. The whole run stops.
// - ProbeError / ClassifyError: one link could not be probed or classified.
//   These never stop the run; the link is recorded as "unknown" instead.
//
// Everything above the scan driver uses anyhow, so these types mostly exist
// to let the lower layers say precisely what went wrong.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

/// Fatal failures of the paginated GraphQL query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The request never produced a response (connection, TLS, bad JSON...)
    #[error("GitHub API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("GitHub API returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The payload carried an `errors` list
    #[error("GitHub API reported errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// A 2xx response with no repository data in it
    #[error("GitHub API response contained no repository data")]
    MissingData,
}

/// A HEAD probe that did not yield a response.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Per-link failure surfaced by a classifier to the dispatcher.
#[derive(Debug, Error)]
#[error("could not classify {link}: {reason}")]
pub struct ClassifyError {
    pub link: String,
    pub reason: String,
}
