// src/github/mod.rs
// =============================================================================
// This module talks to GitHub.
//
// - repo: parsing "owner/name" (and GitHub URLs) into a RepoId
// - query: paging through pull requests with the GraphQL API
// =============================================================================

mod query;
mod repo;

pub use query::{api_client, PullRequest, PullRequestPager, DEFAULT_API_URL, DEFAULT_PAGE_SIZE};
pub use repo::RepoId;
