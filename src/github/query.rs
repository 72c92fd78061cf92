// src/github/query.rs
// =============================================================================
// Walks a repository's pull requests through the GitHub GraphQL API, one
// page at a time.
//
// The API is cursor based: every response tells us whether there is another
// page and which cursor to ask for next. `PullRequestPager` keeps that state
// and only sends the next request when the caller asks for it, so a slow
// consumer never has more than one page in memory.
//
// Any HTTP failure or GraphQL error ends the whole walk. There's no retry.
// =============================================================================

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::repo::RepoId;
use crate::error::QueryError;

pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_PAGE_SIZE: u32 = 50;

const PULL_REQUESTS_QUERY: &str = r#"
query($owner: String!, $name: String!, $cursor: String, $pageSize: Int!) {
  repository(owner: $owner, name: $name) {
    pullRequests(first: $pageSize, after: $cursor, states: [OPEN, MERGED, CLOSED]) {
      pageInfo {
        hasNextPage
        endCursor
      }
      nodes {
        number
        title
        body
      }
    }
  }
}
"#;

// Longest chunk of an error response body we keep in the error message
const MAX_ERROR_BODY: usize = 500;

/// A pull request as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    /// Description text; GitHub sends null for PRs without one
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'static str,
    variables: Variables<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables<'a> {
    owner: &'a str,
    name: &'a str,
    cursor: Option<&'a str>,
    page_size: u32,
}

#[derive(Deserialize)]
struct QueryResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct ResponseData {
    repository: Option<Repository>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Repository {
    pull_requests: PullRequestConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestConnection {
    page_info: PageInfo,
    // Entries can be null when the token may not see a PR
    nodes: Vec<Option<PullRequest>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

/// Builds the HTTP client used for API calls.
///
/// GitHub rejects requests that carry no User-Agent.
pub fn api_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!("pr-media-scan/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Pull-based pager over a repository's pull requests.
///
/// Call [`next_page`](Self::next_page) until it returns `Ok(None)`.
/// Once it has returned an error or `None` it stays exhausted.
pub struct PullRequestPager {
    client: Client,
    endpoint: String,
    token: String,
    repo: RepoId,
    page_size: u32,
    // None until the first response arrives
    cursor: Option<String>,
    has_more: bool,
}

impl PullRequestPager {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        token: impl Into<String>,
        repo: RepoId,
        page_size: u32,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
            repo,
            page_size,
            cursor: None,
            has_more: true,
        }
    }

    /// Fetches the next page, or `Ok(None)` once the server said there are
    /// no more.
    pub async fn next_page(&mut self) -> Result<Option<Vec<PullRequest>>, QueryError> {
        if !self.has_more {
            return Ok(None);
        }

        let connection = match self.fetch().await {
            Ok(connection) => connection,
            Err(e) => {
                self.has_more = false;
                return Err(e);
            }
        };

        let PageInfo {
            has_next_page,
            end_cursor,
        } = connection.page_info;

        // A next page without a cursor would just fetch page one again
        self.has_more = has_next_page && end_cursor.is_some();
        self.cursor = end_cursor;

        let records: Vec<PullRequest> = connection.nodes.into_iter().flatten().collect();
        debug!(
            repo = %self.repo,
            records = records.len(),
            has_more = self.has_more,
            "fetched pull request page"
        );

        Ok(Some(records))
    }

    async fn fetch(&self) -> Result<PullRequestConnection, QueryError> {
        let request = QueryRequest {
            query: PULL_REQUESTS_QUERY,
            variables: Variables {
                owner: &self.repo.owner,
                name: &self.repo.name,
                cursor: self.cursor.as_deref(),
                page_size: self.page_size,
            },
        };

        debug!(repo = %self.repo, cursor = ?self.cursor, "requesting pull request page");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(QueryError::Status { status, body });
        }

        let payload: QueryResponse = response.json().await?;

        if let Some(errors) = payload.errors.filter(|errors| !errors.is_empty()) {
            return Err(QueryError::GraphQl(
                errors.into_iter().map(|e| e.message).collect(),
            ));
        }

        payload
            .data
            .and_then(|data| data.repository)
            .map(|repository| repository.pull_requests)
            .ok_or(QueryError::MissingData)
    }
}
