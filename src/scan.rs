// src/scan.rs
// =============================================================================
// Drives a whole scan, one page of pull requests at a time:
//
//   fetch page -> extract links -> classify (concurrently) -> append to CSV
//
// A page is fully written before the next one is requested, so a crash
// loses at most the page that was in progress.
// =============================================================================

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::github::{api_client, PullRequest, PullRequestPager};
use crate::links::{classify_batch, extract_links, Classifier, ExtractedLink};
use crate::output::CsvSink;

/// Totals for a finished scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub pages: usize,
    pub pull_requests: usize,
    pub links: usize,
    pub output: PathBuf,
}

/// Scans every pull request of `settings.repo` and appends the classified
/// links to the repository's CSV file.
///
/// Fails as soon as the GitHub API does; rows from earlier pages stay on disk.
pub async fn run_scan<C>(settings: &Settings, classifier: &C) -> Result<ScanSummary>
where
    C: Classifier + ?Sized,
{
    let sink = CsvSink::open(settings.output_path())?;
    let client = api_client().context("Failed to build the GitHub API client")?;
    let mut pager = PullRequestPager::new(
        client,
        settings.api_url.as_str(),
        settings.token.as_str(),
        settings.repo.clone(),
        settings.page_size,
    );

    let mut summary = ScanSummary {
        pages: 0,
        pull_requests: 0,
        links: 0,
        output: sink.path().to_path_buf(),
    };

    while let Some(records) = pager
        .next_page()
        .await
        .with_context(|| format!("Failed to fetch pull requests for {}", settings.repo))?
    {
        summary.pages += 1;
        summary.pull_requests += records.len();

        let batch = links_in(records);
        if batch.is_empty() {
            continue;
        }

        let rows = classify_batch(classifier, &settings.repo, batch, settings.concurrency).await;
        let saved = sink.append(&rows)?;
        summary.links += saved;

        info!(page = summary.pages, saved, total = summary.links, "flushed batch");
        println!("Saved {} links (total so far: {})", saved, summary.links);
    }

    Ok(summary)
}

// Every link of every PR on the page, each tagged with its PR.
fn links_in(records: Vec<PullRequest>) -> Vec<ExtractedLink> {
    records
        .into_iter()
        .flat_map(|record| {
            let links = extract_links(record.body.as_deref());
            let origin = Arc::new(record);
            links.into_iter().map(move |link| ExtractedLink {
                origin: Arc::clone(&origin),
                link,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::HttpClassifier;
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer, output_dir: &std::path::Path) -> Settings {
        Settings {
            repo: "octo/widgets".parse().unwrap(),
            token: "secret-token".to_string(),
            api_url: format!("{}/graphql", server.uri()),
            page_size: 50,
            concurrency: 20,
            probe_timeout: Duration::from_secs(2),
            output_dir: output_dir.to_path_buf(),
        }
    }

    // Sends media.test and github.com to the mock server's address. Nothing
    // listens on 443 there, so github.com probes fail fast and fall back.
    fn classifier_for(server: &MockServer) -> HttpClassifier {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .resolve("media.test", *server.address())
            .resolve("github.com", *server.address())
            .build()
            .unwrap();
        HttpClassifier::with_client(client)
    }

    fn page(has_next: bool, cursor: Option<&str>, nodes: Value) -> Value {
        json!({
            "data": {
                "repository": {
                    "pullRequests": {
                        "pageInfo": { "hasNextPage": has_next, "endCursor": cursor },
                        "nodes": nodes
                    }
                }
            }
        })
    }

    fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        reader
            .records()
            .map(|record| record.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_links_in_keeps_origin() {
        let records = vec![
            PullRequest {
                number: 1,
                title: "One".into(),
                body: Some("a https://a.io/x b https://b.io/y".into()),
            },
            PullRequest {
                number: 2,
                title: "Two".into(),
                body: None,
            },
            PullRequest {
                number: 3,
                title: "Three".into(),
                body: Some("(https://c.io/z)".into()),
            },
        ];

        let links = links_in(records);
        let pairs: Vec<(u64, &str)> = links
            .iter()
            .map(|l| (l.origin.number, l.link.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![(1, "https://a.io/x"), (1, "https://b.io/y"), (3, "https://c.io/z")]
        );
    }

    #[tokio::test]
    async fn test_end_to_end_single_page() {
        let server = MockServer::start().await;
        let port = server.address().port();
        let body = format!("Check this http://media.test:{port}/img.png and https://github.com/x/y");

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                false,
                None,
                json!([{ "number": 12, "title": "Add logo", "body": body }]),
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/img.png"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/png"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(&server, dir.path());

        let summary = run_scan(&settings, &classifier_for(&server)).await.unwrap();

        assert_eq!(summary.pages, 1);
        assert_eq!(summary.pull_requests, 1);
        assert_eq!(summary.links, 2);
        assert_eq!(summary.output, dir.path().join("octo_widgets.csv"));

        let rows = read_rows(&summary.output);
        assert_eq!(rows.len(), 2);

        let image = rows
            .iter()
            .find(|r| r[3].ends_with("/img.png"))
            .expect("image row");
        assert_eq!(image[0], "octo/widgets");
        assert_eq!(image[1], "https://github.com/octo/widgets/pull/12");
        assert_eq!(image[2], "Add logo");
        assert_eq!(image[4], "image");
        assert_eq!(image[5], "false");

        let github = rows
            .iter()
            .find(|r| r[3] == "https://github.com/x/y")
            .expect("github row");
        assert_eq!(github[5], "true");
        assert_eq!(github[4], "unknown");
    }

    #[tokio::test]
    async fn test_each_page_is_flushed_and_appended() {
        let server = MockServer::start().await;
        let port = server.address().port();

        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "variables": { "cursor": null } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                true,
                Some("c1"),
                json!([
                    { "number": 1, "title": "First", "body": format!("http://media.test:{port}/a.mp3") },
                    { "number": 2, "title": "No links", "body": "nothing here" }
                ]),
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "variables": { "cursor": "c1" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                false,
                Some("c2"),
                json!([{ "number": 3, "title": "Second", "body": format!("http://media.test:{port}/b.mp4") }]),
            )))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/a.mp3"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "audio/mpeg"))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/b.mp4"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "video/mp4"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(&server, dir.path());
        let classifier = classifier_for(&server);

        let first = run_scan(&settings, &classifier).await.unwrap();
        assert_eq!(first.pages, 2);
        assert_eq!(first.pull_requests, 3);
        assert_eq!(first.links, 2);

        let rows = read_rows(&first.output);
        let media: Vec<&str> = rows.iter().map(|r| r[4].as_str()).collect();
        assert_eq!(media, vec!["audio", "video"]);

        let contents = std::fs::read_to_string(&first.output).unwrap();
        assert_eq!(contents.matches("repo,pr_link").count(), 1);
    }

    #[tokio::test]
    async fn test_repository_without_links_leaves_header_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                false,
                None,
                json!([{ "number": 1, "title": "Empty", "body": null }]),
            )))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(&server, dir.path());

        let summary = run_scan(&settings, &classifier_for(&server)).await.unwrap();

        assert_eq!(summary.links, 0);
        let contents = std::fs::read_to_string(&summary.output).unwrap();
        assert_eq!(contents, "repo,pr_link,pr_title,link,media_type,isGithub\n");
    }

    #[tokio::test]
    async fn test_api_error_stops_the_run_after_flushed_pages() {
        let server = MockServer::start().await;
        let port = server.address().port();

        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "variables": { "cursor": null } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                true,
                Some("c1"),
                json!([{ "number": 1, "title": "Kept", "body": format!("http://media.test:{port}/a.png") }]),
            )))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "variables": { "cursor": "c1" } })))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "image/png"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(&server, dir.path());

        let err = run_scan(&settings, &classifier_for(&server))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("502"));

        let rows = read_rows(&settings.output_path());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][2], "Kept");
    }
}
