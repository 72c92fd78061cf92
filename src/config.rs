// src/config.rs
// =============================================================================
// Turns the parsed command line into the settings a scan runs with.
//
// The repository and token may be missing from the command line; in that
// case we ask for them on the terminal, the token without echo.
// =============================================================================

use anyhow::{bail, Context, Result};
use dialoguer::{Input, Password};
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::github::RepoId;

/// Everything a scan needs, fully resolved.
#[derive(Clone)]
pub struct Settings {
    pub repo: RepoId,
    pub token: String,
    pub api_url: String,
    pub page_size: u32,
    pub concurrency: usize,
    pub probe_timeout: Duration,
    pub output_dir: PathBuf,
}

impl Settings {
    /// Resolves settings, prompting for anything the command line left out.
    pub fn resolve(cli: Cli) -> Result<Self> {
        let repo: String = match cli.repo.clone() {
            Some(repo) => repo,
            None => Input::new()
                .with_prompt("Enter the repo name (e.g. owner/repo)")
                .interact_text()
                .context("Failed to read the repository name")?,
        };

        let token = match cli.token.clone() {
            Some(token) => token,
            None => Password::new()
                .with_prompt("Enter your GitHub token")
                .interact()
                .context("Failed to read the GitHub token")?,
        };

        Self::build(cli, &repo, &token)
    }

    fn build(cli: Cli, repo: &str, token: &str) -> Result<Self> {
        let repo: RepoId = repo.parse()?;

        let token = token.trim().to_string();
        if token.is_empty() {
            bail!("A GitHub token is required (pass --token or set GITHUB_TOKEN)");
        }

        Ok(Self {
            repo,
            token,
            api_url: cli.api_url,
            page_size: cli.page_size,
            concurrency: usize::from(cli.concurrency),
            probe_timeout: Duration::from_secs(cli.timeout_secs),
            output_dir: cli.output_dir,
        })
    }

    /// Full path of the CSV file for this repository.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.repo.output_file_name())
    }
}

// The token must never end up in logs, so Debug is written by hand.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("page_size", &self.page_size)
            .field("concurrency", &self.concurrency)
            .field("probe_timeout", &self.probe_timeout)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}
