// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Everything is optional on the command line: whatever is missing (the
// repository, the token) gets asked for interactively in config.rs.
//
// Rust concepts:
// - Derive macros: clap generates the parser from the struct
// - Option<T>: "the user may not have passed this"
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

use crate::github::{DEFAULT_API_URL, DEFAULT_PAGE_SIZE};

// #[derive(Parser)] tells clap to automatically generate parsing code
#[derive(Parser, Debug)]
#[command(
    name = "pr-media-scan",
    version,
    about = "Inventory the media links found in a GitHub repository's pull request descriptions",
    long_about = "pr-media-scan walks every pull request of a repository, pulls the links out of \
                  each description, works out what kind of media each link points at, and \
                  appends the results to <owner>_<name>.csv page by page."
)]
pub struct Cli {
    /// Repository to scan (e.g., rust-lang/rust or https://github.com/rust-lang/rust)
    ///
    /// Prompted for when omitted
    pub repo: Option<String>,

    /// GitHub token used for the GraphQL API
    ///
    /// Read from GITHUB_TOKEN when not given; prompted for when neither is set
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Maximum number of links classified at the same time
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,

    /// Seconds to wait for each link's HEAD request
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Pull requests fetched per API page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: u32,

    /// Directory the CSV file is written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// GraphQL endpoint
    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
