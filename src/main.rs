// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Fill in whatever is missing (repo, token) by asking on the terminal
// 3. Run the scan: page through PRs, classify links, append to CSV
// 4. Print a summary, or the error that stopped us
//
// Rust concepts used:
// - async/await: many HEAD requests are in flight at once
// - Result<T, E> and `?`: errors bubble up to main and are printed once
// =============================================================================

mod cli;
mod config;
mod error;
mod github;
mod links;
mod output;
mod scan;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::Settings;
use links::HttpClassifier;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::resolve(cli)?;
    tracing::debug!(?settings, "resolved settings");

    let classifier = HttpClassifier::new(settings.probe_timeout)
        .context("Failed to build the HTTP client for link probes")?;

    println!("🔍 Scanning pull requests of {}", settings.repo);

    let summary = scan::run_scan(&settings, &classifier).await?;

    println!(
        "✅ Finished! Total links saved for {}: {} -> {}",
        settings.repo,
        summary.links,
        summary.output.display()
    );
    println!(
        "   📄 {} pull request(s) across {} page(s)",
        summary.pull_requests, summary.pages
    );

    Ok(())
}

// Logs go to stderr so stdout stays the progress report.
// RUST_LOG wins over -v when it is set.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pr_media_scan={default_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
