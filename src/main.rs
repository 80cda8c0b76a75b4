//! fbarc — archive a Facebook user's public activity.
//!
//! Harvests posts, photos, videos, likes and recursive comment threads
//! through the paginated Graph API into per-entity JSON records plus
//! line-oriented index files, then reconciles separately-downloaded media
//! against those records to build one archive folder per item. Runs are
//! sequential and fail-fast: nothing is retried, and every run re-harvests
//! from scratch.

#![warn(clippy::all)]

mod cli;
mod config;
mod graph;
mod harvest;
mod pack;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config::Config::from_cli(cli);
    tracing::debug!("{config:?}");

    if config.pack_only() {
        let report = pack::run(&config)?;
        print_report(&report);
        return Ok(());
    }

    let user = config
        .user
        .clone()
        .context("must provide a Facebook user name or id to harvest, e.g. `fbarc richardlehane`")?;
    let app_id = config
        .app_id
        .as_deref()
        .context("Graph app id required: set FB_APP_ID or pass --app-id")?;
    let app_secret = config
        .app_secret
        .as_deref()
        .context("Graph app secret required: set FB_APP_SECRET or pass --app-secret")?;

    let session = graph::GraphClient::new(app_id, app_secret);
    harvest::run(&session, &user, &config).await
}

fn print_report(report: &pack::PackReport) {
    println!(
        "Packed {} records ({} files copied)",
        report.records, report.copies
    );
    if !report.suspicious.is_empty() {
        println!();
        println!("Records with no matching media:");
        for entry in &report.suspicious {
            println!("  {entry}");
        }
    }
    if !report.orphans.is_empty() {
        println!();
        println!("Media never referenced by any record:");
        for path in &report.orphans {
            println!("  {}", path.display());
        }
    }
}
