//! Gongmo main entry point
//!
//! This is the command-line interface for the Gongmo contest listing extractor.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gongmo::config::{load_config_with_hash, Config};
use gongmo::output::{
    load_statistics, print_statistics, summarize_entries, write_json_line, write_json_lines,
};
use gongmo::record::{partition_entries, Source};
use gongmo::storage::{open_storage, ListingStore};
use gongmo::CrawlSession;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Gongmo: contest listing extractor
///
/// Gongmo crawls the contest listings of allforyoung.com and wevity.com
/// into normalized records, and extracts full contest detail pages on
/// demand. Records are written to stdout as JSON lines.
#[derive(Parser, Debug)]
#[command(name = "gongmo")]
#[command(version)]
#[command(about = "A contest listing extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl listing pages and print one JSON line per record or failed page
    Listing {
        /// Site to crawl: allforyoung or wevity (the source tag also works)
        #[arg(short, long, default_value = "allforyoung")]
        source: String,

        /// First page to fetch
        #[arg(long, default_value_t = 1)]
        start: u32,

        /// Number of pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Upsert the records into the configured database
        #[arg(long)]
        store: bool,
    },

    /// Fetch one contest detail page and print it as JSON
    Detail {
        /// Site the contest belongs to
        #[arg(short, long)]
        source: String,

        /// Numeric contest id
        id: String,
    },

    /// Show statistics from the database and exit
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_config_with_hash(cli.config.as_deref())
        .context("Failed to load configuration")?;
    match &cli.config {
        Some(path) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            config_hash
        ),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    match cli.command {
        Command::Listing {
            source,
            start,
            pages,
            store,
        } => {
            let source = parse_source(&source)?;
            handle_listing(&config, &config_hash, source, start, pages, store).await
        }
        Command::Detail { source, id } => {
            let source = parse_source(&source)?;
            handle_detail(&config, source, &id).await
        }
        Command::Stats => handle_stats(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only JSON lines.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gongmo=info,warn"),
            1 => EnvFilter::new("gongmo=debug,info"),
            2 => EnvFilter::new("gongmo=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn parse_source(value: &str) -> Result<Source> {
    value
        .parse::<Source>()
        .with_context(|| format!("Expected one of: allforyoung, wevity (got {:?})", value))
}

/// Handles the listing command: crawls pages and optionally stores records
async fn handle_listing(
    config: &Config,
    config_hash: &str,
    source: Source,
    start: u32,
    pages: u32,
    store: bool,
) -> Result<()> {
    let mut session = CrawlSession::new(config).context("Failed to start crawl session")?;

    let mut storage = if store {
        let storage = open_storage(Path::new(&config.output.database_path))
            .with_context(|| format!("Failed to open {}", config.output.database_path))?;
        Some(storage)
    } else {
        None
    };
    let run_id = match storage.as_mut() {
        Some(storage) => Some(storage.create_run(config_hash, source)?),
        None => None,
    };

    let run = session.crawl_listing_run(source, start, pages).await;
    drop(session);
    let entries = run.entries;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_json_lines(&mut out, &entries)?;

    let summary = summarize_entries(&entries, run.pages);
    tracing::info!(
        "Crawled {} pages: {} records, {} failed pages",
        summary.pages,
        summary.records,
        summary.errors
    );

    if let (Some(storage), Some(run_id)) = (storage.as_mut(), run_id) {
        let (records, _) = partition_entries(&entries);
        let records: Vec<_> = records.into_iter().cloned().collect();
        let outcome = storage.upsert_listings(&records)?;
        storage.complete_run(run_id, &summary)?;
        tracing::info!(
            "Stored {} new and {} updated records in {}",
            outcome.inserted,
            outcome.updated,
            config.output.database_path
        );
    }

    Ok(())
}

/// Handles the detail command: prints the record, or exits non-zero when absent
async fn handle_detail(config: &Config, source: Source, id: &str) -> Result<()> {
    let mut session = CrawlSession::new(config).context("Failed to start crawl session")?;

    match session.fetch_detail(source, id).await {
        Some(detail) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_json_line(&mut out, &detail)?;
            out.flush()?;
            Ok(())
        }
        None => anyhow::bail!("No detail record for {} id {}", source, id),
    }
}

/// Handles the stats command: shows statistics from the database
fn handle_stats(config: &Config) -> Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("Failed to open {}", config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}
