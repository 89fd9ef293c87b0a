//! Shelf-Sweep main entry point
//!
//! This is the command-line interface for the Shelf-Sweep catalog crawler.

use anyhow::Context;
use clap::Parser;
use shelf_sweep::config::{load_config_with_hash, Config};
use shelf_sweep::output::print_statistics;
use shelf_sweep::{run_crawl, CrawlOutcome, Interrupt, Progress};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shelf-Sweep: a resumable book-catalog crawler
///
/// Shelf-Sweep walks a paginated book catalog from its oldest page to its
/// newest, downloading each book's PDF and description. Progress is saved
/// on exit, on errors and on Ctrl-C, so the next run picks up where the
/// last one stopped.
#[derive(Parser, Debug)]
#[command(name = "shelf-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A resumable book-catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start from the first page, ignoring stored progress
    #[arg(long)]
    fresh: bool,

    /// Show the effective configuration and stored progress without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, cli.fresh)
    } else {
        handle_crawl(config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_sweep=info,warn"),
            1 => EnvFilter::new("shelf_sweep=debug,info"),
            2 => EnvFilter::new("shelf_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows configuration and where the next run would resume
fn handle_dry_run(config: &Config, fresh: bool) -> anyhow::Result<()> {
    println!("=== Shelf-Sweep Dry Run ===\n");

    println!("Site:");
    println!("  Homepage: {}", config.site.homepage);
    println!("  Page URL template: {}", config.site.page_url_template);
    println!("  User-Agent: {}", config.site.user_agent);
    match config.site.request_timeout_secs {
        Some(secs) => println!("  Request timeout: {}s", secs),
        None => println!("  Request timeout: none"),
    }

    println!("\nPaths:");
    println!("  Progress file: {}", config.paths.progress_file);
    println!("  Blacklist file: {}", config.paths.blacklist_file);
    println!("  Download root: {}", config.paths.download_root);

    println!("\nLog file:");
    println!("  Path: {}", config.logging.log_file);
    println!("  Level: {}", config.logging.level);
    println!("  Timestamps: {}", config.logging.include_time);

    let progress_path = Path::new(&config.paths.progress_file);
    let progress = if fresh {
        Progress::fresh(progress_path, Interrupt::new())
    } else {
        Progress::open(progress_path, Interrupt::new())
            .with_context(|| format!("Failed to read {}", progress_path.display()))?
    };
    let record = progress.record();

    println!("\nStored progress{}:", if fresh { " (ignored, --fresh)" } else { "" });
    println!(
        "  Last book: {}",
        record.last_processed_book_url.as_deref().unwrap_or("(none)")
    );
    println!("  Last page done: {}", record.last_processed_page_number);
    println!("  Pages at last check: {}", record.total_pages_at_last_check);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring stored progress)");
    } else {
        tracing::info!(
            "Starting crawl (resuming from {} if present)",
            config.paths.progress_file
        );
    }

    let outcome = run_crawl(config, fresh).await.context("Crawl failed")?;

    match outcome {
        CrawlOutcome::Completed(stats) => {
            tracing::info!("Crawl completed successfully");
            print_statistics(&stats);
        }
        CrawlOutcome::Interrupted(signal) => {
            tracing::info!("Crawl stopped by {}; run again to resume", signal);
        }
    }

    Ok(())
}
