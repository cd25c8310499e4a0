//! Page-Spider main entry point
//!
//! This is the command-line interface for the Page-Spider crawl engine.

use anyhow::{bail, Context};
use clap::Parser;
use page_spider::config::{
    read_config_with_hash, validate, Config, CrawlerConfig, OutputConfig, PageEncoding,
    RequestConfig, DEFAULT_MAX_CONNECTION, DEFAULT_MAX_DEPTH, DEFAULT_REQUEST_TIMEOUT_MS,
};
use page_spider::output::print_summary;
use page_spider::{CrawlConfig, CrawlListener, Spider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Page-Spider: a bounded-concurrency page downloader
///
/// Page-Spider starts at a root URL, keeps a fixed number of requests in
/// flight, saves every page it fetches as a numbered text file and follows
/// the links it finds inside the root's domain down to a depth limit.
#[derive(Parser, Debug)]
#[command(name = "page-spider")]
#[command(version = "1.0.0")]
#[command(about = "A bounded-concurrency page downloader", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Root URL to start from (http:// is added when missing)
    #[arg(long, required_unless_present = "config")]
    url: Option<String>,

    /// Directory that receives the saved pages
    #[arg(long, value_name = "DIR", required_unless_present = "config")]
    save_path: Option<PathBuf>,

    /// Link hops to follow from the root (root is depth 0)
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Requests kept in flight at once
    #[arg(long, value_name = "N")]
    max_connection: Option<usize>,

    /// Page encoding: utf8 or gb18030
    #[arg(long, value_parser = parse_encoding)]
    encoding: Option<PageEncoding>,

    /// Per-request deadline in milliseconds
    #[arg(long, value_name = "N")]
    timeout_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let crawl_config =
        CrawlConfig::from_config(&config).context("Invalid crawl configuration")?;

    if cli.dry_run {
        handle_dry_run(&crawl_config);
        return Ok(());
    }

    handle_crawl(crawl_config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_spider=info,warn"),
            1 => EnvFilter::new("page_spider=debug,info"),
            2 => EnvFilter::new("page_spider=trace,debug"),
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

fn parse_encoding(name: &str) -> Result<PageEncoding, String> {
    PageEncoding::from_name(name)
        .ok_or_else(|| format!("unknown encoding '{}' (expected utf8 or gb18030)", name))
}

/// Loads the config file if one was given, then applies command-line overrides
///
/// Validation runs once, on the merged result, so a flag can fix a bad file value.
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_file(path)?,
        None => Config {
            crawler: CrawlerConfig {
                root_url: String::new(),
                max_depth: DEFAULT_MAX_DEPTH,
                max_connection: DEFAULT_MAX_CONNECTION,
                page_encoding: PageEncoding::default(),
                request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            },
            request: RequestConfig::default(),
            output: OutputConfig {
                save_path: String::new(),
            },
        },
    };

    if let Some(url) = &cli.url {
        config.crawler.root_url = url.clone();
    }
    if let Some(save_path) = &cli.save_path {
        config.output.save_path = save_path.to_string_lossy().into_owned();
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(max_connection) = cli.max_connection {
        config.crawler.max_connection = max_connection;
    }
    if let Some(encoding) = cli.encoding {
        config.crawler.page_encoding = encoding;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.crawler.request_timeout_ms = timeout_ms;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

fn load_file(path: &Path) -> anyhow::Result<Config> {
    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = read_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &CrawlConfig) {
    println!("=== Page-Spider Dry Run ===\n");

    println!("Crawl:");
    println!("  Root URL: {}", config.root_url);
    println!("  Base domain: {}", config.base_domain);
    println!("  Max depth: {}", config.max_depth);
    println!("  Max connections: {}", config.max_connection);
    println!("  Page encoding: {}", config.page_encoding);
    println!("  Request timeout: {}ms", config.request_timeout.as_millis());

    println!("\nRequest:");
    println!("  Method: {}", config.method);
    println!("  Accept: {}", config.accept);
    println!("  User agent: {}", config.user_agent);

    println!("\nOutput:");
    println!("  Save path: {}", config.save_dir.display());

    println!("\n✓ Configuration is valid");
}

/// Prints one line per saved page
struct ConsoleListener {
    quiet: bool,
}

impl CrawlListener for ConsoleListener {
    fn on_content_saved(&self, path: &Path, url: &str) {
        if !self.quiet {
            println!("{} -> {}", url, path.display());
        }
    }

    fn on_crawl_finished(&self, total_saved: usize) {
        tracing::info!("Crawl finished with {} pages saved", total_saved);
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: CrawlConfig, quiet: bool) -> anyhow::Result<()> {
    let listener = Arc::new(ConsoleListener { quiet });
    let mut spider = Spider::new(config, listener);

    if !spider.start().await.context("Failed to start crawl")? {
        bail!("Root URL is empty, nothing to crawl");
    }

    let summary = tokio::select! {
        summary = spider.wait() => summary,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received, stopping crawl");
            spider.abort();
            spider.wait().await
        }
    };

    match summary {
        Some(summary) => {
            if !quiet {
                println!();
                print_summary(&summary);
            }
            Ok(())
        }
        None => bail!("Crawl ended without a summary"),
    }
}
