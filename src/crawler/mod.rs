//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Link extraction from raw page text
//! - Streaming HTTP fetches with per-request deadlines
//! - Slot assignment over the shared frontier
//! - One-shot completion reporting
//! - The `Spider` engine tying them together

mod coordinator;
mod dispatcher;
mod extractor;
mod fetcher;
mod monitor;
mod supervisor;

pub use coordinator::Spider;
pub use dispatcher::{Assignment, Dispatcher, Release};
pub use extractor::extract_links;
pub use fetcher::{build_http_client, fetch_page, fetch_supervised, FetchResult, RequestState};
pub use monitor::CompletionMonitor;
pub use supervisor::{Supervised, TimeoutSupervisor};

use crate::config::CrawlConfig;
use crate::output::{CrawlListener, CrawlSummary};
use crate::SpiderError;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// Convenience wrapper around [`Spider::crawl`] for callers that do not need
/// to abort or reconfigure.
///
/// # Errors
///
/// Fails if the root URL is empty, the save directory cannot be created or
/// the HTTP client cannot be built. Per-page failures are only counted.
pub async fn crawl(
    config: CrawlConfig,
    listener: Arc<dyn CrawlListener>,
) -> Result<CrawlSummary, SpiderError> {
    Spider::new(config, listener).crawl().await
}
