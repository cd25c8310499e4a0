//! Output module for crawl results
//!
//! This module handles:
//! - Persisting fetched pages as numbered text files
//! - Notifying the embedding application of saves and completion
//! - Recording and printing crawl statistics

mod sink;
pub mod stats;
mod traits;

pub use sink::{ContentSink, SavedPage};
pub use stats::{print_summary, CrawlStats, CrawlSummary};
pub use traits::{CrawlListener, NoopListener, RecordingListener};
