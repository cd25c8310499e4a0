//! Crawl statistics and the end-of-run summary

use crate::state::FetchState;
use chrono::{DateTime, Utc};

/// Counters maintained while a crawl runs
///
/// Updated under the dispatcher lock, so the values are always consistent
/// with each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Frontier entries claimed by a slot
    pub pages_visited: usize,

    /// Pages written to disk and reported
    pub pages_saved: usize,

    /// Links accepted into the frontier
    pub links_enqueued: usize,

    /// Links dropped by the depth bound or the URL filter
    pub links_rejected: usize,

    /// Responses with a status other than 200
    pub http_errors: usize,

    /// Connection, DNS and body read failures
    pub transport_errors: usize,

    pub timeouts: usize,
    pub aborted: usize,
    pub save_errors: usize,
}

impl CrawlStats {
    /// Records how one request ended
    pub fn record_outcome(&mut self, state: FetchState, status: Option<u16>) {
        match state {
            FetchState::Failed if status.is_some() => self.http_errors += 1,
            FetchState::Failed => self.transport_errors += 1,
            FetchState::TimedOut => self.timeouts += 1,
            FetchState::Aborted => self.aborted += 1,
            FetchState::Done | FetchState::Requesting | FetchState::Streaming => {}
        }
    }

    /// Requests that ended without a body
    pub fn total_failures(&self) -> usize {
        self.http_errors + self.transport_errors + self.timeouts
    }
}

/// Final report for one crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSummary {
    pub root_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub aborted: bool,
    pub stats: CrawlStats,
}

impl CrawlSummary {
    /// Number of pages saved; the total passed to `on_crawl_finished`
    pub fn total_saved(&self) -> usize {
        self.stats.pages_saved
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Share of visited pages that were saved, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.stats.pages_visited == 0 {
            return 0.0;
        }
        (self.stats.pages_saved as f64 / self.stats.pages_visited as f64) * 100.0
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    let stats = &summary.stats;

    println!("=== Crawl Summary ===\n");

    println!("Run:");
    println!("  Root URL: {}", summary.root_url);
    println!("  Started: {}", summary.started_at.to_rfc3339());
    println!("  Finished: {}", summary.finished_at.to_rfc3339());
    println!("  Duration: {:.1}s", summary.duration_seconds());
    if summary.aborted {
        println!("  Status: aborted");
    } else {
        println!("  Status: completed");
    }
    println!();

    println!("Pages:");
    println!("  Visited: {}", stats.pages_visited);
    println!("  Saved: {}", stats.pages_saved);
    println!("  Links enqueued: {}", stats.links_enqueued);
    println!("  Links rejected: {}", stats.links_rejected);
    println!();

    if stats.total_failures() > 0 || stats.save_errors > 0 || stats.aborted > 0 {
        println!("Errors:");
        println!("  HTTP status: {}", stats.http_errors);
        println!("  Transport: {}", stats.transport_errors);
        println!("  Timeouts: {}", stats.timeouts);
        println!("  Save failures: {}", stats.save_errors);
        println!("  Aborted requests: {}", stats.aborted);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages saved)",
        summary.success_rate(),
        stats.pages_saved,
        stats.pages_visited
    );
}
