//! One-shot crawl completion signal
//!
//! The last slot to go idle reports completion directly; there is no timer.
//! The monitor makes sure "crawl finished" reaches the listener once even if
//! more than one release observes an idle pool.

use crate::output::{CrawlListener, CrawlSummary};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

#[derive(Debug)]
pub struct CompletionMonitor {
    fired: AtomicBool,
    summary: watch::Sender<Option<CrawlSummary>>,
}

impl CompletionMonitor {
    pub fn new() -> Self {
        let (summary, _) = watch::channel(None);
        Self {
            fired: AtomicBool::new(false),
            summary,
        }
    }

    /// Fires "crawl finished" unless it already fired
    ///
    /// Returns true for the call that actually notified the listener.
    pub fn fire(&self, summary: CrawlSummary, listener: &dyn CrawlListener) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }

        listener.on_crawl_finished(summary.total_saved());
        self.summary.send_replace(Some(summary));
        true
    }

    pub fn is_finished(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Resolves with the run's summary once it has fired
    pub async fn wait(&self) -> Option<CrawlSummary> {
        let mut receiver = self.summary.subscribe();
        let result = receiver.wait_for(Option::is_some).await;
        match result {
            Ok(summary) => (*summary).clone(),
            Err(_) => None,
        }
    }
}

impl Default for CompletionMonitor {
    fn default() -> Self {
        Self::new()
    }
}
