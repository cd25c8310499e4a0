//! Collaborator notification interface
//!
//! The engine reports progress through a plain trait object. Callbacks run
//! synchronously on whichever runtime worker completed the request, so
//! implementations that drive a UI must marshal onto their own thread.

use std::path::Path;
use std::sync::Mutex;

/// Receives the two notifications a crawl emits
///
/// Implementations must be thread-safe: `on_content_saved` may be called
/// concurrently from several completed requests.
pub trait CrawlListener: Send + Sync {
    /// Called once per page successfully written to disk
    ///
    /// Calls are serialized with aborts. Calling
    /// [`Spider::abort`](crate::crawler::Spider::abort) from here stops the
    /// crawl; this page is still reported but no later one is.
    fn on_content_saved(&self, _path: &Path, _url: &str) {}

    /// Called exactly once per crawl, after the frontier is empty and every
    /// slot is idle (or after an abort has drained the in-flight requests)
    fn on_crawl_finished(&self, _total_saved: usize) {}
}

/// Listener that ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl CrawlListener for NoopListener {}

/// Listener that records every notification in memory
///
/// Useful for embedding the engine without a UI and for tests.
#[derive(Debug, Default)]
pub struct RecordingListener {
    saved: Mutex<Vec<(String, String)>>,
    finished: Mutex<Vec<usize>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(file path, source url)` pairs in notification order
    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Totals passed to every `on_crawl_finished` call
    pub fn finished(&self) -> Vec<usize> {
        self.finished
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Source URLs of the saved pages
    pub fn saved_urls(&self) -> Vec<String> {
        self.saved().into_iter().map(|(_, url)| url).collect()
    }
}

impl CrawlListener for RecordingListener {
    fn on_content_saved(&self, path: &Path, url: &str) {
        self.saved
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((path.display().to_string(), url.to_string()));
    }

    fn on_crawl_finished(&self, total_saved: usize) {
        self.finished
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(total_saved);
    }
}
