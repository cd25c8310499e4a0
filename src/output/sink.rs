//! Content sink: persists fetched pages as numbered text files
//!
//! Files are named `0.txt`, `1.txt`, ... inside the save directory. No index
//! or manifest is written; the file/URL pairing only reaches the listener.

use crate::output::CrawlListener;
use crate::SpiderError;
use std::cell::Cell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

thread_local! {
    /// Set while this thread is inside `on_content_saved` (and holds the gate)
    static NOTIFYING: Cell<bool> = const { Cell::new(false) };
}

/// Clears [`NOTIFYING`] even if the listener panics
struct NotifyingGuard;

impl NotifyingGuard {
    fn enter() -> Self {
        NOTIFYING.with(|flag| flag.set(true));
        Self
    }
}

impl Drop for NotifyingGuard {
    fn drop(&mut self) {
        NOTIFYING.with(|flag| flag.set(false));
    }
}

/// A page written to disk and reported to the listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPage {
    pub index: usize,
    pub path: PathBuf,
    pub url: String,
}

/// Writes page text to uniquely numbered files and reports each save
pub struct ContentSink {
    dir: PathBuf,
    counter: AtomicUsize,
    listener: Arc<dyn CrawlListener>,
    cancel: CancellationToken,
    /// Held while notifying, and while sealing, so no save is reported after
    /// [`ContentSink::seal`] returns.
    gate: Mutex<()>,
}

impl ContentSink {
    pub fn new(
        dir: impl Into<PathBuf>,
        listener: Arc<dyn CrawlListener>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            dir: dir.into(),
            counter: AtomicUsize::new(0),
            listener,
            cancel,
            gate: Mutex::new(()),
        }
    }

    /// Creates the save directory if it does not exist
    pub async fn prepare(&self) -> Result<(), SpiderError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| SpiderError::Save {
                path: self.dir.clone(),
                source,
            })
    }

    /// Saves one page and notifies the listener
    ///
    /// Returns `Ok(None)` without touching the disk when the text is empty or
    /// the crawl has been stopped. A write failure is returned as
    /// [`SpiderError::Save`] and nothing is reported to the listener.
    pub async fn save(&self, text: &str, url: &str) -> Result<Option<SavedPage>, SpiderError> {
        if text.is_empty() || self.cancel.is_cancelled() {
            return Ok(None);
        }

        let index = self.counter.fetch_add(1, Ordering::SeqCst);
        let path = self.dir.join(format!("{}.txt", index));

        tokio::fs::write(&path, text.as_bytes())
            .await
            .map_err(|source| SpiderError::Save {
                path: path.clone(),
                source,
            })?;

        let _gate = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        if self.cancel.is_cancelled() {
            tracing::debug!("Crawl stopped before {} could be reported", path.display());
            return Ok(None);
        }
        {
            let _notifying = NotifyingGuard::enter();
            self.listener.on_content_saved(&path, url);
        }

        Ok(Some(SavedPage {
            index,
            path,
            url: url.to_string(),
        }))
    }

    /// Sets the stop flag once no notification is in progress
    ///
    /// Called from inside `on_content_saved`, the gate is already held by
    /// this thread, so the flag is set directly.
    pub fn seal(&self) {
        if NOTIFYING.with(Cell::get) {
            self.cancel.cancel();
            return;
        }
        let _gate = self.gate.lock().unwrap_or_else(|e| e.into_inner());
        self.cancel.cancel();
    }

    /// Number of file names handed out so far
    pub fn files_attempted(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }
}
