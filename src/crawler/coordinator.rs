//! Crawler coordinator - the crawl engine
//!
//! This module ties the pieces of a crawl run together:
//! - Seeding the frontier and filling the worker slots
//! - Running each claimed entry through the fetch pipeline
//! - Saving bodies, extracting links and enqueueing the next depth
//! - Refilling a slot as soon as it frees
//! - Aborting and reporting completion

use crate::config::CrawlConfig;
use crate::crawler::dispatcher::{Assignment, Dispatcher};
use crate::crawler::extractor::extract_links;
use crate::crawler::fetcher::{build_http_client, fetch_supervised, FetchResult, RequestState};
use crate::crawler::monitor::CompletionMonitor;
use crate::crawler::supervisor::TimeoutSupervisor;
use crate::output::{ContentSink, CrawlListener, CrawlSummary};
use crate::state::FetchState;
use crate::{SpiderError, UrlError};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything shared by the tasks of one crawl run
struct Run {
    config: CrawlConfig,
    client: Client,
    dispatcher: Dispatcher,
    supervisor: TimeoutSupervisor,
    sink: ContentSink,
    monitor: CompletionMonitor,
    listener: Arc<dyn CrawlListener>,
    cancel: CancellationToken,
    started_at: DateTime<Utc>,
}

impl Run {
    /// Starts one task per assignment
    fn dispatch(self: &Arc<Self>, assignments: Vec<Assignment>) {
        for assignment in assignments {
            let run = Arc::clone(self);
            tokio::spawn(async move { run.work(assignment).await });
        }
    }

    /// Fetches one claimed entry and frees its slot
    async fn work(self: Arc<Self>, assignment: Assignment) {
        let mut request = RequestState::new(
            assignment.entry,
            assignment.slot,
            self.config.page_encoding.codec(),
        );

        let result =
            fetch_supervised(&self.client, &mut request, &self.config, &self.supervisor).await;
        let outcome = result.state();
        let status = result.status_code();

        match result {
            FetchResult::Success { body, bytes } => {
                tracing::debug!("Fetched {} ({} bytes)", request.url, bytes);
                self.handle_page(&request, &body).await;
            }
            FetchResult::Aborted => {
                tracing::debug!("Request for {} aborted", request.url);
            }
            failed => {
                if let Some(e) = failed.into_error(&request.url) {
                    tracing::warn!("{}", e);
                }
            }
        }

        self.finish_request(request.slot, outcome, status);
    }

    /// Saves a fetched body and enqueues the links it contains
    async fn handle_page(&self, request: &RequestState, body: &str) {
        match self.sink.save(body, &request.url).await {
            Ok(Some(page)) => {
                self.dispatcher.record_saved();
                tracing::debug!("Saved {} as {}", page.url, page.path.display());
            }
            Ok(None) => {}
            Err(e) => {
                self.dispatcher.record_save_error();
                tracing::warn!("{}", e);
            }
        }

        if self.cancel.is_cancelled() {
            return;
        }

        let links = extract_links(body);
        let report = self.dispatcher.enqueue_links(&links, request.depth + 1);
        tracing::debug!(
            "{}: {} links found, {} enqueued at depth {}",
            request.url,
            links.len(),
            report.accepted,
            request.depth + 1
        );
    }

    /// Frees the slot, starts any refill and reports completion if idle
    fn finish_request(self: &Arc<Self>, slot: usize, outcome: FetchState, status: Option<u16>) {
        let release = self.dispatcher.release(slot, outcome, status);
        let all_idle = release.all_idle;
        self.dispatch(release.assignments);

        if all_idle {
            self.finish();
        }
    }

    fn finish(&self) {
        let summary = CrawlSummary {
            root_url: self.config.root_url.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            aborted: self.cancel.is_cancelled(),
            stats: self.dispatcher.stats(),
        };

        let total_saved = summary.total_saved();
        if self.monitor.fire(summary, self.listener.as_ref()) {
            tracing::info!(
                "Crawl of {} finished: {} pages saved",
                self.config.root_url,
                total_saved
            );
        }
    }
}

/// Bounded-concurrency crawl engine
///
/// One `Spider` runs at most one crawl at a time. Configure it, call
/// [`start`](Spider::start), then [`wait`](Spider::wait) for the summary or
/// [`abort`](Spider::abort) from anywhere that can borrow it.
///
/// # Example
///
/// ```no_run
/// use page_spider::output::NoopListener;
/// use page_spider::{CrawlConfig, Spider};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CrawlConfig::new("example.com", "./pages").with_max_depth(2);
/// let mut spider = Spider::new(config, Arc::new(NoopListener));
/// let summary = spider.crawl().await?;
/// println!("saved {} pages", summary.total_saved());
/// # Ok(())
/// # }
/// ```
pub struct Spider {
    config: CrawlConfig,
    listener: Arc<dyn CrawlListener>,
    run: Option<Arc<Run>>,
}

impl Spider {
    pub fn new(config: CrawlConfig, listener: Arc<dyn CrawlListener>) -> Self {
        Self {
            config,
            listener,
            run: None,
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Replaces the configuration used by the next crawl
    pub fn reconfigure(&mut self, config: CrawlConfig) -> Result<(), SpiderError> {
        if self.is_running() {
            return Err(SpiderError::AlreadyRunning);
        }
        self.config = config;
        Ok(())
    }

    /// Returns true between a successful start and "crawl finished"
    pub fn is_running(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| !run.monitor.is_finished())
    }

    /// Starts a crawl from the configured root
    ///
    /// Returns `Ok(false)` without doing anything when the root URL is empty.
    /// Otherwise the save directory is created, the frontier is seeded with
    /// the root and the first dispatch runs before this returns.
    ///
    /// # Errors
    ///
    /// * [`SpiderError::AlreadyRunning`] if a crawl is in progress
    /// * [`SpiderError::Save`] if the save directory cannot be created
    /// * [`SpiderError::Reqwest`] if the HTTP client cannot be built
    pub async fn start(&mut self) -> Result<bool, SpiderError> {
        if self.is_running() {
            return Err(SpiderError::AlreadyRunning);
        }
        if self.config.is_empty() {
            tracing::warn!("Root URL is empty, nothing to crawl");
            return Ok(false);
        }

        let cancel = CancellationToken::new();
        let sink = ContentSink::new(
            self.config.save_dir.clone(),
            Arc::clone(&self.listener),
            cancel.clone(),
        );
        sink.prepare().await?;

        let client = build_http_client(&self.config)?;
        let dispatcher = Dispatcher::new(&self.config, cancel.clone());
        dispatcher.seed(&self.config.root_url);

        let run = Arc::new(Run {
            config: self.config.clone(),
            client,
            dispatcher,
            supervisor: TimeoutSupervisor::new(self.config.request_timeout, cancel.clone()),
            sink,
            monitor: CompletionMonitor::new(),
            listener: Arc::clone(&self.listener),
            cancel,
            started_at: Utc::now(),
        });

        tracing::info!(
            "Starting crawl of {} (domain {}, depth {}, {} connections)",
            self.config.root_url,
            self.config.base_domain,
            self.config.max_depth,
            self.config.max_connection
        );

        let assignments = run.dispatcher.dispatch();
        run.dispatch(assignments);
        self.run = Some(run);

        Ok(true)
    }

    /// Stops the current crawl
    ///
    /// In-flight requests are dropped, nothing more is saved or reported as
    /// saved, and no new requests start. "Crawl finished" still fires once,
    /// after the dropped requests have freed their slots. Does nothing when no
    /// crawl is running. Safe to reach from `on_content_saved`.
    pub fn abort(&self) {
        let Some(run) = self.run.as_ref() else {
            return;
        };
        if run.monitor.is_finished() || run.cancel.is_cancelled() {
            return;
        }

        tracing::info!("Aborting crawl of {}", run.config.root_url);
        run.sink.seal();
    }

    /// Waits for the current (or last) crawl to finish
    ///
    /// Returns `None` if no crawl was ever started.
    pub async fn wait(&self) -> Option<CrawlSummary> {
        let run = self.run.as_ref()?;
        run.monitor.wait().await
    }

    /// Runs a complete crawl and returns its summary
    pub async fn crawl(&mut self) -> Result<CrawlSummary, SpiderError> {
        if !self.start().await? {
            return Err(SpiderError::UrlError(UrlError::Empty));
        }
        self.wait()
            .await
            .ok_or(SpiderError::UrlError(UrlError::Empty))
    }
}

/// Dropping a running spider aborts its crawl
impl Drop for Spider {
    fn drop(&mut self) {
        if self.is_running() {
            self.abort();
        }
    }
}

impl std::fmt::Debug for Spider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spider")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}
