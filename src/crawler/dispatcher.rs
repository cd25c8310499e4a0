//! Slot assignment over the shared frontier
//!
//! The frontier, the slot flags and the crawl counters live behind one mutex.
//! Claiming a pending URL, moving it to "visited" and marking a slot busy is a
//! single critical section, so two completions can never claim the same entry
//! or the same slot.

use crate::config::CrawlConfig;
use crate::output::CrawlStats;
use crate::state::{EnqueueReport, FetchState, Frontier, FrontierEntry, WorkerSlots};
use crate::url::UrlFilter;
use std::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// A frontier entry handed to an idle slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub slot: usize,
    pub entry: FrontierEntry,
}

/// What happened when a slot was freed
#[derive(Debug, Default)]
pub struct Release {
    /// New work started as part of the refill
    pub assignments: Vec<Assignment>,

    /// True when no slot is busy after the refill
    pub all_idle: bool,
}

#[derive(Debug)]
struct DispatchState {
    frontier: Frontier,
    slots: WorkerSlots,
    stats: CrawlStats,
}

/// Owns the worker slots and the frontier for one crawl run
#[derive(Debug)]
pub struct Dispatcher {
    state: Mutex<DispatchState>,
    cancel: CancellationToken,
}

impl Dispatcher {
    pub fn new(config: &CrawlConfig, cancel: CancellationToken) -> Self {
        let filter = UrlFilter::new(config.base_domain.clone());
        Self {
            state: Mutex::new(DispatchState {
                frontier: Frontier::new(config.max_depth, filter),
                slots: WorkerSlots::new(config.max_connection),
                stats: CrawlStats::default(),
            }),
            cancel,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DispatchState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Resets the frontier to just the root and frees every slot
    pub fn seed(&self, root_url: &str) {
        let mut state = self.lock();
        state.frontier.seed(root_url);
        state.slots.reset();
        state.stats = CrawlStats::default();
    }

    /// Fills every idle slot that can claim a pending entry
    ///
    /// Safe to call from any number of completions at once: each call only
    /// acts on slots it finds idle. Slots left without work stay idle until
    /// the next call. Nothing is assigned once the crawl is stopped.
    pub fn dispatch(&self) -> Vec<Assignment> {
        let mut state = self.lock();
        self.fill_idle_slots(&mut state)
    }

    fn fill_idle_slots(&self, state: &mut DispatchState) -> Vec<Assignment> {
        let mut assignments = Vec::new();
        if self.cancel.is_cancelled() {
            return assignments;
        }

        for slot in state.slots.idle_slots() {
            let Some(entry) = state.frontier.claim_next() else {
                break;
            };
            state.slots.start_working(slot);
            state.stats.pages_visited += 1;
            tracing::debug!("Slot {} claimed {} (depth {})", slot, entry.url, entry.depth);
            assignments.push(Assignment { slot, entry });
        }
        assignments
    }

    /// Enqueues links found on a page at `depth`
    pub fn enqueue_links(&self, links: &[String], depth: u32) -> EnqueueReport {
        let mut state = self.lock();
        let report = state.frontier.enqueue_all(links, depth);
        state.stats.links_enqueued += report.accepted;
        state.stats.links_rejected += report.rejected;
        report
    }

    pub fn record_saved(&self) {
        self.lock().stats.pages_saved += 1;
    }

    pub fn record_save_error(&self) {
        self.lock().stats.save_errors += 1;
    }

    /// Frees `slot`, records how its request ended and refills idle slots
    pub fn release(&self, slot: usize, outcome: FetchState, status: Option<u16>) -> Release {
        let mut state = self.lock();
        if !state.slots.finish_working(slot) {
            tracing::warn!("Slot {} released while idle", slot);
        }
        state.stats.record_outcome(outcome, status);

        let assignments = self.fill_idle_slots(&mut state);
        Release {
            assignments,
            all_idle: state.slots.all_idle(),
        }
    }

    pub fn stats(&self) -> CrawlStats {
        self.lock().stats
    }

    pub fn busy_count(&self) -> usize {
        self.lock().slots.busy_count()
    }

    pub fn pending_len(&self) -> usize {
        self.lock().frontier.pending_len()
    }

    pub fn visited_len(&self) -> usize {
        self.lock().frontier.visited_len()
    }
}
