//! Pending/visited URL bookkeeping
//!
//! The frontier is the single source of truth for what to fetch next and what
//! must never be fetched again. It is not internally synchronized: the
//! dispatcher owns it behind the same lock that guards slot assignment, so a
//! claim and its move to "visited" happen as one step.

use crate::url::{clean_candidate, Eligibility, UrlFilter};
use std::collections::{HashMap, VecDeque};

/// A URL waiting in, or claimed from, the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,

    /// Link hops from the root, fixed at first discovery
    pub depth: u32,
}

/// Counts from one batch of enqueues
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnqueueReport {
    pub accepted: usize,
    pub rejected: usize,
}

/// Two disjoint URL -> depth sets plus the claim order of the pending one
///
/// Invariants:
/// - a URL is in at most one of `pending` and `visited`
/// - once visited, a URL never re-enters `pending`
/// - `order` holds exactly the keys of `pending`
#[derive(Debug)]
pub struct Frontier {
    pending: HashMap<String, u32>,
    order: VecDeque<String>,
    visited: HashMap<String, u32>,
    max_depth: u32,
    filter: UrlFilter,
}

impl Frontier {
    pub fn new(max_depth: u32, filter: UrlFilter) -> Self {
        Self {
            pending: HashMap::new(),
            order: VecDeque::new(),
            visited: HashMap::new(),
            max_depth,
            filter,
        }
    }

    /// Clears both sets and inserts the root at depth 0
    ///
    /// The root skips the depth bound and the URL filter.
    pub fn seed(&mut self, root_url: &str) {
        self.clear();
        self.insert_pending(root_url.to_string(), 0);
    }

    /// Cleans a discovered link and adds it at `depth` if it is eligible
    ///
    /// Rejected links are dropped without side effects. Enqueueing a URL
    /// that is already pending is a no-op reported as [`Eligibility::Known`].
    pub fn enqueue(&mut self, raw_url: &str, depth: u32) -> Eligibility {
        if depth >= self.max_depth {
            return Eligibility::TooDeep;
        }

        let url = clean_candidate(raw_url);
        let verdict = self.filter.check(&url, self);
        if verdict.is_eligible() {
            self.insert_pending(url, depth);
        }
        verdict
    }

    /// Enqueues every link found on a page at `depth`
    pub fn enqueue_all<I, S>(&mut self, links: I, depth: u32) -> EnqueueReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = EnqueueReport::default();
        for link in links {
            let verdict = self.enqueue(link.as_ref(), depth);
            if verdict.is_eligible() {
                report.accepted += 1;
            } else {
                tracing::trace!("Dropped link {} ({})", link.as_ref(), verdict);
                report.rejected += 1;
            }
        }
        report
    }

    /// Removes the oldest pending entry and marks it visited
    ///
    /// Returns `None` when nothing is pending.
    pub fn claim_next(&mut self) -> Option<FrontierEntry> {
        while let Some(url) = self.order.pop_front() {
            if let Some(depth) = self.pending.remove(&url) {
                self.visited.insert(url.clone(), depth);
                return Some(FrontierEntry { url, depth });
            }
        }
        None
    }

    /// Returns true if the URL is pending or visited
    pub fn contains(&self, url: &str) -> bool {
        self.pending.contains_key(url) || self.visited.contains_key(url)
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending.contains_key(url)
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains_key(url)
    }

    /// Depth recorded for a known URL
    pub fn depth_of(&self, url: &str) -> Option<u32> {
        self.pending
            .get(url)
            .or_else(|| self.visited.get(url))
            .copied()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Returns true when nothing is waiting to be claimed
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.order.clear();
        self.visited.clear();
    }

    fn insert_pending(&mut self, url: String, depth: u32) {
        if self.contains(&url) {
            return;
        }
        self.order.push_back(url.clone());
        self.pending.insert(url, depth);
    }
}
