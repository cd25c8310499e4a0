//! Per-request deadline and stop-flag enforcement
//!
//! A supervised future is raced against its deadline and the crawl-wide
//! cancellation token. Whichever loses is dropped, which for an HTTP request
//! closes the underlying connection.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How a supervised future ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Supervised<T> {
    /// The future finished before the deadline
    Completed(T),
    /// The deadline expired first; the future was dropped
    TimedOut,
    /// The stop flag was set first; the future was dropped
    Aborted,
}

/// Arms a deadline for each request and honors the global stop flag
#[derive(Debug, Clone)]
pub struct TimeoutSupervisor {
    deadline: Duration,
    cancel: CancellationToken,
}

impl TimeoutSupervisor {
    pub fn new(deadline: Duration, cancel: CancellationToken) -> Self {
        Self { deadline, cancel }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs `fut` until it completes, its deadline passes, or the crawl stops
    ///
    /// A stop that is already signaled wins over a ready future.
    pub async fn supervise<F>(&self, fut: F) -> Supervised<F::Output>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Supervised::Aborted,
            result = tokio::time::timeout(self.deadline, fut) => match result {
                Ok(value) => Supervised::Completed(value),
                Err(_) => Supervised::TimedOut,
            },
        }
    }
}
