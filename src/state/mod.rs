//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `Frontier`: pending and visited URLs with their discovery depth
//! - `WorkerSlots`: busy/idle flags for the fixed pool of fetch slots
//! - `FetchState`: where one request is in the fetch pipeline

mod fetch_state;
mod frontier;
mod slots;

// Re-export main types
pub use fetch_state::FetchState;
pub use frontier::{EnqueueReport, Frontier, FrontierEntry};
pub use slots::WorkerSlots;
