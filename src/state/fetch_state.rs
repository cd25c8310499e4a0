/// Per-request fetch state definitions
///
/// Every request walks `Requesting -> Streaming -> Done`, or leaves early
/// through one of the failure states.
use std::fmt;

/// Represents where a single request is in the fetch pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    // ===== Active States =====
    /// Request built and sent, waiting for response headers
    Requesting,

    /// Status was OK, body chunks are being read
    Streaming,

    // ===== Terminal Success State =====
    /// Body fully read
    Done,

    // ===== Terminal Failure States =====
    /// Non-OK status or transport error
    Failed,

    /// The per-request deadline expired
    TimedOut,

    /// The crawl-wide stop flag was set
    Aborted,
}

impl FetchState {
    /// Returns true if this is a terminal state (the slot can be freed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true while the request still holds its connection
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Requesting | Self::Streaming)
    }

    /// Returns true if a state transition is permitted
    ///
    /// Active states may always fall into a failure state. `Streaming` may
    /// repeat (one step per chunk). Terminal states never change.
    pub fn can_transition_to(&self, next: FetchState) -> bool {
        match (self, next) {
            (Self::Requesting, Self::Streaming) => true,
            (Self::Streaming, Self::Streaming | Self::Done) => true,
            (
                Self::Requesting | Self::Streaming,
                Self::Failed | Self::TimedOut | Self::Aborted,
            ) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requesting => "requesting",
            Self::Streaming => "streaming",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
