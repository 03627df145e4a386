//! Loop-level progress events.
//!
//! `ProgressEvent` is what the agent loop pushes to its caller while a turn
//! runs: live content fragments, tool-execution status lines, and a
//! terminal marker with the stop reason.

use serde::{Deserialize, Serialize};

/// Why the agent loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model answered without requesting further tools.
    Completed,
    /// The iteration cap cut the loop short — a soft stop, not an error.
    IterationCapReached,
    /// The caller cancelled the turn.
    Cancelled,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::IterationCapReached => write!(f, "iteration cap reached"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Events emitted by the agent loop during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A fragment of model output, for live display.
    Content { text: String },

    /// A status line (tool-execution announcements).
    Status { message: String },

    /// The loop reached a terminal state.
    Done { reason: StopReason, iterations: u32 },
}

impl ProgressEvent {
    /// Wire name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Content { .. } => "content",
            Self::Status { .. } => "status",
            Self::Done { .. } => "done",
        }
    }
}
