//! Events that drive the request controller

use super::state::RequestId;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    Submit {
        text: String,
    },
    Cancel,

    // Network events
    ChatCompleted {
        request_id: RequestId,
        outcome: ChatOutcome,
    },
    /// The request task observed its cancellation token
    ChatAborted {
        request_id: RequestId,
    },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit { text: text.into() }
    }
}

/// How a chat request resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The endpoint answered successfully
    Answer(String),
    /// The endpoint reported an application-level failure
    Rejected { error: Option<String> },
    /// Network failure, bad status or a malformed body
    TransportFailed { reason: String },
}
