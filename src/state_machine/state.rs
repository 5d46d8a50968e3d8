//! Request state types

use crate::conversation::ConversationId;
use serde::Serialize;
use std::fmt;

/// Identifies one chat request issued by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Request controller state
///
/// The cancellation handle for a pending request is held by the runtime;
/// this type only records which request is outstanding and where its answer goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestState {
    /// No request outstanding
    #[default]
    Idle,

    /// Exactly one request outstanding
    Pending {
        request_id: RequestId,
        /// Conversation the request was issued from
        conversation_id: ConversationId,
    },
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending { .. })
    }

    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            RequestState::Idle => None,
            RequestState::Pending { request_id, .. } => Some(*request_id),
        }
    }

    pub fn conversation_id(&self) -> Option<ConversationId> {
        match self {
            RequestState::Idle => None,
            RequestState::Pending {
                conversation_id, ..
            } => Some(*conversation_id),
        }
    }
}

/// Inputs the transition needs from outside the request state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub active_conversation: Option<ConversationId>,
    /// Id to assign if this transition issues a request
    pub next_request_id: RequestId,
}

impl RequestContext {
    pub fn new(active_conversation: Option<ConversationId>, next_request_id: RequestId) -> Self {
        Self {
            active_conversation,
            next_request_id,
        }
    }
}
