//! Effects produced by state transitions

use super::state::RequestId;
use crate::conversation::{ConversationId, Message};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a message to a conversation and show it
    AppendMessage {
        conversation_id: ConversationId,
        message: Message,
    },

    /// Issue the chat request (spawns as background task)
    RequestChat { request_id: RequestId, text: String },

    /// Abort the outstanding chat request
    AbortChat { request_id: RequestId },

    ShowLoading,
    HideLoading,

    /// Show a transient error block; never stored in a conversation
    ShowError { text: String },

    /// Tell the endpoint to forget its conversation context (fire-and-forget)
    ResetRemoteSession,
}

impl Effect {
    pub fn append_user_message(conversation_id: ConversationId, content: String) -> Self {
        Effect::AppendMessage {
            conversation_id,
            message: Message::user(content),
        }
    }

    pub fn append_bot_message(conversation_id: ConversationId, content: String) -> Self {
        Effect::AppendMessage {
            conversation_id,
            message: Message::bot(content),
        }
    }

    pub fn show_error(text: impl Into<String>) -> Self {
        Effect::ShowError { text: text.into() }
    }
}
