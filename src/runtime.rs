//! Session runtime
//!
//! Owns the conversation store and the request state, executes the effects
//! the state machine asks for, and publishes view updates to subscribers.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ChatSession;
pub use traits::*;

use crate::backend::HttpChatBackend;
use crate::conversation::ConversationId;

/// Session talking to a real chat endpoint
pub type ProductionSession = ChatSession<HttpChatBackend>;

/// Explicit commands a view binding dispatches into the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    Cancel,
    NewConversation,
    SwitchConversation(ConversationId),
    DeleteConversation(ConversationId),
    RenameConversation { id: ConversationId, title: String },
    /// Clear the active conversation
    ClearConversation,
    ToggleSidebar,
    CollapseSidebar,
}
