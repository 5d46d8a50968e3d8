//! Conversation store
//!
//! In-memory list of conversations, most recent first, plus the pointer to
//! the active one.

mod id;
mod message;
mod store;

pub use id::{ConversationId, IdAllocator};
pub use message::{Message, MessageKind};
pub use store::{
    Appended, Conversation, ConversationStore, Deletion, StoreError, DEFAULT_TITLE_CHARS,
};
