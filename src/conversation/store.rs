//! In-memory conversation store

use super::{ConversationId, IdAllocator, Message, MessageKind};
use serde::Serialize;
use thiserror::Error;

/// Number of characters of the first user message used as a derived title
pub const DEFAULT_TITLE_CHARS: usize = 20;

const DEFAULT_TITLE_PREFIX: &str = "New chat";

/// A named, ordered exchange of messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    messages: Vec<Message>,
    /// Set by an explicit rename; derived titles never overwrite it
    #[serde(skip)]
    renamed: bool,
}

impl Conversation {
    fn new(id: ConversationId, title: String) -> Self {
        Self {
            id,
            title,
            messages: Vec::new(),
            renamed: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_renamed(&self) -> bool {
        self.renamed
    }

    fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.kind == MessageKind::User)
    }
}

/// Errors for operations that require an existing conversation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown conversation: {0}")]
    UnknownConversation(ConversationId),
}

/// What a successful delete changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deletion {
    pub was_active: bool,
    /// The active conversation after the delete
    pub active_id: Option<ConversationId>,
}

/// What a successful append changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appended {
    /// Position of the new message in the conversation
    pub index: usize,
    /// The title was derived from this message
    pub title_changed: bool,
}

/// Owns every conversation and the active-conversation pointer.
///
/// Invariants: ids are unique, and `active_id`, when set, names exactly one
/// conversation in the list.
#[derive(Debug)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: Option<ConversationId>,
    ids: IdAllocator,
    created: u32,
    title_chars: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::with_title_chars(DEFAULT_TITLE_CHARS)
    }

    pub fn with_title_chars(title_chars: usize) -> Self {
        Self {
            conversations: Vec::new(),
            active_id: None,
            ids: IdAllocator::new(),
            created: 0,
            title_chars,
        }
    }

    /// All conversations, most recent first
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active_id(&self) -> Option<ConversationId> {
        self.active_id
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active_id.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    fn get_mut(&mut self, id: ConversationId) -> Result<&mut Conversation, StoreError> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::UnknownConversation(id))
    }

    /// Prepend a fresh conversation with a numbered default title and make it active.
    pub fn create_conversation(&mut self) -> &Conversation {
        self.created += 1;
        let id = self.ids.next();
        let title = format!("{DEFAULT_TITLE_PREFIX} {}", self.created);

        tracing::debug!(conv_id = %id, %title, "Creating conversation");
        self.conversations.insert(0, Conversation::new(id, title));
        self.active_id = Some(id);
        &self.conversations[0]
    }

    /// Remove a conversation. Unknown ids are ignored.
    ///
    /// Removing the active conversation activates the most recent remaining
    /// one, or leaves nothing active when the list is empty.
    pub fn delete_conversation(&mut self, id: ConversationId) -> Option<Deletion> {
        let idx = self.conversations.iter().position(|c| c.id == id)?;
        self.conversations.remove(idx);

        let was_active = self.active_id == Some(id);
        if was_active {
            self.active_id = self.conversations.first().map(|c| c.id);
        }

        tracing::debug!(conv_id = %id, was_active, "Deleted conversation");
        Some(Deletion {
            was_active,
            active_id: self.active_id,
        })
    }

    /// Make `id` active. Returns false when it already is, or is unknown.
    pub fn switch_conversation(&mut self, id: ConversationId) -> bool {
        if self.active_id == Some(id) || self.get(id).is_none() {
            return false;
        }
        self.active_id = Some(id);
        true
    }

    /// Set a trimmed title. Blank titles and unknown ids leave everything unchanged.
    pub fn rename_conversation(&mut self, id: ConversationId, title: &str) -> Option<&str> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let conv = self.get_mut(id).ok()?;
        conv.title = title.to_string();
        conv.renamed = true;
        Some(&conv.title)
    }

    /// Append a message.
    ///
    /// The first user message of a conversation that was never renamed also
    /// becomes its title, cut to the configured number of characters.
    pub fn append_message(
        &mut self,
        id: ConversationId,
        message: Message,
    ) -> Result<Appended, StoreError> {
        let title_chars = self.title_chars;
        let conv = self.get_mut(id)?;

        let derive_title =
            message.kind == MessageKind::User && !conv.renamed && !conv.has_user_message();
        let mut title_changed = false;
        if derive_title {
            let derived: String = message.content.chars().take(title_chars).collect();
            let derived = derived.trim();
            if !derived.is_empty() && derived != conv.title {
                conv.title = derived.to_string();
                title_changed = true;
            }
        }

        conv.messages.push(message);
        Ok(Appended {
            index: conv.messages.len() - 1,
            title_changed,
        })
    }

    /// Drop every message but keep the conversation, its id and title.
    /// Returns whether the cleared conversation is the active one.
    pub fn clear_conversation(&mut self, id: ConversationId) -> Result<bool, StoreError> {
        let was_active = self.active_id == Some(id);
        self.get_mut(id)?.messages.clear();
        Ok(was_active)
    }
}
