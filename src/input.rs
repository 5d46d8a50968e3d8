//! Input controller
//!
//! Turns textarea, button and sidebar events into session commands. It keeps
//! the textarea draft and the inline rename editor; everything else lives in
//! the session.

use crate::conversation::ConversationId;
use crate::render::rename_input_html;
use crate::runtime::Command;

/// Textarea grows with its content up to this height, in pixels
pub const MAX_TEXTAREA_HEIGHT: u32 = 200;

pub fn textarea_height(scroll_height: u32) -> u32 {
    scroll_height.min(MAX_TEXTAREA_HEIGHT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn with_shift(key: Key) -> Self {
        Self { key, shift: true }
    }

    /// Decode a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str, shift: bool) -> Self {
        let key = match key {
            "Enter" => Key::Enter,
            "Escape" => Key::Escape,
            _ => Key::Other,
        };
        Self { key, shift }
    }

    fn is_plain_enter(self) -> bool {
        self.key == Key::Enter && !self.shift
    }
}

/// Tracks the message draft and maps keys and clicks to commands
#[derive(Debug, Default)]
pub struct InputController {
    draft: String,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Textarea content changed. Returns the new textarea height.
    pub fn on_input(&mut self, text: impl Into<String>, scroll_height: u32) -> u32 {
        self.draft = text.into();
        textarea_height(scroll_height)
    }

    /// Plain Enter submits when idle and cancels while a request is pending.
    /// Shift+Enter is left to the textarea as a newline.
    pub fn on_key(&mut self, key: KeyPress, pending: bool) -> Option<Command> {
        if key.is_plain_enter() {
            self.submit_or_cancel(pending)
        } else {
            None
        }
    }

    /// The send button doubles as the stop button
    pub fn on_send_button(&mut self, pending: bool) -> Option<Command> {
        self.submit_or_cancel(pending)
    }

    fn submit_or_cancel(&mut self, pending: bool) -> Option<Command> {
        if pending {
            return Some(Command::Cancel);
        }
        let text = self.draft.trim();
        if text.is_empty() {
            return None;
        }
        let command = Command::Submit(text.to_string());
        self.draft.clear();
        Some(command)
    }
}

/// How an inline rename ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameResult {
    Commit(Command),
    /// Drop the editor and show the list as it was
    Abandon,
}

/// Inline title editor opened by double clicking a row.
///
/// Enter and blur both commit; whichever comes first wins and the editor
/// never reports a second result.
#[derive(Debug)]
pub struct RenameEditor {
    id: ConversationId,
    value: String,
    finished: bool,
}

impl RenameEditor {
    pub fn begin(id: ConversationId, current_title: &str) -> Self {
        Self {
            id,
            value: current_title.to_string(),
            finished: false,
        }
    }

    pub fn html(&self) -> String {
        rename_input_html(&self.value)
    }

    pub fn on_input(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn on_key(&mut self, key: KeyPress) -> Option<RenameResult> {
        match key.key {
            Key::Enter => self.commit(),
            Key::Escape => self.finish().then_some(RenameResult::Abandon),
            Key::Other => None,
        }
    }

    pub fn on_blur(&mut self) -> Option<RenameResult> {
        self.commit()
    }

    fn commit(&mut self) -> Option<RenameResult> {
        self.finish().then(|| {
            RenameResult::Commit(Command::RenameConversation {
                id: self.id,
                title: self.value.clone(),
            })
        })
    }

    /// True the first time only
    fn finish(&mut self) -> bool {
        !std::mem::replace(&mut self.finished, true)
    }
}

/// A click or double click inside the conversation list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarIntent {
    Switch(ConversationId),
    Delete(ConversationId),
    BeginRename(ConversationId),
}

impl SidebarIntent {
    /// Decode the `data-action` and `data-id` attributes of the clicked element
    pub fn decode(action: &str, id: &str) -> Option<Self> {
        let id: ConversationId = id.parse().ok()?;
        match action {
            "switch" => Some(SidebarIntent::Switch(id)),
            "delete" => Some(SidebarIntent::Delete(id)),
            "rename" => Some(SidebarIntent::BeginRename(id)),
            _ => None,
        }
    }

    /// Renaming opens an editor instead of issuing a command
    pub fn command(self) -> Option<Command> {
        match self {
            SidebarIntent::Switch(id) => Some(Command::SwitchConversation(id)),
            SidebarIntent::Delete(id) => Some(Command::DeleteConversation(id)),
            SidebarIntent::BeginRename(_) => None,
        }
    }
}
