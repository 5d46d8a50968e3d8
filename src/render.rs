//! Render layer
//!
//! Projects store and request state into HTML fragments for the widget's
//! list view and message view. Nothing here holds state; a view binding
//! receives [`ViewUpdate`]s and applies them to whatever surface it drives.

use crate::conversation::{Conversation, ConversationId, ConversationStore, Message, MessageKind};
use crate::format::{escape_html, format_message};
use crate::state_machine::RequestState;
use serde::Serialize;
use std::fmt::Write;

/// One row of the conversation list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarRow {
    pub id: ConversationId,
    pub title: String,
    pub active: bool,
}

/// Send button appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendButtonState {
    Send,
    /// A request is pending; pressing the button cancels it
    Stop,
}

impl SendButtonState {
    pub fn for_request(state: &RequestState) -> Self {
        if state.is_pending() {
            SendButtonState::Stop
        } else {
            SendButtonState::Send
        }
    }

    /// Tooltip text
    pub fn title(self) -> &'static str {
        match self {
            SendButtonState::Send => "Send",
            SendButtonState::Stop => "Stop generating",
        }
    }

    /// Whether the button carries the `loading` class
    pub fn is_loading(self) -> bool {
        self == SendButtonState::Stop
    }
}

/// A change the view binding must apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ViewUpdate {
    /// Replace the whole conversation list
    Sidebar { rows: Vec<SidebarRow>, html: String },
    /// Replace the whole message pane
    MessagePane { html: String },
    /// Append one message block to the message pane.
    ///
    /// When `replaces_welcome` is set the conversation was empty, so the pane
    /// still shows the welcome block and `html` replaces its content instead.
    MessageAppended {
        conversation_id: ConversationId,
        message: Message,
        html: String,
        replaces_welcome: bool,
    },
    LoadingShown { html: String },
    LoadingHidden,
    /// Append a transient error block
    ErrorShown { text: String, html: String },
    SendButton(SendButtonState),
    SidebarCollapsed(bool),
    /// Keep the message pane scrolled to its end
    ScrollToEnd,
}

impl ViewUpdate {
    pub fn sidebar(store: &ConversationStore) -> Self {
        let rows = sidebar_rows(store);
        let html = sidebar_html(&rows);
        ViewUpdate::Sidebar { rows, html }
    }

    /// Full message pane for the active conversation.
    ///
    /// The loading indicator is included only when the pending request was
    /// issued from the conversation being shown.
    pub fn message_pane(store: &ConversationStore, request: &RequestState) -> Self {
        let active = store.active();
        let loading = match (active, request.conversation_id()) {
            (Some(conv), Some(pending)) => conv.id == pending,
            _ => false,
        };
        ViewUpdate::MessagePane {
            html: message_pane_html(active, loading),
        }
    }

    /// `index` is the message's position in its conversation
    pub fn message_appended(
        conversation_id: ConversationId,
        message: Message,
        index: usize,
    ) -> Self {
        let html = message_html(&message);
        ViewUpdate::MessageAppended {
            conversation_id,
            message,
            html,
            replaces_welcome: index == 0,
        }
    }

    pub fn loading_shown() -> Self {
        ViewUpdate::LoadingShown {
            html: loading_html(),
        }
    }

    pub fn error_shown(text: impl Into<String>) -> Self {
        let text = text.into();
        let html = error_html(&text);
        ViewUpdate::ErrorShown { text, html }
    }
}

pub fn sidebar_rows(store: &ConversationStore) -> Vec<SidebarRow> {
    let active = store.active_id();
    store
        .conversations()
        .iter()
        .map(|conv| SidebarRow {
            id: conv.id,
            title: conv.title.clone(),
            active: Some(conv.id) == active,
        })
        .collect()
}

/// Rows carry `data-action` attributes: `switch` on the row, `rename` on the
/// title (double click) and `delete` on the button.
pub fn sidebar_html(rows: &[SidebarRow]) -> String {
    let mut html = String::new();
    for row in rows {
        let class = if row.active {
            "chat-item active"
        } else {
            "chat-item"
        };
        let _ = write!(
            html,
            r#"<div class="{class}" data-id="{id}" data-action="switch"><div class="chat-item-icon"></div><div class="chat-item-title" data-id="{id}" data-action="rename">{title}</div><button class="chat-item-delete" data-id="{id}" data-action="delete" title="Delete chat">×</button></div>"#,
            id = row.id,
            title = escape_html(&row.title),
        );
    }
    html
}

pub fn welcome_html() -> String {
    concat!(
        r#"<div class="welcome-message">"#,
        r#"<div class="welcome-title">Ready when you are</div>"#,
        r#"<div class="welcome-text">Ask a security question below, for example:<br>"#,
        "&quot;What is SQL injection?&quot; &quot;How do I defend against XSS?&quot;</div>",
        "</div>"
    )
    .to_string()
}

/// The welcome block when nothing is active or the conversation is empty,
/// otherwise every message in order with the loading indicator last.
pub fn message_pane_html(conversation: Option<&Conversation>, loading: bool) -> String {
    let messages = conversation.map(Conversation::messages).unwrap_or_default();
    let mut html = if messages.is_empty() {
        welcome_html()
    } else {
        messages.iter().map(message_html).collect()
    };
    if loading {
        html.push_str(&loading_html());
    }
    html
}

pub fn message_html(message: &Message) -> String {
    let label = match message.kind {
        MessageKind::User => "You",
        MessageKind::Bot => "AI",
    };
    format!(
        r#"<div class="message {kind}-message"><div class="message-header"><div class="message-icon">{label}</div></div><div class="message-content">{content}</div></div>"#,
        kind = message.kind.as_str(),
        content = format_message(message.kind, &message.content),
    )
}

pub fn loading_html() -> String {
    concat!(
        r#"<div class="message bot-message loading-message" id="loadingIndicator">"#,
        r#"<div class="message-header"><div class="message-icon">AI</div></div>"#,
        r#"<div class="loading-dots"><span></span><span></span><span></span></div>"#,
        "</div>"
    )
    .to_string()
}

pub fn error_html(text: &str) -> String {
    format!(
        r#"<div class="message error-message"><div class="message-header"><div class="message-icon">!</div></div><div class="message-content">{}</div></div>"#,
        escape_html(text)
    )
}

/// Inline editor that replaces a row title while renaming
pub fn rename_input_html(title: &str) -> String {
    format!(
        r#"<input class="chat-rename-input" value="{}">"#,
        escape_html(title)
    )
}
