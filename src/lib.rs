//! Chat widget client state
//!
//! The state manager behind a browser chat widget: a store of named
//! conversations, a request controller that keeps at most one chat request
//! in flight, a formatter for assistant markdown, and a render layer that
//! turns all of it into view updates for whatever binding drives the page.

pub mod backend;
pub mod config;
pub mod conversation;
pub mod format;
pub mod input;
pub mod render;
pub mod runtime;
pub mod state_machine;

pub use backend::HttpChatBackend;
pub use config::WidgetConfig;
pub use conversation::ConversationStore;
pub use render::ViewUpdate;
pub use runtime::{ChatBackend, ChatSession, Command};
