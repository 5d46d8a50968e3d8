//! Client side of the remote chat endpoint
//!
//! `POST /chat` answers one message; `POST /clear_history` asks the endpoint
//! to forget the conversation context it keeps between messages.

mod error;
mod http;
pub mod types;

pub use error::{ChatError, ChatErrorKind};
pub use http::HttpChatBackend;
pub use types::{ChatReply, ChatRequest, ChatResponse};
