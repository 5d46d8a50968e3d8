//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the session with mock implementations.

use crate::backend::{ChatError, ChatReply};
use async_trait::async_trait;
use std::sync::Arc;

/// Client for the remote chat endpoint
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user message and wait for the endpoint's reply
    async fn send_message(&self, message: &str) -> Result<ChatReply, ChatError>;

    /// Ask the endpoint to drop the conversation context it keeps
    async fn clear_history(&self) -> Result<(), ChatError>;
}

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn send_message(&self, message: &str) -> Result<ChatReply, ChatError> {
        (**self).send_message(message).await
    }

    async fn clear_history(&self) -> Result<(), ChatError> {
        (**self).clear_history().await
    }
}
