//! Wire types for the chat endpoint

use super::ChatError;
use serde::{Deserialize, Serialize};

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body returned by `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    /// Some servers name this field `response`
    #[serde(default, alias = "response", skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn answer(answer: impl Into<String>) -> Self {
        Self {
            success: true,
            answer: Some(answer.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            answer: None,
            error: Some(error.into()),
        }
    }

    /// A success without an answer is not a well-formed response.
    pub fn into_reply(self) -> Result<ChatReply, ChatError> {
        match (self.success, self.answer) {
            (true, Some(answer)) => Ok(ChatReply::Answer(answer)),
            (true, None) => Err(ChatError::malformed("success response without an answer")),
            (false, _) => Ok(ChatReply::Rejected { error: self.error }),
        }
    }
}

/// A well-formed reply from the endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    Answer(String),
    /// Application-level failure reported by the endpoint
    Rejected { error: Option<String> },
}
