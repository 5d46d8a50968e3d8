//! reqwest implementation of the chat endpoint client

use super::{ChatError, ChatReply, ChatRequest, ChatResponse};
use crate::runtime::ChatBackend;
use async_trait::async_trait;
use reqwest::{Client, Url};

const CHAT_PATH: &str = "chat";
const CLEAR_HISTORY_PATH: &str = "clear_history";

/// Talks to a chat endpoint over HTTP
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    client: Client,
    chat_url: Url,
    clear_history_url: Url,
}

impl HttpChatBackend {
    /// `base_url` is the endpoint root, e.g. `http://127.0.0.1:5000`.
    ///
    /// No request timeout is set; the transport default applies.
    pub fn new(base_url: &str) -> Result<Self, ChatError> {
        let mut base = Url::parse(base_url.trim())
            .map_err(|e| ChatError::invalid_endpoint(format!("{base_url}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| ChatError::invalid_endpoint(format!("{base_url}: {e}")))
        };

        let client = Client::builder()
            .build()
            .map_err(|e| ChatError::invalid_endpoint(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            chat_url: join(CHAT_PATH)?,
            clear_history_url: join(CLEAR_HISTORY_PATH)?,
        })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }
}

fn transport_error(e: &reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::network(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        ChatError::network(format!("Connection failed: {e}"))
    } else {
        ChatError::network(format!("Request failed: {e}"))
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send_message(&self, message: &str) -> Result<ChatReply, ChatError> {
        let response = self
            .client
            .post(self.chat_url.clone())
            .json(&ChatRequest::new(message))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(ChatError::status(format!("HTTP {status}")));
        }

        let response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ChatError::malformed(format!("Failed to parse response: {e}")))?;
        response.into_reply()
    }

    async fn clear_history(&self) -> Result<(), ChatError> {
        let response = self
            .client
            .post(self.clear_history_url.clone())
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ChatError::status(format!("HTTP {status}")))
        }
    }
}
