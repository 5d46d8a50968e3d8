//! Widget configuration

use crate::conversation::DEFAULT_TITLE_CHARS;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";

/// Configuration for the chat widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Root URL of the chat endpoint
    pub endpoint: String,
    /// Characters of the first user message used as a conversation title
    pub title_chars: usize,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            title_chars: DEFAULT_TITLE_CHARS,
        }
    }
}

impl WidgetConfig {
    /// Read `CHAT_WIDGET_ENDPOINT` and `CHAT_WIDGET_TITLE_CHARS`.
    /// Missing or unusable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let endpoint = lookup("CHAT_WIDGET_ENDPOINT")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.endpoint);
        let title_chars = lookup("CHAT_WIDGET_TITLE_CHARS")
            .and_then(|v| v.trim().parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(defaults.title_chars);
        Self {
            endpoint,
            title_chars,
        }
    }
}
