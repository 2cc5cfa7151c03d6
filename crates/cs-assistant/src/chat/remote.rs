//! Client for the CarSense backend chatbot endpoint.
//!
//! Posts the conversation to `<base>/api/v1/chatbot/ask` and accepts either
//! `{ "text": .., "followups": [..] }` or the older `{ "reply": .. }` shape.
//! Any failure (unreachable, non-2xx, timeout, unexpected body) yields
//! `None` so the caller can fall back to the offline rules.

use async_trait::async_trait;
use cs_protocol::{ChatMessage, ChatReply};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChatResponder, ResponderReply};
use crate::error::{AssistantError, AssistantResult};

const ASK_PATH: &str = "/api/v1/chatbot/ask";

/// Configuration for the remote chatbot backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteChatConfig {
    /// Backend base URL. Trailing slashes and a trailing `/api/v1` are
    /// tolerated.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Whether the remote tier is consulted at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_enabled() -> bool {
    true
}

impl Default for RemoteChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            enabled: default_enabled(),
        }
    }
}

impl RemoteChatConfig {
    /// Full URL of the ask endpoint.
    pub fn ask_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let base = match base.len().checked_sub("/api/v1".len()) {
            Some(cut)
                if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case("/api/v1") =>
            {
                &base[..cut]
            }
            _ => base,
        };
        format!("{base}{ASK_PATH}")
    }
}

#[derive(Serialize)]
struct AskRequest<'a> {
    messages: &'a [ChatMessage],
}

/// Client for the backend chatbot.
pub struct RemoteChatClient {
    client: reqwest::Client,
    url: String,
}

impl RemoteChatClient {
    pub fn new(config: &RemoteChatConfig) -> AssistantResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AssistantError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url: config.ask_url(),
        })
    }

    /// Ask the backend. Returns `None` on any failure.
    pub async fn ask(&self, history: &[ChatMessage]) -> Option<ChatReply> {
        let body = AskRequest { messages: history };

        let response = match self.client.post(&self.url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, url = %self.url, "chatbot request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "chatbot returned non-2xx");
            return None;
        }

        let data: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse chatbot response body");
                return None;
            }
        };

        let Some(text) = ["text", "reply"]
            .iter()
            .find_map(|key| data.get(*key).and_then(Value::as_str))
        else {
            tracing::warn!("chatbot response has no text");
            return None;
        };

        let followups = data
            .get("followups")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        Some(ChatReply {
            text: text.to_string(),
            followups,
            intent: data.get("intent").and_then(Value::as_str).map(String::from),
        })
    }
}

#[async_trait]
impl ChatResponder for RemoteChatClient {
    async fn respond(&self, history: &[ChatMessage]) -> Option<ResponderReply> {
        self.ask(history).await.map(|reply| ResponderReply {
            reply,
            tier: self.tier_name().into(),
        })
    }

    fn tier_name(&self) -> &str {
        "remote"
    }
}
