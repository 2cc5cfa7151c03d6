//! Chat answer sources.
//!
//! Two tiers, composed by [`FallbackResponder`]:
//! - **Remote** (primary): the CarSense backend's `/api/v1/chatbot/ask`.
//! - **Local** (fallback): the offline rule table in [`rules`], which
//!   always answers.

pub mod fallback;
pub mod prompt;
pub mod remote;
pub mod rules;

use async_trait::async_trait;
use cs_protocol::{ChatMessage, ChatReply};
use serde::Serialize;

pub use fallback::FallbackResponder;
pub use prompt::{build_request, smart_prompt};
pub use remote::{RemoteChatClient, RemoteChatConfig};

/// An answer plus the tier that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponderReply {
    pub reply: ChatReply,
    pub tier: String,
}

/// Anything that can answer a conversation.
#[async_trait]
pub trait ChatResponder: Send + Sync {
    /// Answer the latest user message of `history`.
    /// Returns None if this source cannot answer right now.
    async fn respond(&self, history: &[ChatMessage]) -> Option<ResponderReply>;

    /// Name of this tier (for logging).
    fn tier_name(&self) -> &str;
}

/// Offline rule-based responder.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalResponder;

#[async_trait]
impl ChatResponder for LocalResponder {
    async fn respond(&self, history: &[ChatMessage]) -> Option<ResponderReply> {
        Some(ResponderReply {
            reply: rules::respond(history),
            tier: self.tier_name().into(),
        })
    }

    fn tier_name(&self) -> &str {
        "local"
    }
}
