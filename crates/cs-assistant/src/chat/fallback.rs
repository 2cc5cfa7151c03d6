//! Fallback responder: primary source first, second source on a miss.
//!
//! Typically remote-first with the offline rules behind it. The tier that
//! actually produced the answer is carried in `ResponderReply.tier`.

use async_trait::async_trait;
use cs_protocol::{ChatMessage, last_user_message};

use super::{ChatResponder, ResponderReply};

/// Composite responder that tries `primary`, then `fallback`.
pub struct FallbackResponder {
    primary: Box<dyn ChatResponder>,
    fallback: Box<dyn ChatResponder>,
}

impl FallbackResponder {
    pub fn new(primary: Box<dyn ChatResponder>, fallback: Box<dyn ChatResponder>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl ChatResponder for FallbackResponder {
    async fn respond(&self, history: &[ChatMessage]) -> Option<ResponderReply> {
        if let Some(answer) = self.primary.respond(history).await {
            return Some(answer);
        }

        let answer = self.fallback.respond(history).await;
        tracing::debug!(
            primary = self.primary.tier_name(),
            fallback = self.fallback.tier_name(),
            question = %question_preview(last_user_message(history)),
            topic = answer
                .as_ref()
                .and_then(|a| a.reply.intent.as_deref())
                .unwrap_or("none"),
            "primary responder missed, answered by fallback"
        );
        answer
    }

    fn tier_name(&self) -> &str {
        "fallback"
    }
}

/// First characters of a question, for log lines.
fn question_preview(question: &str) -> String {
    const MAX_CHARS: usize = 60;
    let mut preview: String = question.chars().take(MAX_CHARS).collect();
    if question.chars().nth(MAX_CHARS).is_some() {
        preview.push('…');
    }
    preview
}
