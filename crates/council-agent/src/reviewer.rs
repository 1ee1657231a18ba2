//! Reviewer: scores an answer and explains what is missing.

use std::sync::Arc;

use council_core::error::Result;
use council_core::parse::parse_review;
use council_core::template::render;
use council_core::traits::Provider;
use council_core::types::{GenerateParams, ReviewResult};
use tokio::sync::Mutex;

use crate::conversation::Conversation;

/// Owns a conversation of its own, created on first review.
pub struct Reviewer {
    provider: Arc<dyn Provider>,
    params: GenerateParams,
    persona: String,
    template: String,
    conversation: Mutex<Option<Conversation>>,
}

impl Reviewer {
    /// `template` placeholders: `{question}`, `{answer}`.
    pub fn new(
        provider: Arc<dyn Provider>,
        params: GenerateParams,
        persona: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            params,
            persona: persona.into(),
            template: template.into(),
            conversation: Mutex::new(None),
        }
    }

    /// Review one answer.
    ///
    /// A reply without both `score:` and `review:` yields the zero value;
    /// only a failed request is an error.
    pub async fn review(&self, question: &str, answer: &str) -> Result<ReviewResult> {
        let prompt = render(&self.template, &[("question", question), ("answer", answer)]);

        let mut guard = self.conversation.lock().await;
        let conversation = guard
            .get_or_insert_with(|| Conversation::new(self.params.clone(), self.persona.clone()));
        let reply = conversation.chat_in(self.provider.as_ref(), &prompt).await?;

        let result = parse_review(&reply);
        if !result.is_available() {
            tracing::warn!("reviewer reply did not match the score/review format: {reply:?}");
        }
        Ok(result)
    }

    /// Number of turns so far; 0 before the first review.
    pub async fn turn_count(&self) -> usize {
        self.conversation
            .lock()
            .await
            .as_ref()
            .map_or(0, |c| c.turns().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use council_core::types::Message;

    fn reviewer(provider: Arc<ScriptedProvider>) -> Reviewer {
        Reviewer::new(
            provider,
            GenerateParams::new("rev"),
            "You grade answers strictly.",
            "Question: {question}\nAnswer: {answer}",
        )
    }

    #[tokio::test]
    async fn test_review_parses_score_and_critique() {
        let provider = Arc::new(ScriptedProvider::new(|_, _| {
            Ok("score: 75\nreview: needs more detail".into())
        }));
        let r = reviewer(provider.clone());
        assert_eq!(r.turn_count().await, 0);

        let result = r.review("1+2+3", "6").await.unwrap();
        assert_eq!(result.score, 75);
        assert_eq!(result.critique, "needs more detail");

        let call = &provider.calls_to("rev")[0];
        assert_eq!(call.messages[0], Message::system("You grade answers strictly."));
        assert_eq!(call.last_text(), "Question: 1+2+3\nAnswer: 6");
    }

    #[tokio::test]
    async fn test_malformed_reply_is_unavailable() {
        let provider = Arc::new(ScriptedProvider::new(|_, _| Ok("looks fine to me".into())));
        let result = reviewer(provider).review("q", "a").await.unwrap();
        assert!(!result.is_available());
    }

    #[tokio::test]
    async fn test_reviewer_keeps_its_own_history() {
        let provider = Arc::new(ScriptedProvider::new(|_, _| Ok("score: 90 review: ok".into())));
        let r = reviewer(provider.clone());
        r.review("q1", "a1").await.unwrap();
        r.review("q2", "a2").await.unwrap();

        assert_eq!(r.turn_count().await, 4);
        assert_eq!(provider.calls()[1].messages.len(), 4);
    }
}
