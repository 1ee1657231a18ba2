//! Conversation state and the two ways of talking to a model.

use council_core::error::Result;
use council_core::traits::Provider;
use council_core::types::{GenerateParams, Message};

/// Append-only history owned by one specialist or reviewer.
///
/// The persona is fixed at creation and sent first on every request, as a
/// system turn even when it is empty.
#[derive(Debug, Clone)]
pub struct Conversation {
    params: GenerateParams,
    persona: String,
    turns: Vec<Message>,
}

impl Conversation {
    pub fn new(params: GenerateParams, persona: impl Into<String>) -> Self {
        Self {
            params,
            persona: persona.into(),
            turns: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.params.model
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    /// Full request payload: persona, then every turn in order.
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.turns.len() + 1);
        messages.push(Message::system(self.persona.clone()));
        messages.extend(self.turns.iter().cloned());
        messages
    }

    /// Append `text` as a user turn, send the whole history and append the
    /// reply.
    ///
    /// On failure the user turn stays in the history.
    pub async fn chat_in(&mut self, provider: &dyn Provider, text: &str) -> Result<String> {
        self.turns.push(Message::user(text));
        let response = provider.chat(&self.messages(), &self.params).await?;
        let reply = response.message.content;
        self.turns.push(Message::assistant(reply.clone()));
        Ok(reply)
    }
}

/// Single-shot request with no history and no persona.
pub async fn chat_once(provider: &dyn Provider, params: &GenerateParams, text: &str) -> Result<String> {
    let response = provider.chat(&[Message::user(text)], params).await?;
    Ok(response.message.content)
}
