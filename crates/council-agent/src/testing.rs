//! Scripted model service used by the unit tests of this crate.

use std::sync::Mutex;

use async_trait::async_trait;
use council_core::error::Result;
use council_core::traits::Provider;
use council_core::types::{GenerateParams, Message, ProviderResponse, Usage};

type Handler = dyn Fn(&str, &[Message]) -> Result<String> + Send + Sync;

/// One recorded chat request.
#[derive(Debug, Clone)]
pub struct Call {
    pub model: String,
    pub messages: Vec<Message>,
}

impl Call {
    pub fn last_text(&self) -> &str {
        self.messages.last().map(|m| m.content.as_str()).unwrap_or("")
    }
}

/// Answers every chat through a closure of `(model, messages)` and records
/// the request. Embeddings are letter counts over a-e.
pub struct ScriptedProvider {
    handler: Box<Handler>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedProvider {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &[Message]) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, model: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.model == model)
            .collect()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, messages: &[Message], params: &GenerateParams) -> Result<ProviderResponse> {
        self.calls.lock().unwrap().push(Call {
            model: params.model.clone(),
            messages: messages.to_vec(),
        });
        let content = (self.handler)(&params.model, messages)?;
        Ok(ProviderResponse {
            message: Message::assistant(content),
            usage: Usage {
                prompt_tokens: 0,
                completion_tokens: 1,
            },
        })
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec![
            "coord".into(),
            "expert".into(),
            "rev".into(),
            "rank".into(),
            "emb".into(),
        ])
    }

    async fn embed(&self, _model: &str, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0; 5];
        for c in text.chars() {
            if let Some(i) = "abcde".find(c) {
                v[i] += 1.0;
            }
        }
        Ok(v)
    }
}
