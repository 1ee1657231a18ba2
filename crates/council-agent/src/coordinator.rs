//! Routing: pick the specialist that should answer a question.

use std::collections::BTreeMap;
use std::sync::Arc;

use council_core::config::PromptsConfig;
use council_core::error::Result;
use council_core::template::render;
use council_core::traits::Provider;
use council_core::types::GenerateParams;

use crate::conversation::chat_once;

/// Sentinel a model replies with when no specialist fits.
pub const NO_MATCH: &str = "NA";

/// Holds the name → introduction registry and asks a model to classify.
///
/// Every route is single-shot: no history is kept between questions.
pub struct Coordinator {
    provider: Arc<dyn Provider>,
    params: GenerateParams,
    header_template: String,
    entry_template: String,
    registry: BTreeMap<String, String>,
}

impl Coordinator {
    pub fn new(provider: Arc<dyn Provider>, params: GenerateParams, prompts: &PromptsConfig) -> Self {
        Self {
            provider,
            params,
            header_template: prompts.coordinator.clone(),
            entry_template: prompts.coordinator_specialist.clone(),
            registry: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, introduction: impl Into<String>) {
        self.registry.insert(name.into(), introduction.into());
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    /// Header followed by one line per registered specialist.
    pub fn routing_prompt(&self, question: &str) -> String {
        let mut prompt = render(&self.header_template, &[("question", question)]);
        for (name, introduction) in &self.registry {
            prompt.push_str(&render(
                &self.entry_template,
                &[("name", name.as_str()), ("introduction", introduction.as_str())],
            ));
        }
        prompt
    }

    /// The model's raw reply; interpreting it is left to the caller.
    pub async fn route(&self, question: &str) -> Result<String> {
        let prompt = self.routing_prompt(question);
        chat_once(self.provider.as_ref(), &self.params, &prompt).await
    }
}
