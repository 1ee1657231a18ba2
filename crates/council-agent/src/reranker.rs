//! Model-backed rerank step for the retriever.

use std::sync::Arc;

use async_trait::async_trait;
use council_core::error::Result;
use council_core::template::render;
use council_core::traits::Provider;
use council_core::types::GenerateParams;
use council_knowledge::Rerank;

use crate::conversation::chat_once;

/// Asks a model to keep the most relevant candidate passages.
pub struct ModelReranker {
    provider: Arc<dyn Provider>,
    params: GenerateParams,
    template: String,
}

impl ModelReranker {
    /// `template` placeholders: `{question}`, `{candidates}`, `{number}`.
    pub fn new(provider: Arc<dyn Provider>, params: GenerateParams, template: impl Into<String>) -> Self {
        Self {
            provider,
            params,
            template: template.into(),
        }
    }
}

#[async_trait]
impl Rerank for ModelReranker {
    async fn rerank(&self, candidates: &str, question: &str, count: usize) -> Result<String> {
        let number = count.to_string();
        let prompt = render(
            &self.template,
            &[
                ("candidates", candidates),
                ("question", question),
                ("number", number.as_str()),
            ],
        );
        chat_once(self.provider.as_ref(), &self.params, &prompt).await
    }
}
