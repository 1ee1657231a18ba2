//! Offline orchestrator used by the gateway tests.

use std::sync::Arc;

use async_trait::async_trait;
use council_agent::{Coordinator, Orchestrator, Specialist};
use council_core::config::{PromptsConfig, SpecialistProfile};
use council_core::error::{CouncilError, Result};
use council_core::traits::Provider;
use council_core::types::{GenerateParams, Message, ProviderResponse, Usage};
use council_providers::MeteredProvider;

use crate::server::AppState;

/// Routes everything to the general specialist and echoes the question.
/// A question of "boom" fails.
struct EchoProvider;

#[async_trait]
impl Provider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn chat(&self, messages: &[Message], params: &GenerateParams) -> Result<ProviderResponse> {
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        let content = match params.model.as_str() {
            "coord" => "NA".to_string(),
            _ if last == "boom" => return Err(CouncilError::Http("timed out".into())),
            _ => format!("echo: {last}"),
        };
        Ok(ProviderResponse {
            message: Message::assistant(content),
            usage: Usage {
                prompt_tokens: 1,
                completion_tokens: 2,
            },
        })
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["coord".into(), "expert".into()])
    }

    async fn embed(&self, _model: &str, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0])
    }
}

pub fn test_state() -> AppState {
    let metered = Arc::new(MeteredProvider::new(Arc::new(EchoProvider)));
    let stats = metered.stats();
    let provider: Arc<dyn Provider> = metered;

    let coordinator = Coordinator::new(
        provider.clone(),
        GenerateParams::new("coord"),
        &PromptsConfig::default(),
    );
    let general = Specialist::new(
        "general",
        SpecialistProfile::general(),
        provider,
        GenerateParams::new("expert"),
        None,
    );
    AppState::new(Arc::new(Orchestrator::new(coordinator, general, 80)), stats)
}
