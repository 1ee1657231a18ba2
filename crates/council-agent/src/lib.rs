//! # Council Agent
//! Specialists, routing and review: the question-answering core of Council.
//!
//! ## Flow
//! - **Coordinator** picks a specialist from the configured registry
//! - **Specialist** answers, with retrieved passages when it owns a source
//! - **Reviewer** scores the answer; a low score triggers one rewrite
//! - **Orchestrator** runs the whole turn and never fails outward

pub mod conversation;
pub mod coordinator;
pub mod orchestrator;
pub mod reranker;
pub mod reviewer;
pub mod specialist;

#[cfg(test)]
pub(crate) mod testing;

pub use conversation::{Conversation, chat_once};
pub use coordinator::Coordinator;
pub use orchestrator::{APOLOGY, Orchestrator, Outcome};
pub use reranker::ModelReranker;
pub use reviewer::Reviewer;
pub use specialist::{KnowledgeServices, Specialist};

use std::sync::Arc;

use council_core::config::{CouncilConfig, SpecialistProfile};
use council_core::error::Result;
use council_core::traits::Provider;
use council_core::types::GenerateParams;
use council_knowledge::{MemoryVectorIndex, ProviderEmbedder, Retriever, SourceBuilder};
use council_providers::{ModelCatalog, ModelService, UsageStats};

/// Composition root: one orchestrator plus the usage counters of the model
/// service it talks to.
pub struct Council {
    pub orchestrator: Arc<Orchestrator>,
    pub stats: Arc<UsageStats>,
}

impl Council {
    /// Connect to the model service and build every configured specialist.
    pub async fn start(config: &CouncilConfig) -> Result<Self> {
        let service = council_providers::connect(&config.model_service).await?;
        Ok(Self::assemble(config, &service))
    }

    /// Build the agent graph over an already-connected model service.
    pub fn assemble(config: &CouncilConfig, service: &ModelService) -> Self {
        let provider: Arc<dyn Provider> = service.provider.clone();
        let params = |alias: &str| model_params(config, &service.catalog, alias);
        let models = &config.models;

        let embedder = Arc::new(ProviderEmbedder::new(
            provider.clone(),
            service.catalog.resolve(&models.embedding),
        ));
        let index = Arc::new(MemoryVectorIndex::new(embedder));
        let reranker = Arc::new(ModelReranker::new(
            provider.clone(),
            params(&models.reranker),
            config.prompts.rerank.clone(),
        ));
        let knowledge = KnowledgeServices {
            builder: Arc::new(SourceBuilder::new(index.clone(), &config.retrieval)),
            retriever: Arc::new(Retriever::new(index, reranker, &config.retrieval)),
        };

        let coordinator = Coordinator::new(provider.clone(), params(&models.coordinator), &config.prompts);
        let general = Specialist::new(
            "general",
            SpecialistProfile::general(),
            provider.clone(),
            params(&models.specialist),
            None,
        );
        let mut orchestrator = Orchestrator::new(coordinator, general, config.review.rewrite_threshold);

        for (name, profile) in &config.specialists {
            let alias = profile.model.as_deref().unwrap_or(&models.specialist);
            let reviewer = profile.reviewer_persona.as_ref().map(|persona| {
                Reviewer::new(
                    provider.clone(),
                    params(&models.reviewer),
                    persona.clone(),
                    profile.review_template.clone().unwrap_or_default(),
                )
            });
            let specialist = Specialist::new(
                name.clone(),
                profile.clone(),
                provider.clone(),
                params(alias),
                profile.source_file.as_ref().map(|_| knowledge.clone()),
            );
            tracing::info!(
                "Specialist '{name}' ready (model: {}, source: {}, reviewer: {})",
                specialist.model(),
                profile.source_file.is_some(),
                reviewer.is_some()
            );
            orchestrator.add_specialist(specialist, reviewer);
        }

        Self {
            orchestrator: Arc::new(orchestrator),
            stats: service.stats(),
        }
    }
}

fn model_params(config: &CouncilConfig, catalog: &ModelCatalog, alias: &str) -> GenerateParams {
    GenerateParams {
        model: catalog.resolve(alias),
        temperature: config.model_service.temperature,
    }
}
