//! # Council Providers
//!
//! Model service implementations for Council.
//!
//! The only backend is Ollama (`OllamaProvider`); every call made by the
//! agents goes through `MeteredProvider`, which keeps the process-wide usage
//! counters. `ModelCatalog` turns short aliases such as "gemma" into full
//! installed model names.

pub mod catalog;
pub mod metered;
pub mod ollama;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{ModelCatalog, resolve_model};
pub use metered::{MeteredProvider, UsageSnapshot, UsageStats};
pub use ollama::OllamaProvider;

use council_core::config::ModelServiceConfig;
use council_core::error::{CouncilError, Result};
use council_core::traits::Provider;
use std::sync::Arc;

/// A connected, metered model service plus the models it has installed.
pub struct ModelService {
    pub provider: Arc<MeteredProvider>,
    pub catalog: ModelCatalog,
}

impl ModelService {
    pub fn stats(&self) -> Arc<UsageStats> {
        self.provider.stats()
    }
}

/// Connect to the configured model service.
///
/// Fails with [`CouncilError::Startup`] if the service is unreachable or
/// reports no installed models.
pub async fn connect(config: &ModelServiceConfig) -> Result<ModelService> {
    let ollama = OllamaProvider::new(config)?;
    ollama
        .ping()
        .await
        .map_err(|e| CouncilError::Startup(format!("need ollama server at {}: {e}", config.endpoint)))?;

    let provider = Arc::new(MeteredProvider::new(Arc::new(ollama)));
    let catalog = ModelCatalog::discover(provider.as_ref()).await?;
    tracing::info!(
        "Connected to model service at {} ({} model(s))",
        config.endpoint,
        catalog.installed().len()
    );

    Ok(ModelService { provider, catalog })
}

/// Wrap an already-built provider (tests, alternative backends).
pub async fn connect_with(provider: Arc<dyn Provider>) -> Result<ModelService> {
    let provider = Arc::new(MeteredProvider::new(provider));
    let catalog = ModelCatalog::discover(provider.as_ref()).await?;
    Ok(ModelService { provider, catalog })
}
