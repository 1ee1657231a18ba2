//! Installed-model catalog and alias resolution.

use council_core::error::{CouncilError, Result};
use council_core::traits::Provider;

/// Find the first installed model whose name contains `alias`,
/// ignoring case.
pub fn resolve_model<'a>(installed: &'a [String], alias: &str) -> Option<&'a str> {
    let needle = alias.to_lowercase();
    installed
        .iter()
        .find(|name| name.to_lowercase().contains(&needle))
        .map(String::as_str)
}

/// Model names reported by the service at startup.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    installed: Vec<String>,
}

impl ModelCatalog {
    pub fn new(installed: Vec<String>) -> Self {
        Self { installed }
    }

    /// Query the provider for its installed models.
    ///
    /// An empty list is a startup failure: nothing could answer.
    pub async fn discover(provider: &dyn Provider) -> Result<Self> {
        let installed = provider
            .list_models()
            .await
            .map_err(|e| CouncilError::Startup(format!("cannot list models: {e}")))?;
        if installed.is_empty() {
            return Err(CouncilError::Startup(
                "model service has no installed models".into(),
            ));
        }
        Ok(Self::new(installed))
    }

    pub fn installed(&self) -> &[String] {
        &self.installed
    }

    /// Resolve an alias to a full model name, falling back to the alias
    /// itself when nothing matches.
    pub fn resolve(&self, alias: &str) -> String {
        match resolve_model(&self.installed, alias) {
            Some(name) => name.to_string(),
            None => {
                tracing::warn!("no installed model matches '{alias}', using it verbatim");
                alias.to_string()
            }
        }
    }
}
