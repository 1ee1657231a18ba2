//! Vector index: embeds unit text and answers nearest-neighbor queries.
//!
//! Each knowledge source owns exactly one namespace. Namespaces are created
//! once, filled once, and never merged.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use council_core::error::{CouncilError, Result};
use council_core::traits::Provider;
use tokio::sync::RwLock;

/// Turns text into an embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// [`Embedder`] backed by the model service.
pub struct ProviderEmbedder {
    provider: Arc<dyn Provider>,
    model: String,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Embedder for ProviderEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.provider.embed(&self.model, text).await
    }
}

/// Namespace lifecycle plus similarity search.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Fails if the namespace already exists.
    async fn create_namespace(&self, namespace: &str) -> Result<()>;

    /// Embed `text` and store it under `ordinal`.
    async fn index(&self, namespace: &str, ordinal: usize, text: &str) -> Result<()>;

    /// Up to `k` ordinals, most similar first.
    async fn query(&self, namespace: &str, text: &str, k: usize) -> Result<Vec<usize>>;
}

/// In-process brute-force index over an [`Embedder`].
pub struct MemoryVectorIndex {
    embedder: Arc<dyn Embedder>,
    namespaces: RwLock<HashMap<String, Vec<(usize, Vec<f32>)>>>,
}

impl MemoryVectorIndex {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored vectors in a namespace, if it exists.
    pub async fn len(&self, namespace: &str) -> Option<usize> {
        self.namespaces.read().await.get(namespace).map(Vec::len)
    }
}

fn missing(namespace: &str) -> CouncilError {
    CouncilError::Index(format!("namespace '{namespace}' does not exist"))
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn create_namespace(&self, namespace: &str) -> Result<()> {
        let mut namespaces = self.namespaces.write().await;
        if namespaces.contains_key(namespace) {
            return Err(CouncilError::Index(format!(
                "namespace '{namespace}' already exists"
            )));
        }
        namespaces.insert(namespace.to_string(), Vec::new());
        Ok(())
    }

    async fn index(&self, namespace: &str, ordinal: usize, text: &str) -> Result<()> {
        if !self.namespaces.read().await.contains_key(namespace) {
            return Err(missing(namespace));
        }

        let vector = self.embedder.embed(text).await?;

        let mut namespaces = self.namespaces.write().await;
        let entries = namespaces.get_mut(namespace).ok_or_else(|| missing(namespace))?;
        if let Some(first) = entries.first() {
            if first.1.len() != vector.len() {
                return Err(CouncilError::Index(format!(
                    "dimension mismatch in '{namespace}': expected {}, got {}",
                    first.1.len(),
                    vector.len()
                )));
            }
        }
        entries.push((ordinal, vector));
        Ok(())
    }

    async fn query(&self, namespace: &str, text: &str, k: usize) -> Result<Vec<usize>> {
        if !self.namespaces.read().await.contains_key(namespace) {
            return Err(missing(namespace));
        }

        let target = self.embedder.embed(text).await?;
        let target_mag = magnitude(&target);

        let namespaces = self.namespaces.read().await;
        let entries = namespaces.get(namespace).ok_or_else(|| missing(namespace))?;

        let mut scored: Vec<(usize, f32)> = entries
            .iter()
            .map(|(ordinal, v)| (*ordinal, cosine_similarity(&target, v, target_mag)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored.into_iter().map(|(ordinal, _)| ordinal).collect())
    }
}

fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity; 0.0 for zero vectors or mismatched lengths.
fn cosine_similarity(a: &[f32], b: &[f32], mag_a: f32) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mag_b = magnitude(b);
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (mag_a * mag_b)
}
