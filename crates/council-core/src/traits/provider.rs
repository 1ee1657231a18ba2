//! Model service abstraction.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerateParams, Message, ProviderResponse};

/// A text-generation and embedding backend.
///
/// Every call is a potentially long network round trip; failures surface as
/// errors and are never retried here.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Generate the next assistant turn for an ordered list of turns.
    async fn chat(&self, messages: &[Message], params: &GenerateParams)
    -> Result<ProviderResponse>;

    /// Names of the models installed on the service.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Embed a piece of text with the given embedding model.
    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>>;
}
