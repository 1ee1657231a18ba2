//! Ollama model service client.
//!
//! Speaks the native Ollama HTTP API: `/api/chat` for generation,
//! `/api/tags` for the installed model list and `/api/embed` for embeddings.
//! Requests are non-streaming; a timeout or transport failure maps to
//! [`CouncilError::Http`], a non-success status or malformed body to
//! [`CouncilError::Provider`].

use async_trait::async_trait;
use council_core::config::ModelServiceConfig;
use council_core::error::{CouncilError, Result};
use council_core::traits::Provider;
use council_core::types::{GenerateParams, Message, ProviderResponse, Usage};
use serde_json::{Value, json};
use std::time::Duration;

/// Client for a local or remote Ollama server.
pub struct OllamaProvider {
    name: String,
    /// Base URL without trailing slash (e.g., "http://localhost:11434").
    base_url: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a client from the `[model_service]` section.
    pub fn new(config: &ModelServiceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CouncilError::Http(format!("client build failed: {e}")))?;

        Ok(Self {
            name: "ollama".to_string(),
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the server answers at its root URL.
    pub async fn ping(&self) -> Result<()> {
        let resp = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| transport_error(&self.base_url, e))?;
        if !resp.status().is_success() {
            return Err(CouncilError::provider(format!(
                "ollama ping returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CouncilError::provider(format!(
                "{} API error {}: {}",
                self.name, status, text
            )));
        }

        resp.json()
            .await
            .map_err(|e| CouncilError::provider(format!("invalid response from {url}: {e}")))
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> CouncilError {
    if e.is_timeout() {
        CouncilError::Http(format!("request to {url} timed out"))
    } else {
        CouncilError::Http(format!("connection to {url} failed: {e}"))
    }
}

/// Build the `/api/chat` request body.
pub(crate) fn chat_body(messages: &[Message], params: &GenerateParams) -> Value {
    let mut body = json!({
        "model": params.model,
        "messages": messages,
        "stream": false,
    });
    if let Some(temperature) = params.temperature {
        body["options"] = json!({ "temperature": temperature });
    }
    body
}

/// Extract the assistant turn and token counts from a `/api/chat` reply.
pub(crate) fn parse_chat_response(json: Value) -> Result<ProviderResponse> {
    let message: Message = serde_json::from_value(json["message"].clone())
        .map_err(|e| CouncilError::provider(format!("no message in chat response: {e}")))?;

    let usage = Usage {
        prompt_tokens: json["prompt_eval_count"].as_u64().unwrap_or(0) as u32,
        completion_tokens: json["eval_count"].as_u64().unwrap_or(0) as u32,
    };

    Ok(ProviderResponse { message, usage })
}

/// Extract model names from a `/api/tags` reply.
pub(crate) fn parse_model_names(json: &Value) -> Vec<String> {
    json["models"]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|m| m["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Extract the first vector from a `/api/embed` reply.
pub(crate) fn parse_embedding(json: &Value) -> Result<Vec<f32>> {
    let first = json["embeddings"]
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| CouncilError::provider("no embeddings in response"))?;

    Ok(first
        .iter()
        .filter_map(|x| x.as_f64())
        .map(|x| x as f32)
        .collect())
}

#[async_trait]
impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> Result<ProviderResponse> {
        let body = chat_body(messages, params);
        let json = self.post_json("/api/chat", &body).await?;
        parse_chat_response(json)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        if !resp.status().is_success() {
            return Err(CouncilError::provider(format!(
                "{} model list returned {}",
                self.name,
                resp.status()
            )));
        }
        let json: Value = resp
            .json()
            .await
            .map_err(|e| CouncilError::provider(format!("invalid model list: {e}")))?;
        Ok(parse_model_names(&json))
    }

    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let body = json!({ "model": model, "input": text });
        let json = self.post_json("/api/embed", &body).await?;
        parse_embedding(&json)
    }
}
