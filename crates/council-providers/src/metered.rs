//! Usage accounting. Wraps a provider and counts every generate call.
//!
//! Counters are process-wide atomics, so they are updated independently of
//! whatever lock the caller holds around its own conversation.

use async_trait::async_trait;
use council_core::error::Result;
use council_core::traits::Provider;
use council_core::types::{GenerateParams, Message, ProviderResponse};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Cumulative counters across all model calls.
#[derive(Debug, Default)]
pub struct UsageStats {
    questions: AtomicU64,
    answers: AtomicU64,
    duration_micros: AtomicU64,
    tokens: AtomicU64,
}

impl UsageStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_question(&self) {
        self.questions.fetch_add(1, Ordering::Relaxed);
    }

    fn record_answer(&self, elapsed: Duration, tokens: u32) {
        self.answers.fetch_add(1, Ordering::Relaxed);
        self.duration_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.tokens.fetch_add(u64::from(tokens), Ordering::Relaxed);
    }

    pub fn question_count(&self) -> u64 {
        self.questions.load(Ordering::Relaxed)
    }

    pub fn answer_count(&self) -> u64 {
        self.answers.load(Ordering::Relaxed)
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_micros(self.duration_micros.load(Ordering::Relaxed))
    }

    pub fn total_tokens(&self) -> u64 {
        self.tokens.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            question_count: self.question_count(),
            answer_count: self.answer_count(),
            total_duration: self.total_duration().as_secs_f64(),
            total_tokens: self.total_tokens(),
        }
    }
}

/// Point-in-time copy of [`UsageStats`]; `total_duration` is in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageSnapshot {
    pub question_count: u64,
    pub answer_count: u64,
    pub total_duration: f64,
    pub total_tokens: u64,
}

/// Provider wrapper that logs and meters every chat call.
pub struct MeteredProvider {
    inner: Arc<dyn Provider>,
    stats: Arc<UsageStats>,
}

impl MeteredProvider {
    pub fn new(inner: Arc<dyn Provider>) -> Self {
        Self {
            inner,
            stats: Arc::new(UsageStats::new()),
        }
    }

    /// Shared handle to the counters.
    pub fn stats(&self) -> Arc<UsageStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl Provider for MeteredProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn chat(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> Result<ProviderResponse> {
        self.stats.record_question();
        if let Some(last) = messages.last() {
            tracing::debug!(model = %params.model, "q#: {}", last.content);
        }

        let start = Instant::now();
        match self.inner.chat(messages, params).await {
            Ok(response) => {
                self.stats
                    .record_answer(start.elapsed(), response.usage.completion_tokens);
                tracing::debug!(model = %params.model, "a#: {}", response.content());
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.inner.name(),
                    model = %params.model,
                    "chat request failed: {e}"
                );
                Err(e)
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        self.inner.list_models().await
    }

    async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        self.inner.embed(model, text).await
    }
}
