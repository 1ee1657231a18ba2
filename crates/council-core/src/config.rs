//! Council configuration system.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{CouncilError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouncilConfig {
    #[serde(default)]
    pub model_service: ModelServiceConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub review: ReviewConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Specialist profiles keyed by the name the coordinator routes to.
    #[serde(default)]
    pub specialists: BTreeMap<String, SpecialistProfile>,
}

impl CouncilConfig {
    /// Load config from the default path (~/.council/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CouncilError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CouncilError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject profiles that cannot work at runtime.
    pub fn validate(&self) -> Result<()> {
        for (name, profile) in &self.specialists {
            if name.trim().is_empty() {
                return Err(CouncilError::Config("specialist name must not be empty".into()));
            }
            if profile.source_file.is_some() && profile.source_template.is_none() {
                return Err(CouncilError::Config(format!(
                    "specialist '{name}' declares source_file without source_template"
                )));
            }
            if profile.has_reviewer()
                && (profile.review_template.is_none() || profile.rewrite_template.is_none())
            {
                return Err(CouncilError::Config(format!(
                    "specialist '{name}' declares reviewer_persona without review_template and rewrite_template"
                )));
            }
        }
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Council home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".council")
    }
}

/// Connection to the model service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelServiceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_endpoint() -> String { "http://localhost:11434".into() }
fn default_request_timeout() -> u64 { 180 }

impl Default for ModelServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
            temperature: None,
        }
    }
}

/// Short model aliases, resolved against the installed models at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_chat_model")]
    pub coordinator: String,
    #[serde(default = "default_chat_model")]
    pub specialist: String,
    #[serde(default = "default_judge_model")]
    pub reviewer: String,
    #[serde(default = "default_judge_model")]
    pub reranker: String,
    #[serde(default = "default_embedding_model")]
    pub embedding: String,
}

fn default_chat_model() -> String { "deepseek".into() }
fn default_judge_model() -> String { "gemma".into() }
fn default_embedding_model() -> String { "nomic-embed-text".into() }

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            coordinator: default_chat_model(),
            specialist: default_chat_model(),
            reviewer: default_judge_model(),
            reranker: default_judge_model(),
            embedding: default_embedding_model(),
        }
    }
}

/// Knowledge source chunking and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_recall_count")]
    pub recall_count: usize,
    #[serde(default = "default_rerank_count")]
    pub rerank_count: usize,
    #[serde(default = "default_min_paragraphs")]
    pub min_paragraphs: usize,
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
    #[serde(default = "bool_true")]
    pub segment_cjk: bool,
}

fn default_recall_count() -> usize { 10 }
fn default_rerank_count() -> usize { 5 }
fn default_min_paragraphs() -> usize { 2 }
fn default_min_chars() -> usize { 100 }
fn bool_true() -> bool { true }

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            recall_count: default_recall_count(),
            rerank_count: default_rerank_count(),
            min_paragraphs: default_min_paragraphs(),
            min_chars: default_min_chars(),
            segment_cjk: true,
        }
    }
}

/// Review policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Answers scoring below this get exactly one rewrite.
    #[serde(default = "default_rewrite_threshold")]
    pub rewrite_threshold: i64,
}

fn default_rewrite_threshold() -> i64 { 80 }

impl Default for ReviewConfig {
    fn default() -> Self {
        Self { rewrite_threshold: default_rewrite_threshold() }
    }
}

/// Templates shared by every specialist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Header of the routing prompt. Placeholder: `{question}`.
    #[serde(default = "default_coordinator_prompt")]
    pub coordinator: String,
    /// One line per registered specialist. Placeholders: `{name}`, `{introduction}`.
    #[serde(default = "default_coordinator_specialist_prompt")]
    pub coordinator_specialist: String,
    /// Rerank instruction. Placeholders: `{question}`, `{candidates}`, `{number}`.
    #[serde(default = "default_rerank_prompt")]
    pub rerank: String,
}

fn default_coordinator_prompt() -> String {
    "A question needs the help of a specialist.\nQuestion: {question}\n\
     Reply with only the name of the one specialist below best suited to answer it, \
     or reply NA if none of them fits.\n"
        .into()
}

fn default_coordinator_specialist_prompt() -> String {
    "Specialist name: {name} Introduction: {introduction}\n".into()
}

fn default_rerank_prompt() -> String {
    "Topic: {question}\nCompare each of the passages below with the topic and score its relevance. \
     Then reply with only the {number} most relevant passages, verbatim, without scores or reasons:\n\
     {candidates}"
        .into()
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            coordinator: default_coordinator_prompt(),
            coordinator_specialist: default_coordinator_specialist_prompt(),
            rerank: default_rerank_prompt(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 3000 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// One specialist: persona, optional knowledge source and optional reviewer.
///
/// A missing knowledge source or reviewer is expressed by the absent fields,
/// never by a different profile kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecialistProfile {
    /// One-line description the coordinator routes on.
    #[serde(default)]
    pub introduction: String,
    /// System turn of the specialist's conversation.
    #[serde(default)]
    pub persona: String,
    /// Model alias overriding `[models].specialist`.
    #[serde(default)]
    pub model: Option<String>,
    /// Plain-text knowledge source, paragraphs separated by blank lines.
    #[serde(default)]
    pub source_file: Option<PathBuf>,
    /// Placeholders: `{source}`, `{question}`.
    #[serde(default)]
    pub source_template: Option<String>,
    /// System turn of the reviewer; its presence enables review.
    #[serde(default)]
    pub reviewer_persona: Option<String>,
    /// Placeholders: `{question}`, `{answer}`.
    #[serde(default)]
    pub review_template: Option<String>,
    /// Placeholders: `{review}`, `{question}`, `{answer}`.
    #[serde(default)]
    pub rewrite_template: Option<String>,
    #[serde(default)]
    pub answer_format: Option<AnswerFormat>,
}

impl SpecialistProfile {
    /// The persona-free profile used when routing finds no specialist.
    pub fn general() -> Self {
        Self::default()
    }

    pub fn has_reviewer(&self) -> bool {
        self.reviewer_persona.is_some()
    }
}

/// Structured reply contract: `<gate_key>: true <body_key>: <answer>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerFormat {
    pub gate_key: String,
    pub body_key: String,
    /// Returned whenever the gate is not `true` or the reply is malformed.
    pub not_applicable: String,
}
