//! Specialist: a persona-bound answering agent with an optional knowledge
//! source.
//!
//! State is created on the first question: the knowledge source is built
//! (progress fully drained), then the conversation is opened with the
//! persona. Each specialist answers one question at a time; the lock is held
//! for the whole answer.

use std::path::Path;
use std::sync::Arc;

use council_core::config::SpecialistProfile;
use council_core::error::Result;
use council_core::parse::apply_answer_format;
use council_core::template::render;
use council_core::traits::Provider;
use council_core::types::GenerateParams;
use council_knowledge::{KnowledgeSource, Retriever, SourceBuilder};
use tokio::sync::Mutex;

use crate::conversation::Conversation;

/// Shared retrieval machinery handed to every specialist.
#[derive(Clone)]
pub struct KnowledgeServices {
    pub builder: Arc<SourceBuilder>,
    pub retriever: Arc<Retriever>,
}

struct SpecialistState {
    conversation: Conversation,
    source: Option<KnowledgeSource>,
}

pub struct Specialist {
    name: String,
    profile: SpecialistProfile,
    provider: Arc<dyn Provider>,
    params: GenerateParams,
    knowledge: Option<KnowledgeServices>,
    state: Mutex<Option<SpecialistState>>,
}

impl Specialist {
    pub fn new(
        name: impl Into<String>,
        profile: SpecialistProfile,
        provider: Arc<dyn Provider>,
        params: GenerateParams,
        knowledge: Option<KnowledgeServices>,
    ) -> Self {
        Self {
            name: name.into(),
            profile,
            provider,
            params,
            knowledge,
            state: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profile(&self) -> &SpecialistProfile {
        &self.profile
    }

    pub fn model(&self) -> &str {
        &self.params.model
    }

    /// Answer one question, retrieving from the knowledge source first when
    /// one is configured.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let mut guard = self.state.lock().await;
        let state = match &mut *guard {
            Some(state) => state,
            empty => empty.insert(self.prepare().await),
        };

        let prompt = match (&state.source, &self.knowledge) {
            (Some(source), Some(knowledge)) => {
                let passages = match knowledge.retriever.retrieve(source, question).await {
                    Ok(passages) => passages,
                    Err(e) => {
                        tracing::warn!(specialist = %self.name, "rag query failed: {e}");
                        String::new()
                    }
                };
                let template = self.profile.source_template.as_deref().unwrap_or("{source}\n{question}");
                render(template, &[("source", passages.as_str()), ("question", question)])
            }
            _ => question.to_string(),
        };

        let reply = state
            .conversation
            .chat_in(self.provider.as_ref(), &prompt)
            .await?;
        Ok(apply_answer_format(self.profile.answer_format.as_ref(), &reply))
    }

    /// Turns in the conversation; 0 before the first answer.
    pub async fn turn_count(&self) -> usize {
        self.state
            .lock()
            .await
            .as_ref()
            .map_or(0, |s| s.conversation.turns().len())
    }

    /// Whether a knowledge source was built and is in use.
    pub async fn has_source(&self) -> bool {
        self.state
            .lock()
            .await
            .as_ref()
            .is_some_and(|s| s.source.is_some())
    }

    async fn prepare(&self) -> SpecialistState {
        let source = match (&self.profile.source_file, &self.knowledge) {
            (Some(path), Some(knowledge)) => self.load_source(knowledge, path).await,
            (Some(path), None) => {
                tracing::warn!(
                    specialist = %self.name,
                    "no retrieval configured, ignoring source {}",
                    path.display()
                );
                None
            }
            _ => None,
        };

        SpecialistState {
            conversation: Conversation::new(self.params.clone(), self.profile.persona.clone()),
            source,
        }
    }

    async fn load_source(&self, knowledge: &KnowledgeServices, path: &Path) -> Option<KnowledgeSource> {
        let (source, mut progress) = match knowledge.builder.build_from_file(path).await {
            Ok(built) => built,
            Err(e) => {
                tracing::error!(specialist = %self.name, "rag preprocess failed: {e}");
                return None;
            }
        };

        tracing::info!(specialist = %self.name, "Importing knowledge source {}...", path.display());
        let mut failed = 0usize;
        while let Some(p) = progress.recv().await {
            if let Some(err) = &p.error {
                failed += 1;
                tracing::error!(
                    specialist = %self.name,
                    "rag preprocess failed on unit {}: {err}\n{}",
                    p.current,
                    p.unit_text
                );
            }
            tracing::debug!("Progress: {:.1}% unit {} of {}", p.percentage, p.current, p.total);
        }

        if failed > 0 {
            tracing::warn!(
                specialist = %self.name,
                "Knowledge source ready, {failed} of {} unit(s) failed",
                source.len()
            );
        } else {
            tracing::info!(specialist = %self.name, "Knowledge source ready ({} units)", source.len());
        }
        Some(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;
    use council_core::config::{AnswerFormat, RetrievalConfig};
    use council_core::error::CouncilError;
    use council_knowledge::{MemoryVectorIndex, ProviderEmbedder, Rerank};

    struct EchoRerank;

    #[async_trait::async_trait]
    impl Rerank for EchoRerank {
        async fn rerank(&self, candidates: &str, _q: &str, _n: usize) -> Result<String> {
            Ok(format!("[{candidates}]"))
        }
    }

    fn knowledge(provider: Arc<ScriptedProvider>) -> KnowledgeServices {
        let embedder = Arc::new(ProviderEmbedder::new(provider, "emb"));
        let index = Arc::new(MemoryVectorIndex::new(embedder));
        let config = RetrievalConfig::default();
        KnowledgeServices {
            builder: Arc::new(SourceBuilder::new(index.clone(), &config)),
            retriever: Arc::new(Retriever::new(index, Arc::new(EchoRerank), &config)),
        }
    }

    fn plain(persona: &str) -> SpecialistProfile {
        SpecialistProfile {
            persona: persona.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_plain_specialist_returns_raw_reply() {
        let provider = Arc::new(ScriptedProvider::new(|_, _| Ok("  6\n".into())));
        let s = Specialist::new("general", plain(""), provider.clone(), GenerateParams::new("expert"), None);

        assert_eq!(s.answer("1+2+3").await.unwrap(), "  6\n");
        assert_eq!(provider.calls()[0].last_text(), "1+2+3");
        assert_eq!(s.turn_count().await, 2);
    }

    #[tokio::test]
    async fn test_answer_format_applied() {
        let provider = Arc::new(ScriptedProvider::new(|_, messages| {
            let q = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            if q.contains('+') {
                Ok("isMath: true\nresolvation:\n\n1+2+3 = 6\n\n".into())
            } else {
                Ok("isMath: false\nresolvation: -".into())
            }
        }));
        let profile = SpecialistProfile {
            persona: "You are a math teacher.".into(),
            answer_format: Some(AnswerFormat {
                gate_key: "isMath".into(),
                body_key: "resolvation".into(),
                not_applicable: "not a math question".into(),
            }),
            ..Default::default()
        };
        let s = Specialist::new("math", profile, provider, GenerateParams::new("expert"), None);

        assert_eq!(s.answer("1+2+3").await.unwrap(), "1+2+3 = 6");
        assert_eq!(s.answer("who is Wang Wei?").await.unwrap(), "not a math question");
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let provider = Arc::new(ScriptedProvider::new(|_, _| Err(CouncilError::Http("timed out".into()))));
        let s = Specialist::new("general", plain(""), provider, GenerateParams::new("expert"), None);
        assert!(s.answer("q").await.unwrap_err().is_request_failure());
    }

    #[tokio::test]
    async fn test_source_is_built_once_and_spliced_into_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.txt");
        let a = "a".repeat(60);
        let b = "b".repeat(60);
        std::fs::write(&path, format!("{a}\n\n{a}\n\n{b}\n\n{b}\n")).unwrap();

        let provider = Arc::new(ScriptedProvider::new(|_, _| Ok("answer".into())));
        let profile = SpecialistProfile {
            persona: "You know the source.".into(),
            source_file: Some(path),
            source_template: Some("Source: {source}\nQuestion: {question}".into()),
            ..Default::default()
        };
        let s = Specialist::new(
            "hp",
            profile,
            provider.clone(),
            GenerateParams::new("expert"),
            Some(knowledge(provider.clone())),
        );

        s.answer("aaa?").await.unwrap();
        s.answer("bbb?").await.unwrap();
        assert!(s.has_source().await);

        let spec_calls = provider.calls_to("expert");
        assert_eq!(spec_calls.len(), 2);
        let prompt = spec_calls[0].last_text();
        assert!(prompt.starts_with("Source: ["));
        assert!(prompt.contains(&a));
        assert!(prompt.ends_with("Question: aaa?"));
    }

    #[tokio::test]
    async fn test_missing_source_file_degrades_to_plain_answers() {
        let provider = Arc::new(ScriptedProvider::new(|_, _| Ok("answer".into())));
        let profile = SpecialistProfile {
            source_file: Some("/nonexistent/source.txt".into()),
            source_template: Some("{source}|{question}".into()),
            ..Default::default()
        };
        let s = Specialist::new(
            "hp",
            profile,
            provider.clone(),
            GenerateParams::new("expert"),
            Some(knowledge(provider.clone())),
        );

        assert_eq!(s.answer("q").await.unwrap(), "answer");
        assert!(!s.has_source().await);
        assert_eq!(provider.calls()[0].last_text(), "q");
    }

    #[tokio::test]
    async fn test_concurrent_answers_are_serialized() {
        let provider = Arc::new(ScriptedProvider::new(|_, messages| Ok(format!("{}", messages.len()))));
        let s = Arc::new(Specialist::new(
            "general",
            plain("p"),
            provider,
            GenerateParams::new("expert"),
            None,
        ));

        let mut handles = Vec::new();
        for i in 0..8 {
            let s = Arc::clone(&s);
            handles.push(tokio::spawn(async move { s.answer(&format!("q{i}")).await.unwrap() }));
        }
        for h in handles {
            h.await.unwrap();
        }
        // Every user turn is followed by its reply: no interleaving.
        assert_eq!(s.turn_count().await, 16);
    }
}
