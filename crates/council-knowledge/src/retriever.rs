//! Retrieval: recall, context expansion, rerank.
//!
//! ```text
//! question ──► index.query(k = recall_count) ──► sort ──► expand gaps of 2
//!          ──► join unit texts with "\n" ──► rerank(top rerank_count) ──► passages
//! ```
//!
//! The rerank reply is passed through as an opaque string.

use std::sync::Arc;

use async_trait::async_trait;
use council_core::config::RetrievalConfig;
use council_core::error::Result;

use crate::index::VectorIndex;
use crate::source::KnowledgeSource;

/// Second-pass relevance filter over recalled candidates.
#[async_trait]
pub trait Rerank: Send + Sync {
    /// Return the `count` passages of `candidates` most relevant to
    /// `question`, verbatim.
    async fn rerank(&self, candidates: &str, question: &str, count: usize) -> Result<String>;
}

/// Bridge single-unit gaps in a sorted ordinal list.
///
/// When an ordinal is exactly 2 above its predecessor, the skipped ordinal is
/// inserted before it. Other gaps are left alone.
pub fn expand_ordinals(sorted: &[usize]) -> Vec<usize> {
    let mut expanded = Vec::with_capacity(sorted.len() * 2);
    for (i, &ordinal) in sorted.iter().enumerate() {
        if i > 0 && ordinal.checked_sub(sorted[i - 1]) == Some(2) {
            expanded.push(ordinal - 1);
        }
        expanded.push(ordinal);
    }
    expanded
}

/// Query operation over a built [`KnowledgeSource`]. Read-only.
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    reranker: Arc<dyn Rerank>,
    recall_count: usize,
    rerank_count: usize,
}

impl Retriever {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        reranker: Arc<dyn Rerank>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            index,
            reranker,
            recall_count: config.recall_count,
            rerank_count: config.rerank_count,
        }
    }

    /// Recalled ordinals, sorted and gap-expanded.
    pub async fn recall(&self, source: &KnowledgeSource, question: &str) -> Result<Vec<usize>> {
        let mut ordinals = self
            .index
            .query(source.namespace(), question, self.recall_count)
            .await?;

        ordinals.retain(|&ordinal| {
            let known = ordinal < source.len();
            if !known {
                tracing::warn!(
                    namespace = source.namespace(),
                    "recall returned unknown ordinal {ordinal}, skipping"
                );
            }
            known
        });
        ordinals.sort_unstable();
        ordinals.dedup();

        Ok(expand_ordinals(&ordinals))
    }

    /// Candidate block handed to the reranker.
    pub async fn candidates(&self, source: &KnowledgeSource, question: &str) -> Result<String> {
        let ordinals = self.recall(source, question).await?;
        let texts: Vec<&str> = ordinals
            .iter()
            .filter_map(|&ordinal| source.unit(ordinal))
            .map(|unit| unit.text.as_str())
            .collect();
        Ok(texts.join("\n"))
    }

    /// Full retrieval. Empty when nothing was recalled.
    pub async fn retrieve(&self, source: &KnowledgeSource, question: &str) -> Result<String> {
        let candidates = self.candidates(source, question).await?;
        if candidates.is_empty() {
            tracing::debug!(namespace = source.namespace(), "nothing recalled, skipping rerank");
            return Ok(String::new());
        }
        self.reranker
            .rerank(&candidates, question, self.rerank_count)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::KnowledgeUnit;
    use crate::source::SourceBuilder;
    use council_core::error::CouncilError;
    use std::sync::Mutex;

    /// Index that ignores the query and returns a fixed recall list.
    struct ScriptedIndex {
        recall: Vec<usize>,
        last_k: Mutex<Option<usize>>,
    }

    impl ScriptedIndex {
        fn new(recall: Vec<usize>) -> Self {
            Self {
                recall,
                last_k: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl VectorIndex for ScriptedIndex {
        async fn create_namespace(&self, _namespace: &str) -> Result<()> {
            Ok(())
        }

        async fn index(&self, _namespace: &str, _ordinal: usize, _text: &str) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _namespace: &str, _text: &str, k: usize) -> Result<Vec<usize>> {
            *self.last_k.lock().unwrap() = Some(k);
            Ok(self.recall.clone())
        }
    }

    /// Echoes the candidates and records each call.
    #[derive(Default)]
    struct RecordingRerank {
        calls: Mutex<Vec<(String, String, usize)>>,
    }

    #[async_trait]
    impl Rerank for RecordingRerank {
        async fn rerank(&self, candidates: &str, question: &str, count: usize) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((candidates.to_string(), question.to_string(), count));
            Ok(format!("top: {candidates}"))
        }
    }

    struct FailingRerank;

    #[async_trait]
    impl Rerank for FailingRerank {
        async fn rerank(&self, _c: &str, _q: &str, _n: usize) -> Result<String> {
            Err(CouncilError::Http("timed out".into()))
        }
    }

    async fn source(index: Arc<ScriptedIndex>, n: usize) -> KnowledgeSource {
        let units = (0..n)
            .map(|ordinal| KnowledgeUnit {
                ordinal,
                text: format!("u{ordinal}"),
            })
            .collect();
        let builder = SourceBuilder::new(index, &RetrievalConfig::default());
        let (source, mut rx) = builder.build(units).await.unwrap();
        while rx.recv().await.is_some() {}
        source
    }

    #[test]
    fn test_expand_bridges_gap_of_two() {
        assert_eq!(expand_ordinals(&[2, 4, 9]), vec![2, 3, 4, 9]);
    }

    #[test]
    fn test_expand_leaves_other_gaps() {
        assert_eq!(expand_ordinals(&[0, 1, 3, 6]), vec![0, 1, 2, 3, 6]);
        assert_eq!(expand_ordinals(&[5, 8, 12]), vec![5, 8, 12]);
        assert_eq!(expand_ordinals(&[7]), vec![7]);
        assert!(expand_ordinals(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_sorts_expands_and_reranks() {
        let index = Arc::new(ScriptedIndex::new(vec![9, 2, 4]));
        let rerank = Arc::new(RecordingRerank::default());
        let retriever = Retriever::new(index.clone(), rerank.clone(), &RetrievalConfig::default());
        let src = source(index.clone(), 10).await;

        let out = retriever.retrieve(&src, "who wrote it?").await.unwrap();
        assert_eq!(out, "top: u2\nu3\nu4\nu9");
        assert_eq!(*index.last_k.lock().unwrap(), Some(10));

        let calls = rerank.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "who wrote it?");
        assert_eq!(calls[0].2, 5);
    }

    #[tokio::test]
    async fn test_unknown_ordinals_are_skipped() {
        let index = Arc::new(ScriptedIndex::new(vec![42, 1]));
        let rerank = Arc::new(RecordingRerank::default());
        let retriever = Retriever::new(index.clone(), rerank, &RetrievalConfig::default());
        let src = source(index, 3).await;

        assert_eq!(retriever.candidates(&src, "q").await.unwrap(), "u1");
    }

    #[tokio::test]
    async fn test_empty_recall_skips_rerank() {
        let index = Arc::new(ScriptedIndex::new(vec![]));
        let rerank = Arc::new(RecordingRerank::default());
        let retriever = Retriever::new(index.clone(), rerank.clone(), &RetrievalConfig::default());
        let src = source(index, 3).await;

        assert_eq!(retriever.retrieve(&src, "q").await.unwrap(), "");
        assert!(rerank.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rerank_failure_propagates() {
        let index = Arc::new(ScriptedIndex::new(vec![0]));
        let retriever = Retriever::new(index.clone(), Arc::new(FailingRerank), &RetrievalConfig::default());
        let src = source(index, 2).await;

        let err = retriever.retrieve(&src, "q").await.unwrap_err();
        assert!(err.is_request_failure());
    }
}
