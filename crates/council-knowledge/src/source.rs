//! Knowledge sources and their background build.
//!
//! Building a source chunks the file, claims a fresh index namespace and then
//! embeds every unit on a spawned task. Progress flows back over a channel of
//! capacity 1, so the task advances only as fast as the caller drains it.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use council_core::config::RetrievalConfig;
use council_core::error::Result;
use tokio::sync::mpsc;

use crate::chunker::{ChunkPolicy, KnowledgeUnit, chunk_file};
use crate::index::VectorIndex;
use crate::segment::prepare_for_index;

/// One indexing step of a source build.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressInfo {
    /// 1-based position of the unit just processed.
    pub current: usize,
    pub total: usize,
    pub percentage: f32,
    pub unit_text: String,
    /// Set when this unit could not be indexed; the build continues.
    pub error: Option<String>,
}

/// Receiving end of a build. Must be drained (or dropped) by the caller.
pub type ProgressStream = mpsc::Receiver<ProgressInfo>;

/// A built collection of units plus the namespace holding their vectors.
#[derive(Debug, Clone)]
pub struct KnowledgeSource {
    namespace: String,
    units: Arc<Vec<KnowledgeUnit>>,
}

impl KnowledgeSource {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn units(&self) -> &[KnowledgeUnit] {
        &self.units
    }

    pub fn unit(&self, ordinal: usize) -> Option<&KnowledgeUnit> {
        self.units.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Creates knowledge sources against one shared vector index.
pub struct SourceBuilder {
    index: Arc<dyn VectorIndex>,
    policy: ChunkPolicy,
    segment_cjk: bool,
    next_id: AtomicUsize,
}

impl SourceBuilder {
    pub fn new(index: Arc<dyn VectorIndex>, config: &RetrievalConfig) -> Self {
        Self {
            index,
            policy: ChunkPolicy::from(config),
            segment_cjk: config.segment_cjk,
            next_id: AtomicUsize::new(0),
        }
    }

    /// Chunk a source file and start indexing it.
    pub async fn build_from_file(&self, path: &Path) -> Result<(KnowledgeSource, ProgressStream)> {
        let units = chunk_file(path, self.policy).await?;
        tracing::info!("Chunked {} into {} unit(s)", path.display(), units.len());
        self.build(units).await
    }

    /// Claim a namespace and index `units` on a background task.
    pub async fn build(&self, units: Vec<KnowledgeUnit>) -> Result<(KnowledgeSource, ProgressStream)> {
        let namespace = format!("source-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.index.create_namespace(&namespace).await?;

        let units = Arc::new(units);
        let (tx, rx) = mpsc::channel(1);

        let index = Arc::clone(&self.index);
        let task_units = Arc::clone(&units);
        let task_namespace = namespace.clone();
        let segment_cjk = self.segment_cjk;

        tokio::spawn(async move {
            let total = task_units.len();
            for unit in task_units.iter() {
                let text = prepare_for_index(&unit.text, segment_cjk);
                let error = match index.index(&task_namespace, unit.ordinal, &text).await {
                    Ok(()) => None,
                    Err(e) => {
                        tracing::warn!(
                            namespace = %task_namespace,
                            ordinal = unit.ordinal,
                            "index failed for unit {:?}: {e}",
                            unit.text
                        );
                        Some(e.to_string())
                    }
                };

                let current = unit.ordinal + 1;
                let progress = ProgressInfo {
                    current,
                    total,
                    percentage: current as f32 / total as f32 * 100.0,
                    unit_text: unit.text.clone(),
                    error,
                };
                if tx.send(progress).await.is_err() {
                    tracing::debug!("progress receiver for {task_namespace} closed, stopping build");
                    break;
                }
            }
        });

        Ok((KnowledgeSource { namespace, units }, rx))
    }
}
