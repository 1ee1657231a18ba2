//! Paragraph chunking.
//!
//! A source is read as paragraphs (runs of non-blank lines) which are
//! accumulated into units. A unit closes once it holds at least
//! `min_paragraphs` paragraphs and `min_chars` characters; the counter then
//! restarts from empty, so units never overlap.

use std::path::Path;

use council_core::config::RetrievalConfig;
use council_core::error::{CouncilError, Result};

/// An immutable chunk of source text.
///
/// Ordinals are dense and zero-based within one source and are the key the
/// vector index hands back on recall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeUnit {
    pub ordinal: usize,
    pub text: String,
}

/// Thresholds that close a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    pub min_paragraphs: usize,
    /// Counted in Unicode scalar values.
    pub min_chars: usize,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            min_paragraphs: 2,
            min_chars: 100,
        }
    }
}

impl From<&RetrievalConfig> for ChunkPolicy {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            min_paragraphs: config.min_paragraphs,
            min_chars: config.min_chars,
        }
    }
}

/// Split raw text into paragraphs on blank lines.
///
/// Lines of one paragraph are joined with `\n`; a line holding only
/// whitespace counts as blank. Lines keep their inner whitespace.
pub fn split_paragraphs(raw: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for line in raw.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

/// Group paragraphs into units.
///
/// Paragraphs are concatenated as-is. A trailing remainder is emitted only
/// when it holds more than one paragraph.
pub fn chunk_paragraphs<S: AsRef<str>>(paragraphs: &[S], policy: ChunkPolicy) -> Vec<KnowledgeUnit> {
    let mut units = Vec::new();
    let mut text = String::new();
    let mut chars = 0usize;
    let mut count = 0usize;

    for para in paragraphs {
        let para = para.as_ref();
        text.push_str(para);
        chars += para.chars().count();
        count += 1;

        if count >= policy.min_paragraphs && chars >= policy.min_chars {
            units.push(KnowledgeUnit {
                ordinal: units.len(),
                text: std::mem::take(&mut text),
            });
            chars = 0;
            count = 0;
        }
    }

    if count > 1 && !text.is_empty() {
        units.push(KnowledgeUnit {
            ordinal: units.len(),
            text,
        });
    }

    units
}

/// Split and group raw text in one step.
pub fn chunk(raw: &str, policy: ChunkPolicy) -> Vec<KnowledgeUnit> {
    chunk_paragraphs(&split_paragraphs(raw), policy)
}

/// Read a UTF-8 source file and chunk it.
pub async fn chunk_file(path: &Path, policy: ChunkPolicy) -> Result<Vec<KnowledgeUnit>> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        CouncilError::Knowledge(format!("cannot read source {}: {e}", path.display()))
    })?;
    Ok(chunk(&raw, policy))
}
