//! # Council Knowledge
//!
//! Retrieval-augmented generation for specialists that declare a source file.
//!
//! ## How it works
//! ```text
//! source.txt
//!   ↓ chunker: paragraphs → units (≥2 paragraphs, ≥100 chars)
//!   ↓ segment: CJK text split into space-joined words
//!   ↓ index: one namespace per source, embedded on a background task
//! question
//!   ↓ retriever: recall 10 → sort → bridge gaps of 2 → rerank top 5
//! passages spliced into the specialist prompt
//! ```

pub mod chunker;
pub mod index;
pub mod retriever;
pub mod segment;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use chunker::{ChunkPolicy, KnowledgeUnit};
pub use index::{Embedder, MemoryVectorIndex, ProviderEmbedder, VectorIndex};
pub use retriever::{Rerank, Retriever};
pub use source::{KnowledgeSource, ProgressInfo, ProgressStream, SourceBuilder};
