//! Offline fakes shared by the unit tests of this crate.

use std::sync::Mutex;

use async_trait::async_trait;
use council_core::error::{CouncilError, Result};

use crate::index::Embedder;

/// Letter-frequency embedding over a-e; deterministic and offline.
pub struct LetterEmbedder;

fn letters(text: &str) -> Vec<f32> {
    let mut v = vec![0.0; 5];
    for c in text.chars() {
        if let Some(i) = "abcde".find(c) {
            v[i] += 1.0;
        }
    }
    v
}

#[async_trait]
impl Embedder for LetterEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(letters(text))
    }
}

/// Letter embedding that records every input and fails on a marker.
#[derive(Default)]
pub struct RecordingEmbedder {
    seen: Mutex<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl RecordingEmbedder {
    pub fn failing_on(marker: &'static str) -> Self {
        Self {
            fail_on: Some(marker),
            ..Default::default()
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Embedder for RecordingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.seen.lock().unwrap().push(text.to_string());
        if self.fail_on.is_some_and(|m| text.contains(m)) {
            return Err(CouncilError::Http("embedding timed out".into()));
        }
        Ok(letters(text))
    }
}
