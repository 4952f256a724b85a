//! # Common Test Utilities
//!
//! Shared harnesses for the `pressgen` test suites:
//!
//! - `MockAiProvider`: a scripted [`AiProvider`] keyed on prompt substrings,
//!   recording every call for assertions.
//! - `TestSetup`: an isolated in-memory article store with the schema
//!   initialized.

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pressgen::errors::{AiError, AiErrorKind};
use pressgen::providers::ai::{AiProvider, GeneratedImage, GenerationOptions};
use pressgen::providers::db::sqlite::SqliteStore;
use pressgen::types::AspectRatio;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// --- Test Setup ---

/// An isolated in-memory store for one test.
pub struct TestSetup {
    pub store: SqliteStore,
}

impl TestSetup {
    pub async fn new() -> Result<Self> {
        let store = SqliteStore::new(":memory:").await?;
        store.initialize_schema().await?;
        Ok(Self { store })
    }
}

// --- Mock AI Provider ---

/// One recorded text-generation call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub had_schema: bool,
    pub thinking_budget: Option<i32>,
}

/// A scripted AI provider.
///
/// Text responses are keyed on a unique substring of the prompt; image
/// calls succeed with a tiny inline PNG unless failures have been queued.
#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    text_failures: Arc<Mutex<Vec<AiErrorKind>>>,
    image_failures: Arc<Mutex<Vec<AiErrorKind>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    image_calls: Arc<Mutex<u32>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-programs a response for any prompt containing `key`.
    pub fn add_response(&self, key: &str, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_string(), response.into());
    }

    /// Queues an error kind; the next text call fails with it regardless of
    /// the prompt.
    pub fn fail_text_once(&self, kind: AiErrorKind) {
        self.text_failures.lock().unwrap().push(kind);
    }

    /// Queues an error kind for the next image call.
    pub fn fail_image_once(&self, kind: AiErrorKind) {
        self.image_failures.lock().unwrap().push(kind);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that went to the given model.
    pub fn calls_for(&self, model: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.model == model)
            .count()
    }

    pub fn image_call_count(&self) -> u32 {
        *self.image_calls.lock().unwrap()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, AiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
            had_schema: options.response_schema.is_some(),
            thinking_budget: options.thinking_budget,
        });

        if let Some(kind) = self.text_failures.lock().unwrap().pop() {
            return Err(AiError::new(kind, "scripted text failure"));
        }

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if prompt.contains(key) {
                return Ok(response.clone());
            }
        }
        Err(AiError::new(
            AiErrorKind::Api,
            format!("MockAiProvider has no response for prompt: {prompt:.80}"),
        ))
    }

    async fn generate_image(
        &self,
        _model: &str,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
        _resolution: &str,
    ) -> Result<GeneratedImage, AiError> {
        *self.image_calls.lock().unwrap() += 1;
        if let Some(kind) = self.image_failures.lock().unwrap().pop() {
            return Err(AiError::new(kind, "scripted image failure"));
        }
        Ok(GeneratedImage {
            bytes_base64: BASE64.encode(b"not-really-a-png"),
            mime_type: "image/png".to_string(),
        })
    }
}
