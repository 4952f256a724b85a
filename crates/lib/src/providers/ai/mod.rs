pub mod gemini;
pub mod local;

use crate::errors::AiError;
use crate::types::AspectRatio;
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde_json::Value;
use std::fmt::Debug;

/// Per-call options forwarded to the generative API.
///
/// Not every tier supports every knob; the dispatcher strips the
/// unsupported ones before retrying against the fallback model.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    /// Ask the provider to emit JSON (`responseMimeType: application/json`).
    pub json_output: bool,
    /// A strict response schema. Preferred tier only.
    pub response_schema: Option<Value>,
    /// Reasoning token budget. Preferred tier only.
    pub thinking_budget: Option<i32>,
    /// Augment the request with live web search results.
    pub search_grounding: bool,
    pub temperature: Option<f32>,
}

impl GenerationOptions {
    /// A copy safe for the fallback model tier: schema constraints and
    /// thinking budgets are dropped, everything else is kept.
    pub fn for_fallback(&self) -> Self {
        Self {
            response_schema: None,
            thinking_budget: None,
            ..self.clone()
        }
    }
}

/// A rendered image returned inline by the provider.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes_base64: String,
    pub mime_type: String,
}

impl GeneratedImage {
    /// Encodes the image as a `data:` URL for storage and display.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.bytes_base64)
    }
}

/// The generative API boundary.
///
/// Implementations translate their transport's raw failures into
/// [`AiError`] kinds; callers never see a status code or an error body.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates text from a prompt against a named model.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, AiError>;

    /// Renders an image from a prompt against a named model.
    async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
        aspect_ratio: AspectRatio,
        resolution: &str,
    ) -> Result<GeneratedImage, AiError>;
}

dyn_clone::clone_trait_object!(AiProvider);
