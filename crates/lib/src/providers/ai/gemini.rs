use crate::{
    constants::GEMINI_API_BASE,
    errors::{AiError, AiErrorKind},
    providers::ai::{AiProvider, GeneratedImage, GenerationOptions},
    types::AspectRatio,
};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

// --- Gemini-specific request and response structures ---

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize, Default)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "thinkingConfig", skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Serialize)]
struct ThinkingConfig {
    #[serde(rename = "thinkingBudget")]
    thinking_budget: i32,
}

#[derive(Serialize)]
struct Tool {
    google_search: Value,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ContentResponse,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    #[serde(default)]
    text: String,
}

// --- Imagen predict structures ---

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Serialize)]
struct PredictParameters {
    #[serde(rename = "sampleCount")]
    sample_count: u32,
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
    #[serde(rename = "sampleImageSize")]
    sample_image_size: String,
}

#[derive(Deserialize, Debug)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize, Debug)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded", default)]
    bytes_base64_encoded: String,
    #[serde(rename = "mimeType", default = "default_mime_type")]
    mime_type: String,
}

fn default_mime_type() -> String {
    "image/png".to_string()
}

// --- Gemini Provider implementation ---

/// A provider for the Google Gemini API family: `:generateContent` for text
/// and the Imagen `:predict` surface for images.
#[derive(Clone, Debug)]
pub struct GeminiProvider {
    client: ReqwestClient,
    base_url: String,
    api_key: String,
}

impl GeminiProvider {
    /// Creates a provider against the public Gemini endpoint.
    pub fn new(api_key: String) -> Result<Self, AiError> {
        Self::with_base_url(GEMINI_API_BASE.to_string(), api_key)
    }

    /// Creates a provider against a custom base URL. Used by tests to point
    /// at a mock server.
    pub fn with_base_url(base_url: String, api_key: String) -> Result<Self, AiError> {
        if api_key.trim().is_empty() {
            return Err(AiError::new(
                AiErrorKind::InvalidKey,
                "The Gemini API key is not configured. Set AI_API_KEY before generating.",
            ));
        }
        let client = ReqwestClient::builder().build().map_err(|e| {
            AiError::new(AiErrorKind::Api, format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// The single place raw Gemini HTTP failures become typed kinds.
    fn kind_for_status(status: StatusCode, body: &str) -> AiErrorKind {
        match status.as_u16() {
            429 => AiErrorKind::RateLimited,
            503 => AiErrorKind::Overloaded,
            404 => AiErrorKind::ModelNotFound,
            401 | 403 => AiErrorKind::InvalidKey,
            _ if body.contains("RESOURCE_EXHAUSTED") => AiErrorKind::RateLimited,
            _ => AiErrorKind::Api,
        }
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, AiError> {
        let generation_config = GenerationConfig {
            response_mime_type: options
                .json_output
                .then(|| "application/json".to_string()),
            response_schema: options.response_schema.clone(),
            temperature: options.temperature,
            thinking_config: options
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
        };
        let request_body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(generation_config),
            tools: options.search_grounding.then(|| {
                vec![Tool {
                    google_search: Value::Object(serde_json::Map::new()),
                }]
            }),
        };

        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(AiError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::new(
                Self::kind_for_status(status, &body),
                format!("Gemini API returned {status}: {body}"),
            ));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            AiError::new(
                AiErrorKind::Api,
                format!("Failed to deserialize Gemini response: {e}"),
            )
        })?;

        let text = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::empty_response(model));
        }
        Ok(text)
    }

    async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
        aspect_ratio: AspectRatio,
        resolution: &str,
    ) -> Result<GeneratedImage, AiError> {
        let request_body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: aspect_ratio.as_str().to_string(),
                sample_image_size: resolution.to_string(),
            },
        };

        let url = format!("{}/models/{model}:predict", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(AiError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::new(
                Self::kind_for_status(status, &body),
                format!("Image API returned {status}: {body}"),
            ));
        }

        let predict_response: PredictResponse = response.json().await.map_err(|e| {
            AiError::new(
                AiErrorKind::Api,
                format!("Failed to deserialize image response: {e}"),
            )
        })?;

        let prediction = predict_response
            .predictions
            .into_iter()
            .find(|p| !p.bytes_base64_encoded.is_empty())
            .ok_or_else(|| AiError::empty_response(model))?;

        Ok(GeneratedImage {
            bytes_base64: prediction.bytes_base64_encoded,
            mime_type: prediction.mime_type,
        })
    }
}
