use crate::{
    errors::{AiError, AiErrorKind},
    providers::ai::{AiProvider, GeneratedImage, GenerationOptions},
    types::AspectRatio,
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct LocalAiRequest<'a> {
    messages: Vec<LocalAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct LocalAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct LocalAiResponse {
    #[serde(default)]
    choices: Vec<LocalAiChoice>,
}

#[derive(Deserialize, Debug)]
struct LocalAiChoice {
    message: LocalAiMessage,
}

// --- Local Provider implementation ---

/// A provider for a local or OpenAI-compatible chat completions API.
/// Useful for development without burning Gemini quota. Image rendering is
/// not available on this surface.
#[derive(Clone, Debug)]
pub struct LocalAiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
}

impl LocalAiProvider {
    pub fn new(api_url: String, api_key: Option<String>) -> Result<Self, AiError> {
        let client = ReqwestClient::builder().build().map_err(|e| {
            AiError::new(AiErrorKind::Api, format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl AiProvider for LocalAiProvider {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, AiError> {
        let mut content = prompt.to_string();
        if options.json_output {
            // Chat-completions servers have no responseMimeType knob; ask in-band.
            content.push_str("\n\nRespond ONLY with a valid JSON value, no other text.");
        }
        let request_body = LocalAiRequest {
            messages: vec![LocalAiMessage {
                role: "user".to_string(),
                content,
            }],
            model: Some(model),
            temperature: options.temperature,
            stream: false,
        };

        let mut request_builder = self.client.post(&self.api_url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(AiError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let kind = match status.as_u16() {
                429 => AiErrorKind::RateLimited,
                503 => AiErrorKind::Overloaded,
                404 => AiErrorKind::ModelNotFound,
                401 | 403 => AiErrorKind::InvalidKey,
                _ => AiErrorKind::Api,
            };
            return Err(AiError::new(
                kind,
                format!("Local AI API returned {status}: {body}"),
            ));
        }

        let local_response: LocalAiResponse = response.json().await.map_err(|e| {
            AiError::new(
                AiErrorKind::Api,
                format!("Failed to deserialize local AI response: {e}"),
            )
        })?;

        let text = local_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AiError::empty_response(model));
        }
        Ok(text)
    }

    async fn generate_image(
        &self,
        _model: &str,
        _prompt: &str,
        _aspect_ratio: AspectRatio,
        _resolution: &str,
    ) -> Result<GeneratedImage, AiError> {
        Err(AiError::new(
            AiErrorKind::Api,
            "The local provider does not support image generation.",
        ))
    }
}
