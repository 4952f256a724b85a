//! # HTTP Error Mapping
//!
//! Translates the library's typed errors into status codes and short,
//! human-readable messages. Raw provider error bodies never reach the
//! client; quota, credential and connectivity problems each get their own
//! wording so the UI can point the user at the right fix.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pressgen::errors::AiErrorKind;
use pressgen::pipeline::PipelineError;
use pressgen::providers::db::store::StoreError;
use pressgen::wordpress::PublishError;
use serde_json::json;
use tracing::error;

pub enum AppError {
    Pipeline(PipelineError),
    Publish(PublishError),
    Store(StoreError),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::Pipeline(err)
    }
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        AppError::Publish(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Pipeline(err) => {
                error!("PipelineError: {err:?}");
                match &err {
                    PipelineError::Ai(ai) => match ai.kind {
                        AiErrorKind::RateLimited => (
                            StatusCode::TOO_MANY_REQUESTS,
                            "The AI quota is exhausted. Wait a while or check your plan and API key."
                                .to_string(),
                        ),
                        AiErrorKind::InvalidKey => (
                            StatusCode::BAD_GATEWAY,
                            "The AI provider rejected the API key. Check AI_API_KEY.".to_string(),
                        ),
                        _ => (
                            StatusCode::BAD_GATEWAY,
                            "The AI provider request failed. Try again in a moment.".to_string(),
                        ),
                    },
                    PipelineError::Extract(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
                    PipelineError::NotFound(id) => {
                        (StatusCode::NOT_FOUND, format!("Article not found: {id}"))
                    }
                    PipelineError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                    PipelineError::Cancelled => {
                        (StatusCode::CONFLICT, "The generation run was cancelled.".to_string())
                    }
                    PipelineError::Store(e) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, format!("Storage error: {e}"))
                    }
                }
            }
            AppError::Publish(err) => {
                error!("PublishError: {err:?}");
                let status = match &err {
                    PublishError::MissingCredentials | PublishError::MissingPayload => {
                        StatusCode::BAD_REQUEST
                    }
                    PublishError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, err.to_string())
            }
            AppError::Store(err) => {
                error!("StoreError: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A storage error occurred.".to_string(),
                )
            }
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, what),
            AppError::Internal(err) => {
                error!("Internal server error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status_code, body).into_response()
    }
}
