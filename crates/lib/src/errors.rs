use thiserror::Error;

/// The classified failure kinds for the generative API boundary.
///
/// Provider adapters are the only place allowed to inspect raw HTTP statuses
/// or response bodies; everything above them (retry, fallback, the circuit
/// breaker) decides on this kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiErrorKind {
    /// The per-minute or per-day quota for the model is exhausted (HTTP 429).
    RateLimited,
    /// The model is temporarily overloaded or unavailable (HTTP 503).
    Overloaded,
    /// The requested model id does not exist for this key (HTTP 404).
    ModelNotFound,
    /// The request never reached the provider (DNS, TLS, connection reset).
    Transport,
    /// The provider answered 2xx but the candidate text was empty.
    EmptyResponse,
    /// The API key was rejected (HTTP 401/403).
    InvalidKey,
    /// Any other provider-reported error.
    Api,
}

impl AiErrorKind {
    /// Whether the backoff primitive should re-attempt the same model.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            AiErrorKind::RateLimited
                | AiErrorKind::Overloaded
                | AiErrorKind::Transport
                | AiErrorKind::EmptyResponse
        )
    }

    /// Whether the dispatcher should try the fallback model tier.
    pub fn triggers_fallback(self) -> bool {
        matches!(
            self,
            AiErrorKind::RateLimited
                | AiErrorKind::Overloaded
                | AiErrorKind::ModelNotFound
                | AiErrorKind::EmptyResponse
        )
    }
}

/// A classified error from an AI provider call.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AiError {
    pub kind: AiErrorKind,
    pub message: String,
}

impl AiError {
    pub fn new(kind: AiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn empty_response(model: &str) -> Self {
        Self::new(
            AiErrorKind::EmptyResponse,
            format!("Model '{model}' returned an empty response."),
        )
    }

    /// Classifies a `reqwest` failure that happened before an HTTP status
    /// was available.
    pub fn transport(err: reqwest::Error) -> Self {
        Self::new(
            AiErrorKind::Transport,
            format!("Request to AI provider failed: {err}"),
        )
    }
}
