//! # Image Rendering
//!
//! Renders one [`ImageSpec`] through the provider, under the image retry
//! policy and behind the quota breaker. Image quota windows are long, so a
//! single detected exhaustion trips the breaker and every later call —
//! including this one's fallback — resolves to a deterministic placeholder
//! without touching the network.

use crate::{
    breaker::QuotaBreaker,
    constants::PLACEHOLDER_PROMPT_CHARS,
    errors::{AiError, AiErrorKind},
    providers::ai::AiProvider,
    retry::{retry_with_backoff, RetryPolicy},
    text::truncate_chars,
    types::{AspectRatio, ImageSpec},
};
use tracing::{info, warn};

/// The outcome of a render call.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub url: String,
    pub model_used: String,
    pub resolution_used: String,
    /// True when the breaker short-circuited the render.
    pub placeholder: bool,
}

/// A deterministic placeholder reference sized to the aspect ratio and
/// annotated with the truncated prompt.
pub fn placeholder_url(aspect_ratio: AspectRatio, prompt: &str) -> String {
    let (width, height) = aspect_ratio.dimensions();
    let label = truncate_chars(prompt, PLACEHOLDER_PROMPT_CHARS);
    let encoded: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("+");
    format!("https://placehold.co/{width}x{height}/png?text={encoded}")
}

/// Renders a spec, or returns a placeholder when the quota breaker is (or
/// becomes) tripped. Non-quota failures propagate to the caller.
pub async fn render_image(
    provider: &dyn AiProvider,
    breaker: &QuotaBreaker,
    model: &str,
    resolution: &str,
    policy: RetryPolicy,
    spec: &ImageSpec,
) -> Result<RenderedImage, AiError> {
    if breaker.is_tripped() {
        info!(role = spec.role.as_str(), "image quota breaker open, returning placeholder");
        return Ok(RenderedImage {
            url: placeholder_url(spec.aspect_ratio, &spec.prompt),
            model_used: "placeholder".to_string(),
            resolution_used: spec.aspect_ratio.as_str().to_string(),
            placeholder: true,
        });
    }

    let result = retry_with_backoff(
        || provider.generate_image(model, &spec.prompt, spec.aspect_ratio, resolution),
        policy,
    )
    .await;

    match result {
        Ok(image) => Ok(RenderedImage {
            url: image.data_url(),
            model_used: model.to_string(),
            resolution_used: resolution.to_string(),
            placeholder: false,
        }),
        Err(err) if err.kind == AiErrorKind::RateLimited => {
            warn!("image quota exhausted, tripping breaker for the rest of the session: {err}");
            breaker.trip();
            Ok(RenderedImage {
                url: placeholder_url(spec.aspect_ratio, &spec.prompt),
                model_used: "placeholder".to_string(),
                resolution_used: spec.aspect_ratio.as_str().to_string(),
                placeholder: true,
            })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_sized_to_the_ratio_and_labelled() {
        let url = placeholder_url(
            AspectRatio::Widescreen,
            "A photorealistic rooftop solar array at golden hour, 35mm",
        );
        assert!(url.starts_with("https://placehold.co/1280x720/png?text="));
        assert!(url.contains("A+photorealistic+rooftop+solar"));
    }

    #[test]
    fn placeholder_strips_unsafe_characters() {
        let url = placeholder_url(AspectRatio::Square, "50% off! <b>");
        assert!(url.starts_with("https://placehold.co/1024x1024/png?text=50+off+b"));
    }
}
