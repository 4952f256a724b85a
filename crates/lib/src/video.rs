//! # Video Asset Resolver
//!
//! Turns a free-text search query into an embeddable [`VideoAsset`] via a
//! search-grounded structured request. Only the 11-character video id is
//! trusted from the model: the embed snippet and the thumbnail URL are
//! always derived from the id, and an asset with no extractable id is
//! rejected outright — never silently embedded with a broken reference.

use crate::{
    dispatch::{generate_with_fallback, ModelRoute},
    errors::AiError,
    extract::{self, ExtractError},
    prompts,
    providers::ai::{AiProvider, GenerationOptions},
    types::VideoAsset,
};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::info;
use url::Url;

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Covers the watch, short-link, embed, and shorts URL shapes.
    Regex::new(
        r"(?:youtube\.com/(?:watch\?(?:[^#\s]*&)?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("video id regex is valid")
});

#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Video search failed: {0}")]
    Ai(#[from] AiError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("The model did not return a video URL.")]
    MissingUrl,
    #[error("Unrecognized video URL: {0}")]
    UnrecognizedUrl(String),
}

#[derive(Deserialize, Debug)]
struct VideoLookup {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    caption: String,
    #[serde(default)]
    alt_text: String,
}

/// Extracts the 11-character video id from a recognized YouTube watch URL.
///
/// The host is validated first so lookalike domains embedding a plausible
/// path do not pass.
pub fn extract_video_id(raw_url: &str) -> Option<String> {
    let parsed = Url::parse(raw_url).ok()?;
    let host = parsed.host_str()?;
    let recognized = host == "youtu.be"
        || host == "youtube.com"
        || host.ends_with(".youtube.com")
        || host == "youtube-nocookie.com"
        || host.ends_with(".youtube-nocookie.com");
    if !recognized {
        return None;
    }
    VIDEO_ID_RE
        .captures(raw_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The privacy-enhanced embed snippet for a video id.
pub fn embed_html(video_id: &str, title: &str) -> String {
    let safe_title = title.replace('"', "&quot;");
    format!(
        "<iframe src=\"https://www.youtube-nocookie.com/embed/{video_id}\" \
         title=\"{safe_title}\" loading=\"lazy\" allowfullscreen \
         sandbox=\"allow-scripts allow-same-origin allow-presentation\"></iframe>"
    )
}

/// The maximum-resolution thumbnail for a video id.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{video_id}/maxresdefault.jpg")
}

/// Resolves a search query to a validated, embeddable video.
pub async fn resolve_video(
    provider: &dyn AiProvider,
    route: &ModelRoute,
    query: &str,
) -> Result<VideoAsset, VideoError> {
    let prompt = prompts::VIDEO_LOOKUP_PROMPT.replace("{query}", query);
    let options = GenerationOptions {
        json_output: true,
        search_grounding: true,
        ..Default::default()
    };
    let raw = generate_with_fallback(provider, route, &prompt, &options).await?;
    let lookup: VideoLookup = extract::parse_structured(&raw)?;

    let watch_url = lookup.url.filter(|u| !u.trim().is_empty()).ok_or(VideoError::MissingUrl)?;
    let video_id = extract_video_id(&watch_url)
        .ok_or_else(|| VideoError::UnrecognizedUrl(watch_url.clone()))?;
    info!(%video_id, "resolved video for query '{query}'");

    Ok(VideoAsset {
        query: query.to_string(),
        embed_html: embed_html(&video_id, &lookup.title),
        thumbnail_url: thumbnail_url(&video_id),
        title: lookup.title,
        channel: lookup.channel,
        watch_url,
        video_id,
        caption: lookup.caption,
        alt_text: lookup.alt_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_id_from_all_watch_url_shapes() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?list=PL123&v=dQw4w9WgXcQ",
        ] {
            assert_eq!(
                extract_video_id(url).as_deref(),
                Some("dQw4w9WgXcQ"),
                "failed for {url}"
            );
        }
    }

    #[test]
    fn rejects_unrecognized_hosts_and_shapes() {
        assert_eq!(extract_video_id("https://example.com/video"), None);
        assert_eq!(
            extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"),
            None
        );
        assert_eq!(extract_video_id("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(extract_video_id("not a url"), None);
    }

    #[test]
    fn derived_markup_uses_only_the_id() {
        let embed = embed_html("dQw4w9WgXcQ", "A \"quoted\" title");
        assert!(embed.contains("youtube-nocookie.com/embed/dQw4w9WgXcQ"));
        assert!(embed.contains("&quot;quoted&quot;"));
        assert_eq!(
            thumbnail_url("dQw4w9WgXcQ"),
            "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
        );
    }
}
