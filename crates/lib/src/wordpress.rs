//! # WordPress Publishing Client
//!
//! One HTTP exchange with the target site's REST API: upload the hero image
//! as a media item (with alt/title/caption follow-up), then create a draft
//! post carrying the SEO meta fields. Authentication is HTTP Basic with an
//! application password. The post is always created as a draft.

use crate::types::{Article, WordPressCredentials};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("WordPress credentials are not configured. Add them in Settings before publishing.")]
    MissingCredentials,
    #[error("WordPress rejected the credentials (HTTP {0}). Check the username and the application password.")]
    InvalidCredentials(u16),
    #[error("WordPress returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Could not reach the WordPress site ({0}). Check the site URL and its CORS settings.")]
    Transport(reqwest::Error),
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),
    #[error("The article has no technical SEO payload; regenerate it before publishing.")]
    MissingPayload,
    #[error("Invalid media part: {0}")]
    Media(String),
    #[error("Failed to serialize post payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Deserialize, Debug)]
struct MediaResponse {
    id: u64,
}

#[derive(Deserialize, Debug)]
struct PostResponse {
    id: u64,
    #[serde(default)]
    link: String,
}

/// The created draft post.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub post_id: u64,
    pub link: String,
    pub featured_media: Option<u64>,
}

#[derive(Debug)]
pub struct WordPressClient {
    client: ReqwestClient,
    api_base: String,
    username: String,
    app_password: String,
}

impl WordPressClient {
    /// Fails fast on blank credentials, before any network call.
    pub fn new(credentials: &WordPressCredentials) -> Result<Self, PublishError> {
        if credentials.site_url.trim().is_empty()
            || credentials.username.trim().is_empty()
            || credentials.app_password.trim().is_empty()
        {
            return Err(PublishError::MissingCredentials);
        }
        let client = ReqwestClient::builder()
            .build()
            .map_err(PublishError::ClientBuild)?;
        Ok(Self {
            client,
            api_base: format!(
                "{}/wp-json/wp/v2",
                credentials.site_url.trim().trim_end_matches('/')
            ),
            username: credentials.username.clone(),
            app_password: credentials.app_password.clone(),
        })
    }

    /// Uploads the hero image (when one was rendered inline) and creates the
    /// draft post from the article's technical SEO payload.
    pub async fn publish(&self, article: &Article) -> Result<PublishReceipt, PublishError> {
        let payload = article
            .technical_seo
            .as_ref()
            .ok_or(PublishError::MissingPayload)?;

        let featured_media = match article.media.image_specs.first() {
            Some(spec) => match spec.rendered_url.as_deref().and_then(parse_data_url) {
                Some((mime, bytes)) => {
                    let media_id = self
                        .upload_media(&spec.filename, &mime, bytes, spec)
                        .await?;
                    Some(media_id)
                }
                // Placeholder or unrendered hero: publish without a featured image.
                None => None,
            },
            None => None,
        };

        let mut body = serde_json::to_value(payload)?;
        if let Some(media_id) = featured_media {
            body["featured_media"] = json!(media_id);
        }
        eprintln!("DEBUG post body = {}", body);

        let response = self
            .client
            .post(format!("{}/posts", self.api_base))
            .basic_auth(&self.username, Some(&self.app_password))
            .json(&body)
            .send()
            .await
            .map_err(PublishError::Transport)?;
        let post: PostResponse = Self::read_json(response).await?;
        info!(post_id = post.id, "created WordPress draft post");

        Ok(PublishReceipt {
            post_id: post.id,
            link: post.link,
            featured_media,
        })
    }

    async fn upload_media(
        &self,
        filename: &str,
        mime: &str,
        bytes: Vec<u8>,
        spec: &crate::types::ImageSpec,
    ) -> Result<u64, PublishError> {
        let file_name = if filename.trim().is_empty() {
            "featured-image.jpg".to_string()
        } else {
            filename.to_string()
        };
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| PublishError::Media(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/media", self.api_base))
            .basic_auth(&self.username, Some(&self.app_password))
            .multipart(form)
            .send()
            .await
            .map_err(PublishError::Transport)?;
        let media: MediaResponse = Self::read_json(response).await?;

        // Best-effort metadata update; a failure here should not lose the upload.
        let update = self
            .client
            .post(format!("{}/media/{}", self.api_base, media.id))
            .basic_auth(&self.username, Some(&self.app_password))
            .json(&json!({
                "alt_text": spec.alt_text,
                "title": spec.title,
                "caption": spec.caption,
            }))
            .send()
            .await;
        if let Err(e) = update {
            warn!(media_id = media.id, "failed to update media metadata: {e}");
        }

        Ok(media.id)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PublishError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PublishError::InvalidCredentials(status.as_u16()));
        }
        if !status.is_success() {
            eprintln!("DEBUG read_json non-success status={} url={}", status, response.url());
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Http {
                status: status.as_u16(),
                body,
            });
        }
        response.json().await.map_err(PublishError::Transport)
    }
}

/// Splits a `data:<mime>;base64,<payload>` URL into mime type and bytes.
/// Placeholder and remote URLs return `None`.
fn parse_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let bytes = BASE64.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_round_trip() {
        let url = format!("data:image/png;base64,{}", BASE64.encode(b"png-bytes"));
        let (mime, bytes) = parse_data_url(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"png-bytes");
    }

    #[test]
    fn non_data_urls_are_skipped() {
        assert!(parse_data_url("https://placehold.co/1280x720/png?text=x").is_none());
        assert!(parse_data_url("data:image/png;base64,!!!invalid").is_none());
    }

    #[test]
    fn blank_credentials_fail_before_any_request() {
        let err = WordPressClient::new(&WordPressCredentials {
            site_url: "https://example.com".to_string(),
            username: String::new(),
            app_password: "secret".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, PublishError::MissingCredentials));
    }
}
