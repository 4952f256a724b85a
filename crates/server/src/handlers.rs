//! # Request Handlers
//!
//! Thin adapters between HTTP and the library: deserialize, call the
//! pipeline/store/publisher, serialize. All policy lives in `pressgen`.

use crate::{errors::AppError, state::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use pressgen::{
    providers::db::store::ArticleStore,
    types::{AppSettings, Article, Author, GenerationRequest, VideoAsset, WordPressCredentials},
    video,
    wordpress::{PublishError, WordPressClient},
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub async fn root() -> &'static str {
    "pressgen server is running."
}

pub async fn health_check() -> &'static str {
    "OK"
}

// --- Generation ---

pub async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<Article>, AppError> {
    info!(keyword = %request.target_keyword, "generation requested");
    // The HTTP layer has no cancel surface yet; navigating away simply
    // abandons the response. The token still gates every stage.
    let cancel = CancellationToken::new();
    let article = state.pipeline.run(request, &cancel).await?;
    Ok(Json(article))
}

// --- Articles ---

pub async fn list_articles_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Article>>, AppError> {
    Ok(Json(state.store.list_articles().await?))
}

pub async fn get_article_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Article>, AppError> {
    let article = state
        .store
        .get_article(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article not found: {id}")))?;
    Ok(Json(article))
}

pub async fn delete_article_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.store.delete_article(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

// --- Images ---

pub async fn render_image_handler(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<Article>, AppError> {
    let article = state.pipeline.render_article_image(&id, index).await?;
    Ok(Json(article))
}

// --- Video ---

#[derive(Deserialize)]
pub struct VideoSearchRequest {
    pub query: String,
}

/// Standalone resolution, for previewing before attaching to an article.
pub async fn video_search_handler(
    State(state): State<AppState>,
    Json(request): Json<VideoSearchRequest>,
) -> Result<Json<VideoAsset>, AppError> {
    let asset = video::resolve_video(
        state.pipeline.provider(),
        &state.pipeline.config().video_route,
        &request.query,
    )
    .await
    .map_err(|e| AppError::Pipeline(pressgen::pipeline::PipelineError::InvalidInput(e.to_string())))?;
    Ok(Json(asset))
}

pub async fn attach_video_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<VideoSearchRequest>,
) -> Result<Json<Article>, AppError> {
    let article = state.pipeline.attach_video(&id, &request.query).await?;
    Ok(Json(article))
}

// --- Publishing ---

#[derive(Serialize)]
pub struct PublishResponse {
    pub post_id: u64,
    pub link: String,
    pub article: Article,
}

pub async fn publish_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublishResponse>, AppError> {
    let article = state
        .store
        .get_article(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Article not found: {id}")))?;

    let credentials = resolve_credentials(&state).await?;
    let client = WordPressClient::new(&credentials)?;
    let receipt = client.publish(&article).await?;

    let article = state.pipeline.mark_published(&id).await?;
    info!(article_id = %id, post_id = receipt.post_id, "article published as draft post");
    Ok(Json(PublishResponse {
        post_id: receipt.post_id,
        link: receipt.link,
        article,
    }))
}

/// Persisted settings win; the config file supplies deployment defaults.
async fn resolve_credentials(state: &AppState) -> Result<WordPressCredentials, AppError> {
    let settings = state.store.load_settings().await?;
    if let Some(credentials) = settings.wordpress {
        return Ok(credentials);
    }
    if let Some(defaults) = &state.config.wordpress {
        return Ok(WordPressCredentials {
            site_url: defaults.site_url.clone(),
            username: defaults.username.clone(),
            app_password: defaults.app_password.clone(),
        });
    }
    Err(AppError::Publish(PublishError::MissingCredentials))
}

// --- Settings ---

pub async fn get_settings_handler(
    State(state): State<AppState>,
) -> Result<Json<AppSettings>, AppError> {
    Ok(Json(state.store.load_settings().await?))
}

pub async fn put_settings_handler(
    State(state): State<AppState>,
    Json(settings): Json<AppSettings>,
) -> Result<Json<AppSettings>, AppError> {
    state.store.save_settings(&settings).await?;
    Ok(Json(settings))
}

// --- Authors ---

pub async fn list_authors_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Author>>, AppError> {
    Ok(Json(state.store.list_authors().await?))
}

pub async fn save_author_handler(
    State(state): State<AppState>,
    Json(author): Json<Author>,
) -> Result<Json<Author>, AppError> {
    state.store.save_author(&author).await?;
    Ok(Json(author))
}
