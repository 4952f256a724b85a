//! # Application State
//!
//! The shared state handed to every request handler: the configuration,
//! the article store, and the generation pipeline built on top of them.

use crate::config::AppConfig;
use pressgen::{
    dispatch::ModelRoute,
    pipeline::{Pipeline, PipelineConfig},
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
    providers::db::sqlite::SqliteStore,
    QuotaBreaker, Throttle,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<SqliteStore>,
    pub pipeline: Arc<Pipeline>,
}

/// Builds the shared application state from the configuration.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let provider: Box<dyn AiProvider> = match config.ai.provider.as_str() {
        "gemini" => {
            let api_key = config
                .ai
                .api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("AI_API_KEY is required for the gemini provider"))?;
            match config.ai.api_url.clone() {
                Some(base_url) => Box::new(GeminiProvider::with_base_url(base_url, api_key)?),
                None => Box::new(GeminiProvider::new(api_key)?),
            }
        }
        "local" => {
            let api_url = config.ai.api_url.clone().ok_or_else(|| {
                anyhow::anyhow!("ai.api_url is required for the local provider")
            })?;
            Box::new(LocalAiProvider::new(api_url, config.ai.api_key.clone())?)
        }
        other => {
            return Err(anyhow::anyhow!("Unsupported AI provider: {other}"));
        }
    };

    let store = SqliteStore::new(&config.db_url).await?;
    store.initialize_schema().await?;

    let route =
        || ModelRoute::new(config.ai.text_model.clone(), config.ai.fallback_model.clone());
    let pipeline_config = PipelineConfig {
        analysis_route: route(),
        structure_route: route(),
        body_route: route(),
        media_route: route(),
        metadata_route: route(),
        video_route: route(),
        image_model: config.ai.image_model.clone(),
        internal_links: config.pipeline.internal_links,
        auto_video: config.pipeline.auto_video,
        auto_render_hero: config.pipeline.auto_render_hero,
        ..Default::default()
    };

    let requests_per_minute = config.pipeline.requests_per_minute.max(1);
    let throttle = Throttle::new(
        requests_per_minute,
        Duration::from_secs_f64(60.0 / requests_per_minute as f64),
    );

    let pipeline = Pipeline::new(
        provider,
        Arc::new(store.clone()),
        QuotaBreaker::new(),
        throttle,
        pipeline_config,
    );

    Ok(AppState {
        config: Arc::new(config),
        store: Arc::new(store),
        pipeline: Arc::new(pipeline),
    })
}
