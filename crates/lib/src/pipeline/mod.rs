//! # Generation Pipeline Orchestrator
//!
//! The strictly ordered sequence of stages that turns a
//! [`GenerationRequest`] into a completed [`Article`]: competitive analysis,
//! structure, body (with optional internal-link splicing), media strategy,
//! hero render, metadata, assembly, persistence.
//!
//! Failure policy is per stage and consistent: advisory stages (analysis,
//! internal links, video lookup, hero render) log and degrade to a default;
//! load-bearing stages (structure, body, metadata, assembly) abort the run,
//! and nothing is persisted until the final stage succeeds. The
//! cancellation token is checked before every outbound call.

mod stages;

pub use stages::{default_media_strategy, enforce_title, finalize_seo};

use crate::{
    breaker::QuotaBreaker,
    constants,
    dispatch::{generate_with_fallback, ModelRoute},
    errors::AiError,
    extract::{self, ExtractError},
    images,
    prompts,
    providers::ai::{AiProvider, GenerationOptions},
    providers::db::store::{ArticleStore, StoreError},
    retry::RetryPolicy,
    seo,
    text::truncate_chars,
    throttle::Throttle,
    types::{
        Article, ArticleStatus, CompetitiveAnalysis, GenerationRequest, MediaStrategy,
        SeoMetadata, VideoAsset,
    },
    video,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Content generation failed: {0}")]
    Ai(#[from] AiError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
    #[error("The generation run was cancelled.")]
    Cancelled,
    #[error("Article not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
}

/// Tuning knobs for a pipeline instance. Which stages use which model
/// tier, retry budgets, and the best-effort toggles are configuration, not
/// hardcoded policy.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub analysis_route: ModelRoute,
    pub structure_route: ModelRoute,
    pub body_route: ModelRoute,
    pub media_route: ModelRoute,
    pub metadata_route: ModelRoute,
    pub video_route: ModelRoute,
    pub image_model: String,
    pub image_resolution: String,
    pub image_policy: RetryPolicy,
    /// Attempt internal-link discovery when the request carries a site URL.
    pub internal_links: bool,
    pub internal_link_limit: usize,
    /// Resolve a real video from the media strategy's search query.
    pub auto_video: bool,
    /// Render the hero image eagerly at the end of the run.
    pub auto_render_hero: bool,
    pub title_word_limit: usize,
    pub related_links_heading: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let route =
            || ModelRoute::new(constants::PREFERRED_TEXT_MODEL, constants::FALLBACK_TEXT_MODEL);
        Self {
            analysis_route: route(),
            structure_route: route(),
            body_route: route(),
            media_route: route(),
            metadata_route: route(),
            video_route: route(),
            image_model: constants::IMAGE_MODEL.to_string(),
            image_resolution: constants::IMAGE_RESOLUTION.to_string(),
            image_policy: RetryPolicy::image(),
            internal_links: true,
            internal_link_limit: constants::INTERNAL_LINK_LIMIT,
            auto_video: true,
            auto_render_hero: true,
            title_word_limit: constants::TITLE_MAX_WORDS,
            related_links_heading: "Related reading".to_string(),
        }
    }
}

/// The orchestrator. Owns the provider handle, the image quota breaker and
/// the shared request throttle; articles are only ever persisted through
/// the store it was built with.
pub struct Pipeline {
    provider: Box<dyn AiProvider>,
    store: Arc<dyn ArticleStore>,
    breaker: QuotaBreaker,
    throttle: Throttle,
    config: PipelineConfig,
}

#[derive(Deserialize)]
struct LinkCandidate {
    url: String,
    #[serde(default)]
    title: String,
}

impl Pipeline {
    pub fn new(
        provider: Box<dyn AiProvider>,
        store: Arc<dyn ArticleStore>,
        breaker: QuotaBreaker,
        throttle: Throttle,
        config: PipelineConfig,
    ) -> Self {
        Self {
            provider,
            store,
            breaker,
            throttle,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn provider(&self) -> &dyn AiProvider {
        self.provider.as_ref()
    }

    pub fn breaker(&self) -> &QuotaBreaker {
        &self.breaker
    }

    /// Runs the full pipeline. Returns the persisted, completed article.
    pub async fn run(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<Article, PipelineError> {
        info!(keyword = %request.target_keyword, topic = %request.topic, "starting generation run");
        let created_at = Utc::now();

        // Stage 1: competitive analysis (advisory).
        let analysis = match self.analyze_competition(&request, cancel).await {
            Ok(analysis) => analysis,
            Err(PipelineError::Cancelled) => return Err(PipelineError::Cancelled),
            Err(e) => {
                warn!("competitive analysis failed, continuing with an empty default: {e}");
                CompetitiveAnalysis::default()
            }
        };

        // Stage 2: structure (load-bearing).
        let structure = self.generate_structure(&request, &analysis, cancel).await?;

        // Stage 3: body, with best-effort internal links (load-bearing).
        let body_html = self
            .generate_body(&request, &structure, &analysis, cancel)
            .await?;

        // Stage 4: media strategy (degrades to a deterministic default),
        // then the best-effort video lookup.
        let mut media = self.generate_media_strategy(&request, &structure, cancel).await?;
        let video_asset = self.lookup_video(&media, cancel).await?;

        // Stage 5: eager hero render (best-effort, breaker-aware).
        if self.config.auto_render_hero {
            self.render_hero(&mut media, cancel).await?;
        }

        // Stage 6: metadata (deterministic fallback, never blank).
        let seo_meta = self
            .generate_metadata(&request, &body_html, cancel)
            .await?;

        // Stage 7: assembly. Video injection is idempotent; the technical
        // SEO payload is derived without a model call.
        let html_content = pressgen_html::inject_video(
            &body_html,
            video_asset.as_ref().map(|v| v.embed_html.as_str()),
            video_asset
                .as_ref()
                .map(|v| v.caption.as_str())
                .unwrap_or(""),
        );

        let settings = match self.store.load_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!("could not load settings for SEO payload, using defaults: {e}");
                Default::default()
            }
        };

        let mut article = Article {
            id: Uuid::new_v4().to_string(),
            status: ArticleStatus::Completed,
            request,
            analysis,
            structure,
            html_content,
            media,
            video: video_asset,
            seo: seo_meta,
            technical_seo: None,
            created_at,
            updated_at: Utc::now(),
        };
        article.technical_seo = Some(seo::build_technical_seo(&article, &settings));

        // Stage 8: persist and hand back.
        self.store.save_article(&article).await?;
        info!(article_id = %article.id, "generation run completed");
        Ok(article)
    }

    /// Re-renders one image spec of a stored article by index and persists
    /// the result. Honors the quota breaker like any other render.
    pub async fn render_article_image(
        &self,
        article_id: &str,
        index: usize,
    ) -> Result<Article, PipelineError> {
        let mut article = self
            .store
            .get_article(article_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(article_id.to_string()))?;
        let spec = article.media.image_specs.get_mut(index).ok_or_else(|| {
            PipelineError::InvalidInput(format!("no image spec at index {index}"))
        })?;

        let rendered = images::render_image(
            self.provider.as_ref(),
            &self.breaker,
            &self.config.image_model,
            &self.config.image_resolution,
            self.config.image_policy,
            spec,
        )
        .await?;
        spec.rendered_url = Some(rendered.url);
        spec.model_used = Some(rendered.model_used);
        spec.resolution_used = Some(rendered.resolution_used);

        article.updated_at = Utc::now();
        self.refresh_technical_seo(&mut article).await;
        self.store.save_article(&article).await?;
        Ok(article)
    }

    /// Resolves a user-supplied video query for a stored article and
    /// re-injects the embed into its HTML.
    pub async fn attach_video(
        &self,
        article_id: &str,
        query: &str,
    ) -> Result<Article, PipelineError> {
        let mut article = self
            .store
            .get_article(article_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(article_id.to_string()))?;

        self.throttle.acquire().await;
        let asset = video::resolve_video(self.provider.as_ref(), &self.config.video_route, query)
            .await
            .map_err(|e| PipelineError::InvalidInput(e.to_string()))?;

        article.html_content = pressgen_html::inject_video(
            &article.html_content,
            Some(asset.embed_html.as_str()),
            &asset.caption,
        );
        article.video = Some(asset);
        article.updated_at = Utc::now();
        self.refresh_technical_seo(&mut article).await;
        self.store.save_article(&article).await?;
        Ok(article)
    }

    /// Marks a stored article as published without altering its content.
    pub async fn mark_published(&self, article_id: &str) -> Result<Article, PipelineError> {
        let mut article = self
            .store
            .get_article(article_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(article_id.to_string()))?;
        article.status = ArticleStatus::Published;
        article.updated_at = Utc::now();
        self.store.save_article(&article).await?;
        Ok(article)
    }

    // --- Stage implementations ---

    async fn analyze_competition(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<CompetitiveAnalysis, PipelineError> {
        let prompt = prompts::ANALYSIS_PROMPT
            .replace("{keyword}", &request.target_keyword)
            .replace("{language}", &request.language);
        let options = GenerationOptions {
            json_output: true,
            search_grounding: true,
            ..Default::default()
        };
        let raw = self
            .guarded_generate(&self.config.analysis_route, &prompt, &options, cancel)
            .await?;
        Ok(extract::parse_structured(&raw)?)
    }

    async fn generate_structure(
        &self,
        request: &GenerationRequest,
        analysis: &CompetitiveAnalysis,
        cancel: &CancellationToken,
    ) -> Result<crate::types::ArticleStructure, PipelineError> {
        let analysis_context = if analysis.competitor_titles.is_empty() {
            "No competitive data available.".to_string()
        } else {
            format!(
                "Top competitor titles: {}\nContent gaps to exploit: {}\nStrategy: {}",
                analysis.competitor_titles.join("; "),
                analysis.content_gaps.join("; "),
                analysis.strategy_summary
            )
        };
        let prompt = prompts::STRUCTURE_PROMPT
            .replace("{topic}", &request.topic)
            .replace("{keyword}", &request.target_keyword)
            .replace("{language}", &request.language)
            .replace("{analysis}", &analysis_context)
            .replace("{title_word_limit}", &self.config.title_word_limit.to_string());
        let options = GenerationOptions {
            json_output: true,
            ..Default::default()
        };
        let raw = self
            .guarded_generate(&self.config.structure_route, &prompt, &options, cancel)
            .await?;
        let mut structure: crate::types::ArticleStructure = extract::parse_structured(&raw)?;
        structure.title = enforce_title(
            &structure.title,
            &request.target_keyword,
            self.config.title_word_limit,
        );
        Ok(structure)
    }

    async fn generate_body(
        &self,
        request: &GenerationRequest,
        structure: &crate::types::ArticleStructure,
        analysis: &CompetitiveAnalysis,
        cancel: &CancellationToken,
    ) -> Result<String, PipelineError> {
        // Best-effort internal link discovery first, so the splice below is
        // plain string work.
        let links = match request.site_url.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(site) if self.config.internal_links => {
                match self.discover_internal_links(site, &request.target_keyword, cancel).await {
                    Ok(links) => links,
                    Err(PipelineError::Cancelled) => return Err(PipelineError::Cancelled),
                    Err(e) => {
                        warn!("internal link discovery failed, continuing without: {e}");
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        };

        let mut extra_rules = Vec::new();
        let options = &request.options;
        if options.table_of_contents {
            extra_rules.push(prompts::BODY_RULE_TOC.to_string());
        }
        if options.glossary {
            extra_rules.push(prompts::BODY_RULE_GLOSSARY.to_string());
        }
        if options.tables {
            extra_rules.push(prompts::BODY_RULE_TABLES.to_string());
        }
        if options.lists {
            extra_rules.push(prompts::BODY_RULE_LISTS.to_string());
        }
        if options.secure_sources {
            extra_rules.push(prompts::BODY_RULE_SECURE_SOURCES.to_string());
        }
        if options.author_credit {
            if let Some(author) = self.resolve_author(request).await {
                extra_rules.push(
                    prompts::BODY_RULE_AUTHOR_CREDIT.replace("{author_credit}", &author),
                );
            }
        }
        let extra_rules = extra_rules
            .iter()
            .enumerate()
            .map(|(i, rule)| format!("{}. {rule}", i + 6))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = prompts::BODY_PROMPT
            .replace("{language}", &request.language)
            .replace("{word_count}", &request.word_count.words().to_string())
            .replace("{title}", &structure.title)
            .replace("{subtitle}", &structure.subtitle)
            .replace("{lead}", &structure.lead)
            .replace("{keyword}", &request.target_keyword)
            .replace("{lsi_keywords}", &analysis.lsi_keywords.join(", "))
            .replace("{extra_rules}", &extra_rules);
        let generation_options = GenerationOptions {
            thinking_budget: Some(2048),
            ..Default::default()
        };
        let raw = self
            .guarded_generate(&self.config.body_route, &prompt, &generation_options, cancel)
            .await?;

        let cleaned = pressgen_html::clean_model_html(&raw);
        Ok(pressgen_html::splice_related_links(
            &cleaned,
            &self.config.related_links_heading,
            &links,
        ))
    }

    async fn discover_internal_links(
        &self,
        site_url: &str,
        keyword: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<(String, String)>, PipelineError> {
        let domain = site_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        let prompt = prompts::INTERNAL_LINKS_PROMPT
            .replace("{domain}", domain)
            .replace("{keyword}", keyword)
            .replace("{count}", &self.config.internal_link_limit.to_string());
        let options = GenerationOptions {
            json_output: true,
            search_grounding: true,
            ..Default::default()
        };
        let raw = self
            .guarded_generate(&self.config.body_route, &prompt, &options, cancel)
            .await?;
        let candidates: Vec<LinkCandidate> = extract::parse_structured(&raw)?;

        // Dedupe by URL, then shuffle before truncating so repeated runs do
        // not always favor the search engine's first ordering.
        let mut seen = HashSet::new();
        let mut links: Vec<(String, String)> = candidates
            .into_iter()
            .filter(|c| !c.url.trim().is_empty() && seen.insert(c.url.clone()))
            .map(|c| {
                let title = if c.title.trim().is_empty() {
                    c.url.clone()
                } else {
                    c.title
                };
                (c.url, title)
            })
            .collect();
        links.shuffle(&mut rand::thread_rng());
        links.truncate(self.config.internal_link_limit);
        Ok(links)
    }

    async fn generate_media_strategy(
        &self,
        request: &GenerationRequest,
        structure: &crate::types::ArticleStructure,
        cancel: &CancellationToken,
    ) -> Result<MediaStrategy, PipelineError> {
        let prompt = prompts::MEDIA_STRATEGY_PROMPT
            .replace("{title}", &structure.title)
            .replace("{keyword}", &request.target_keyword)
            .replace("{language}", &request.language)
            .replace("{image_count}", &constants::IMAGE_SPEC_COUNT.to_string());
        let options = GenerationOptions {
            json_output: true,
            ..Default::default()
        };
        let parsed = match self
            .guarded_generate(&self.config.media_route, &prompt, &options, cancel)
            .await
        {
            Ok(raw) => extract::parse_structured::<MediaStrategy>(&raw).ok(),
            Err(PipelineError::Cancelled) => return Err(PipelineError::Cancelled),
            Err(e) => {
                warn!("media strategy generation failed: {e}");
                None
            }
        };

        Ok(stages::normalize_media_strategy(
            parsed,
            &structure.title,
            &request.target_keyword,
        ))
    }

    async fn lookup_video(
        &self,
        media: &MediaStrategy,
        cancel: &CancellationToken,
    ) -> Result<Option<VideoAsset>, PipelineError> {
        if !self.config.auto_video || media.video_search_query.trim().is_empty() {
            return Ok(None);
        }
        self.ensure_live(cancel)?;
        self.throttle.acquire().await;
        match video::resolve_video(
            self.provider.as_ref(),
            &self.config.video_route,
            &media.video_search_query,
        )
        .await
        {
            Ok(asset) => Ok(Some(asset)),
            Err(e) => {
                warn!("video lookup failed, leaving the video slot empty: {e}");
                Ok(None)
            }
        }
    }

    async fn render_hero(
        &self,
        media: &mut MediaStrategy,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        let Some(spec) = media.image_specs.first_mut() else {
            return Ok(());
        };
        self.ensure_live(cancel)?;
        match images::render_image(
            self.provider.as_ref(),
            &self.breaker,
            &self.config.image_model,
            &self.config.image_resolution,
            self.config.image_policy,
            spec,
        )
        .await
        {
            Ok(rendered) => {
                spec.rendered_url = Some(rendered.url);
                spec.model_used = Some(rendered.model_used);
                spec.resolution_used = Some(rendered.resolution_used);
            }
            Err(e) => warn!("hero image render failed, continuing without it: {e}"),
        }
        Ok(())
    }

    async fn generate_metadata(
        &self,
        request: &GenerationRequest,
        body_html: &str,
        cancel: &CancellationToken,
    ) -> Result<SeoMetadata, PipelineError> {
        let prompt = prompts::METADATA_PROMPT
            .replace("{topic}", &request.topic)
            .replace("{keyword}", &request.target_keyword)
            .replace("{language}", &request.language)
            .replace("{body_excerpt}", &truncate_chars(body_html, 1500))
            .replace("{synonym_count}", &constants::SYNONYM_COUNT.to_string())
            .replace("{tag_count}", &constants::TAG_COUNT.to_string());
        let options = GenerationOptions {
            json_output: true,
            response_schema: Some(stages::metadata_schema()),
            ..Default::default()
        };
        let draft = match self
            .guarded_generate(&self.config.metadata_route, &prompt, &options, cancel)
            .await
        {
            Ok(raw) => extract::parse_structured::<SeoMetadata>(&raw).unwrap_or_else(|e| {
                warn!("metadata parse failed, using keyword-derived defaults: {e}");
                SeoMetadata::default()
            }),
            Err(PipelineError::Cancelled) => return Err(PipelineError::Cancelled),
            Err(e) => {
                warn!("metadata generation failed, using keyword-derived defaults: {e}");
                SeoMetadata::default()
            }
        };
        Ok(finalize_seo(draft, &request.target_keyword))
    }

    async fn resolve_author(&self, request: &GenerationRequest) -> Option<String> {
        let author_id = request.author_id.as_deref()?;
        match self.store.get_author(author_id).await {
            Ok(Some(author)) => Some(format!("{}, {}", author.name, author.bio)),
            Ok(None) => {
                warn!(%author_id, "author not found, skipping author credit");
                None
            }
            Err(e) => {
                warn!("author lookup failed, skipping author credit: {e}");
                None
            }
        }
    }

    async fn refresh_technical_seo(&self, article: &mut Article) {
        let settings = self.store.load_settings().await.unwrap_or_default();
        article.technical_seo = Some(seo::build_technical_seo(article, &settings));
    }

    // --- Shared plumbing ---

    fn ensure_live(&self, cancel: &CancellationToken) -> Result<(), PipelineError> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        Ok(())
    }

    async fn guarded_generate(
        &self,
        route: &ModelRoute,
        prompt: &str,
        options: &GenerationOptions,
        cancel: &CancellationToken,
    ) -> Result<String, PipelineError> {
        self.ensure_live(cancel)?;
        self.throttle.acquire().await;
        Ok(generate_with_fallback(self.provider.as_ref(), route, prompt, options).await?)
    }
}
