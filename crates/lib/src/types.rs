//! # Core Data Model
//!
//! The article aggregate and the per-stage outputs that feed it. Fields
//! filled in by the model are tolerant of omissions (`#[serde(default)]`)
//! because structured output is parsed from free-form text; the pipeline is
//! responsible for enforcing the editorial contracts afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The requested length of the generated article body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WordCountTarget {
    #[serde(rename = "400")]
    Brief,
    #[default]
    #[serde(rename = "800")]
    Standard,
    #[serde(rename = "1500")]
    Long,
    #[serde(rename = "2500")]
    Pillar,
}

impl WordCountTarget {
    pub fn words(self) -> u32 {
        match self {
            WordCountTarget::Brief => 400,
            WordCountTarget::Standard => 800,
            WordCountTarget::Long => 1500,
            WordCountTarget::Pillar => 2500,
        }
    }
}

/// Optional article features the user can toggle per request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AdvancedOptions {
    #[serde(default)]
    pub table_of_contents: bool,
    #[serde(default)]
    pub glossary: bool,
    #[serde(default)]
    pub tables: bool,
    #[serde(default)]
    pub lists: bool,
    #[serde(default)]
    pub secure_sources: bool,
    #[serde(default)]
    pub author_credit: bool,
}

/// Everything the user supplies to start a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub topic: String,
    pub target_keyword: String,
    pub language: String,
    #[serde(default)]
    pub word_count: WordCountTarget,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub options: AdvancedOptions,
}

/// SERP-level research produced once per run. Advisory: an empty default is
/// a valid value when the analysis stage degrades.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitiveAnalysis {
    #[serde(default)]
    pub competitor_titles: Vec<String>,
    #[serde(default)]
    pub content_gaps: Vec<String>,
    #[serde(default)]
    pub paa_questions: Vec<String>,
    #[serde(default)]
    pub lsi_keywords: Vec<String>,
    #[serde(default)]
    pub strategy_summary: String,
}

/// Title, subtitle and lead paragraph for the article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleStructure {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub lead: String,
}

/// The slot an image fills in the published article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageRole {
    Hero,
    Social,
    Feed,
    Detail,
}

impl ImageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageRole::Hero => "hero",
            ImageRole::Social => "social",
            ImageRole::Feed => "feed",
            ImageRole::Detail => "detail",
        }
    }
}

/// The aspect ratios the image model accepts. Anything else is rejected at
/// the boundary rather than coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AspectRatio {
    Widescreen,
    Square,
    Standard,
    Vertical,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Widescreen => "16:9",
            AspectRatio::Square => "1:1",
            AspectRatio::Standard => "4:3",
            AspectRatio::Vertical => "9:16",
        }
    }

    /// Pixel dimensions used for placeholder images.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectRatio::Widescreen => (1280, 720),
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Standard => (1024, 768),
            AspectRatio::Vertical => (720, 1280),
        }
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "16:9" => Ok(AspectRatio::Widescreen),
            "1:1" => Ok(AspectRatio::Square),
            "4:3" => Ok(AspectRatio::Standard),
            "9:16" => Ok(AspectRatio::Vertical),
            other => Err(format!("Unsupported aspect ratio: '{other}'")),
        }
    }
}

impl From<AspectRatio> for String {
    fn from(ratio: AspectRatio) -> Self {
        ratio.as_str().to_string()
    }
}

/// One planned image: prompt and SEO fields first, rendering data filled in
/// when (if) the image is actually generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSpec {
    pub role: ImageRole,
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub rendered_url: Option<String>,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub resolution_used: Option<String>,
}

/// The media plan for an article: one video query plus a fixed set of image
/// specs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaStrategy {
    #[serde(default)]
    pub video_search_query: String,
    #[serde(default)]
    pub image_specs: Vec<ImageSpec>,
}

/// A resolved, embeddable video. `embed_html` and `thumbnail_url` are always
/// derived from the extracted 11-character id, never taken from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAsset {
    pub query: String,
    pub title: String,
    pub channel: String,
    pub watch_url: String,
    pub video_id: String,
    pub embed_html: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub alt_text: String,
}

/// Ranking opportunities surfaced by the metadata stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeoOpportunities {
    #[serde(default)]
    pub featured_snippet: String,
    #[serde(default)]
    pub paa: Vec<String>,
    #[serde(default)]
    pub news_angle: String,
}

/// The SEO metadata block. The pipeline guarantees the length ceilings and
/// cardinalities after generation; no field is ever left blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeoMetadata {
    #[serde(default)]
    pub seo_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub target_keyword: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub related_keyphrase: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub lsi_keywords: Vec<String>,
    #[serde(default)]
    pub opportunities: SeoOpportunities,
    #[serde(default)]
    pub viral_excerpt: String,
}

/// Yoast-compatible meta fields sent with the WordPress post payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WpSeoMeta {
    #[serde(rename = "_yoast_wpseo_title")]
    pub seo_title: String,
    #[serde(rename = "_yoast_wpseo_metadesc")]
    pub meta_description: String,
    #[serde(rename = "_yoast_wpseo_focuskw")]
    pub focus_keyword: String,
}

/// The post creation payload for the WordPress REST API. `status` is always
/// `"draft"`; publishing to the live site stays a human decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WpPostPayload {
    pub title: String,
    pub content: String,
    pub status: String,
    pub slug: String,
    pub excerpt: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub meta: WpSeoMeta,
}

/// Derived technical SEO output: a schema.org `@graph` document and the CMS
/// post payload. Regenerated whenever the article changes, never edited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnicalSeo {
    pub schema_json_ld: String,
    pub post_payload: WpPostPayload,
}

/// Article lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Completed,
    Published,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Completed => "completed",
            ArticleStatus::Published => "published",
        }
    }
}

/// The aggregate root. Owned by the orchestrator during generation, by the
/// store and the API afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub status: ArticleStatus,
    pub request: GenerationRequest,
    #[serde(default)]
    pub analysis: CompetitiveAnalysis,
    #[serde(default)]
    pub structure: ArticleStructure,
    #[serde(default)]
    pub html_content: String,
    #[serde(default)]
    pub media: MediaStrategy,
    #[serde(default)]
    pub video: Option<VideoAsset>,
    #[serde(default)]
    pub seo: SeoMetadata,
    #[serde(default)]
    pub technical_seo: Option<TechnicalSeo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An author profile that can be credited on generated articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
}

/// Credentials for the WordPress REST API (application password flow).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordPressCredentials {
    pub site_url: String,
    pub username: String,
    pub app_password: String,
}

/// Persisted application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub admin_name: String,
    #[serde(default)]
    pub default_site_url: String,
    #[serde(default)]
    pub wordpress: Option<WordPressCredentials>,
}
