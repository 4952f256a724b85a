//! # Shared Constants
//!
//! Centralizes model identifiers and the editorial limits enforced by the
//! pipeline so they are not scattered through orchestration code.

/// The base URL for the Gemini REST API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The preferred model tier for content generation stages.
pub const PREFERRED_TEXT_MODEL: &str = "gemini-2.5-pro";

/// The more available tier used after a recoverable failure of the
/// preferred model.
pub const FALLBACK_TEXT_MODEL: &str = "gemini-2.5-flash";

/// The model used for image rendering.
pub const IMAGE_MODEL: &str = "imagen-3.0-generate-002";

/// The default rendering resolution requested from the image model.
pub const IMAGE_RESOLUTION: &str = "1K";

// --- Editorial limits ---

/// Headline word ceiling for generated article titles.
pub const TITLE_MAX_WORDS: usize = 7;

/// Character ceiling for the SEO title tag.
pub const SEO_TITLE_MAX_CHARS: usize = 60;

/// Character ceiling for the meta description.
pub const META_DESCRIPTION_MAX_CHARS: usize = 156;

/// The keyword must appear within this many characters of the start of the
/// meta description.
pub const META_KEYWORD_WINDOW: usize = 100;

/// Character ceiling for the social sharing excerpt.
pub const EXCERPT_MAX_CHARS: usize = 180;

/// Exact number of keyword synonyms produced by the metadata stage.
pub const SYNONYM_COUNT: usize = 4;

/// Exact number of post tags produced by the metadata stage.
pub const TAG_COUNT: usize = 5;

/// Number of image specs in a media strategy.
pub const IMAGE_SPEC_COUNT: usize = 4;

/// Maximum internal links spliced into the article body.
pub const INTERNAL_LINK_LIMIT: usize = 5;

/// How much of the image prompt survives onto a placeholder image.
pub const PLACEHOLDER_PROMPT_CHARS: usize = 40;
