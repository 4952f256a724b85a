//! Deterministic post-processing for stage outputs: the editorial contracts
//! (title ceiling, metadata lengths, fixed cardinalities) are enforced here
//! rather than trusted to the model.

use crate::constants::{
    EXCERPT_MAX_CHARS, IMAGE_SPEC_COUNT, META_DESCRIPTION_MAX_CHARS, META_KEYWORD_WINDOW,
    SEO_TITLE_MAX_CHARS, SYNONYM_COUNT, TAG_COUNT,
};
use crate::text::{char_position, slugify, title_case, truncate_chars};
use crate::types::{AspectRatio, ImageRole, ImageSpec, MediaStrategy, SeoMetadata};
use serde_json::{json, Value};

const SYNONYM_SUFFIXES: &[&str] = &["guide", "tips", "benefits", "examples"];
const TAG_SUFFIXES: &[&str] = &["guide", "tips", "benefits", "examples", "trends"];

/// Applies the headline contract: at most `limit` words, and the target
/// keyword must survive. A title that lost the keyword is replaced by a
/// keyword-derived one rather than shipped broken.
pub fn enforce_title(raw_title: &str, keyword: &str, limit: usize) -> String {
    let trimmed = raw_title.trim();
    let mut candidate = if trimmed.is_empty() {
        title_case(keyword)
    } else {
        trimmed.to_string()
    };

    let words: Vec<&str> = candidate.split_whitespace().collect();
    if words.len() > limit {
        candidate = words[..limit].join(" ");
    }
    if !candidate.to_lowercase().contains(&keyword.to_lowercase()) {
        candidate = title_case(keyword);
    }
    candidate
}

/// Enforces the metadata ceilings and cardinalities. Every field ends up
/// non-empty: missing or non-conforming values are derived from the keyword.
pub fn finalize_seo(mut seo: SeoMetadata, keyword: &str) -> SeoMetadata {
    let keyword_lower = keyword.to_lowercase();
    seo.target_keyword = keyword.to_string();

    // SEO title: keyword present, hard 60-char ceiling.
    let seo_title = seo.seo_title.trim();
    if seo_title.is_empty() || !seo_title.to_lowercase().contains(&keyword_lower) {
        seo.seo_title = title_case(keyword);
    } else {
        seo.seo_title = seo_title.to_string();
    }
    seo.seo_title = truncate_chars(&seo.seo_title, SEO_TITLE_MAX_CHARS);

    // Meta description: keyword inside the first 100 chars, 156-char ceiling.
    let description = seo.meta_description.trim().to_string();
    seo.meta_description = if description.is_empty() {
        format!(
            "{}: a practical, up-to-date guide with expert analysis and sources.",
            title_case(keyword)
        )
    } else {
        match char_position(&description, keyword) {
            Some(pos) if pos < META_KEYWORD_WINDOW => description,
            _ => format!("{}: {description}", title_case(keyword)),
        }
    };
    seo.meta_description = truncate_chars(&seo.meta_description, META_DESCRIPTION_MAX_CHARS);

    // Viral excerpt: 180-char ceiling, never blank.
    let excerpt = seo.viral_excerpt.trim().to_string();
    seo.viral_excerpt = if excerpt.is_empty() {
        format!("Everything you need to know about {keyword}, in one place.")
    } else {
        excerpt
    };
    seo.viral_excerpt = truncate_chars(&seo.viral_excerpt, EXCERPT_MAX_CHARS);

    // Slug and related keyphrase.
    seo.slug = if seo.slug.trim().is_empty() {
        slugify(keyword)
    } else {
        slugify(&seo.slug)
    };
    if seo.related_keyphrase.trim().is_empty() {
        seo.related_keyphrase = format!("{keyword} guide");
    }

    // Fixed cardinalities.
    seo.synonyms = pad_list(seo.synonyms, SYNONYM_COUNT, keyword, SYNONYM_SUFFIXES);
    seo.tags = pad_list(seo.tags, TAG_COUNT, keyword, TAG_SUFFIXES);

    seo
}

fn pad_list(mut items: Vec<String>, target: usize, keyword: &str, suffixes: &[&str]) -> Vec<String> {
    items.retain(|item| !item.trim().is_empty());
    items.dedup();
    for suffix in suffixes {
        if items.len() >= target {
            break;
        }
        let candidate = format!("{keyword} {suffix}");
        if !items.contains(&candidate) {
            items.push(candidate);
        }
    }
    items.truncate(target);
    items
}

/// The fixed role/ratio plan for a media strategy.
const IMAGE_PLAN: &[(ImageRole, AspectRatio)] = &[
    (ImageRole::Hero, AspectRatio::Widescreen),
    (ImageRole::Social, AspectRatio::Square),
    (ImageRole::Feed, AspectRatio::Standard),
    (ImageRole::Detail, AspectRatio::Vertical),
];

/// A usable strategy derived purely from the title and keyword, for when
/// the media stage degrades.
pub fn default_media_strategy(title: &str, keyword: &str) -> MediaStrategy {
    MediaStrategy {
        video_search_query: keyword.to_string(),
        image_specs: IMAGE_PLAN
            .iter()
            .map(|(role, ratio)| ImageSpec {
                role: *role,
                aspect_ratio: *ratio,
                prompt: format!(
                    "Photorealistic editorial photograph illustrating {title}. Natural light, 35mm lens, no text overlays."
                ),
                alt_text: title.to_string(),
                title: title.to_string(),
                caption: String::new(),
                filename: format!("{}-{}.jpg", slugify(keyword), role.as_str()),
                rendered_url: None,
                model_used: None,
                resolution_used: None,
            })
            .collect(),
    }
}

/// Validates a model-produced strategy against the fixed plan; anything
/// off-shape falls back to the deterministic default, and per-spec gaps
/// (blank filenames, blank query) are filled in.
pub(super) fn normalize_media_strategy(
    parsed: Option<MediaStrategy>,
    title: &str,
    keyword: &str,
) -> MediaStrategy {
    let Some(mut strategy) = parsed else {
        return default_media_strategy(title, keyword);
    };
    if strategy.image_specs.len() != IMAGE_SPEC_COUNT {
        return default_media_strategy(title, keyword);
    }
    for (spec, (role, ratio)) in strategy.image_specs.iter_mut().zip(IMAGE_PLAN) {
        spec.role = *role;
        spec.aspect_ratio = *ratio;
        if spec.filename.trim().is_empty() {
            spec.filename = format!("{}-{}.jpg", slugify(keyword), role.as_str());
        }
        if spec.prompt.trim().is_empty() {
            spec.prompt = format!(
                "Photorealistic editorial photograph illustrating {title}. Natural light, 35mm lens, no text overlays."
            );
        }
    }
    if strategy.video_search_query.trim().is_empty() {
        strategy.video_search_query = keyword.to_string();
    }
    strategy
}

/// The strict response schema sent to the preferred tier for the metadata
/// stage. The fallback tier gets the same prompt with the schema stripped.
pub(super) fn metadata_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "seo_title": { "type": "string" },
            "meta_description": { "type": "string" },
            "slug": { "type": "string" },
            "synonyms": { "type": "array", "items": { "type": "string" } },
            "related_keyphrase": { "type": "string" },
            "tags": { "type": "array", "items": { "type": "string" } },
            "lsi_keywords": { "type": "array", "items": { "type": "string" } },
            "opportunities": {
                "type": "object",
                "properties": {
                    "featured_snippet": { "type": "string" },
                    "paa": { "type": "array", "items": { "type": "string" } },
                    "news_angle": { "type": "string" }
                }
            },
            "viral_excerpt": { "type": "string" }
        },
        "required": ["seo_title", "meta_description", "slug"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYWORD: &str = "solar energy brazil 2025";

    #[test]
    fn titles_over_the_ceiling_are_truncated() {
        let title = enforce_title(
            "Solar Energy Brazil 2025 Will Change Absolutely Everything Forever",
            KEYWORD,
            7,
        );
        assert!(title.split_whitespace().count() <= 7);
        assert!(title.to_lowercase().contains(KEYWORD));
    }

    #[test]
    fn titles_that_lose_the_keyword_are_replaced() {
        let title = enforce_title("A Completely Unrelated Headline", KEYWORD, 7);
        assert_eq!(title, "Solar Energy Brazil 2025");
    }

    #[test]
    fn empty_titles_fall_back_to_the_keyword() {
        assert_eq!(enforce_title("  ", KEYWORD, 7), "Solar Energy Brazil 2025");
    }

    #[test]
    fn finalize_seo_enforces_all_ceilings() {
        let draft = SeoMetadata {
            seo_title: format!("{KEYWORD} and a very long tail that blows past sixty characters"),
            meta_description: format!("{} {KEYWORD}", "padding ".repeat(20)),
            viral_excerpt: "x".repeat(400),
            ..Default::default()
        };
        let seo = finalize_seo(draft, KEYWORD);
        assert!(seo.seo_title.chars().count() <= 60);
        assert!(seo.meta_description.chars().count() <= 156);
        assert!(seo.viral_excerpt.chars().count() <= 180);
        let window: String = seo.meta_description.to_lowercase().chars().take(100).collect();
        assert!(window.contains(KEYWORD) || seo.meta_description.to_lowercase().starts_with("solar"));
        assert_eq!(seo.synonyms.len(), SYNONYM_COUNT);
        assert_eq!(seo.tags.len(), TAG_COUNT);
        assert_eq!(seo.target_keyword, KEYWORD);
    }

    #[test]
    fn finalize_seo_derives_everything_from_an_empty_draft() {
        let seo = finalize_seo(SeoMetadata::default(), KEYWORD);
        assert_eq!(seo.seo_title, "Solar Energy Brazil 2025");
        assert!(seo.meta_description.to_lowercase().contains(KEYWORD));
        assert!(char_position(&seo.meta_description, KEYWORD).unwrap() < META_KEYWORD_WINDOW);
        assert_eq!(seo.slug, "solar-energy-brazil-2025");
        assert!(!seo.viral_excerpt.is_empty());
        assert_eq!(seo.synonyms.len(), SYNONYM_COUNT);
        assert_eq!(seo.tags.len(), TAG_COUNT);
    }

    #[test]
    fn keyword_buried_past_the_window_is_pulled_forward() {
        let draft = SeoMetadata {
            meta_description: format!("{} {KEYWORD}.", "filler words here ".repeat(8)),
            ..Default::default()
        };
        let seo = finalize_seo(draft, KEYWORD);
        let pos = char_position(&seo.meta_description, KEYWORD).unwrap();
        assert!(pos < META_KEYWORD_WINDOW, "keyword at {pos}");
    }

    #[test]
    fn default_media_strategy_follows_the_fixed_plan() {
        let strategy = default_media_strategy("A Title", KEYWORD);
        assert_eq!(strategy.image_specs.len(), IMAGE_SPEC_COUNT);
        assert_eq!(strategy.image_specs[0].role, ImageRole::Hero);
        assert_eq!(strategy.image_specs[0].aspect_ratio, AspectRatio::Widescreen);
        assert_eq!(strategy.image_specs[3].aspect_ratio, AspectRatio::Vertical);
        assert_eq!(strategy.video_search_query, KEYWORD);
        assert!(strategy.image_specs[0].filename.ends_with("-hero.jpg"));
    }

    #[test]
    fn off_shape_strategies_fall_back_to_the_default() {
        let short = MediaStrategy {
            video_search_query: "q".to_string(),
            image_specs: vec![],
        };
        let normalized = normalize_media_strategy(Some(short), "A Title", KEYWORD);
        assert_eq!(normalized.image_specs.len(), IMAGE_SPEC_COUNT);
        assert_eq!(normalized.video_search_query, KEYWORD);
    }
}
