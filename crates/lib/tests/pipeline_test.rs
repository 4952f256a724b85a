//! End-to-end pipeline runs against a scripted provider and an in-memory
//! store. Every external collaborator succeeds unless a test says otherwise.

use anyhow::Result;
use pressgen::constants::{META_DESCRIPTION_MAX_CHARS, META_KEYWORD_WINDOW};
use pressgen::errors::AiErrorKind;
use pressgen::images;
use pressgen::pipeline::{Pipeline, PipelineConfig};
use pressgen::providers::db::store::ArticleStore;
use pressgen::retry::RetryPolicy;
use pressgen::text::char_position;
use pressgen::throttle::Throttle;
use pressgen::types::{
    ArticleStatus, GenerationRequest, ImageRole, ImageSpec, AspectRatio, WordCountTarget,
};
use pressgen::QuotaBreaker;
use pressgen_test_utils::{MockAiProvider, TestSetup};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const KEYWORD: &str = "solar energy brazil 2025";

fn scripted_provider() -> MockAiProvider {
    let mock = MockAiProvider::new();
    mock.add_response(
        "SEO strategist",
        json!({
            "competitor_titles": ["Top Solar Guide", "Brazil Energy Outlook"],
            "content_gaps": ["costs for homeowners"],
            "paa_questions": ["Is solar worth it in Brazil?"],
            "lsi_keywords": ["photovoltaic", "net metering"],
            "strategy_summary": "Lead with 2025 policy changes."
        })
        .to_string(),
    );
    mock.add_response(
        "senior editor",
        json!({
            "title": format!("{KEYWORD} complete guide"),
            "subtitle": "What the new rules mean for your roof",
            "lead": format!("{KEYWORD} is reshaping how households buy power.")
        })
        .to_string(),
    );
    mock.add_response(
        "expert content writer",
        concat!(
            "```html\n",
            "<article><h1>Solar energy brazil 2025 complete guide</h1>",
            "<p>Solar energy brazil 2025 is reshaping how households buy power.</p>",
            "<h2>Costs</h2><p>Prices keep falling.</p>",
            "<section id=\"authority-references\"><h2>References</h2>",
            "<ul><li><a href=\"https://www.iea.org\">IEA</a></li></ul></section>",
            "</article>\n```"
        ),
    );
    mock.add_response(
        "art director",
        json!({
            "video_search_query": "solar energy brazil 2025 explained",
            "image_specs": [
                {"role": "hero", "aspect_ratio": "16:9", "prompt": "Rooftop solar at golden hour",
                 "alt_text": "Rooftop solar", "title": "Rooftop solar", "caption": "A rooftop array",
                 "filename": "solar-energy-brazil-2025-hero.jpg"},
                {"role": "social", "aspect_ratio": "1:1", "prompt": "Close-up of a panel",
                 "alt_text": "Panel", "title": "Panel", "caption": "", "filename": "solar-social.jpg"},
                {"role": "feed", "aspect_ratio": "4:3", "prompt": "Installer at work",
                 "alt_text": "Installer", "title": "Installer", "caption": "", "filename": "solar-feed.jpg"},
                {"role": "detail", "aspect_ratio": "9:16", "prompt": "Inverter detail",
                 "alt_text": "Inverter", "title": "Inverter", "caption": "", "filename": "solar-detail.jpg"}
            ]
        })
        .to_string(),
    );
    mock.add_response(
        "Search YouTube for:",
        json!({
            "title": "Solar in Brazil, explained",
            "channel": "Energy Desk",
            "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "caption": "A clear overview of the 2025 rules.",
            "alt_text": "Video about solar energy in Brazil"
        })
        .to_string(),
    );
    mock.add_response(
        "SEO specialist",
        json!({
            "seo_title": format!("{KEYWORD}: costs, rules, payback"),
            "meta_description": format!("{KEYWORD} explained: prices, new net metering rules and payback times for households."),
            "slug": "solar-energy-brazil-2025",
            "synonyms": ["solar power brazil", "brazil pv market", "solar brazil outlook", "brazil solar growth"],
            "related_keyphrase": "solar panel prices brazil",
            "tags": ["solar", "brazil", "energy", "renewables", "2025"],
            "lsi_keywords": ["photovoltaic", "net metering"],
            "opportunities": {
                "featured_snippet": "Solar keeps growing in Brazil in 2025 thanks to falling prices.",
                "paa": ["Is solar worth it in Brazil?"],
                "news_angle": "New net metering rules"
            },
            "viral_excerpt": "Brazil's solar boom is not slowing down in 2025."
        })
        .to_string(),
    );
    mock
}

fn request() -> GenerationRequest {
    GenerationRequest {
        topic: "Solar energy in Brazil".to_string(),
        target_keyword: KEYWORD.to_string(),
        language: "English".to_string(),
        word_count: WordCountTarget::Standard,
        site_url: None,
        author_id: None,
        options: Default::default(),
    }
}

async fn build_pipeline(mock: &MockAiProvider) -> Result<(Pipeline, TestSetup)> {
    let setup = TestSetup::new().await?;
    let pipeline = Pipeline::new(
        Box::new(mock.clone()),
        Arc::new(setup.store.clone()),
        QuotaBreaker::new(),
        Throttle::new(100, Duration::from_secs(1)),
        PipelineConfig::default(),
    );
    Ok((pipeline, setup))
}

#[tokio::test]
async fn full_run_produces_a_completed_article() -> Result<()> {
    let mock = scripted_provider();
    let (pipeline, setup) = build_pipeline(&mock).await?;

    let article = pipeline.run(request(), &CancellationToken::new()).await?;

    assert_eq!(article.status, ArticleStatus::Completed);
    assert!(!article.html_content.is_empty());
    assert_eq!(
        article.html_content.matches("id=\"authority-references\"").count(),
        1
    );

    // Metadata ceilings.
    assert!(article.seo.meta_description.chars().count() <= META_DESCRIPTION_MAX_CHARS);
    assert!(char_position(&article.seo.meta_description, KEYWORD).unwrap() < META_KEYWORD_WINDOW);
    assert!(article.seo.seo_title.chars().count() <= 60);

    // Title contract.
    assert!(article.structure.title.split_whitespace().count() <= 7);
    assert!(article.structure.title.to_lowercase().contains(KEYWORD));

    // Video derived from the extracted id only.
    let video = article.video.as_ref().expect("video resolved");
    assert_eq!(video.video_id, "dQw4w9WgXcQ");
    assert!(video.embed_html.contains("youtube-nocookie.com/embed/dQw4w9WgXcQ"));
    assert_eq!(
        article.html_content.matches("id=\"featured-video\"").count(),
        1
    );

    // Hero rendered eagerly, the rest left for on-demand rendering.
    assert!(article.media.image_specs[0]
        .rendered_url
        .as_deref()
        .unwrap()
        .starts_with("data:image/png;base64,"));
    assert!(article.media.image_specs[1].rendered_url.is_none());

    // Technical SEO payload.
    let technical = article.technical_seo.as_ref().expect("technical seo");
    assert!(technical.schema_json_ld.contains(r#""@type":"Article""#));
    assert_eq!(technical.post_payload.status, "draft");

    // Persisted under its id.
    let stored = setup.store.get_article(&article.id).await?.expect("persisted");
    assert_eq!(stored.id, article.id);
    Ok(())
}

#[tokio::test]
async fn advisory_analysis_failure_does_not_abort_the_run() -> Result<()> {
    let mock = scripted_provider();
    // The first text call (analysis) fails permanently; everything else is scripted.
    mock.fail_text_once(AiErrorKind::Api);
    let (pipeline, _setup) = build_pipeline(&mock).await?;

    let article = pipeline.run(request(), &CancellationToken::new()).await?;
    assert_eq!(article.status, ArticleStatus::Completed);
    assert!(article.analysis.competitor_titles.is_empty());
    Ok(())
}

#[tokio::test]
async fn internal_links_are_spliced_exactly_once() -> Result<()> {
    let mock = scripted_provider();
    mock.add_response(
        "Search the web for pages on the site",
        json!([
            {"url": "https://example.org/solar-basics", "title": "Solar basics"},
            {"url": "https://example.org/solar-basics", "title": "Duplicate"},
            {"url": "https://example.org/net-metering", "title": "Net metering"}
        ])
        .to_string(),
    );
    let (pipeline, _setup) = build_pipeline(&mock).await?;

    let mut req = request();
    req.site_url = Some("https://example.org".to_string());
    let article = pipeline.run(req, &CancellationToken::new()).await?;

    assert_eq!(
        article.html_content.matches("id=\"related-reading\"").count(),
        1
    );
    // Deduplicated by URL.
    assert_eq!(
        article.html_content.matches("https://example.org/solar-basics").count(),
        1
    );
    Ok(())
}

#[tokio::test]
async fn cancellation_aborts_before_any_network_call() -> Result<()> {
    let mock = scripted_provider();
    let (pipeline, setup) = build_pipeline(&mock).await?;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = pipeline.run(request(), &cancel).await.unwrap_err();
    assert!(err.to_string().contains("cancelled"));
    assert!(mock.calls().is_empty());
    assert!(setup.store.list_articles().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn quota_trip_short_circuits_the_next_render() -> Result<()> {
    let mock = MockAiProvider::new();
    mock.fail_image_once(AiErrorKind::RateLimited);
    let breaker = QuotaBreaker::new();
    let spec = ImageSpec {
        role: ImageRole::Hero,
        aspect_ratio: AspectRatio::Widescreen,
        prompt: "Rooftop solar at golden hour".to_string(),
        alt_text: String::new(),
        title: String::new(),
        caption: String::new(),
        filename: "hero.jpg".to_string(),
        rendered_url: None,
        model_used: None,
        resolution_used: None,
    };

    let first = images::render_image(
        &mock,
        &breaker,
        "imagen-3.0-generate-002",
        "1K",
        RetryPolicy::none(),
        &spec,
    )
    .await?;
    assert!(first.placeholder);
    assert!(first.url.starts_with("https://placehold.co/1280x720"));
    assert_eq!(mock.image_call_count(), 1);
    assert!(breaker.is_tripped());

    // Second call: placeholder again, and no network attempt at all.
    let second = images::render_image(
        &mock,
        &breaker,
        "imagen-3.0-generate-002",
        "1K",
        RetryPolicy::none(),
        &spec,
    )
    .await?;
    assert!(second.placeholder);
    assert_eq!(mock.image_call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn video_lookup_failure_leaves_the_slot_empty() -> Result<()> {
    let mock = scripted_provider();
    // Replace the video lookup response with a URL on an unrecognized host.
    mock.add_response(
        "Search YouTube for:",
        json!({
            "title": "Nope",
            "channel": "Nope",
            "url": "https://example.com/video",
            "caption": "",
            "alt_text": ""
        })
        .to_string(),
    );
    let (pipeline, _setup) = build_pipeline(&mock).await?;

    let article = pipeline.run(request(), &CancellationToken::new()).await?;
    assert_eq!(article.status, ArticleStatus::Completed);
    assert!(article.video.is_none());
    assert_eq!(article.html_content.matches("id=\"featured-video\"").count(), 0);
    Ok(())
}
