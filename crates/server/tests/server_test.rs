//! End-to-end API tests: a real server on a random port, with the AI
//! provider and the WordPress site both played by a mock HTTP server.

use anyhow::Result;
use pressgen_server::{
    config::{AiConfig, AppConfig, PipelineSettings, WordPressSettings},
    router::create_router,
    state::build_app_state,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEYWORD: &str = "solar energy brazil 2025";
const CHAT_PATH: &str = "/v1/chat/completions";

/// Wraps a stage payload in an OpenAI-style chat completion.
fn completion(content: String) -> Value {
    json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

async fn mount_stage(server: &MockServer, key: &str, content: String) {
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(body_string_contains(key))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
        .mount(server)
        .await;
}

async fn mount_ai_stages(server: &MockServer) {
    mount_stage(
        server,
        "SEO strategist",
        json!({
            "competitor_titles": ["Top Solar Guide"],
            "content_gaps": [],
            "paa_questions": ["Is solar worth it in Brazil?"],
            "lsi_keywords": ["photovoltaic"],
            "strategy_summary": "Lead with policy changes."
        })
        .to_string(),
    )
    .await;
    mount_stage(
        server,
        "senior editor",
        json!({
            "title": format!("{KEYWORD} complete guide"),
            "subtitle": "What the new rules mean",
            "lead": format!("{KEYWORD} is reshaping the market.")
        })
        .to_string(),
    )
    .await;
    mount_stage(
        server,
        "expert content writer",
        concat!(
            "<article><h1>Guide</h1><p>Solar energy brazil 2025 lead.</p>",
            "<section id=\"authority-references\"><h2>References</h2>",
            "<ul><li><a href=\"https://www.iea.org\">IEA</a></li></ul></section></article>"
        )
        .to_string(),
    )
    .await;
    mount_stage(
        server,
        "art director",
        json!({
            "video_search_query": "solar brazil explained",
            "image_specs": [
                {"role": "hero", "aspect_ratio": "16:9", "prompt": "p1", "alt_text": "a", "title": "t", "caption": "", "filename": "hero.jpg"},
                {"role": "social", "aspect_ratio": "1:1", "prompt": "p2", "alt_text": "a", "title": "t", "caption": "", "filename": "social.jpg"},
                {"role": "feed", "aspect_ratio": "4:3", "prompt": "p3", "alt_text": "a", "title": "t", "caption": "", "filename": "feed.jpg"},
                {"role": "detail", "aspect_ratio": "9:16", "prompt": "p4", "alt_text": "a", "title": "t", "caption": "", "filename": "detail.jpg"}
            ]
        })
        .to_string(),
    )
    .await;
    mount_stage(
        server,
        "Search YouTube for:",
        json!({
            "title": "Solar in Brazil, explained",
            "channel": "Energy Desk",
            "url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "caption": "An overview.",
            "alt_text": "Video thumbnail"
        })
        .to_string(),
    )
    .await;
    mount_stage(
        server,
        "SEO specialist",
        json!({
            "seo_title": format!("{KEYWORD}: costs and rules"),
            "meta_description": format!("{KEYWORD} explained: prices, rules and payback."),
            "slug": "solar-energy-brazil-2025",
            "synonyms": ["solar power brazil", "brazil pv", "solar brazil", "pv brazil"],
            "related_keyphrase": "solar panel prices brazil",
            "tags": ["solar", "brazil", "energy", "renewables", "2025"],
            "lsi_keywords": ["photovoltaic"],
            "opportunities": {"featured_snippet": "Solar keeps growing.", "paa": [], "news_angle": ""},
            "viral_excerpt": "Brazil's solar boom is not slowing down."
        })
        .to_string(),
    )
    .await;
}

struct TestApp {
    address: String,
    client: reqwest::Client,
    _mock_server: MockServer,
}

impl TestApp {
    async fn spawn() -> Result<Self> {
        let mock_server = MockServer::start().await;
        mount_ai_stages(&mock_server).await;

        let config = AppConfig {
            port: 0,
            db_url: ":memory:".to_string(),
            ai: AiConfig {
                provider: "local".to_string(),
                api_key: None,
                api_url: Some(format!("{}{CHAT_PATH}", mock_server.uri())),
                ..Default::default()
            },
            pipeline: PipelineSettings::default(),
            wordpress: Some(WordPressSettings {
                site_url: mock_server.uri(),
                username: "editor".to_string(),
                app_password: "abcd efgh".to_string(),
            }),
        };

        let app_state = build_app_state(config).await?;
        let app = create_router(app_state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let address = format!("http://{}", listener.local_addr()?);
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server task");
        });

        Ok(Self {
            address,
            client: reqwest::Client::new(),
            _mock_server: mock_server,
        })
    }
}

#[tokio::test]
async fn health_check_works() -> Result<()> {
    let app = TestApp::spawn().await?;
    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await?;
    assert!(response.status().is_success());
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn generate_then_publish_flow() -> Result<()> {
    let app = TestApp::spawn().await?;

    // WordPress: the draft post creation endpoint.
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            json!({"id": 321, "link": "https://example.com/?p=321"}),
        ))
        .mount(&app._mock_server)
        .await;

    // Generate.
    let response = app
        .client
        .post(format!("{}/generate", app.address))
        .json(&json!({
            "topic": "Solar energy in Brazil",
            "target_keyword": KEYWORD,
            "language": "English",
            "word_count": "800"
        }))
        .send()
        .await?;
    let status = response.status();
    let body = response.text().await?;
    assert!(status.is_success(), "{body}");
    let article: Value = serde_json::from_str(&body)?;
    assert_eq!(article["status"], "completed");
    let html = article["html_content"].as_str().unwrap();
    assert_eq!(html.matches("id=\"authority-references\"").count(), 1);
    assert!(article["seo"]["meta_description"].as_str().unwrap().len() <= 156);
    let technical = article["technical_seo"]["schema_json_ld"].as_str().unwrap();
    assert!(technical.contains(r#""@type":"Article""#));
    // The local provider cannot render images; the hero stays pending.
    assert!(article["media"]["image_specs"][0]["rendered_url"].is_null());

    // Listed.
    let articles: Value = app
        .client
        .get(format!("{}/articles", app.address))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(articles.as_array().unwrap().len(), 1);

    // Publish.
    let id = article["id"].as_str().unwrap();
    let response = app
        .client
        .post(format!("{}/articles/{id}/publish", app.address))
        .send()
        .await?;
    let status = response.status();
    let body = response.text().await?;
    assert!(status.is_success(), "{body}");
    let receipt: Value = serde_json::from_str(&body)?;
    assert_eq!(receipt["post_id"], 321);
    assert_eq!(receipt["article"]["status"], "published");
    Ok(())
}

#[tokio::test]
async fn unknown_articles_return_404() -> Result<()> {
    let app = TestApp::spawn().await?;
    let response = app
        .client
        .get(format!("{}/articles/nope", app.address))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 404);
    Ok(())
}
