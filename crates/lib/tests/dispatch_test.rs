//! Fallback dispatch behavior against a scripted provider.

use pressgen::dispatch::{generate_with_fallback, ModelRoute};
use pressgen::errors::AiErrorKind;
use pressgen::providers::ai::GenerationOptions;
use pressgen::retry::RetryPolicy;
use pressgen_test_utils::MockAiProvider;
use serde_json::json;

fn route() -> ModelRoute {
    ModelRoute::new("gemini-2.5-pro", "gemini-2.5-flash")
        .with_policies(RetryPolicy::none(), RetryPolicy::none())
}

#[tokio::test]
async fn quota_failure_falls_back_and_returns_the_fallback_result() {
    let mock = MockAiProvider::new();
    mock.add_response("write a haiku", "an old silent pond");
    mock.fail_text_once(AiErrorKind::RateLimited);

    let options = GenerationOptions {
        json_output: false,
        response_schema: Some(json!({"type": "object"})),
        thinking_budget: Some(1024),
        ..Default::default()
    };
    let result = generate_with_fallback(&mock, &route(), "write a haiku", &options)
        .await
        .unwrap();
    assert_eq!(result, "an old silent pond");

    // Preferred tried exactly once under its (zero-retry) budget, then the
    // fallback once.
    assert_eq!(mock.calls_for("gemini-2.5-pro"), 1);
    assert_eq!(mock.calls_for("gemini-2.5-flash"), 1);

    // The fallback call had the incompatible options stripped.
    let calls = mock.calls();
    assert!(calls[0].had_schema);
    assert_eq!(calls[0].thinking_budget, Some(1024));
    assert!(!calls[1].had_schema);
    assert_eq!(calls[1].thinking_budget, None);
}

#[tokio::test]
async fn permanent_failures_do_not_fall_back() {
    let mock = MockAiProvider::new();
    mock.add_response("write a haiku", "unused");
    mock.fail_text_once(AiErrorKind::InvalidKey);

    let err = generate_with_fallback(
        &mock,
        &route(),
        "write a haiku",
        &GenerationOptions::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, AiErrorKind::InvalidKey);
    assert_eq!(mock.calls_for("gemini-2.5-flash"), 0);
}

#[tokio::test]
async fn identical_fallback_model_is_not_retried() {
    let mock = MockAiProvider::new();
    mock.fail_text_once(AiErrorKind::RateLimited);
    let same = ModelRoute::new("gemini-2.5-pro", "gemini-2.5-pro")
        .with_policies(RetryPolicy::none(), RetryPolicy::none());

    let err = generate_with_fallback(
        &mock,
        &same,
        "write a haiku",
        &GenerationOptions::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, AiErrorKind::RateLimited);
    assert_eq!(mock.calls_for("gemini-2.5-pro"), 1);
}

#[tokio::test]
async fn empty_response_triggers_the_fallback() {
    let mock = MockAiProvider::new();
    mock.add_response("write a haiku", "an old silent pond");
    mock.fail_text_once(AiErrorKind::EmptyResponse);

    let result = generate_with_fallback(
        &mock,
        &route(),
        "write a haiku",
        &GenerationOptions::default(),
    )
    .await
    .unwrap();
    assert_eq!(result, "an old silent pond");
}
