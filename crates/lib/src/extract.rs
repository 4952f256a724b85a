//! # Structured Output Extraction
//!
//! Models are instructed to answer with a bare JSON value, but in practice
//! the payload often arrives wrapped in a markdown fence or padded with
//! prose. This module normalizes that raw text into parsed JSON, or fails
//! with an error the UI can show verbatim.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:[a-zA-Z0-9]+)?\s*\n?([\s\S]*?)```").expect("fence regex is valid")
});

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("The model returned an empty response.")]
    EmptyResponse,
    #[error("The model did not return valid structured data: {0}")]
    MalformedOutput(String),
}

/// Locates the JSON payload inside a raw model response.
///
/// Order of attempts: a fenced code block wins; otherwise the span from the
/// first opening brace/bracket to the last matching closer is taken,
/// tolerating commentary the model added around it.
pub fn json_payload(raw: &str) -> Result<String, ExtractError> {
    if raw.trim().is_empty() {
        return Err(ExtractError::EmptyResponse);
    }

    let candidate = match FENCE_RE.captures(raw).and_then(|caps| caps.get(1)) {
        Some(fenced) => fenced.as_str(),
        None => raw,
    };

    let Some((start, opener)) = candidate
        .char_indices()
        .find(|&(_, c)| c == '{' || c == '[')
    else {
        return Err(ExtractError::MalformedOutput(
            "no JSON object or array found in the response".to_string(),
        ));
    };
    let closer = if opener == '{' { '}' } else { ']' };
    let end = candidate.rfind(closer).ok_or_else(|| {
        ExtractError::MalformedOutput("unterminated JSON value in the response".to_string())
    })?;
    if end < start {
        return Err(ExtractError::MalformedOutput(
            "unterminated JSON value in the response".to_string(),
        ));
    }

    Ok(candidate[start..=end].to_string())
}

/// Parses the JSON payload of a raw model response into a `serde_json::Value`.
pub fn parse_value(raw: &str) -> Result<Value, ExtractError> {
    let payload = json_payload(raw)?;
    serde_json::from_str(&payload).map_err(|e| ExtractError::MalformedOutput(e.to_string()))
}

/// Parses the JSON payload of a raw model response into a typed structure.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractError> {
    let payload = json_payload(raw)?;
    serde_json::from_str(&payload).map_err(|e| ExtractError::MalformedOutput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_fenced_json_with_language_tag() {
        let raw = "Here is the data:\n```json\n{\"a\":1}\n```\nThanks!";
        assert_eq!(parse_value(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn extracts_fenced_json_without_language_tag() {
        let raw = "```\n[1, 2, 3]\n```";
        assert_eq!(parse_value(raw).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn tolerates_prose_around_bare_json() {
        let raw = "Sure! The result is {\"title\": \"Hello\"} as requested.";
        assert_eq!(parse_value(raw).unwrap(), json!({"title": "Hello"}));
    }

    #[test]
    fn empty_input_is_a_distinct_error() {
        assert!(matches!(parse_value("   \n"), Err(ExtractError::EmptyResponse)));
    }

    #[test]
    fn garbage_is_malformed_not_a_crash() {
        assert!(matches!(
            parse_value("not json at all"),
            Err(ExtractError::MalformedOutput(_))
        ));
    }

    #[test]
    fn truncated_object_is_malformed() {
        assert!(matches!(
            parse_value("{\"a\": 1"),
            Err(ExtractError::MalformedOutput(_))
        ));
    }

    #[test]
    fn typed_parsing_reports_shape_mismatches() {
        #[derive(Debug, serde::Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            title: String,
        }
        let err = parse_structured::<Expected>("{\"title\": 42}").unwrap_err();
        assert!(matches!(err, ExtractError::MalformedOutput(_)));
    }
}
