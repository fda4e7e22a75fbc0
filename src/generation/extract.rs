//! Extraction of a JSON payload from a model completion.
//!
//! Models are prompted for strict JSON but still wrap replies in fenced
//! code blocks or add prose around the object. Rather than letting a
//! `serde_json` parse failure surface generically, this narrows the raw
//! completion down to the JSON object and signals a distinct error when
//! none is present.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("completion did not contain a JSON object: {snippet}")]
pub struct MalformedResponse {
    /// Leading slice of the offending completion, for log context.
    pub snippet: String,
}

static FENCE: Lazy<Regex> = Lazy::new(|| {
    // ```json ... ``` or bare ``` ... ```
    Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("fence regex")
});

/// Return the JSON object text inside `raw`, stripping a markdown fence if
/// one is present, otherwise slicing from the first `{` to the last `}`.
pub fn extract_json_payload(raw: &str) -> Result<String, MalformedResponse> {
    let candidate = match FENCE.captures(raw) {
        Some(caps) => caps[1].to_string(),
        None => raw.trim().to_string(),
    };

    let start = candidate.find('{');
    let end = candidate.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(candidate[start..=end].to_string()),
        _ => Err(MalformedResponse {
            snippet: raw.chars().take(120).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_json_passes_through() {
        let raw = r#"{"title": "Hello"}"#;
        assert_eq!(extract_json_payload(raw).unwrap(), raw);
    }

    #[test]
    fn json_fence_is_stripped() {
        let raw = "```json\n{\"title\": \"Hello\"}\n```";
        assert_eq!(extract_json_payload(raw).unwrap(), r#"{"title": "Hello"}"#);
    }

    #[test]
    fn anonymous_fence_is_stripped() {
        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json_payload(raw).unwrap(), r#"{"a": 1}"#);
    }

    #[test]
    fn surrounding_prose_is_trimmed() {
        let raw = "Sure, here is the article:\n{\"title\": \"X\"}\nHope that helps!";
        assert_eq!(extract_json_payload(raw).unwrap(), r#"{"title": "X"}"#);
    }

    #[test]
    fn missing_object_is_malformed() {
        let err = extract_json_payload("I could not generate an article.").unwrap_err();
        assert!(err.snippet.starts_with("I could not"));
    }

    #[test]
    fn snippet_is_bounded() {
        let raw = "x".repeat(500);
        let err = extract_json_payload(&raw).unwrap_err();
        assert_eq!(err.snippet.len(), 120);
    }
}
