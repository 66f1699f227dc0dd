//! Defensive JSON extraction from provider text.
//!
//! Structured-output modes usually return bare JSON, but models still wrap
//! answers in markdown fences or a sentence of prose. These helpers recover
//! the JSON document before schema validation sees it.

use crate::error::Result;
use crate::PipelineError;
use serde_json::Value;

/// Extract JSON content from markdown fenced code blocks.
///
/// Recognizes `` ```json ``, `` ```JSON ``, and plain `` ``` `` fences.
pub fn extract_json_block(text: &str) -> Option<String> {
    let markers = ["```json", "```JSON", "```"];
    for marker in markers {
        if let Some(start) = text.find(marker) {
            let content_start = start + marker.len();
            if let Some(end) = text[content_start..].find("```") {
                return Some(text[content_start..content_start + end].trim().to_string());
            }
        }
    }
    None
}

/// Try to locate a JSON object or array inside surrounding prose.
///
/// Tries, in order:
/// 1. Markdown code block extraction
/// 2. First `{` or `[` with its last matching closer
pub fn extract_json_candidate(text: &str) -> Option<String> {
    let trimmed = text.trim();

    if let Some(block) = extract_json_block(trimmed) {
        return Some(block);
    }

    let idx = trimmed.find(['{', '['])?;
    let candidate = &trimmed[idx..];
    if serde_json::from_str::<Value>(candidate).is_ok() {
        return Some(candidate.to_string());
    }
    let close = if candidate.starts_with('{') { '}' } else { ']' };
    let end = candidate.rfind(close)?;
    let substr = &candidate[..=end];
    if serde_json::from_str::<Value>(substr).is_ok() {
        return Some(substr.to_string());
    }

    None
}

/// Parse provider text into a `serde_json::Value`, requiring valid JSON.
pub fn parse_value_defensively(text: &str) -> Result<Value> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(PipelineError::MalformedResponse(
            "empty response text".to_string(),
        ));
    }

    if let Ok(val) = serde_json::from_str::<Value>(trimmed) {
        return Ok(val);
    }

    if let Some(candidate) = extract_json_candidate(trimmed) {
        if let Ok(val) = serde_json::from_str::<Value>(&candidate) {
            return Ok(val);
        }
    }

    Err(PipelineError::MalformedResponse(format!(
        "no valid JSON found in provider output. Raw text (truncated): {}",
        truncate(trimmed, 200)
    )))
}

/// Truncate on a char boundary, appending "..." when shortened.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_block() {
        let text = "text\n```json\n{\"a\":1}\n```\nmore";
        assert_eq!(extract_json_block(text), Some("{\"a\":1}".to_string()));
    }

    #[test]
    fn test_extract_json_block_none() {
        assert_eq!(extract_json_block("no code block"), None);
    }

    #[test]
    fn test_extract_json_candidate_embedded() {
        let text = "Here is the result: {\"name\": \"test\"} done.";
        let candidate = extract_json_candidate(text).unwrap();
        let val: Value = serde_json::from_str(&candidate).unwrap();
        assert_eq!(val["name"], "test");
    }

    #[test]
    fn test_extract_json_candidate_array() {
        let text = "Sure: [1, 2, 3]";
        assert_eq!(extract_json_candidate(text), Some("[1, 2, 3]".to_string()));
    }

    #[test]
    fn test_parse_value_defensively_ok() {
        let val = parse_value_defensively(r#"{"a": 1}"#).unwrap();
        assert_eq!(val["a"], 1);
    }

    #[test]
    fn test_parse_value_defensively_fenced() {
        let val = parse_value_defensively("```json\n{\"questions\": []}\n```").unwrap();
        assert!(val["questions"].is_array());
    }

    #[test]
    fn test_parse_value_defensively_err() {
        assert!(matches!(
            parse_value_defensively("not json"),
            Err(PipelineError::MalformedResponse(_))
        ));
        assert!(parse_value_defensively("   ").is_err());
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("₹₹₹₹", 2), "₹₹...");
        assert_eq!(truncate("short", 10), "short");
    }
}
