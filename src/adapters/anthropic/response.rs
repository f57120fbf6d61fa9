//! Unwrapping and parsing of the model's answer
//!
//! The model is asked for a bare JSON object but sometimes wraps it in a
//! markdown fence. Stripping the fence is its own step so it can be tested
//! apart from JSON parsing.

use crate::adapters::service::ResultMapping;
use crate::domain::TransformError;

const FENCE: &str = "```";

/// Remove a surrounding markdown code fence, if present
///
/// The opening fence line (including any language tag) is dropped, and so
/// is everything from the last closing fence on. Text without a leading
/// fence is returned trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with(FENCE) {
        return trimmed;
    }

    let body = match trimmed.split_once('\n') {
        Some((_, rest)) => rest,
        None => return "",
    };

    match body.rsplit_once(FENCE) {
        Some((inner, _)) => inner.trim(),
        None => body.trim(),
    }
}

/// Parse the model's answer into an identifier mapping
///
/// # Errors
///
/// Returns [`TransformError::Malformed`] when the unwrapped text is not a
/// JSON object of string values.
pub fn parse_result_mapping(text: &str) -> Result<ResultMapping, TransformError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(TransformError::Malformed("empty response text".to_string()));
    }

    serde_json::from_str::<ResultMapping>(body).map_err(|e| {
        let preview: String = body.chars().take(120).collect();
        TransformError::Malformed(format!("{e} (response starts with: {preview:?})"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("{\"a\":\"b\"}", "{\"a\":\"b\"}" ; "bare object")]
    #[test_case("  {\"a\":\"b\"}\n", "{\"a\":\"b\"}" ; "surrounding whitespace")]
    #[test_case("```json\n{\"a\":\"b\"}\n```", "{\"a\":\"b\"}" ; "json fence")]
    #[test_case("```\n{\"a\":\"b\"}\n```\n", "{\"a\":\"b\"}" ; "plain fence")]
    #[test_case("```json\n{\"a\":\"b\"}", "{\"a\":\"b\"}" ; "unterminated fence")]
    #[test_case("```", "" ; "fence only")]
    fn test_strip_code_fence(input: &str, expected: &str) {
        assert_eq!(strip_code_fence(input), expected);
    }

    #[test]
    fn test_parse_fenced_mapping() {
        let text = "```json\n{\"99490\": \"Chronic Care Management Services, 20 Minutes\", \"J2785\": \"Injection, Regadenoson 0.1 mg\"}\n```";
        let mapping = parse_result_mapping(text).unwrap();

        assert_eq!(mapping.len(), 2);
        assert_eq!(
            mapping.get("J2785").map(String::as_str),
            Some("Injection, Regadenoson 0.1 mg")
        );
    }

    #[test]
    fn test_parse_rejects_prose() {
        let err = parse_result_mapping("Here are the cleaned descriptions: ...").unwrap_err();
        assert!(matches!(err, TransformError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_non_string_values() {
        let err = parse_result_mapping("{\"99213\": 42}").unwrap_err();
        assert!(matches!(err, TransformError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            parse_result_mapping("```json\n```"),
            Err(TransformError::Malformed(_))
        ));
    }
}
