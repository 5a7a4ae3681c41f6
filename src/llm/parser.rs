use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::AnalysisResult;

const HEURISTIC_SCORE: u8 = 75;
const SUMMARY_CHARS: usize = 200;
const REJECTION_MARKERS: &[&str] = &["rejected", "not approved"];

/// Turns the model's raw reply into a verdict. Never fails.
///
/// A JSON object embedded in the reply wins. Anything else degrades to a
/// keyword heuristic, and a failure inside the interpreter itself yields
/// [`AnalysisResult::unparseable`].
pub fn interpret_response(text: &str) -> AnalysisResult {
    interpret_with(text, heuristic_result)
}

fn interpret_with<H>(text: &str, heuristic: H) -> AnalysisResult
where
    H: Fn(&str) -> AnalysisResult,
{
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| match parse_structured(text) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Falling back to heuristic verdict: {}", e);
            heuristic(text)
        }
    }));

    match attempt {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Interpreter failed on model response, rejecting");
            AnalysisResult::unparseable()
        }
    }
}

/// Parses the JSON span leniently; only invalid JSON is an error.
pub fn parse_structured(text: &str) -> Result<AnalysisResult> {
    let json_str = extract_json(text)?;

    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| Error::ParseError(format!("Failed to parse LLM response: {}", e)))?;

    Ok(AnalysisResult::from_value(&value))
}

/// Greedy span from the first `{` to the last `}`.
fn extract_json(text: &str) -> Result<&str> {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => Ok(&text[start..=end]),
        _ => Err(Error::ParseError("No JSON object found in response".to_string())),
    }
}

fn heuristic_result(text: &str) -> AnalysisResult {
    let lower = text.to_lowercase();
    let approved = !REJECTION_MARKERS.iter().any(|m| lower.contains(m));

    let mut summary: String = text.chars().take(SUMMARY_CHARS).collect();
    summary.push_str("...");

    AnalysisResult {
        approved,
        issues: Vec::new(),
        score: Some(HEURISTIC_SCORE),
        suggestions: Some(Vec::new()),
        summary: Some(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNPARSEABLE_ISSUE;

    #[test]
    fn test_recovers_object_from_prose() {
        let input = r#"Sure! Here is my review:
```json
{"approved": false, "score": 62, "issues": ["src/db.rs: SQL built with format!"],
 "suggestions": ["Add tests"], "summary": "Needs work."}
```
Let me know if you need anything else."#;

        let result = interpret_response(input);
        assert_eq!(
            result,
            AnalysisResult {
                approved: false,
                issues: vec!["src/db.rs: SQL built with format!".to_string()],
                score: Some(62),
                suggestions: Some(vec!["Add tests".to_string()]),
                summary: Some("Needs work.".to_string()),
            }
        );
    }

    #[test]
    fn test_nested_braces_use_greedy_span() {
        let input = r#"Result: {"approved": true, "issues": [], "summary": "uses {} in format"} done"#;
        let result = interpret_response(input);
        assert!(result.approved);
        assert_eq!(result.summary.as_deref(), Some("uses {} in format"));
    }

    #[test]
    fn test_rejected_without_json() {
        let result = interpret_response("The change is REJECTED because it leaks a key.");
        assert!(!result.approved);
        assert!(result.issues.is_empty());
        assert_eq!(result.score, Some(75));
    }

    #[test]
    fn test_not_approved_without_json() {
        let result = interpret_response("This PR is not approved.");
        assert!(!result.approved);
    }

    #[test]
    fn test_plain_text_is_approved() {
        let result = interpret_response("Looks good to me, nice work.");
        assert!(result.approved);
        assert!(result.issues.is_empty());
        assert_eq!(
            result.summary.as_deref(),
            Some("Looks good to me, nice work....")
        );
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let result = interpret_response(r#"{"approved": fals, "issues": [}"#);
        assert!(result.approved);
        assert_eq!(result.score, Some(75));

        let result = interpret_response(r#"rejected: {"approved": nope}"#);
        assert!(!result.approved);
    }

    #[test]
    fn test_explicit_rejection_survives_odd_fields() {
        let replies = [
            r#"{"approved": false, "score": "60", "issues": ["SQL injection in src/db.rs"]}"#,
            r#"{"approved": false, "issues": null}"#,
            r#"{"approved": false, "issues": [{"file": "src/db.rs", "message": "SQL injection"}]}"#,
            r#"{"approved": false, "issues": ["x"], "suggestions": [{"text": "y"}]}"#,
        ];

        for reply in replies {
            let result = interpret_response(reply);
            assert!(!result.approved, "approved for {}", reply);
        }

        let result = interpret_response(replies[0]);
        assert_eq!(result.score, Some(60));
        assert_eq!(result.issues, vec!["SQL injection in src/db.rs".to_string()]);

        let result = interpret_response(replies[2]);
        assert_eq!(result.issues, vec!["src/db.rs: SQL injection".to_string()]);

        let result = interpret_response(replies[3]);
        assert_eq!(result.suggestions, Some(vec!["y".to_string()]));
    }

    #[test]
    fn test_heuristic_failure_yields_sentinel() {
        let result = interpret_with("no json here", |_| panic!("heuristic blew up"));
        assert_eq!(result, AnalysisResult::unparseable());
        assert!(!result.approved);
        assert_eq!(result.issues, vec![UNPARSEABLE_ISSUE.to_string()]);
    }

    #[test]
    fn test_structured_reply_skips_heuristic() {
        let result = interpret_with(r#"{"approved": true}"#, |_| panic!("not reached"));
        assert!(result.approved);
    }

    #[test]
    fn test_reversed_braces_are_not_a_span() {
        assert!(extract_json("} nothing {").is_err());
        assert!(extract_json("no braces").is_err());
    }

    #[test]
    fn test_summary_is_truncated_by_chars() {
        let text = "é".repeat(300);
        let result = interpret_response(&text);
        let summary = result.summary.unwrap();
        assert_eq!(summary.chars().count(), SUMMARY_CHARS + 3);
        assert!(summary.ends_with("..."));
    }
}
