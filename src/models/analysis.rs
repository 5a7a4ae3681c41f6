use serde::Serialize;
use serde_json::{Map, Value};

pub const UNPARSEABLE_ISSUE: &str = "Analysis response could not be parsed";

const TEXT_KEYS: &[&str] = &["message", "description", "text", "issue", "suggestion", "title"];
const LOCATION_KEYS: &[&str] = &["file", "path", "filename"];

/// Verdict produced from the model's reply.
///
/// `score`, `suggestions` and `summary` are optional so that both the minimal
/// `{approved, issues}` reply and the extended reply map onto the same type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub approved: bool,
    pub issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AnalysisResult {
    /// Reads a verdict out of any JSON value without rejecting odd fields.
    ///
    /// Only a boolean `approved: true` approves. Non-string list entries are
    /// stringified, a score may be a number or a numeric string.
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let object = value.as_object().unwrap_or(&empty);

        Self {
            approved: object
                .get("approved")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            issues: object.get("issues").map(read_list).unwrap_or_default(),
            score: object.get("score").and_then(read_score),
            suggestions: object
                .get("suggestions")
                .filter(|v| !v.is_null())
                .map(read_list),
            summary: object
                .get("summary")
                .and_then(Value::as_str)
                .map(String::from),
        }
    }

    /// Conservative verdict used when the interpreter itself fails.
    pub fn unparseable() -> Self {
        Self {
            approved: false,
            issues: vec![UNPARSEABLE_ISSUE.to_string()],
            score: None,
            suggestions: None,
            summary: None,
        }
    }
}

fn read_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(read_entry).collect(),
        other => read_entry(other).into_iter().collect(),
    }
}

fn read_entry(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(fields) => {
            let text = TEXT_KEYS
                .iter()
                .find_map(|k| fields.get(*k).and_then(Value::as_str));
            let location = LOCATION_KEYS
                .iter()
                .find_map(|k| fields.get(*k).and_then(Value::as_str));
            match (location, text) {
                (Some(location), Some(text)) => Some(format!("{}: {}", location, text)),
                (None, Some(text)) => Some(text.to_string()),
                _ => Some(value.to_string()),
            }
        }
        other => Some(other.to_string()),
    }
}

fn read_score(value: &Value) -> Option<u8> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !score.is_finite() {
        return None;
    }
    Some(score.round().clamp(0.0, 100.0) as u8)
}
