//! Recovery of a JSON object from free-text model output.
//!
//! Models asked for "JSON only" still wrap their answer in code fences or prose often enough
//! that a single parse is not enough. [`recover_json`] tries an ordered list of strategies, each
//! a pure function from the raw text to an optional JSON object, and returns the first hit.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;

pub type JsonObject = Map<String, Value>;

/// Balanced-brace object candidates, tolerating one level of nested braces.
static OBJECT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").expect("object pattern is a valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    FenceStripping,
    BraceSlicing,
    PatternScan,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::FenceStripping => "fence_stripping",
            Strategy::BraceSlicing => "brace_slicing",
            Strategy::PatternScan => "pattern_scan",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategies in the order they are attempted.
pub const STRATEGIES: [(Strategy, fn(&str) -> Option<JsonObject>); 3] = [
    (Strategy::FenceStripping, strip_fences),
    (Strategy::BraceSlicing, slice_braces),
    (Strategy::PatternScan, scan_objects),
];

/// Recover a JSON object from `text`, or `None` if no strategy succeeds.
pub fn recover_json(text: &str) -> Option<JsonObject> {
    recover_with_strategy(text).map(|(_, object)| object)
}

/// Like [`recover_json`], also reporting which strategy produced the object.
pub fn recover_with_strategy(text: &str) -> Option<(Strategy, JsonObject)> {
    STRATEGIES
        .iter()
        .find_map(|(strategy, attempt)| attempt(text).map(|object| (*strategy, object)))
}

/// Strict parse that only accepts a top-level object.
fn parse_object(candidate: &str) -> Option<JsonObject> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Remove every ```` ```json ```` and ```` ``` ```` marker, trim, and parse what is left.
pub fn strip_fences(text: &str) -> Option<JsonObject> {
    let cleaned = text.replace("```json", "").replace("```", "");
    parse_object(cleaned.trim())
}

/// Parse the span from the first `{` to the last `}`.
pub fn slice_braces(text: &str) -> Option<JsonObject> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&text[start..=end])
}

/// Parse every balanced-brace candidate, last-found first.
pub fn scan_objects(text: &str) -> Option<JsonObject> {
    let candidates: Vec<&str> = OBJECT_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
    candidates.into_iter().rev().find_map(parse_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fenced_json_matches_direct_parse() {
        let body = r#"{"epics": [{"summary": "Login", "stories": [{"summary": "SSO", "subtasks": []}]}]}"#;
        let text = format!("```json\n{body}\n```");

        let (strategy, object) = recover_with_strategy(&text).unwrap();

        assert_eq!(strategy, Strategy::FenceStripping);
        assert_eq!(Value::Object(object), serde_json::from_str::<Value>(body).unwrap());
    }

    #[test]
    fn test_bare_fence_is_stripped() {
        let text = "```\n{\"epics\": []}\n```";
        assert_eq!(strip_fences(text), Some(json!({"epics": []}).as_object().unwrap().clone()));
    }

    #[test]
    fn test_surrounding_prose_falls_back_to_brace_slicing() {
        let text = "Here is the result: {\"epics\":[]} Thanks!";

        let (strategy, object) = recover_with_strategy(text).unwrap();

        assert_eq!(strategy, Strategy::BraceSlicing);
        assert_eq!(Value::Object(object), json!({"epics": []}));
    }

    #[test]
    fn test_prose_before_fence_uses_brace_slicing() {
        let text = "Sure! Here you go:\n```json\n{\"epics\": [{\"summary\": \"A\"}]}\n```\nLet me know.";

        let (strategy, object) = recover_with_strategy(text).unwrap();

        assert_eq!(strategy, Strategy::BraceSlicing);
        assert_eq!(object["epics"][0]["summary"], "A");
    }

    #[test]
    fn test_pattern_scan_prefers_last_candidate() {
        let text = r#"first {"a": 1} then {"b": {"c": 2}} and a stray }"#;

        let (strategy, object) = recover_with_strategy(text).unwrap();

        assert_eq!(strategy, Strategy::PatternScan);
        assert_eq!(Value::Object(object), json!({"b": {"c": 2}}));
    }

    #[test]
    fn test_pattern_scan_skips_unparseable_candidates() {
        let text = r#"{"epics": []} followed by {not json at all}"#;

        assert_eq!(slice_braces(text), None);
        assert_eq!(scan_objects(text).map(Value::Object), Some(json!({"epics": []})));
    }

    #[test]
    fn test_no_braces_fails() {
        assert_eq!(recover_json("The model refused to answer."), None);
        assert_eq!(recover_json(""), None);
    }

    #[test]
    fn test_reversed_braces_fail() {
        assert_eq!(slice_braces("} nothing here {"), None);
        assert_eq!(recover_json("} nothing here {"), None);
    }

    #[test]
    fn test_top_level_array_is_not_an_object() {
        assert_eq!(strip_fences("```json\n[1, 2, 3]\n```"), None);
        assert_eq!(recover_json("[1, 2, 3]"), None);
    }

    #[test]
    fn test_array_of_objects_recovers_inner_span() {
        let object = recover_json(r#"[{"epics": []}]"#).unwrap();
        assert_eq!(Value::Object(object), json!({"epics": []}));
    }
}
