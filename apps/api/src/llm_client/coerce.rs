//! JSON coercion for oracle responses.
//!
//! The model is asked for a bare JSON object but regularly wraps it in prose
//! or code fences. `coerce` recovers the object when it can and degrades to an
//! empty map when it cannot; it never fails. Field readers below apply the
//! per-key defaults at the parsing boundary so callers work with typed values.

use serde_json::{Map, Value};

/// Recovers a JSON object from arbitrary model output.
///
/// 1. Parse the whole text.
/// 2. Otherwise parse the span from the first `{` to the last `}`.
/// 3. Otherwise return an empty map.
///
/// A successful parse that is not an object counts as a failure.
pub fn coerce(text: &str) -> Map<String, Value> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return map;
    }

    if let Some(candidate) = brace_span(text) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
            return map;
        }
    }

    Map::new()
}

/// Greedy `{ ... }` span: first opening brace through last closing brace.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Reads an integer field. Accepts JSON integers, floats (truncated toward
/// zero) and numeric strings such as `"85"` or `" 72.5 "`.
pub fn int_field(map: &Map<String, Value>, key: &str) -> Option<i64> {
    match map.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// Reads a string field; missing or non-string values yield `None`.
pub fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Reads a list of strings. Non-string elements are dropped; a missing or
/// non-array value yields an empty list.
pub fn string_list_field(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_coerce_direct_parse() {
        assert_eq!(coerce(r#"{"a":1}"#), obj(json!({"a": 1})));
    }

    #[test]
    fn test_coerce_recovers_object_inside_noise() {
        assert_eq!(
            coerce(r#"garbage text {"a":1} trailing"#),
            obj(json!({"a": 1}))
        );
    }

    #[test]
    fn test_coerce_no_json_returns_empty() {
        assert!(coerce("no json here").is_empty());
        assert!(coerce("").is_empty());
    }

    #[test]
    fn test_coerce_tolerates_code_fences() {
        let input = "Here you go:\n```json\n{\"points\": [\"Rust\", \"Go\"]}\n```";
        assert_eq!(coerce(input), obj(json!({"points": ["Rust", "Go"]})));
    }

    #[test]
    fn test_coerce_greedy_span_keeps_nested_objects() {
        let input = r#"Result: {"outer": {"inner": 2}, "n": 3} done"#;
        assert_eq!(coerce(input), obj(json!({"outer": {"inner": 2}, "n": 3})));
    }

    #[test]
    fn test_coerce_two_objects_is_unparseable() {
        // Greedy span covers both objects, which is not valid JSON.
        assert!(coerce(r#"{"a":1} and {"b":2}"#).is_empty());
    }

    #[test]
    fn test_coerce_non_object_json_returns_empty() {
        assert!(coerce("[1, 2, 3]").is_empty());
        assert!(coerce("42").is_empty());
    }

    #[test]
    fn test_coerce_reversed_braces_returns_empty() {
        assert!(coerce("} nothing {").is_empty());
    }

    #[test]
    fn test_int_field_accepts_numbers_and_numeric_strings() {
        let map = obj(json!({
            "int": 85,
            "float": 72.9,
            "negative_float": -3.7,
            "string": " 64 ",
            "float_string": "55.5",
            "word": "high",
            "null": null,
            "list": [1]
        }));
        assert_eq!(int_field(&map, "int"), Some(85));
        assert_eq!(int_field(&map, "float"), Some(72));
        assert_eq!(int_field(&map, "negative_float"), Some(-3));
        assert_eq!(int_field(&map, "string"), Some(64));
        assert_eq!(int_field(&map, "float_string"), Some(55));
        assert_eq!(int_field(&map, "word"), None);
        assert_eq!(int_field(&map, "null"), None);
        assert_eq!(int_field(&map, "list"), None);
        assert_eq!(int_field(&map, "missing"), None);
    }

    #[test]
    fn test_string_list_field_drops_non_strings() {
        let map = obj(json!({"skills": ["Rust", 3, null, "Go"], "bad": "Rust"}));
        assert_eq!(string_list_field(&map, "skills"), vec!["Rust", "Go"]);
        assert!(string_list_field(&map, "bad").is_empty());
        assert!(string_list_field(&map, "missing").is_empty());
    }

    #[test]
    fn test_string_field() {
        let map = obj(json!({"analysis": "Solid fit", "n": 1}));
        assert_eq!(string_field(&map, "analysis").as_deref(), Some("Solid fit"));
        assert_eq!(string_field(&map, "n"), None);
    }
}
