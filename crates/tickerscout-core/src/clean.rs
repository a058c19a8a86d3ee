//! Row shaping helpers: key normalization and empty-value cleanup.

use serde_json::{Map, Value};

/// Normalize an upstream field name to a snake_case key.
///
/// Three passes, in order: non-alphanumeric characters become
/// underscores, an underscore is inserted before every interior
/// uppercase letter (acronym runs split letter by letter, matching the
/// upstream feed's historical key set), then underscore runs collapse
/// and edges are trimmed.
pub fn snake_case_key(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len() + 4);
    for (index, ch) in raw.chars().enumerate() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            cleaned.push('_');
            continue;
        }
        if ch.is_ascii_uppercase() && index > 0 {
            cleaned.push('_');
        }
        cleaned.push(ch.to_ascii_lowercase());
    }

    let mut collapsed = String::with_capacity(cleaned.len());
    for ch in cleaned.chars() {
        if ch == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed.trim_matches('_').to_string()
}

/// Recursively replace empty markers with JSON null.
///
/// Strings exactly equal to `nan`, `none`, or `infinity` (any case)
/// become null; objects and arrays are walked in place. Anything else
/// passes through untouched.
pub fn normalize_empty(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (key, normalize_empty(inner)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(normalize_empty).collect())
        }
        Value::String(text) if is_empty_marker(&text) => Value::Null,
        other => other,
    }
}

fn is_empty_marker(text: &str) -> bool {
    text.eq_ignore_ascii_case("nan")
        || text.eq_ignore_ascii_case("none")
        || text.eq_ignore_ascii_case("infinity")
}
