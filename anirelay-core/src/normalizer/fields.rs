//! Field-priority extraction
//!
//! Each canonical field is described by an ordered table of candidate paths
//! into the raw JSON. The first candidate that yields a usable value wins.
//! Upstream shape drift is absorbed by editing a table, not control flow.

use serde_json::Value;

/// Path of object keys from an item to one candidate value
pub type FieldPath = &'static [&'static str];

/// Status spellings that mean "OK", compared case-insensitively
const OK_STATUS_SPELLINGS: &[&str] = &["ok", "success", "succeeded", "200"];

/// Follow `path` through nested objects
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Usable text from a scalar: trimmed non-empty strings and numbers
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First candidate that yields usable text
pub fn first_text(item: &Value, candidates: &[FieldPath]) -> Option<String> {
    candidates
        .iter()
        .find_map(|path| lookup(item, path).and_then(text))
}

/// First candidate that is an array
pub fn first_array<'a>(item: &'a Value, candidates: &[FieldPath]) -> Option<&'a Vec<Value>> {
    candidates
        .iter()
        .find_map(|path| lookup(item, path).and_then(Value::as_array))
}

/// First candidate that is a number or a numeric string
pub fn first_f64(item: &Value, candidates: &[FieldPath]) -> Option<f64> {
    candidates.iter().find_map(|path| {
        lookup(item, path).and_then(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
    })
}

/// First candidate that is a non-negative integer or an integer string
pub fn first_u64(item: &Value, candidates: &[FieldPath]) -> Option<u64> {
    candidates.iter().find_map(|path| {
        lookup(item, path).and_then(|value| match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        })
    })
}

pub fn first_u32(item: &Value, candidates: &[FieldPath]) -> Option<u32> {
    first_u64(item, candidates).and_then(|n| u32::try_from(n).ok())
}

/// First candidate that is a boolean or a "true"/"false" string
pub fn first_bool(item: &Value, candidates: &[FieldPath]) -> Option<bool> {
    candidates.iter().find_map(|path| {
        lookup(item, path).and_then(|value| match value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse::<bool>().ok(),
            _ => None,
        })
    })
}

/// True when the envelope reports success and carries a payload
///
/// Success is a `statusCode` of 200, a `status` spelled "Ok"/"Success"/...,
/// or `success: true`. The payload is a non-null `data` or `result` field.
pub fn is_ok_response(json: &Value) -> bool {
    let code_ok = match json.get("statusCode") {
        Some(Value::Number(n)) => n.as_u64() == Some(200),
        Some(Value::String(s)) => s.trim() == "200",
        _ => false,
    };
    let status_ok = json
        .get("status")
        .and_then(Value::as_str)
        .map(|status| {
            OK_STATUS_SPELLINGS
                .iter()
                .any(|ok| status.trim().eq_ignore_ascii_case(ok))
        })
        .unwrap_or(false);
    let flag_ok = json.get("success").and_then(Value::as_bool) == Some(true);

    (code_ok || status_ok || flag_ok) && has_payload(json)
}

/// True when `data` or `result` is present and non-null
pub fn has_payload(json: &Value) -> bool {
    ["data", "result"]
        .iter()
        .any(|key| json.get(*key).map(|v| !v.is_null()).unwrap_or(false))
}

/// True when the envelope itself reports not-found
pub fn is_not_found(json: &Value) -> bool {
    match json.get("statusCode") {
        Some(Value::Number(n)) => n.as_u64() == Some(404),
        Some(Value::String(s)) => s.trim() == "404",
        _ => false,
    }
}

/// True for absolute http(s) URLs
pub fn is_http_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Rewrite protocol-relative URLs to explicit https
pub fn absolutize(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("//") {
        format!("https:{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Navigation-key slug: lowercase ASCII alphanumerics joined by single dashes
pub fn slugify(name: &str) -> Option<String> {
    let slug = name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    (!slug.is_empty()).then_some(slug)
}

/// Last non-empty path segment of a URL
pub fn last_path_segment(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_string)
}
