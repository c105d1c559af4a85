//! Server URL normalization

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::fields::{absolutize, first_text, is_ok_response, text, FieldPath};

const URL_KEYS: &[FieldPath] = &[&["url"], &["iframe"], &["link"], &["embed"], &["playerUrl"]];

static IFRAME_SRC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)src\s*=\s*["']([^"']+)["']"#).expect("iframe src regex should compile")
});

/// Resolve the playable URL from a server payload
///
/// Accepts a bare string body, or an ok envelope whose `data` is a string or
/// an object exposing the URL under one of several names.
pub fn normalize_server_url(json: &Value) -> Option<String> {
    let raw = match json {
        Value::String(_) => text(json),
        _ if is_ok_response(json) => match json.get("data") {
            Some(data @ Value::String(_)) => text(data),
            Some(data) => first_text(data, URL_KEYS),
            None => None,
        },
        _ => None,
    }?;

    let url = extract_embedded_url(&raw).unwrap_or(raw);
    let url = absolutize(&url);
    (!url.is_empty()).then_some(url)
}

/// Pull the `src` attribute out of an iframe fragment, escaped or not
///
/// Returns `None` when the value is not iframe markup or carries no `src`.
pub fn extract_embedded_url(raw: &str) -> Option<String> {
    let lower = raw.to_ascii_lowercase();
    if !lower.contains("<iframe") && !lower.contains("&lt;iframe") {
        return None;
    }

    let markup = match htmlescape::decode_html(raw) {
        Ok(decoded) => decoded,
        Err(e) => {
            debug!(error = ?e, "Iframe markup did not decode cleanly, matching raw text");
            raw.to_string()
        }
    };

    IFRAME_SRC_PATTERN
        .captures(&markup)
        .and_then(|caps| caps.get(1))
        .map(|src| src.as_str().trim().to_string())
        .filter(|src| !src.is_empty())
}
