//! Title cleaning for enrichment lookups

use once_cell::sync::Lazy;
use regex::Regex;

static QUALIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(.*\)|sub\s*indo|batch").expect("qualifier regex should compile")
});

static EPISODE_SUFFIX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)episode.*").expect("episode suffix regex should compile"));

static COLLAPSE_WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

/// Strip aggregator qualifiers from a title before searching the provider
///
/// Removes parenthesised segments, "Sub Indo" and "Batch". With
/// `strip_episode`, everything from "Episode" onward is dropped too.
pub fn clean_title(title: &str, strip_episode: bool) -> String {
    let cleaned = QUALIFIER_REGEX.replace_all(title, " ");
    let cleaned = if strip_episode {
        EPISODE_SUFFIX_REGEX.replace_all(&cleaned, " ").into_owned()
    } else {
        cleaned.into_owned()
    };
    collapse_whitespace(&cleaned)
}

/// Cache key for a cleaned title: lowercase, no punctuation, single spaces
pub fn cache_key(cleaned: &str) -> String {
    let stripped: String = cleaned
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch.is_whitespace() {
                ch
            } else {
                ' '
            }
        })
        .collect::<String>()
        .to_lowercase();
    collapse_whitespace(&stripped)
}

fn collapse_whitespace(value: &str) -> String {
    COLLAPSE_WHITESPACE_REGEX
        .replace_all(value.trim(), " ")
        .to_string()
}
