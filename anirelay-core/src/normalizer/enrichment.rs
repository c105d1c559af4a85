//! Enrichment provider normalization
//!
//! The provider wraps results in `{ "data": [...] }`. Title searches are
//! requested with `limit=1`, so only the first element is read.

use anirelay_common::{CatalogEntry, DetailEnrichment};
use serde_json::Value;

use super::fields::{first_f64, first_text, first_u32, first_u64, FieldPath};

/// Placeholder values the provider uses for "unknown"
const PLACEHOLDERS: &[&str] = &["N/A", "?", "Unknown"];

mod keys {
    use super::FieldPath;

    pub const POSTER: &[FieldPath] = &[
        &["images", "jpg", "large_image_url"],
        &["images", "jpg", "image_url"],
        &["images", "webp", "large_image_url"],
        &["images", "webp", "image_url"],
    ];
    pub const SCORE: &[FieldPath] = &[&["score"]];
    pub const EPISODES: &[FieldPath] = &[&["episodes"]];
    pub const DURATION: &[FieldPath] = &[&["duration"]];
    pub const RATING: &[FieldPath] = &[&["rating"]];
    pub const TRAILER: &[FieldPath] = &[&["trailer", "embed_url"], &["trailer", "url"]];
    pub const MAL_ID: &[FieldPath] = &[&["mal_id"]];
    pub const POPULARITY: &[FieldPath] = &[&["popularity"]];
    pub const RANK: &[FieldPath] = &[&["rank"]];
    pub const SYNOPSIS: &[FieldPath] = &[&["synopsis"]];
    pub const TITLE: &[FieldPath] = &[&["title"], &["title_english"]];
    pub const KIND: &[FieldPath] = &[&["type"]];
    pub const STATUS: &[FieldPath] = &[&["status"]];
}

/// First element of the `data` array
fn first_result(json: &Value) -> Option<&Value> {
    json.get("data")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .filter(|item| item.is_object())
}

fn known_text(item: &Value, candidates: &[FieldPath]) -> Option<String> {
    first_text(item, candidates).filter(|value| {
        !PLACEHOLDERS
            .iter()
            .any(|placeholder| value.eq_ignore_ascii_case(placeholder))
    })
}

/// Metadata for a detail view from a title search response
///
/// Absent when the search matched nothing or the match carries no usable field.
pub fn normalize_enrichment(json: &Value) -> Option<DetailEnrichment> {
    let item = first_result(json)?;

    let enrichment = DetailEnrichment {
        score: first_f64(item, keys::SCORE),
        total_episodes: known_text(item, keys::EPISODES),
        duration: known_text(item, keys::DURATION),
        rating_system: known_text(item, keys::RATING),
        trailer_url: known_text(item, keys::TRAILER),
        mal_id: first_u64(item, keys::MAL_ID),
        popularity: first_u32(item, keys::POPULARITY),
        rank: first_u32(item, keys::RANK),
        synopsis: known_text(item, keys::SYNOPSIS),
        poster_url: first_text(item, keys::POSTER),
    };

    (!enrichment.is_empty()).then_some(enrichment)
}

/// Poster URL of the first title search match
pub fn poster_from_search(json: &Value) -> Option<String> {
    first_result(json).and_then(|item| first_text(item, keys::POSTER))
}

/// Top-list entries; the catalog id is the provider's numeric id
pub fn normalize_top_anime(json: &Value) -> Vec<CatalogEntry> {
    let Some(items) = json.get("data").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let id = first_text(item, keys::MAL_ID)?;
            let title = first_text(item, keys::TITLE).unwrap_or_default();
            let mut entry = CatalogEntry::new(id, title)?;
            entry.poster_url = first_text(item, keys::POSTER).unwrap_or_default();
            entry.score = first_f64(item, keys::SCORE);
            entry.rating = entry.score.map(|score| score.to_string());
            entry.episode_count = known_text(item, keys::EPISODES);
            if let Some(kind) = first_text(item, keys::KIND) {
                entry.kind = kind;
            }
            entry.status = first_text(item, keys::STATUS);
            Some(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_hit() -> Value {
        json!({
            "pagination": { "last_visible_page": 1 },
            "data": [{
                "mal_id": 52991,
                "title": "Sousou no Frieren",
                "images": {
                    "jpg": {
                        "image_url": "https://cdn.example/52991.jpg",
                        "large_image_url": "https://cdn.example/52991l.jpg"
                    }
                },
                "trailer": { "embed_url": "https://yt.example/embed/abc", "url": null },
                "score": 9.31,
                "episodes": 28,
                "duration": "24 min per ep",
                "rating": "PG-13 - Teens 13 or older",
                "rank": 1,
                "popularity": 180,
                "synopsis": "During their decade-long quest..."
            }]
        })
    }

    #[test]
    fn test_full_enrichment() {
        let enrichment = normalize_enrichment(&search_hit()).unwrap();

        assert_eq!(enrichment.score, Some(9.31));
        assert_eq!(enrichment.total_episodes.as_deref(), Some("28"));
        assert_eq!(enrichment.duration.as_deref(), Some("24 min per ep"));
        assert_eq!(enrichment.rating_system.as_deref(), Some("PG-13 - Teens 13 or older"));
        assert_eq!(enrichment.trailer_url.as_deref(), Some("https://yt.example/embed/abc"));
        assert_eq!(enrichment.mal_id, Some(52991));
        assert_eq!(enrichment.popularity, Some(180));
        assert_eq!(enrichment.rank, Some(1));
        assert_eq!(enrichment.poster_url.as_deref(), Some("https://cdn.example/52991l.jpg"));
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let json = json!({
            "data": [{
                "mal_id": 7,
                "score": null,
                "episodes": null,
                "duration": "Unknown",
                "images": { "jpg": { "image_url": "https://cdn.example/7.jpg" } }
            }]
        });
        let enrichment = normalize_enrichment(&json).unwrap();

        assert_eq!(enrichment.score, None);
        assert_eq!(enrichment.total_episodes, None);
        assert_eq!(enrichment.duration, None);
        assert_eq!(enrichment.trailer_url, None);
        assert_eq!(enrichment.poster_url.as_deref(), Some("https://cdn.example/7.jpg"));
    }

    #[test]
    fn test_no_match() {
        assert!(normalize_enrichment(&json!({ "data": [] })).is_none());
        assert!(normalize_enrichment(&json!({ "status": 429, "message": "slow down" })).is_none());
        assert!(normalize_enrichment(&json!({ "data": [{}] })).is_none());
        assert!(poster_from_search(&json!({ "data": [] })).is_none());
    }

    #[test]
    fn test_poster_from_search() {
        assert_eq!(
            poster_from_search(&search_hit()).as_deref(),
            Some("https://cdn.example/52991l.jpg")
        );
    }

    #[test]
    fn test_top_anime() {
        let json = json!({
            "data": [
                {
                    "mal_id": 16498,
                    "title": "Shingeki no Kyojin",
                    "type": "TV",
                    "status": "Finished Airing",
                    "score": 8.55,
                    "episodes": 25,
                    "images": { "jpg": { "image_url": "https://cdn.example/s.jpg" } }
                },
                { "title": "No id" }
            ]
        });

        let entries = normalize_top_anime(&json);

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.id, "16498");
        assert_eq!(entry.title, "Shingeki no Kyojin");
        assert_eq!(entry.kind, "TV");
        assert_eq!(entry.score, Some(8.55));
        assert_eq!(entry.rating.as_deref(), Some("8.55"));
        assert_eq!(entry.episode_count.as_deref(), Some("25"));
        assert_eq!(entry.poster_url, "https://cdn.example/s.jpg");
    }

    #[test]
    fn test_top_anime_garbage() {
        assert!(normalize_top_anime(&json!({ "data": "nope" })).is_empty());
        assert!(normalize_top_anime(&json!(null)).is_empty());
    }
}
