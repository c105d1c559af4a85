//! Genre normalization

use anirelay_common::Genre;
use serde_json::Value;

use super::fields::{first_array, first_text, has_payload, slugify, text, FieldPath};

const NAME: &[FieldPath] = &[&["name"], &["title"]];
const ID: &[FieldPath] = &[&["genreId"], &["id"], &["slug"]];
const GENRE_LISTS: &[FieldPath] = &[
    &["data", "genreList"],
    &["data", "genres"],
    &["data"],
    &["result"],
];

/// Map one raw genre, which may be an object or a bare name string
///
/// The id falls back to a slug of the name; a genre with neither is dropped.
pub fn genre(item: &Value) -> Option<Genre> {
    let (name, id) = match item {
        Value::String(_) => (text(item), None),
        _ => (first_text(item, NAME), first_text(item, ID)),
    };

    let id = id.or_else(|| name.as_deref().and_then(slugify))?;
    let name = name.unwrap_or_else(|| id.clone());
    Some(Genre { name, id })
}

/// Map a raw genre array, keeping upstream order
pub fn genres(items: &[Value]) -> Vec<Genre> {
    items.iter().filter_map(genre).collect()
}

/// Normalize the genre index payload
pub fn normalize_genre_list(json: &Value) -> Vec<Genre> {
    if !has_payload(json) {
        return Vec::new();
    }

    first_array(json, GENRE_LISTS)
        .map(|items| genres(items))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_genre_shapes() {
        let raw = json!([
            { "title": "Action", "genreId": "action" },
            { "name": "Slice of Life" },
            { "id": 22 },
            "Romance",
            { "url": "/genre/nothing-usable" }
        ]);

        let genres = genres(raw.as_array().unwrap());

        assert_eq!(
            genres,
            vec![
                Genre { name: "Action".into(), id: "action".into() },
                Genre { name: "Slice of Life".into(), id: "slice-of-life".into() },
                Genre { name: "22".into(), id: "22".into() },
                Genre { name: "Romance".into(), id: "romance".into() },
            ]
        );
    }

    #[test]
    fn test_genre_index_shapes() {
        let keyed = json!({
            "statusCode": 200,
            "data": { "genreList": [{ "title": "Action", "genreId": "action" }] }
        });
        let bare = json!({ "status": "Ok", "data": [{ "name": "Action", "slug": "action" }] });

        assert_eq!(normalize_genre_list(&keyed), normalize_genre_list(&bare));
        assert_eq!(normalize_genre_list(&keyed).len(), 1);
    }

    #[test]
    fn test_genre_index_garbage() {
        assert!(normalize_genre_list(&json!({})).is_empty());
        assert!(normalize_genre_list(&json!({ "data": { "other": 1 } })).is_empty());
        assert!(normalize_genre_list(&json!(42)).is_empty());
    }
}
