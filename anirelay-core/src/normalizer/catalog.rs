//! Catalog list normalization

use anirelay_common::models::DEFAULT_KIND;
use anirelay_common::{CatalogEntry, CatalogPage, PageInfo};
use serde_json::Value;

use super::fields::{
    first_bool, first_f64, first_text, first_u32, is_ok_response, FieldPath,
};

/// Container keys holding the raw item array, probed in order
const LIST_CONTAINERS: &[&str] = &[
    "animeList",
    "completeAnimeList",
    "ongoingAnimeList",
    "searchList",
    "genreAnimeList",
];

/// Candidate paths per catalog field
mod keys {
    use super::FieldPath;

    pub const ID: &[FieldPath] = &[&["animeId"], &["id"], &["slug"]];
    pub const TITLE: &[FieldPath] = &[&["title"], &["name"]];
    pub const POSTER: &[FieldPath] = &[&["poster"], &["image"], &["thumb"], &["thumbnail"]];
    pub const EPISODES: &[FieldPath] = &[&["episodes"], &["episode"], &["episodeCount"]];
    pub const KIND: &[FieldPath] = &[&["type"], &["kind"]];
    pub const STATUS: &[FieldPath] = &[&["status"]];
    pub const RELEASE_DAY: &[FieldPath] = &[&["releaseDay"], &["hari"]];
    pub const LATEST_RELEASE: &[FieldPath] = &[&["latestReleaseDate"], &["tanggal"]];
    pub const RATING: &[FieldPath] = &[&["rating"]];
    pub const URL: &[FieldPath] = &[&["url"], &["href"], &["link"]];
    pub const SCORE: &[FieldPath] = &[&["score"], &["score", "value"]];

    pub const CURRENT_PAGE: &[FieldPath] = &[&["currentPage"], &["current_page"], &["page"]];
    pub const TOTAL_PAGES: &[FieldPath] = &[
        &["totalPages"],
        &["total_pages"],
        &["lastPage"],
        &["last_page"],
    ];
    pub const HAS_NEXT: &[FieldPath] = &[
        &["hasNextPage"],
        &["hasNext"],
        &["has_next_page"],
        &["has_next"],
    ];
    pub const HAS_PREV: &[FieldPath] = &[
        &["hasPrevPage"],
        &["hasPrev"],
        &["has_prev_page"],
        &["has_prev"],
    ];
}

/// Normalize a list payload into a catalog page
///
/// Anything unrecognized yields an empty page with default pagination.
pub fn normalize_catalog(json: &Value) -> CatalogPage {
    if !is_ok_response(json) {
        return CatalogPage::default();
    }

    let entries = locate_items(json)
        .map(|items| items.iter().filter_map(catalog_entry).collect())
        .unwrap_or_default();

    CatalogPage {
        entries,
        page_info: page_info(json),
    }
}

/// Find the raw item array inside a successful envelope
fn locate_items(json: &Value) -> Option<&Vec<Value>> {
    if let Some(data) = json.get("data") {
        if let Some(items) = probe_containers(data) {
            return Some(items);
        }
        if let Value::Array(items) = data {
            return Some(items);
        }
    }

    match json.get("result") {
        Some(Value::Array(items)) => Some(items),
        Some(result) => probe_containers(result),
        None => None,
    }
}

fn probe_containers(container: &Value) -> Option<&Vec<Value>> {
    LIST_CONTAINERS
        .iter()
        .find_map(|key| container.get(*key).and_then(Value::as_array))
}

/// Map one raw item; items without a derivable id are dropped
pub fn catalog_entry(item: &Value) -> Option<CatalogEntry> {
    let id = first_text(item, keys::ID)?;
    let mut entry = CatalogEntry::new(id, first_text(item, keys::TITLE).unwrap_or_default())?;

    entry.poster_url = first_text(item, keys::POSTER).unwrap_or_default();
    entry.episode_count = first_text(item, keys::EPISODES);
    entry.kind = first_text(item, keys::KIND).unwrap_or_else(|| DEFAULT_KIND.to_string());
    entry.release_day = first_text(item, keys::RELEASE_DAY);
    entry.latest_release_date = first_text(item, keys::LATEST_RELEASE);
    entry.status = first_text(item, keys::STATUS);
    entry.rating = first_text(item, keys::RATING);
    entry.url = first_text(item, keys::URL);
    entry.score = first_f64(item, keys::SCORE);

    Some(entry)
}

/// Pagination from the top-level `pagination` object, else `data.pagination`
fn page_info(json: &Value) -> PageInfo {
    let raw = json
        .get("pagination")
        .filter(|p| p.is_object())
        .or_else(|| {
            json.get("data")
                .and_then(|data| data.get("pagination"))
                .filter(|p| p.is_object())
        });

    let Some(raw) = raw else {
        return PageInfo::default();
    };

    let current_page = first_u32(raw, keys::CURRENT_PAGE).unwrap_or(1).max(1);
    let total_pages = first_u32(raw, keys::TOTAL_PAGES)
        .unwrap_or(current_page)
        .max(1);

    PageInfo {
        current_page,
        total_pages,
        has_next: first_bool(raw, keys::HAS_NEXT).unwrap_or(current_page < total_pages),
        has_prev: first_bool(raw, keys::HAS_PREV).unwrap_or(current_page > 1),
    }
}
