//! Detail record normalization

use anirelay_common::models::DEFAULT_KIND;
use anirelay_common::{CatalogEntry, DetailRecord, EpisodeRef};
use serde_json::Value;

use super::fields::{
    first_array, first_f64, first_text, first_u32, first_u64, is_ok_response, lookup, text,
    FieldPath,
};
use super::genre::genres;

/// Keys under `data` that hold the detail object, probed in order
const DETAIL_CONTAINERS: &[&str] = &["animeDetail", "anime_detail"];

/// Episode list keys; their presence also marks `data` itself as a detail object
const EPISODE_LISTS: &[FieldPath] = &[&["episode_list"], &["episodeList"]];

mod keys {
    use super::FieldPath;

    pub const TITLE: &[FieldPath] = &[&["title"], &["name"]];
    pub const POSTER: &[FieldPath] = &[&["poster"], &["image"], &["thumb"], &["thumbnail"]];
    pub const KIND: &[FieldPath] = &[&["type"], &["kind"]];
    pub const STATUS: &[FieldPath] = &[&["status"]];
    pub const RATING: &[FieldPath] = &[&["rating"]];
    pub const SCORE: &[FieldPath] = &[&["score"], &["score", "value"]];
    pub const RELEASE_DAY: &[FieldPath] = &[&["releaseDay"], &["hari"]];
    pub const JAPANESE_TITLE: &[FieldPath] =
        &[&["japanese_title"], &["japaneseTitle"], &["japanese"]];
    pub const PRODUCER: &[FieldPath] = &[&["producer"], &["producers"]];
    pub const STUDIO: &[FieldPath] = &[&["studio"], &["studios"]];
    pub const DURATION: &[FieldPath] = &[&["duration"]];
    pub const RELEASE_DATE: &[FieldPath] = &[
        &["release_date"],
        &["releaseDate"],
        &["aired"],
        &["released"],
    ];
    pub const TOTAL_EPISODES: &[FieldPath] =
        &[&["total_episodes"], &["totalEpisodes"], &["episodes"]];
    pub const GENRES: &[FieldPath] = &[&["genres"], &["genreList"], &["genre_list"]];
    pub const TRAILER: &[FieldPath] = &[&["trailer_url"], &["trailerUrl"], &["trailer"]];
    pub const RANK: &[FieldPath] = &[&["rank"]];
    pub const MAL_ID: &[FieldPath] = &[&["mal_id"], &["malId"]];
    pub const POPULARITY: &[FieldPath] = &[&["popularity"]];
    pub const SYNOPSIS: &[FieldPath] = &[&["synopsis"], &["sinopsis"], &["description"]];

    pub const EPISODE_ID: &[FieldPath] = &[&["slug"], &["episodeId"], &["id"]];
    pub const EPISODE_TITLE: &[FieldPath] = &[&["title"], &["episode"]];
    pub const EPISODE_DATE: &[FieldPath] = &[&["date"], &["releaseDate"], &["releasedOn"]];
    pub const EPISODE_URL: &[FieldPath] = &[&["url"], &["href"]];
}

/// Find the detail object inside a successful envelope
pub fn locate_detail(json: &Value) -> Option<&Value> {
    if !is_ok_response(json) {
        return None;
    }
    let data = json.get("data")?;

    if let Some(detail) = DETAIL_CONTAINERS
        .iter()
        .find_map(|key| data.get(*key).filter(|d| d.is_object()))
    {
        return Some(detail);
    }

    let has_title = first_text(data, keys::TITLE).is_some();
    let has_episodes = first_array(data, EPISODE_LISTS).is_some();
    (has_title && has_episodes).then_some(data)
}

/// Normalize a detail payload fetched with `id`
///
/// The record keeps the id it was fetched with, so it can be fetched again.
pub fn normalize_detail(json: &Value, id: &str) -> Option<DetailRecord> {
    let detail = locate_detail(json)?;

    let mut entry = CatalogEntry::new(id, first_text(detail, keys::TITLE).unwrap_or_default())?;
    entry.poster_url = first_text(detail, keys::POSTER).unwrap_or_default();
    entry.kind = first_text(detail, keys::KIND).unwrap_or_else(|| DEFAULT_KIND.to_string());
    entry.status = first_text(detail, keys::STATUS);
    entry.rating = first_text(detail, keys::RATING);
    entry.score = first_f64(detail, keys::SCORE);
    entry.release_day = first_text(detail, keys::RELEASE_DAY);

    let total_episodes = first_text(detail, keys::TOTAL_EPISODES).unwrap_or_default();
    if !total_episodes.is_empty() {
        entry.episode_count = Some(total_episodes.clone());
    }

    let mut record = DetailRecord::from_entry(entry);
    record.synopsis = synopsis(detail);
    record.genres = first_array(detail, keys::GENRES)
        .map(|raw| genres(raw))
        .unwrap_or_default();
    record.episodes = first_array(detail, EPISODE_LISTS)
        .map(|raw| raw.iter().filter_map(episode_ref).collect())
        .unwrap_or_default();
    record.studio = first_text(detail, keys::STUDIO).unwrap_or_default();
    record.duration = first_text(detail, keys::DURATION).unwrap_or_default();
    record.release_date = first_text(detail, keys::RELEASE_DATE).unwrap_or_default();
    record.total_episodes = total_episodes;
    record.rank = first_u32(detail, keys::RANK);
    record.trailer_url = first_text(detail, keys::TRAILER);
    record.japanese_title = first_text(detail, keys::JAPANESE_TITLE);
    record.producer = first_text(detail, keys::PRODUCER);
    record.mal_id = first_u64(detail, keys::MAL_ID);
    record.popularity = first_u32(detail, keys::POPULARITY);

    Some(record)
}

/// Map one raw episode; episodes without a resolvable id are dropped
pub fn episode_ref(item: &Value) -> Option<EpisodeRef> {
    let id = first_text(item, keys::EPISODE_ID)?;
    Some(EpisodeRef {
        id,
        title: first_text(item, keys::EPISODE_TITLE).unwrap_or_default(),
        date: first_text(item, keys::EPISODE_DATE).unwrap_or_default(),
        url: first_text(item, keys::EPISODE_URL),
    })
}

/// Synopsis as plain text
///
/// Some scrapers send a string, others an array of paragraphs or an object
/// with a `paragraphs` array.
fn synopsis(detail: &Value) -> String {
    let Some(raw) = keys::SYNOPSIS
        .iter()
        .find_map(|path| lookup(detail, path).filter(|v| !v.is_null()))
    else {
        return String::new();
    };

    let paragraphs = match raw {
        Value::Array(items) => Some(items),
        Value::Object(_) => raw.get("paragraphs").and_then(Value::as_array),
        _ => None,
    };

    match paragraphs {
        Some(items) => items
            .iter()
            .filter_map(text)
            .collect::<Vec<_>>()
            .join("\n\n"),
        None => text(raw).unwrap_or_default(),
    }
}
