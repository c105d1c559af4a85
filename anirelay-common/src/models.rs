//! Canonical record types
//!
//! Every upstream payload, whatever shape it arrived in, is mapped onto these
//! value types before it reaches a caller. Records are plain owned data: the
//! only post-construction update is [`DetailRecord::merge_enrichment`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Title used when an upstream item carries none
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Kind tag used when an upstream item carries none
pub const DEFAULT_KIND: &str = "Anime";

// ============================================================================
// Request Keys
// ============================================================================

/// Upstream provider key, used as the first path segment of every aggregator URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Otakudesu,
    Kuramanime,
}

impl Source {
    /// All known provider keys
    pub const ALL: [Source; 2] = [Source::Otakudesu, Source::Kuramanime];

    /// Path segment for this provider
    pub fn key(&self) -> &'static str {
        match self {
            Source::Otakudesu => "otakudesu",
            Source::Kuramanime => "kuramanime",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Source::ALL
            .into_iter()
            .find(|source| source.key() == key)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown source: {}", s)))
    }
}

/// Catalog listing requested from the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    /// Currently airing titles (paginated)
    Ongoing,
    /// Finished titles (paginated)
    Completed,
    /// Full unpaginated index
    All,
    /// Titles tagged with a genre id or slug (paginated)
    Genre(String),
    /// Movies, listed through the `movie` genre
    Movie,
    /// OVAs, listed through the `ova` genre
    Ova,
}

impl Category {
    /// Genre slug backing this category, if it is listed through a genre route
    pub fn genre_slug(&self) -> Option<&str> {
        match self {
            Category::Genre(id) => Some(id.as_str()),
            Category::Movie => Some("movie"),
            Category::Ova => Some("ova"),
            _ => None,
        }
    }
}

/// Which enrichment call path a call site uses
///
/// Bulk poster upgrades go through the rate-limited queue; the single
/// metadata lookup behind a detail view may go direct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentPath {
    /// Serialized through the enrichment queue
    Queued,
    /// Called immediately after a short fixed delay
    #[default]
    Direct,
}

// ============================================================================
// Catalog Records
// ============================================================================

/// Pagination metadata for one catalog page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Default for PageInfo {
    /// A single page with nothing before or after it
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            has_next: false,
            has_prev: false,
        }
    }
}

/// One item of a catalog listing or search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Canonical identifier, never empty
    pub id: String,
    pub title: String,
    pub poster_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_count: Option<String>,
    /// Free-form type tag (TV, Movie, OVA, ...)
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    /// Upstream page link, when the provider sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl CatalogEntry {
    /// Create an entry with defaults for every optional field
    ///
    /// Returns `None` when `id` is blank: an entry without an identifier
    /// cannot be navigated to and is never produced.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return None;
        }

        let title = title.into();
        Some(Self {
            id,
            title: if title.trim().is_empty() {
                UNKNOWN_TITLE.to_string()
            } else {
                title
            },
            poster_url: String::new(),
            episode_count: None,
            kind: DEFAULT_KIND.to_string(),
            release_day: None,
            latest_release_date: None,
            status: None,
            rating: None,
            url: None,
            score: None,
        })
    }
}

/// One page of catalog entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    pub page_info: PageInfo,
}

impl CatalogPage {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Genre tag, used for filtering and as a navigation key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub name: String,
    /// Slug or numeric id
    pub id: String,
}

// ============================================================================
// Detail Records
// ============================================================================

/// One episode link inside a detail record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    /// Identifier passed to the episode endpoint, never empty
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Full record for one title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub synopsis: String,
    /// Upstream order is preserved
    pub genres: Vec<Genre>,
    /// Only episodes with a resolvable id
    pub episodes: Vec<EpisodeRef>,
    pub studio: String,
    pub duration: String,
    pub release_date: String,
    pub total_episodes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub japanese_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    /// Audience rating such as "PG-13"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mal_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
}

impl DetailRecord {
    /// Wrap a catalog entry with empty detail fields
    pub fn from_entry(entry: CatalogEntry) -> Self {
        Self {
            entry,
            synopsis: String::new(),
            genres: Vec::new(),
            episodes: Vec::new(),
            studio: String::new(),
            duration: String::new(),
            release_date: String::new(),
            total_episodes: String::new(),
            rank: None,
            trailer_url: None,
            japanese_title: None,
            producer: None,
            rating_system: None,
            mal_id: None,
            popularity: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.entry.id
    }

    pub fn title(&self) -> &str {
        &self.entry.title
    }

    /// Merge enrichment fields into this record
    ///
    /// Fields the enrichment carries overwrite the record's; fields it lacks
    /// leave the record untouched.
    pub fn merge_enrichment(&mut self, enrichment: &DetailEnrichment) {
        if let Some(score) = enrichment.score {
            self.entry.score = Some(score);
        }
        if let Some(poster) = &enrichment.poster_url {
            self.entry.poster_url = poster.clone();
        }
        if let Some(total) = &enrichment.total_episodes {
            self.total_episodes = total.clone();
        }
        if let Some(duration) = &enrichment.duration {
            self.duration = duration.clone();
        }
        if let Some(synopsis) = &enrichment.synopsis {
            self.synopsis = synopsis.clone();
        }
        if enrichment.rating_system.is_some() {
            self.rating_system = enrichment.rating_system.clone();
        }
        if enrichment.trailer_url.is_some() {
            self.trailer_url = enrichment.trailer_url.clone();
        }
        if enrichment.mal_id.is_some() {
            self.mal_id = enrichment.mal_id;
        }
        if enrichment.popularity.is_some() {
            self.popularity = enrichment.popularity;
        }
        if enrichment.rank.is_some() {
            self.rank = enrichment.rank;
        }
    }
}

/// Supplementary fields fetched from the enrichment provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailEnrichment {
    pub score: Option<f64>,
    pub total_episodes: Option<String>,
    pub duration: Option<String>,
    pub rating_system: Option<String>,
    pub trailer_url: Option<String>,
    pub mal_id: Option<u64>,
    pub popularity: Option<u32>,
    pub rank: Option<u32>,
    pub synopsis: Option<String>,
    pub poster_url: Option<String>,
}

impl DetailEnrichment {
    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// Stream Records
// ============================================================================

/// One playable mirror for an episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamServer {
    /// Display name of the server or mirror
    pub label: String,
    pub resolution: String,
    /// Playable URL supplied directly by the upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_url: Option<String>,
    /// Identifier to resolve through the server endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
}

impl StreamServer {
    /// Build a server entry, rejecting one with neither a URL nor a server id
    pub fn new(
        label: impl Into<String>,
        resolution: impl Into<String>,
        direct_url: Option<String>,
        server_id: Option<String>,
    ) -> Option<Self> {
        let direct_url = direct_url.filter(|url| !url.trim().is_empty());
        let server_id = server_id.filter(|id| !id.trim().is_empty());
        if direct_url.is_none() && server_id.is_none() {
            return None;
        }

        Some(Self {
            label: label.into(),
            resolution: resolution.into(),
            direct_url,
            server_id,
        })
    }
}

/// Servers available for one episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamResponse {
    pub title: String,
    pub servers: Vec<StreamServer>,
}

// ============================================================================
// Load State
// ============================================================================

/// Tri-state view of a value that is fetched asynchronously
///
/// Lets a presentation layer tell "still loading" apart from "nothing found".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState<T> {
    #[default]
    Pending,
    Absent,
    Ready(T),
}

impl<T> LoadState<T> {
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => LoadState::Ready(value),
            None => LoadState::Absent,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }
}
