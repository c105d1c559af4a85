//! URL builders for the aggregator and the enrichment provider

use anirelay_common::{Category, Source};

fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Primary aggregator routes
#[derive(Debug, Clone)]
pub struct AggregatorEndpoints {
    base_url: String,
}

impl AggregatorEndpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: trim_base(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Listing route for a category
    pub fn catalog(&self, source: Source, category: &Category, page: u32) -> String {
        let page = page.max(1);
        match category {
            Category::Ongoing => format!("{}/{}/ongoing?page={}", self.base_url, source, page),
            Category::Completed => {
                format!("{}/{}/completed?page={}", self.base_url, source, page)
            }
            Category::All => format!("{}/{}/anime", self.base_url, source),
            other => {
                let slug = other.genre_slug().unwrap_or_default();
                self.genre(source, slug, page)
            }
        }
    }

    pub fn genre_list(&self, source: Source) -> String {
        format!("{}/{}/genre", self.base_url, source)
    }

    pub fn genre(&self, source: Source, genre_id: &str, page: u32) -> String {
        format!(
            "{}/{}/genre/{}?page={}",
            self.base_url,
            source,
            urlencoding::encode(genre_id),
            page.max(1)
        )
    }

    /// Query-parameter search
    pub fn search_query(&self, source: Source, query: &str) -> String {
        format!(
            "{}/{}/search?q={}",
            self.base_url,
            source,
            urlencoding::encode(query)
        )
    }

    /// Path-segment search, used when the query form finds nothing
    pub fn search_path(&self, source: Source, query: &str) -> String {
        format!(
            "{}/{}/search/{}",
            self.base_url,
            source,
            urlencoding::encode(query)
        )
    }

    pub fn detail(&self, source: Source, id: &str) -> String {
        format!("{}/{}/anime/{}", self.base_url, source, urlencoding::encode(id))
    }

    pub fn episode(&self, source: Source, episode_id: &str) -> String {
        format!(
            "{}/{}/episode/{}",
            self.base_url,
            source,
            urlencoding::encode(episode_id)
        )
    }

    pub fn server(&self, source: Source, server_id: &str) -> String {
        format!(
            "{}/{}/server/{}",
            self.base_url,
            source,
            urlencoding::encode(server_id)
        )
    }
}

/// Enrichment provider routes
#[derive(Debug, Clone)]
pub struct EnrichmentEndpoints {
    base_url: String,
}

impl EnrichmentEndpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: trim_base(base_url),
        }
    }

    /// Title search returning at most one match
    pub fn anime_search(&self, title: &str) -> String {
        format!(
            "{}/anime?q={}&limit=1",
            self.base_url,
            urlencoding::encode(title)
        )
    }

    pub fn top_anime(&self, limit: u32) -> String {
        format!(
            "{}/top/anime?limit={}&filter=bypopularity",
            self.base_url, limit
        )
    }
}
