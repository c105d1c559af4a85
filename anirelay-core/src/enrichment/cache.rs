//! Poster cache keyed by normalized title

use std::sync::Arc;

use dashmap::DashMap;

use super::title::cache_key;

/// Resolved poster URLs, shared by every clone
///
/// Only successful lookups are stored. The first write for a key wins; a
/// racing second write computed the same value and is dropped.
#[derive(Debug, Clone, Default)]
pub struct PosterCache {
    entries: Arc<DashMap<String, String>>,
}

impl PosterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached poster for a cleaned title
    pub fn get(&self, cleaned_title: &str) -> Option<String> {
        self.entries
            .get(&cache_key(cleaned_title))
            .map(|entry| entry.value().clone())
    }

    /// Store a poster unless the key already has one; returns the stored value
    pub fn insert(&self, cleaned_title: &str, poster_url: String) -> String {
        self.entries
            .entry(cache_key(cleaned_title))
            .or_insert(poster_url)
            .value()
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_uses_normalized_key() {
        let cache = PosterCache::new();
        cache.insert("Re:Zero", "https://cdn.example/rz.jpg".into());

        assert_eq!(cache.get("re zero").as_deref(), Some("https://cdn.example/rz.jpg"));
        assert_eq!(cache.get("RE:ZERO").as_deref(), Some("https://cdn.example/rz.jpg"));
        assert!(cache.get("Frieren").is_none());
    }

    #[test]
    fn test_first_write_wins() {
        let cache = PosterCache::new();
        let first = cache.insert("Frieren", "a.jpg".into());
        let second = cache.insert("frieren", "b.jpg".into());

        assert_eq!(first, "a.jpg");
        assert_eq!(second, "a.jpg");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = PosterCache::new();
        let clone = cache.clone();
        clone.insert("Frieren", "a.jpg".into());
        assert_eq!(cache.get("Frieren").as_deref(), Some("a.jpg"));
    }
}
