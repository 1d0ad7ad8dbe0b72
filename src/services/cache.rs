use crate::core::normalize_query;
use crate::models::{SearchOptions, SearchResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// In-memory cache of search responses
///
/// Keys embed the catalog snapshot version, so entries from an older
/// snapshot are never served after a reload even before invalidation runs.
pub struct SearchCache {
    cache: moka::future::Cache<String, Arc<SearchResponse>>,
    ttl_secs: u64,
}

impl SearchCache {
    /// Create a new search cache
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache, ttl_secs }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<SearchResponse>> {
        let hit = self.cache.get(key).await;
        if hit.is_some() {
            tracing::trace!("Search cache hit: {}", key);
        }
        hit
    }

    pub async fn insert(&self, key: String, response: Arc<SearchResponse>) {
        tracing::trace!("Search cache set: {}", key);
        self.cache.insert(key, response).await;
    }

    /// Drop every cached response
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
        tracing::debug!("Search cache invalidated");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a semantic-only search
    pub fn semantic(version: u64, query: &str, options: &SearchOptions) -> String {
        Self::build("semantic", version, query, options)
    }

    /// Build a cache key for a search with text fallback
    pub fn chained(version: u64, query: &str, options: &SearchOptions) -> String {
        Self::build("chained", version, query, options)
    }

    fn build(kind: &str, version: u64, query: &str, options: &SearchOptions) -> String {
        format!(
            "{}:{}:{}:{}:{}:{}",
            kind,
            version,
            options.limit,
            options.offset,
            options.category.as_deref().unwrap_or("").to_lowercase(),
            normalize_query(query)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QueryIntent;

    #[test]
    fn test_cache_key_builder() {
        let options = SearchOptions::new(20, 40).with_category("Gambits");
        assert_eq!(
            CacheKey::semantic(3, "  Sharp Openings ", &options),
            "semantic:3:20:40:gambits:sharp openings"
        );
        assert_eq!(
            CacheKey::chained(3, "sharp", &SearchOptions::new(10, 0)),
            "chained:3:10:0::sharp"
        );
    }

    #[test]
    fn test_keys_differ_by_version() {
        let options = SearchOptions::new(10, 0);
        assert_ne!(
            CacheKey::semantic(1, "sharp", &options),
            CacheKey::semantic(2, "sharp", &options)
        );
    }

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = SearchCache::new(100, 60);
        let response = Arc::new(SearchResponse::no_semantic_match(QueryIntent::unknown("xyzzy")));

        cache.insert("key".to_string(), response.clone()).await;
        let hit = cache.get("key").await.unwrap();
        assert_eq!(*hit, *response);

        cache.invalidate_all();
        assert!(cache.get("key").await.is_none());
    }
}
