use crate::core::{
    filters::{filter_by_category, filter_openings},
    intent::parse_intent,
    mapping::SemanticMappingTable,
    normalize::normalize_query,
    scoring::score_openings,
};
use crate::models::{OpeningRecord, QueryIntent, ScoringWeights, SearchOptions, SearchResponse};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised before a search starts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Bounds enforced on every search call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_query_length: usize,
    pub max_limit: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_query_length: 200,
            max_limit: 100,
        }
    }
}

/// Search orchestrator - wires query understanding to ranking
///
/// # Pipeline Stages
/// 1. Normalize the query
/// 2. Parse intent (unknown intents short-circuit)
/// 3. Filter by intent
/// 4. Optional category filter
/// 5. Score and sort
/// 6. Paginate
#[derive(Debug, Clone)]
pub struct SearchEngine {
    table: Arc<SemanticMappingTable>,
    weights: ScoringWeights,
    limits: SearchLimits,
}

impl SearchEngine {
    pub fn new(
        table: Arc<SemanticMappingTable>,
        weights: ScoringWeights,
        limits: SearchLimits,
    ) -> Self {
        Self {
            table,
            weights,
            limits,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            Arc::new(SemanticMappingTable::standard()),
            ScoringWeights::default(),
            SearchLimits::default(),
        )
    }

    pub fn table(&self) -> &SemanticMappingTable {
        &self.table
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Reject out-of-range input before any work is done
    ///
    /// Returns the tag set of the requested category, if any.
    pub fn validate(
        &self,
        raw_query: &str,
        options: &SearchOptions,
    ) -> Result<Option<Vec<String>>, SearchError> {
        let query_len = raw_query.chars().count();
        if query_len > self.limits.max_query_length {
            return Err(SearchError::InvalidInput(format!(
                "query is {} characters, maximum is {}",
                query_len, self.limits.max_query_length
            )));
        }

        if options.limit == 0 || options.limit > self.limits.max_limit {
            return Err(SearchError::InvalidInput(format!(
                "limit must be between 1 and {}, got {}",
                self.limits.max_limit, options.limit
            )));
        }

        match options.category.as_deref() {
            None => Ok(None),
            Some(name) => match self.table.category(name) {
                Some(tags) => Ok(Some(tags.to_vec())),
                None => Err(SearchError::InvalidInput(format!("unknown category: {}", name))),
            },
        }
    }

    /// Normalize and classify a raw query
    pub fn parse(&self, raw_query: &str) -> QueryIntent {
        parse_intent(&normalize_query(raw_query), &self.table)
    }

    /// Run a full search against one catalog snapshot
    pub fn search(
        &self,
        raw_query: &str,
        openings: &[OpeningRecord],
        options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError> {
        let category_tags = self.validate(raw_query, options)?;

        let intent = self.parse(raw_query);
        if intent.is_unknown() {
            tracing::debug!("No semantic intent for query '{}'", intent.original_query);
            return Ok(SearchResponse::no_semantic_match(intent));
        }

        let mut filtered = filter_openings(openings, &intent, &self.table);
        if let Some(tags) = &category_tags {
            filtered = filter_by_category(filtered, tags);
        }

        let total_results = filtered.len();
        tracing::debug!(
            "Query '{}' classified as {}, {} of {} openings survive filtering",
            intent.original_query,
            intent.type_name(),
            total_results,
            openings.len()
        );

        let results = score_openings(filtered, &intent, &self.table, &self.weights)
            .into_iter()
            .skip(options.offset)
            .take(options.limit)
            .collect();

        Ok(SearchResponse {
            results,
            total_results,
            has_more: options.offset.saturating_add(options.limit) < total_results,
            search_type: format!("semantic_{}", intent.type_name()),
            intent,
        })
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Complexity, IntentKind};

    fn create_opening(name: &str, moves: &str, style_tags: &[&str]) -> OpeningRecord {
        OpeningRecord {
            fen: format!("fen-{}", name),
            name: name.to_string(),
            eco: "A00".to_string(),
            moves: moves.to_string(),
            style_tags: style_tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_intent_short_circuits() {
        let engine = SearchEngine::with_defaults();
        let openings = vec![create_opening("X", "1. e4", &["Sharp"])];

        let response = engine
            .search("xyzzy12345", &openings, &SearchOptions::new(10, 0))
            .unwrap();

        assert!(response.results.is_empty());
        assert_eq!(response.total_results, 0);
        assert!(!response.has_more);
        assert_eq!(response.search_type, "no_semantic_match");
        assert_eq!(response.intent.kind, IntentKind::Unknown);
    }

    #[test]
    fn test_rejects_long_query() {
        let engine = SearchEngine::with_defaults();
        let query = "a".repeat(201);
        let err = engine.search(&query, &[], &SearchOptions::new(10, 0)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidInput(_)));
    }

    #[test]
    fn test_rejects_bad_limit() {
        let engine = SearchEngine::with_defaults();
        assert!(engine.search("sharp", &[], &SearchOptions::new(0, 0)).is_err());
        assert!(engine.search("sharp", &[], &SearchOptions::new(101, 0)).is_err());
    }

    #[test]
    fn test_rejects_unknown_category() {
        let engine = SearchEngine::with_defaults();
        let options = SearchOptions::new(10, 0).with_category("wild");
        assert!(engine.search("sharp openings", &[], &options).is_err());
    }

    #[test]
    fn test_empty_catalog_yields_empty_results() {
        let engine = SearchEngine::with_defaults();
        let response = engine
            .search("aggressive openings", &[], &SearchOptions::new(10, 0))
            .unwrap();
        assert_eq!(response.total_results, 0);
        assert!(response.results.is_empty());
        assert_eq!(response.search_type, "semantic_style_search");
    }

    #[test]
    fn test_category_narrows_results() {
        let engine = SearchEngine::with_defaults();
        let openings = vec![
            create_opening("Evans Gambit", "1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. b4", &["Sharp", "Gambit"]),
            create_opening("Najdorf", "1. e4 c5", &["Sharp"]),
        ];
        let options = SearchOptions::new(10, 0).with_category("gambits");
        let response = engine.search("sharp openings", &openings, &options).unwrap();
        assert_eq!(response.total_results, 1);
        assert_eq!(response.results[0].opening.name, "Evans Gambit");
    }

    #[test]
    fn test_pagination_has_more() {
        let engine = SearchEngine::with_defaults();
        let openings: Vec<OpeningRecord> = (0..5)
            .map(|i| create_opening(&format!("Line {}", i), "1. e4 e5", &["Sharp"]))
            .collect();

        let first = engine
            .search("sharp openings", &openings, &SearchOptions::new(2, 0))
            .unwrap();
        assert_eq!(first.results.len(), 2);
        assert_eq!(first.total_results, 5);
        assert!(first.has_more);

        let last = engine
            .search("sharp openings", &openings, &SearchOptions::new(2, 4))
            .unwrap();
        assert_eq!(last.results.len(), 1);
        assert!(!last.has_more);

        let beyond = engine
            .search("sharp openings", &openings, &SearchOptions::new(2, 10))
            .unwrap();
        assert!(beyond.results.is_empty());
        assert!(!beyond.has_more);
    }

    #[test]
    fn test_complexity_intent_echoed() {
        let engine = SearchEngine::with_defaults();
        let response = engine
            .search("Beginner French Defense", &[], &SearchOptions::new(10, 0))
            .unwrap();
        assert_eq!(response.intent.complexity(), Some(Complexity::Beginner));
        assert_eq!(response.search_type, "semantic_complexity_search");
    }
}
