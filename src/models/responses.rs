use serde::{Deserialize, Serialize};
use crate::models::domain::ScoredOpening;
use crate::models::intent::QueryIntent;

/// One page of ranked search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ScoredOpening>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
    #[serde(rename = "searchType")]
    pub search_type: String,
    pub intent: QueryIntent,
}

impl SearchResponse {
    /// Response for a query the engine could not interpret
    pub fn no_semantic_match(intent: QueryIntent) -> Self {
        Self {
            results: Vec::new(),
            total_results: 0,
            has_more: false,
            search_type: NO_SEMANTIC_MATCH.to_string(),
            intent,
        }
    }

    pub fn is_semantic_miss(&self) -> bool {
        self.search_type == NO_SEMANTIC_MATCH
    }
}

/// `searchType` reported when no intent could be classified
pub const NO_SEMANTIC_MATCH: &str = "no_semantic_match";

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(rename = "catalogSize")]
    pub catalog_size: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// A named category and the tags that place an opening in it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryInfo>,
}

/// Catalog reload response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub success: bool,
    pub version: u64,
    #[serde(rename = "totalRecords")]
    pub total_records: usize,
}
