// Model exports
pub mod domain;
pub mod intent;
pub mod requests;
pub mod responses;

pub use domain::{Color, Complexity, OpeningRecord, ScoredOpening, ScoringWeights, SearchOptions};
pub use intent::{IntentKind, QueryIntent};
pub use requests::SearchParams;
pub use responses::{
    CategoriesResponse, CategoryInfo, ErrorResponse, HealthResponse, ReloadResponse,
    SearchResponse, NO_SEMANTIC_MATCH,
};
