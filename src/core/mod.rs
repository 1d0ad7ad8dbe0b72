// Core algorithm exports
pub mod engine;
pub mod filters;
pub mod intent;
pub mod mapping;
pub mod normalize;
pub mod scoring;

pub use engine::{SearchEngine, SearchError, SearchLimits};
pub use filters::{filter_by_category, filter_openings, matches_any_style, matches_color, is_response_to};
pub use intent::{intent_rules, parse_intent, IntentRule, MIN_QUERY_CHARS};
pub use mapping::{PatternFamily, PatternFamilyKind, SemanticMappingTable, StyleGroup};
pub use normalize::normalize_query;
pub use scoring::{calculate_popularity_score, calculate_search_score, score_openings};
