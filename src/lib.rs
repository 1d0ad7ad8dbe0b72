//! Opening Search - natural-language search over the chess opening catalog
//!
//! This library turns free-text queries such as "aggressive openings" or
//! "solid responses to d4" into a structured intent, narrows the catalog with
//! it and ranks the survivors by relevance.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{SearchEngine, SearchError, SemanticMappingTable};
pub use models::{
    IntentKind, OpeningRecord, QueryIntent, ScoredOpening, ScoringWeights, SearchOptions,
    SearchResponse,
};
