use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Difficulty level attached to an opening by the enrichment pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[serde(alias = "Beginner")]
    Beginner,
    #[serde(alias = "Intermediate")]
    Intermediate,
    #[serde(alias = "Advanced")]
    Advanced,
}

impl Complexity {
    /// Parse a complexity label, ignoring case and surrounding whitespace
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "beginner" => Some(Complexity::Beginner),
            "intermediate" => Some(Complexity::Intermediate),
            "advanced" => Some(Complexity::Advanced),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Beginner => "beginner",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side to move a repertoire is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "white" => Some(Color::White),
            "black" => Some(Color::Black),
            _ => None,
        }
    }
}

/// A single catalog entry
///
/// Owned by the catalog loader and never mutated by the search core. Every
/// field defaults when absent so one incomplete record cannot poison a search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OpeningRecord {
    #[serde(default)]
    pub fen: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub eco: String,
    #[serde(default)]
    pub moves: String,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(rename = "styleTags", default)]
    pub style_tags: Vec<String>,
    #[serde(rename = "tacticalTags", default)]
    pub tactical_tags: Vec<String>,
    #[serde(rename = "positionalTags", default)]
    pub positional_tags: Vec<String>,
    #[serde(default)]
    pub complexity: Option<Complexity>,
    #[serde(rename = "popularityCount", default)]
    pub popularity_count: u64,
    #[serde(rename = "isEcoRoot", default)]
    pub is_eco_root: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl OpeningRecord {
    /// Style, tactical and positional tags, lowercased
    pub fn combined_tags(&self) -> Vec<String> {
        self.style_tags
            .iter()
            .chain(self.tactical_tags.iter())
            .chain(self.positional_tags.iter())
            .map(|tag| tag.to_lowercase())
            .collect()
    }

    pub fn alias_names(&self) -> impl Iterator<Item = &str> {
        self.aliases.values().map(String::as_str)
    }
}

/// An opening that survived filtering, with its relevance in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredOpening {
    #[serde(flatten)]
    pub opening: OpeningRecord,
    #[serde(rename = "searchScore")]
    pub search_score: f64,
}

/// Scoring weights
///
/// Additive bonuses; the final score is clamped to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub base: f64,
    pub style_match: f64,
    pub complexity: f64,
    pub move_pattern: f64,
    pub name: f64,
    pub popularity_cap: f64,
    pub popularity_divisor: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 0.3,
            style_match: 0.2,
            complexity: 0.15,
            move_pattern: 0.1,
            name: 0.2,
            popularity_cap: 0.1,
            popularity_divisor: 1_000_000.0,
        }
    }
}

/// Pagination and category narrowing for one search call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub limit: usize,
    pub offset: usize,
    pub category: Option<String>,
}

impl SearchOptions {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit,
            offset,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
