use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query-string parameters for the search endpoints
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(min = 1, max = 200))]
    #[serde(alias = "query", default)]
    pub q: String,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub category: Option<String>,
}
