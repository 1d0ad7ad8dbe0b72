// Service exports
pub mod cache;
pub mod catalog;
pub mod fallback;

pub use cache::{CacheKey, CacheStats, SearchCache};
pub use catalog::{CatalogError, CatalogSnapshot, CatalogSource, CatalogStats, CatalogStore, FileStats};
pub use fallback::{search_with_fallback, text_search, TEXT_FALLBACK};
