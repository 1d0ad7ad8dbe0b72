use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::SearchLimits;
use crate::models::ScoringWeights;
use crate::services::CatalogSource;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_eco_dir")]
    pub eco_dir: PathBuf,
    pub popularity_file: Option<PathBuf>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            eco_dir: default_eco_dir(),
            popularity_file: None,
        }
    }
}

impl CatalogSettings {
    pub fn source(&self) -> CatalogSource {
        CatalogSource {
            eco_dir: self.eco_dir.clone(),
            popularity_file: self.popularity_file.clone(),
        }
    }
}

fn default_eco_dir() -> PathBuf { PathBuf::from("data/eco") }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_query_length: default_max_query_length(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl SearchSettings {
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_query_length: self.max_query_length,
            max_limit: self.max_limit,
        }
    }
}

fn default_max_query_length() -> usize { 200 }
fn default_limit() -> usize { 20 }
fn default_max_limit() -> usize { 50 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_base_weight")]
    pub base: f64,
    #[serde(default = "default_style_match_weight")]
    pub style_match: f64,
    #[serde(default = "default_complexity_weight")]
    pub complexity: f64,
    #[serde(default = "default_move_pattern_weight")]
    pub move_pattern: f64,
    #[serde(default = "default_name_weight")]
    pub name: f64,
    #[serde(default = "default_popularity_cap")]
    pub popularity_cap: f64,
    #[serde(default = "default_popularity_divisor")]
    pub popularity_divisor: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            base: default_base_weight(),
            style_match: default_style_match_weight(),
            complexity: default_complexity_weight(),
            move_pattern: default_move_pattern_weight(),
            name: default_name_weight(),
            popularity_cap: default_popularity_cap(),
            popularity_divisor: default_popularity_divisor(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        Self {
            base: config.base,
            style_match: config.style_match,
            complexity: config.complexity,
            move_pattern: config.move_pattern,
            name: config.name,
            popularity_cap: config.popularity_cap,
            popularity_divisor: config.popularity_divisor,
        }
    }
}

fn default_base_weight() -> f64 { 0.3 }
fn default_style_match_weight() -> f64 { 0.2 }
fn default_complexity_weight() -> f64 { 0.15 }
fn default_move_pattern_weight() -> f64 { 0.1 }
fn default_name_weight() -> f64 { 0.2 }
fn default_popularity_cap() -> f64 { 0.1 }
fn default_popularity_divisor() -> f64 { 1_000_000.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_l1_cache_size")]
    pub l1_cache_size: u64,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            l1_cache_size: default_l1_cache_size(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_l1_cache_size() -> u64 { 1000 }
fn default_ttl_secs() -> u64 { 300 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with OPENINGS__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., OPENINGS__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("OPENINGS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("OPENINGS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights::from(&self.scoring.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_weights() {
        let weights = WeightsConfig::default();
        assert_eq!(weights.base, 0.3);
        assert_eq!(weights.style_match, 0.2);
        assert_eq!(weights.complexity, 0.15);
        assert_eq!(weights.move_pattern, 0.1);
        assert_eq!(weights.name, 0.2);
        assert_eq!(weights.popularity_cap, 0.1);
        assert_eq!(weights.popularity_divisor, 1_000_000.0);
    }

    #[test]
    fn test_default_weights_match_engine_defaults() {
        assert_eq!(
            ScoringWeights::from(&WeightsConfig::default()),
            ScoringWeights::default()
        );
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "json");
    }

    #[test]
    fn test_load_from_file_with_partial_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[search]\nmax_limit = 75\n\n[scoring.weights]\nbase = 0.25\n\n[catalog]\neco_dir = \"/srv/eco\""
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.search.max_limit, 75);
        assert_eq!(settings.search.default_limit, 20);
        assert_eq!(settings.scoring.weights.base, 0.25);
        assert_eq!(settings.scoring.weights.style_match, 0.2);
        assert_eq!(settings.catalog.eco_dir, PathBuf::from("/srv/eco"));
        assert_eq!(settings.server.port, 8080);
    }
}
