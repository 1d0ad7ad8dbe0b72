use crate::models::{Complexity, OpeningRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur while loading the opening catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed catalog file {0}: expected an object keyed by position")]
    Malformed(String),
}

/// Where catalog data is read from
#[derive(Debug, Clone)]
pub struct CatalogSource {
    pub eco_dir: PathBuf,
    pub popularity_file: Option<PathBuf>,
}

/// Per-file load counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    pub file: String,
    pub records: usize,
    pub enriched: usize,
    pub skipped: usize,
    #[serde(rename = "enrichmentPercentage")]
    pub enrichment_percentage: f64,
}

/// Catalog-wide load counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    #[serde(rename = "totalRecords")]
    pub total_records: usize,
    #[serde(rename = "enrichedRecords")]
    pub enriched_records: usize,
    #[serde(rename = "ecoRoots")]
    pub eco_roots: usize,
    #[serde(rename = "skippedEntries")]
    pub skipped_entries: usize,
    #[serde(rename = "enrichmentPercentage")]
    pub enrichment_percentage: f64,
    pub files: Vec<FileStats>,
    pub version: u64,
    #[serde(rename = "loadedAt")]
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// One immutable, consistent view of the catalog
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub openings: Vec<OpeningRecord>,
    pub stats: CatalogStats,
}

impl CatalogSnapshot {
    pub fn version(&self) -> u64 {
        self.stats.version
    }

    pub fn len(&self) -> usize {
        self.openings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawEcoEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    eco: Option<String>,
    #[serde(default)]
    moves: Option<String>,
    #[serde(default)]
    aliases: Option<BTreeMap<String, String>>,
    #[serde(rename = "isEcoRoot", default)]
    is_eco_root: Option<bool>,
    #[serde(default)]
    analysis_json: Option<RawAnalysis>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    style_tags: Option<Vec<String>>,
    #[serde(default)]
    tactical_tags: Option<Vec<String>>,
    #[serde(default)]
    positional_tags: Option<Vec<String>>,
    #[serde(default)]
    complexity: Option<String>,
    #[serde(default)]
    last_enriched_at: Option<Value>,
}

/// Records parsed from one ECO file
#[derive(Debug, Default)]
pub struct ParsedEcoFile {
    pub records: Vec<OpeningRecord>,
    pub stats: FileStats,
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn into_record(fen: &str, raw: RawEcoEntry) -> (OpeningRecord, bool) {
    let analysis = raw.analysis_json.unwrap_or_default();
    let enriched = analysis
        .last_enriched_at
        .as_ref()
        .is_some_and(|value| !value.is_null());

    let complexity = analysis.complexity.as_deref().and_then(|label| {
        let parsed = Complexity::parse(label);
        if parsed.is_none() {
            tracing::debug!("Unrecognised complexity '{}' for {}", label, fen);
        }
        parsed
    });

    let record = OpeningRecord {
        fen: fen.to_string(),
        name: raw.name.unwrap_or_default(),
        eco: raw.eco.unwrap_or_default(),
        moves: raw.moves.unwrap_or_default(),
        aliases: raw.aliases.unwrap_or_default(),
        style_tags: analysis.style_tags.unwrap_or_default(),
        tactical_tags: analysis.tactical_tags.unwrap_or_default(),
        positional_tags: analysis.positional_tags.unwrap_or_default(),
        complexity,
        popularity_count: 0,
        is_eco_root: raw.is_eco_root.unwrap_or(false),
        description: analysis.description,
    };

    (record, enriched)
}

/// Parse the contents of one ECO file
///
/// Entries that are not objects or carry mistyped fields are skipped and
/// counted; the rest of the file still loads.
pub fn parse_eco_file(file_name: &str, contents: &str) -> Result<ParsedEcoFile, CatalogError> {
    let root: Value = serde_json::from_str(contents).map_err(|source| CatalogError::Json {
        path: file_name.to_string(),
        source,
    })?;

    let entries = match root {
        Value::Object(entries) => entries,
        _ => return Err(CatalogError::Malformed(file_name.to_string())),
    };

    let mut parsed = ParsedEcoFile {
        records: Vec::with_capacity(entries.len()),
        stats: FileStats {
            file: file_name.to_string(),
            ..Default::default()
        },
    };

    for (fen, value) in entries {
        if !value.is_object() {
            tracing::warn!("Skipping non-object entry {} in {}", fen, file_name);
            parsed.stats.skipped += 1;
            continue;
        }

        match serde_json::from_value::<RawEcoEntry>(value) {
            Ok(raw) => {
                let (record, enriched) = into_record(&fen, raw);
                if enriched {
                    parsed.stats.enriched += 1;
                }
                parsed.records.push(record);
            }
            Err(e) => {
                tracing::warn!("Skipping malformed entry {} in {}: {}", fen, file_name, e);
                parsed.stats.skipped += 1;
            }
        }
    }

    parsed.stats.records = parsed.records.len();
    parsed.stats.enrichment_percentage = percentage(parsed.stats.enriched, parsed.stats.records);
    Ok(parsed)
}

/// Parse a popularity file into game counts keyed by position
pub fn parse_popularity(contents: &str) -> Result<HashMap<String, u64>, CatalogError> {
    let root: Value = serde_json::from_str(contents).map_err(|source| CatalogError::Json {
        path: "popularity".to_string(),
        source,
    })?;

    let entries = match root {
        Value::Object(entries) => entries,
        _ => return Err(CatalogError::Malformed("popularity".to_string())),
    };

    Ok(entries
        .into_iter()
        .filter_map(|(fen, stats)| {
            stats
                .get("games_analyzed")
                .and_then(Value::as_u64)
                .map(|games| (fen, games))
        })
        .collect())
}

fn is_eco_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with("eco") && name.ends_with(".json")
}

/// Read and assemble a full snapshot from disk
pub async fn load_snapshot(source: &CatalogSource, version: u64) -> Result<CatalogSnapshot, CatalogError> {
    if !tokio::fs::try_exists(&source.eco_dir).await? {
        return Err(CatalogError::NotFound(source.eco_dir.display().to_string()));
    }

    let mut paths = Vec::new();
    let mut dir = tokio::fs::read_dir(&source.eco_dir).await?;
    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        if is_eco_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        tracing::warn!("No eco*.json files found in {}", source.eco_dir.display());
    }

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let contents = tokio::fs::read_to_string(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        files.push(parse_eco_file(&file_name, &contents)?);
    }

    let popularity = match &source.popularity_file {
        Some(path) if tokio::fs::try_exists(path).await? => {
            parse_popularity(&tokio::fs::read_to_string(path).await?)?
        }
        Some(path) => {
            tracing::warn!("Popularity file {} not found, popularity counts stay at zero", path.display());
            HashMap::new()
        }
        None => HashMap::new(),
    };

    Ok(assemble_snapshot(files, &popularity, version))
}

/// Merge parsed files and popularity counts into one sorted snapshot
pub fn assemble_snapshot(
    files: Vec<ParsedEcoFile>,
    popularity: &HashMap<String, u64>,
    version: u64,
) -> CatalogSnapshot {
    let mut openings = Vec::new();
    let mut file_stats = Vec::with_capacity(files.len());
    let mut enriched_records = 0;
    let mut skipped_entries = 0;

    for file in files {
        enriched_records += file.stats.enriched;
        skipped_entries += file.stats.skipped;
        file_stats.push(file.stats);
        openings.extend(file.records);
    }

    for opening in &mut openings {
        if let Some(games) = popularity.get(&opening.fen) {
            opening.popularity_count = *games;
        }
    }

    openings.sort_by(|a, b| {
        a.eco
            .cmp(&b.eco)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.fen.cmp(&b.fen))
    });

    let stats = CatalogStats {
        total_records: openings.len(),
        enriched_records,
        eco_roots: openings.iter().filter(|o| o.is_eco_root).count(),
        skipped_entries,
        enrichment_percentage: percentage(enriched_records, openings.len()),
        files: file_stats,
        version,
        loaded_at: chrono::Utc::now(),
    };

    CatalogSnapshot { openings, stats }
}

/// Holds the live catalog snapshot and swaps it atomically on reload
pub struct CatalogStore {
    source: Option<CatalogSource>,
    current: RwLock<Arc<CatalogSnapshot>>,
    next_version: AtomicU64,
}

impl CatalogStore {
    /// Load the catalog from disk
    pub async fn open(source: CatalogSource) -> Result<Self, CatalogError> {
        let snapshot = load_snapshot(&source, 1).await?;
        tracing::info!(
            "Catalog loaded: {} openings ({} enriched, {} skipped)",
            snapshot.stats.total_records,
            snapshot.stats.enriched_records,
            snapshot.stats.skipped_entries
        );
        Ok(Self {
            source: Some(source),
            current: RwLock::new(Arc::new(snapshot)),
            next_version: AtomicU64::new(2),
        })
    }

    /// In-memory catalog without a backing source
    pub fn from_records(records: Vec<OpeningRecord>) -> Self {
        let file = ParsedEcoFile {
            stats: FileStats {
                file: "memory".to_string(),
                records: records.len(),
                ..Default::default()
            },
            records,
        };
        let snapshot = assemble_snapshot(vec![file], &HashMap::new(), 1);
        Self {
            source: None,
            current: RwLock::new(Arc::new(snapshot)),
            next_version: AtomicU64::new(2),
        }
    }

    /// The snapshot current at the time of the call
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.read().await.clone()
    }

    /// Rebuild from the source and swap the new snapshot in
    ///
    /// Searches already holding the previous snapshot finish against it.
    pub async fn reload(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| CatalogError::NotFound("no catalog source configured".to_string()))?;

        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        let snapshot = Arc::new(load_snapshot(source, version).await?);

        *self.current.write().await = snapshot.clone();
        tracing::info!(
            "Catalog reloaded: version {}, {} openings",
            version,
            snapshot.stats.total_records
        );
        Ok(snapshot)
    }
}
