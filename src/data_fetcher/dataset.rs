//! Static per-game historical dataset loaded from CSV.
//!
//! Parsing a season-sized CSV is slow enough to matter, so the parsed table is
//! written next to the source as `<file>.cache.json` and read from there on
//! later loads. Deleting the cache file forces a re-parse.

use serde_json::{Number, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::data_fetcher::models::StatTable;
use crate::error::AppError;

const CACHE_SUFFIX: &str = ".cache.json";

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalDataset {
    source: PathBuf,
    table: StatTable,
}

impl HistoricalDataset {
    /// Loads the dataset, preferring the parsed cache when present.
    #[instrument]
    pub async fn load(source: &Path) -> Result<Self, AppError> {
        let cache_path = cache_path_for(source);

        if tokio::fs::try_exists(&cache_path).await? {
            let cached = tokio::fs::read_to_string(&cache_path).await?;
            match serde_json::from_str::<StatTable>(&cached) {
                Ok(table) => {
                    debug!(
                        "Loaded {} cached rows from {}",
                        table.len(),
                        cache_path.display()
                    );
                    return Ok(Self {
                        source: source.to_path_buf(),
                        table,
                    });
                }
                Err(e) => warn!(
                    "Ignoring unreadable dataset cache {}: {e}",
                    cache_path.display()
                ),
            }
        }

        let path = source.to_path_buf();
        let table = tokio::task::spawn_blocking(move || table_from_path(&path))
            .await
            .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))??;
        info!("Parsed {} rows from {}", table.len(), source.display());

        write_cache(&cache_path, &table).await?;
        Ok(Self {
            source: source.to_path_buf(),
            table,
        })
    }

    pub fn from_table(source: impl Into<PathBuf>, table: StatTable) -> Self {
        Self {
            source: source.into(),
            table,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn table(&self) -> &StatTable {
        &self.table
    }

    /// Rows whose `column` equals `value` (case-insensitive) for every filter,
    /// in file order, at most `limit` of them.
    pub fn query(&self, filters: &[(String, String)], limit: usize) -> Result<StatTable, AppError> {
        let mut columns = Vec::with_capacity(filters.len());
        for (column, value) in filters {
            let index = self.table.require_column(column)?;
            columns.push((index, value.trim()));
        }

        let matched = self.table.filter_rows(|row| {
            columns.iter().all(|(index, wanted)| {
                row.values()
                    .get(*index)
                    .is_some_and(|cell| cell_text(cell).eq_ignore_ascii_case(wanted))
            })
        });
        Ok(matched.head(limit))
    }
}

/// Location of the parsed cache for a source CSV.
pub fn cache_path_for(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_os_string();
    name.push(CACHE_SUFFIX);
    PathBuf::from(name)
}

fn table_from_path(path: &Path) -> Result<StatTable, AppError> {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    let file = std::fs::File::open(path)?;
    table_from_reader(name, file)
}

/// Parses CSV into a table. Numeric cells become numbers, empty cells null.
pub fn table_from_reader<R: Read>(name: String, rdr: R) -> Result<StatTable, AppError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) if record.len() == headers.len() => {
                rows.push(record.iter().map(parse_cell).collect());
            }
            Ok(record) => warn!(
                "skipping dataset row with {} fields (expected {})",
                record.len(),
                headers.len()
            ),
            Err(e) => warn!("skipping malformed dataset row: {}", e),
        }
    }

    StatTable::try_new(name, headers, rows).map_err(AppError::document_error)
}

fn parse_cell(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Writes through a temp file and rename so concurrent loaders never observe
/// a partial cache.
async fn write_cache(cache_path: &Path, table: &StatTable) -> Result<(), AppError> {
    let json = serde_json::to_string(table)?;
    let mut temp = cache_path.as_os_str().to_os_string();
    temp.push(format!(".tmp-{}", std::process::id()));
    let temp = PathBuf::from(temp);

    tokio::fs::write(&temp, json).await?;
    tokio::fs::rename(&temp, cache_path).await?;
    debug!("Wrote dataset cache {}", cache_path.display());
    Ok(())
}
