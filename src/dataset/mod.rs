// Dataset loading and preprocessing.
//
// Reads a delimited player export into a raw string table, reconciles its
// header naming against the canonical schema, and runs the deterministic
// imputation pass. The result is a fully-populated record set that the
// query engine can serve without ever touching the raw table again.

pub mod currency;
pub mod impute;
pub mod schema;

pub use currency::parse_currency;
pub use schema::{resolve, ColumnMap, ColumnSource};

use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Column-oriented raw table as read from a delimited file. Headers keep
/// file order; a cell is `None` when the field was empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// A canonical player record. After preprocessing every field is populated;
/// only `age`, `value_eur`, and `wage_eur` may remain NaN (no imputation is
/// defined for them).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub short_name: String,
    pub player_positions: String,
    pub age: f64,
    pub overall: f64,
    pub potential: f64,
    pub value_eur: f64,
    pub wage_eur: f64,
    pub pace: f64,
    pub shooting: f64,
    pub passing: f64,
    pub dribbling: f64,
    pub defending: f64,
    pub physic: f64,
    pub potential_gap: f64,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("no overall-equivalent column found after alias resolution (headers: {headers:?})")]
    MissingOverall { headers: Vec<String> },
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_table_from_reader<R: Read>(rdr: R) -> Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => {
                let row = (0..headers.len())
                    .map(|i| {
                        record
                            .get(i)
                            .filter(|s| !s.is_empty())
                            .map(|s| s.to_string())
                    })
                    .collect();
                rows.push(row);
            }
            Err(e) => {
                warn!("skipping malformed row: {}", e);
            }
        }
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Public loaders
// ---------------------------------------------------------------------------

/// Load a raw table from a CSV file.
pub fn load_table(path: &Path) -> Result<RawTable, DatasetError> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_table_from_reader(file).map_err(|e| DatasetError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Reconcile and impute a raw table into canonical records.
///
/// This is the whole preprocessing pass: alias resolution happens once
/// against the header list, then the imputation rules run in their fixed
/// order. Fails only on the fatal schema error (no overall column).
pub fn preprocess(table: &RawTable) -> Result<Vec<PlayerRecord>, DatasetError> {
    let map = schema::resolve(&table.headers)?;
    Ok(impute::build_records(table, &map))
}

/// Load and preprocess a player dataset from a CSV file.
pub fn load_records(path: &Path) -> Result<Vec<PlayerRecord>, DatasetError> {
    let table = load_table(path)?;
    preprocess(&table)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
