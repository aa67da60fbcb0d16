// Deterministic fill pass over a reconciled table.
//
// Rule order is load-bearing: `overall` is finalized first (median fill),
// `potential` and the six role-skill metrics then fall back to the
// finalized `overall`, and `potential_gap` is derived last.

use crate::dataset::currency::parse_currency;
use crate::dataset::schema::{ColumnMap, ColumnSource};
use crate::dataset::{PlayerRecord, RawTable};

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Median of the finite values in `values`: the central order statistic, or
/// the mean of the two central ones for even counts. 0.0 when nothing is
/// finite.
pub(crate) fn median(values: &[f64]) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return 0.0;
    }
    finite.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = finite.len() / 2;
    if finite.len() % 2 == 1 {
        finite[mid]
    } else {
        (finite[mid - 1] + finite[mid]) / 2.0
    }
}

fn parse_numeric(raw: Option<&str>) -> f64 {
    match raw {
        Some(s) => s.parse::<f64>().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

/// Trimmed, non-empty cell text at (`row`, `idx`), if any.
fn cell<'a>(table: &'a RawTable, row: usize, idx: usize) -> Option<&'a str> {
    table.rows[row]
        .get(idx)
        .and_then(|c| c.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Materialize a numeric column from its resolved source, NaN where missing
/// or unparsable.
fn numeric_column(table: &RawTable, source: ColumnSource) -> Vec<f64> {
    (0..table.rows.len())
        .map(|row| match source {
            ColumnSource::Column(idx) => parse_numeric(cell(table, row, idx)),
            ColumnSource::Millions(idx) => parse_numeric(cell(table, row, idx)) * 1_000_000.0,
            ColumnSource::RowIndex | ColumnSource::Absent => f64::NAN,
        })
        .collect()
}

/// Materialize a monetary column, running each cell through the currency
/// normalizer. A synthesized millions column is plain numeric, not currency.
fn currency_column(table: &RawTable, source: ColumnSource) -> Vec<f64> {
    (0..table.rows.len())
        .map(|row| match source {
            ColumnSource::Column(idx) => parse_currency(cell(table, row, idx)),
            ColumnSource::Millions(idx) => parse_numeric(cell(table, row, idx)) * 1_000_000.0,
            ColumnSource::RowIndex | ColumnSource::Absent => f64::NAN,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Record construction
// ---------------------------------------------------------------------------

/// Run the ordered imputation rules and assemble canonical records.
pub fn build_records(table: &RawTable, map: &ColumnMap) -> Vec<PlayerRecord> {
    let n = table.rows.len();

    // 1. overall: coerce, fill remaining gaps with the dataset median.
    let mut overall = numeric_column(table, map.overall);
    let overall_median = median(&overall);
    for v in overall.iter_mut() {
        if v.is_nan() {
            *v = overall_median;
        }
    }

    // 2-3. potential and role-skill metrics: an absent column is a full copy
    // of overall; per-row gaps fall back to that row's overall.
    let from_overall = |source: ColumnSource| -> Vec<f64> {
        match source {
            ColumnSource::Absent => overall.clone(),
            source => {
                let mut col = numeric_column(table, source);
                for (v, o) in col.iter_mut().zip(&overall) {
                    if v.is_nan() {
                        *v = *o;
                    }
                }
                col
            }
        }
    };

    let potential = from_overall(map.potential);
    let pace = from_overall(map.pace);
    let shooting = from_overall(map.shooting);
    let passing = from_overall(map.passing);
    let dribbling = from_overall(map.dribbling);
    let defending = from_overall(map.defending);
    let physic = from_overall(map.physic);

    // Monetary fields keep NaN: no imputation is defined for them.
    let value_eur = currency_column(table, map.value_eur);
    let wage_eur = currency_column(table, map.wage_eur);

    // Age has no fallback either; NaN rows simply never match age filters.
    let age = numeric_column(table, map.age);

    (0..n)
        .map(|row| {
            // 4-5. positions default to empty; names are trimmed, with the
            // row index as the identifier of last resort.
            let player_positions = match map.player_positions {
                ColumnSource::Column(idx) => cell(table, row, idx).unwrap_or("").to_string(),
                _ => String::new(),
            };
            let short_name = match map.short_name {
                ColumnSource::Column(idx) => cell(table, row, idx).unwrap_or("").to_string(),
                _ => row.to_string(),
            };

            PlayerRecord {
                short_name,
                player_positions,
                age: age[row],
                overall: overall[row],
                potential: potential[row],
                value_eur: value_eur[row],
                wage_eur: wage_eur[row],
                pace: pace[row],
                shooting: shooting[row],
                passing: passing[row],
                dribbling: dribbling[row],
                defending: defending[row],
                physic: physic[row],
                // 6. Derived exactly once, after both inputs are final.
                potential_gap: potential[row] - overall[row],
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
