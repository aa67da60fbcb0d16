// Query engine over the canonical dataset.
//
// Construction runs the whole load-and-preprocess pass once; every query
// after that is a read-only scan of the canonical records. The only
// interior mutability is the bounded team-stats cache.

pub mod cache;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use crate::dataset::{self, DatasetError, PlayerRecord};
use cache::{TeamStatsCache, TEAM_STATS_CACHE_CAPACITY};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The six role-skill metrics averaged by team stats.
pub const TEAM_METRICS: [&str; 6] = [
    "pace",
    "shooting",
    "passing",
    "dribbling",
    "defending",
    "physic",
];

/// Prospect searches return at most this many records.
pub const CANDIDATE_LIMIT: usize = 3;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("player '{0}' not found in dataset")]
    PlayerNotFound(String),
}

// ---------------------------------------------------------------------------
// Snapshot projection
// ---------------------------------------------------------------------------

/// Immutable minimal view of one player, detached from the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub short_name: String,
    pub player_positions: String,
    pub age: u32,
    pub overall: u32,
    pub potential: u32,
    pub pace: f64,
    pub physic: f64,
    pub defending: f64,
    pub potential_gap: f64,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ScoutEngine {
    records: Vec<PlayerRecord>,
    player_names: Vec<String>,
    stats_cache: TeamStatsCache,
}

impl ScoutEngine {
    /// Build an engine from a CSV dataset. Fails when the file is unreadable
    /// or the schema cannot be reconciled; no partial engine is returned.
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        Ok(Self::from_records(dataset::load_records(path)?))
    }

    /// Build an engine from already-canonical records.
    pub fn from_records(records: Vec<PlayerRecord>) -> Self {
        let player_names: Vec<String> = records
            .iter()
            .filter(|r| !r.short_name.is_empty())
            .map(|r| r.short_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            records,
            player_names,
            stats_cache: TeamStatsCache::new(TEAM_STATS_CACHE_CAPACITY),
        }
    }

    /// Sorted, de-duplicated player names; rows without an identifier are
    /// excluded.
    pub fn list_player_names(&self) -> &[String] {
        &self.player_names
    }

    /// Project the first record matching `name` into a snapshot.
    pub fn get_player_snapshot(&self, name: &str) -> Result<PlayerSnapshot, EngineError> {
        let record = self
            .records
            .iter()
            .find(|r| r.short_name == name)
            .ok_or_else(|| EngineError::PlayerNotFound(name.to_string()))?;

        Ok(PlayerSnapshot {
            short_name: record.short_name.clone(),
            player_positions: record.player_positions.clone(),
            age: record.age as u32,
            overall: record.overall as u32,
            potential: record.potential as u32,
            pace: record.pace,
            physic: record.physic,
            defending: record.defending,
            potential_gap: record.potential_gap,
        })
    }

    /// Highest-upside prospects for a role.
    ///
    /// The role matches as a case-insensitive literal substring of the
    /// position tags ("CM" also matches "RCM"; that is intentional). Results
    /// are sorted by potential gap descending, ties keep dataset order, and
    /// at most [`CANDIDATE_LIMIT`] records come back.
    pub fn find_candidates(
        &self,
        position: &str,
        max_age: u32,
        min_potential: u32,
    ) -> Vec<PlayerRecord> {
        let needle = position.to_lowercase();
        let mut matches: Vec<PlayerRecord> = self
            .records
            .iter()
            .filter(|r| {
                r.player_positions.to_lowercase().contains(&needle)
                    && r.age <= f64::from(max_age)
                    && r.potential >= f64::from(min_potential)
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            b.potential_gap
                .partial_cmp(&a.potential_gap)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(CANDIDATE_LIMIT);
        matches
    }

    /// Averaged role-skill metrics for a named squad, memoized per sorted
    /// name combination. An empty squad averages the entire dataset; names
    /// that match nothing are silently ignored.
    pub fn get_team_stats(&self, names: &[String]) -> HashMap<String, f64> {
        let mut key: Vec<String> = names.to_vec();
        key.sort();
        self.stats_cache
            .get_or_insert_with(key, || self.compute_team_stats(names))
    }

    fn compute_team_stats(&self, names: &[String]) -> HashMap<String, f64> {
        let selection: Vec<&PlayerRecord> = if names.is_empty() {
            self.records.iter().collect()
        } else {
            let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
            self.records
                .iter()
                .filter(|r| wanted.contains(r.short_name.as_str()))
                .collect()
        };

        TEAM_METRICS
            .iter()
            .map(|&metric| {
                let mean = nan_mean(selection.iter().map(|r| metric_value(r, metric)));
                (metric.to_string(), mean)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn metric_value(record: &PlayerRecord, metric: &str) -> f64 {
    match metric {
        "pace" => record.pace,
        "shooting" => record.shooting,
        "passing" => record.passing,
        "dribbling" => record.dribbling,
        "defending" => record.defending,
        "physic" => record.physic,
        // Unknown metric: NaN, mirroring a missing column in the selection.
        _ => f64::NAN,
    }
}

/// Mean of the finite values; NaN when there are none (empty selection).
fn nan_mean(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        if v.is_finite() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, positions: &str, age: f64, overall: f64, potential: f64) -> PlayerRecord {
        PlayerRecord {
            short_name: name.to_string(),
            player_positions: positions.to_string(),
            age,
            overall,
            potential,
            value_eur: f64::NAN,
            wage_eur: f64::NAN,
            pace: overall,
            shooting: overall,
            passing: overall,
            dribbling: overall,
            defending: overall,
            physic: overall,
            potential_gap: potential - overall,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn test_engine() -> ScoutEngine {
        ScoutEngine::from_records(vec![
            record("E. Haaland", "ST", 21.0, 88.0, 93.0),
            record("P. Foden", "CAM, LW", 21.0, 84.0, 92.0),
            record("J. Musiala", "CAM, CM", 19.0, 81.0, 90.0),
            record("N. Barella", "RCM", 24.0, 86.0, 89.0),
            record("Veteran CM", "CM", 33.0, 85.0, 85.0),
            record("Low Ceiling CM", "CM", 20.0, 70.0, 74.0),
        ])
    }

    // -- list_player_names --

    #[test]
    fn names_sorted_deduped_and_nonempty() {
        let engine = ScoutEngine::from_records(vec![
            record("B Player", "CM", 20.0, 70.0, 75.0),
            record("A Player", "ST", 20.0, 70.0, 75.0),
            record("B Player", "CB", 25.0, 72.0, 72.0),
            record("", "GK", 30.0, 80.0, 80.0),
        ]);
        assert_eq!(engine.list_player_names(), &names(&["A Player", "B Player"]));
    }

    // -- snapshots --

    #[test]
    fn snapshot_projects_minimal_fields() {
        let engine = test_engine();
        let snap = engine.get_player_snapshot("J. Musiala").unwrap();
        assert_eq!(snap.short_name, "J. Musiala");
        assert_eq!(snap.player_positions, "CAM, CM");
        assert_eq!(snap.age, 19);
        assert_eq!(snap.overall, 81);
        assert_eq!(snap.potential, 90);
        assert_eq!(snap.pace, 81.0);
        assert_eq!(snap.potential_gap, 9.0);
    }

    #[test]
    fn snapshot_unknown_name_is_not_found() {
        let engine = test_engine();
        let err = engine.get_player_snapshot("Unknown Name").unwrap_err();
        match err {
            EngineError::PlayerNotFound(name) => assert_eq!(name, "Unknown Name"),
            other => panic!("expected PlayerNotFound, got: {other}"),
        }
    }

    // -- find_candidates --

    #[test]
    fn role_matches_as_substring_case_insensitive() {
        let engine = test_engine();
        let found = engine.find_candidates("cm", 25, 80);
        let found_names: Vec<&str> = found.iter().map(|r| r.short_name.as_str()).collect();
        // "cm" hits CM, RCM, and "CAM, CM"; ranked by potential gap.
        assert_eq!(found_names, vec!["J. Musiala", "N. Barella"]);
    }

    #[test]
    fn candidates_capped_at_three() {
        let mut records = Vec::new();
        for i in 0..6 {
            records.push(record(&format!("P{i}"), "CM", 20.0, 70.0, 80.0 + i as f64));
        }
        let engine = ScoutEngine::from_records(records);
        let found = engine.find_candidates("CM", 23, 70);
        assert_eq!(found.len(), CANDIDATE_LIMIT);
        assert_eq!(found[0].short_name, "P5");
    }

    #[test]
    fn candidates_sorted_by_gap_with_stable_ties() {
        let engine = ScoutEngine::from_records(vec![
            record("Second Gap", "CM", 20.0, 80.0, 85.0),
            record("Tied A", "CM", 20.0, 78.0, 86.0),
            record("Tied B", "CM", 20.0, 80.0, 88.0),
        ]);
        let found = engine.find_candidates("CM", 23, 80);
        let found_names: Vec<&str> = found.iter().map(|r| r.short_name.as_str()).collect();
        // Both 8-gap players keep dataset order ahead of the 5-gap player.
        assert_eq!(found_names, vec!["Tied A", "Tied B", "Second Gap"]);
    }

    #[test]
    fn age_and_potential_filters_apply() {
        let engine = test_engine();
        let found = engine.find_candidates("CM", 22, 86);
        let found_names: Vec<&str> = found.iter().map(|r| r.short_name.as_str()).collect();
        // Barella is too old, Veteran CM fails both, Low Ceiling CM fails
        // potential.
        assert_eq!(found_names, vec!["J. Musiala"]);
    }

    #[test]
    fn nan_age_never_matches() {
        let engine =
            ScoutEngine::from_records(vec![record("No Age", "CM", f64::NAN, 70.0, 90.0)]);
        assert!(engine.find_candidates("CM", 99, 0).is_empty());
    }

    #[test]
    fn no_match_returns_empty() {
        let engine = test_engine();
        assert!(engine.find_candidates("GK", 40, 0).is_empty());
    }

    // -- get_team_stats --

    #[test]
    fn empty_squad_is_global_baseline() {
        let engine = ScoutEngine::from_records(vec![
            record("A", "CM", 20.0, 70.0, 75.0),
            record("B", "ST", 22.0, 90.0, 92.0),
        ]);
        let stats = engine.get_team_stats(&[]);
        assert_eq!(stats.len(), TEAM_METRICS.len());
        assert_eq!(stats["pace"], 80.0);
        assert_eq!(stats["defending"], 80.0);
    }

    #[test]
    fn named_squad_averages_matches_only() {
        let engine = ScoutEngine::from_records(vec![
            record("A", "CM", 20.0, 70.0, 75.0),
            record("B", "ST", 22.0, 90.0, 92.0),
            record("C", "CB", 25.0, 80.0, 80.0),
        ]);
        let stats = engine.get_team_stats(&names(&["A", "B"]));
        assert_eq!(stats["physic"], 80.0);
    }

    #[test]
    fn unknown_names_silently_ignored() {
        let engine = ScoutEngine::from_records(vec![record("A", "CM", 20.0, 70.0, 75.0)]);
        let stats = engine.get_team_stats(&names(&["A", "Nobody"]));
        assert_eq!(stats["pace"], 70.0);
    }

    #[test]
    fn all_unknown_names_yield_nan() {
        let engine = ScoutEngine::from_records(vec![record("A", "CM", 20.0, 70.0, 75.0)]);
        let stats = engine.get_team_stats(&names(&["Nobody", "Else"]));
        for metric in TEAM_METRICS {
            assert!(stats[metric].is_nan(), "{metric} should be NaN");
        }
    }

    #[test]
    fn stats_key_is_order_independent() {
        let engine = test_engine();
        let forward = engine.get_team_stats(&names(&["E. Haaland", "P. Foden"]));
        let reversed = engine.get_team_stats(&names(&["P. Foden", "E. Haaland"]));
        assert_eq!(forward, reversed);
        // Both requests share one cache entry.
        assert_eq!(engine.stats_cache.len(), 1);
    }

    #[test]
    fn repeated_queries_hit_the_cache() {
        let engine = test_engine();
        let _ = engine.get_team_stats(&names(&["E. Haaland"]));
        let _ = engine.get_team_stats(&names(&["E. Haaland"]));
        let _ = engine.get_team_stats(&[]);
        assert_eq!(engine.stats_cache.len(), 2);
    }
}
