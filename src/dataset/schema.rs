// Canonical schema resolution.
//
// Player exports disagree on column naming ("overall" vs "overall_rating",
// "short_name" vs "player_name", ...). Resolution is a pure function from
// the raw header list to a ColumnMap: one ordered alias table, evaluated
// once at load time, with two synthesis rules for columns that can be
// derived rather than renamed.

use crate::dataset::DatasetError;

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

/// One canonical column and its accepted source spellings, in priority
/// order. The canonical name itself always wins when present.
struct AliasRule {
    canonical: &'static str,
    aliases: &'static [&'static str],
}

const ALIAS_RULES: &[AliasRule] = &[
    AliasRule {
        canonical: "short_name",
        aliases: &["player_name", "name"],
    },
    AliasRule {
        canonical: "player_positions",
        aliases: &["position", "best_position"],
    },
    AliasRule {
        canonical: "overall",
        aliases: &["overall_rating", "overall_score"],
    },
    AliasRule {
        canonical: "potential",
        aliases: &["potential_rating"],
    },
    AliasRule {
        canonical: "value_eur",
        aliases: &["market_value_eur"],
    },
    AliasRule {
        canonical: "wage_eur",
        aliases: &["salary_eur"],
    },
];

/// Column holding market value denominated in millions of euros; used to
/// synthesize `value_eur` when no direct column exists.
const MARKET_VALUE_MILLIONS: &str = "market_value_million_eur";

// ---------------------------------------------------------------------------
// Resolved mapping
// ---------------------------------------------------------------------------

/// Where a canonical column's values come from in the raw table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// Read directly from this raw column index.
    Column(usize),
    /// Multiply this raw column's numeric value by 1,000,000.
    Millions(usize),
    /// Use the record's position in the file, rendered as a string.
    RowIndex,
    /// No source column; the imputation pass supplies the fallback.
    Absent,
}

/// Canonical-schema view of a raw header list. Every canonical field has a
/// source; only `overall` is allowed to make resolution fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub short_name: ColumnSource,
    pub player_positions: ColumnSource,
    pub age: ColumnSource,
    pub overall: ColumnSource,
    pub potential: ColumnSource,
    pub value_eur: ColumnSource,
    pub wage_eur: ColumnSource,
    pub pace: ColumnSource,
    pub shooting: ColumnSource,
    pub passing: ColumnSource,
    pub dribbling: ColumnSource,
    pub defending: ColumnSource,
    pub physic: ColumnSource,
}

/// Resolve a raw header list against the alias table.
///
/// Fails only when no `overall`-equivalent column exists; every other
/// canonical field degrades to a synthesized or absent source.
pub fn resolve(headers: &[String]) -> Result<ColumnMap, DatasetError> {
    let find = |name: &str| headers.iter().position(|h| h == name);

    // Columns with no alias entry (age, the six role-skill metrics) resolve
    // by canonical name only; the loop below is a no-op for them.
    let aliased = |canonical: &str| -> ColumnSource {
        if let Some(idx) = find(canonical) {
            return ColumnSource::Column(idx);
        }
        let aliases: &[&str] = ALIAS_RULES
            .iter()
            .find(|r| r.canonical == canonical)
            .map(|r| r.aliases)
            .unwrap_or(&[]);
        for &alias in aliases {
            if let Some(idx) = find(alias) {
                return ColumnSource::Column(idx);
            }
        }
        ColumnSource::Absent
    };

    let overall = match aliased("overall") {
        ColumnSource::Absent => {
            return Err(DatasetError::MissingOverall {
                headers: headers.to_vec(),
            })
        }
        source => source,
    };

    let value_eur = match aliased("value_eur") {
        ColumnSource::Absent => match find(MARKET_VALUE_MILLIONS) {
            Some(idx) => ColumnSource::Millions(idx),
            None => ColumnSource::Absent,
        },
        source => source,
    };

    // Every record needs an identifier: fall back to the row index when no
    // name-like column exists at all.
    let short_name = match aliased("short_name") {
        ColumnSource::Absent => ColumnSource::RowIndex,
        source => source,
    };

    Ok(ColumnMap {
        short_name,
        player_positions: aliased("player_positions"),
        age: aliased("age"),
        overall,
        potential: aliased("potential"),
        value_eur,
        wage_eur: aliased("wage_eur"),
        pace: aliased("pace"),
        shooting: aliased("shooting"),
        passing: aliased("passing"),
        dribbling: aliased("dribbling"),
        defending: aliased("defending"),
        physic: aliased("physic"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
