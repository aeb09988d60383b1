// Statistics tables: one ranking table per time window.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::normalize::PlayerKey;

// ---------------------------------------------------------------------------
// Shooting splits and stat lines
// ---------------------------------------------------------------------------

/// Made/attempted pair for a shooting category (FG or FT).
///
/// Percentages are never stored: team aggregation re-derives them from summed
/// makes and attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShootingSplit {
    pub made: f64,
    pub attempted: f64,
}

impl ShootingSplit {
    pub fn new(made: f64, attempted: f64) -> Self {
        ShootingSplit { made, attempted }
    }

    /// Made / attempted, or 0.0 when there are no attempts.
    pub fn percentage(&self) -> f64 {
        if self.attempted <= 0.0 {
            0.0
        } else {
            self.made / self.attempted
        }
    }
}

/// Per-game category values for one player in one table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub fg: ShootingSplit,
    pub ft: ShootingSplit,
    pub tpm: f64,
    pub pts: f64,
    pub reb: f64,
    pub ast: f64,
    pub stl: f64,
    pub blk: f64,
    pub to: f64,
}

// ---------------------------------------------------------------------------
// Ranking rows and tables
// ---------------------------------------------------------------------------

/// The time window a ranking table covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TableKind {
    /// Current full-season averages.
    Season,
    /// Rest-of-season projections.
    Projection,
    Last14,
    Last30,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::Season,
        TableKind::Projection,
        TableKind::Last14,
        TableKind::Last30,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TableKind::Season => "Regular Season",
            TableKind::Projection => "Rest of Season Projections",
            TableKind::Last14 => "Last 14 Days",
            TableKind::Last30 => "Last 30 Days",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One player's row in a ranking table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub name: String,
    pub key: PlayerKey,
    /// 1-based position in the table; lower is better.
    pub rank: u32,
    pub line: StatLine,
    /// Overall fantasy value for this window.
    pub total: Option<f64>,
}

/// A ranking table for a single time window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatTable {
    pub rows: Vec<RankedRow>,
}

impl StatTable {
    pub fn new(rows: Vec<RankedRow>) -> Self {
        StatTable { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Map of player key to the table's `TOTAL` value. The first occurrence of
    /// a key wins.
    pub fn totals(&self) -> HashMap<&PlayerKey, f64> {
        let mut map = HashMap::with_capacity(self.rows.len());
        for row in &self.rows {
            if let Some(total) = row.total {
                map.entry(&row.key).or_insert(total);
            }
        }
        map
    }
}

/// The four statistics tables a trade evaluation reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatTables {
    pub season: StatTable,
    pub projection: StatTable,
    pub last_14: StatTable,
    pub last_30: StatTable,
}

impl StatTables {
    pub fn get(&self, kind: TableKind) -> &StatTable {
        match kind {
            TableKind::Season => &self.season,
            TableKind::Projection => &self.projection,
            TableKind::Last14 => &self.last_14,
            TableKind::Last30 => &self.last_30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, rank: u32, total: Option<f64>) -> RankedRow {
        RankedRow {
            name: name.into(),
            key: PlayerKey::new(name),
            rank,
            line: StatLine::default(),
            total,
        }
    }

    #[test]
    fn zero_attempts_is_zero_percent() {
        assert_eq!(ShootingSplit::new(0.0, 0.0).percentage(), 0.0);
        assert!((ShootingSplit::new(4.5, 10.0).percentage() - 0.45).abs() < 1e-12);
    }

    #[test]
    fn totals_skip_missing_and_keep_first() {
        let table = StatTable::new(vec![
            row("Jayson Tatum", 1, Some(8.5)),
            row("Jaylen Brown", 2, None),
            row("Jayson Tatum", 3, Some(1.0)),
        ]);
        let totals = table.totals();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&PlayerKey::new("jayson tatum")], 8.5);
    }

    #[test]
    fn lookup_by_kind() {
        let tables = StatTables {
            last_30: StatTable::new(vec![row("Trae Young", 1, Some(4.0))]),
            ..Default::default()
        };
        assert_eq!(tables.get(TableKind::Last30).len(), 1);
        assert!(tables.get(TableKind::Season).is_empty());
        assert_eq!(tables.get(TableKind::Last30).totals().get(&PlayerKey::new("Trae Young")), Some(&4.0));
    }
}
