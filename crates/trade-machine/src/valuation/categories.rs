// Team category averages over the top-N ranked roster players.
//
// Shooting percentages are re-derived from summed makes and attempts;
// counting stats are plain means over the selected players.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::round_to;
use crate::stats::normalize::PlayerKey;
use crate::stats::tables::{RankedRow, ShootingSplit, StatTable, TableKind};

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// A scoring category tracked for trade fairness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    FgPct,
    FtPct,
    Threes,
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    Turnovers,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::FgPct,
        Category::FtPct,
        Category::Threes,
        Category::Points,
        Category::Rebounds,
        Category::Assists,
        Category::Steals,
        Category::Blocks,
        Category::Turnovers,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::FgPct => "FG%",
            Category::FtPct => "FT%",
            Category::Threes => "3PM",
            Category::Points => "PTS",
            Category::Rebounds => "REB",
            Category::Assists => "AST",
            Category::Steals => "STL",
            Category::Blocks => "BLK",
            Category::Turnovers => "TO",
        }
    }

    pub fn is_shooting(&self) -> bool {
        matches!(self, Category::FgPct | Category::FtPct)
    }

    /// Display precision: 3 decimals for percentages, 2 elsewhere.
    pub fn decimals(&self) -> u32 {
        if self.is_shooting() {
            3
        } else {
            2
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Averages
// ---------------------------------------------------------------------------

/// One aggregate value per category for a set of players.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryAverages {
    pub fg_pct: f64,
    pub ft_pct: f64,
    pub tpm: f64,
    pub pts: f64,
    pub reb: f64,
    pub ast: f64,
    pub stl: f64,
    pub blk: f64,
    pub to: f64,
    /// How many players fed the averages.
    pub players: usize,
}

impl CategoryAverages {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::FgPct => self.fg_pct,
            Category::FtPct => self.ft_pct,
            Category::Threes => self.tpm,
            Category::Points => self.pts,
            Category::Rebounds => self.reb,
            Category::Assists => self.ast,
            Category::Steals => self.stl,
            Category::Blocks => self.blk,
            Category::Turnovers => self.to,
        }
    }
}

/// The roster's best `n` rows of `table` by rank.
///
/// Ties on rank break by player key. A key appearing twice in the table only
/// counts once (first row wins). Fewer than `n` matches returns them all.
pub fn top_n_rows<'a>(table: &'a StatTable, roster: &HashSet<PlayerKey>, n: usize) -> Vec<&'a RankedRow> {
    let mut seen: HashSet<&PlayerKey> = HashSet::new();
    let mut rows: Vec<&RankedRow> = table
        .rows
        .iter()
        .filter(|r| roster.contains(&r.key) && seen.insert(&r.key))
        .collect();

    rows.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.key.cmp(&b.key)));
    rows.truncate(n);
    rows
}

/// Aggregate a set of stat rows.
pub fn aggregate(rows: &[&RankedRow]) -> CategoryAverages {
    let count = rows.len();
    if count == 0 {
        return CategoryAverages::default();
    }

    let sum = |f: fn(&RankedRow) -> f64| rows.iter().map(|r| f(r)).sum::<f64>();
    let split = |f: fn(&RankedRow) -> ShootingSplit| {
        rows.iter()
            .map(|r| f(r))
            .fold(ShootingSplit::default(), |acc, s| {
                ShootingSplit::new(acc.made + s.made, acc.attempted + s.attempted)
            })
    };
    let mean = |f: fn(&RankedRow) -> f64| sum(f) / count as f64;

    CategoryAverages {
        fg_pct: split(|r| r.line.fg).percentage(),
        ft_pct: split(|r| r.line.ft).percentage(),
        tpm: mean(|r| r.line.tpm),
        pts: mean(|r| r.line.pts),
        reb: mean(|r| r.line.reb),
        ast: mean(|r| r.line.ast),
        stl: mean(|r| r.line.stl),
        blk: mean(|r| r.line.blk),
        to: mean(|r| r.line.to),
        players: count,
    }
}

/// Category averages for a roster's top `n` players in `table`.
///
/// Pure: safe to call repeatedly, in any order, from any thread.
pub fn category_averages(table: &StatTable, roster: &HashSet<PlayerKey>, n: usize) -> CategoryAverages {
    aggregate(&top_n_rows(table, roster, n))
}

// ---------------------------------------------------------------------------
// Before / after comparison
// ---------------------------------------------------------------------------

/// Before/after/diff for one category, at display precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryDelta {
    pub category: Category,
    pub before: f64,
    pub after: f64,
    pub diff: f64,
}

/// Per-category before/after view of one team in one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryComparison {
    pub table: TableKind,
    pub before: CategoryAverages,
    pub after: CategoryAverages,
    pub deltas: Vec<CategoryDelta>,
}

impl CategoryComparison {
    pub fn delta(&self, category: Category) -> Option<&CategoryDelta> {
        self.deltas.iter().find(|d| d.category == category)
    }
}

/// Compare two sets of averages. Values are rounded before the diff so the
/// diff matches what is displayed.
pub fn compare(table: TableKind, before: CategoryAverages, after: CategoryAverages) -> CategoryComparison {
    let deltas = Category::ALL
        .iter()
        .map(|&category| {
            let decimals = category.decimals();
            let b = round_to(before.get(category), decimals);
            let a = round_to(after.get(category), decimals);
            CategoryDelta {
                category,
                before: b,
                after: a,
                diff: round_to(a - b, decimals),
            }
        })
        .collect();

    CategoryComparison {
        table,
        before,
        after,
        deltas,
    }
}

/// Compare a team's current roster with its post-trade roster in one table.
pub fn compare_rosters(
    kind: TableKind,
    table: &StatTable,
    before: &HashSet<PlayerKey>,
    after: &HashSet<PlayerKey>,
    n: usize,
) -> CategoryComparison {
    compare(
        kind,
        category_averages(table, before, n),
        category_averages(table, after, n),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
