// Loaded league data and an atomically swappable handle to it.
//
// Evaluations take an `Arc<DataSnapshot>` and work against it for their whole
// duration. A refresh builds a complete new snapshot and swaps the pointer, so
// readers see either the old data or the new data, never a mix.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::{DataPaths, LeagueConfig};
use crate::league::injuries::{load_injuries, InjuryReport};
use crate::league::roster::{load_rosters, resolve, UnmatchedPlayer};
use crate::league::store::PlayerStore;
use crate::stats::loader::{load_tables, LoadError};
use crate::stats::tables::StatTables;
use crate::valuation::trade::{evaluate_trade, TradeEvaluation, TradeRequest};
use crate::valuation::ValuationError;

/// Everything an evaluation reads, loaded together.
#[derive(Debug, Clone)]
pub struct DataSnapshot {
    pub store: PlayerStore,
    pub tables: StatTables,
    /// Roster names that matched no ranked player.
    pub unmatched: Vec<UnmatchedPlayer>,
    pub loaded_at: DateTime<Utc>,
}

impl DataSnapshot {
    pub fn new(store: PlayerStore, tables: StatTables) -> Self {
        DataSnapshot {
            store,
            tables,
            unmatched: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Load rankings, injuries and rosters and merge them into one snapshot.
    ///
    /// A missing injury report is not an error: everyone is treated as
    /// healthy. A roster file named after the free-agent label is ignored.
    pub fn load(paths: &DataPaths, league: &LeagueConfig) -> Result<Self, LoadError> {
        let tables = load_tables(paths)?;
        let mut store = PlayerStore::from_tables(&tables);

        let injuries_path = Path::new(&paths.injuries);
        let report = if injuries_path.exists() {
            load_injuries(injuries_path)?
        } else {
            warn!("no injury report at {}, assuming everyone is healthy", paths.injuries);
            InjuryReport::default()
        };
        store.apply_injuries(&report);

        let rosters: Vec<_> = load_rosters(Path::new(&paths.rosters_dir))?
            .into_iter()
            .filter(|r| r.team != league.free_agent_label)
            .collect();
        let assignment = resolve(&rosters, &store, &league.name_corrections);
        store.apply_rosters(&assignment);

        info!(
            "snapshot loaded: {} players, {} teams, {} injured",
            store.len(),
            store.teams().len(),
            store.injured().len()
        );

        Ok(DataSnapshot {
            store,
            tables,
            unmatched: assignment.unmatched,
            loaded_at: Utc::now(),
        })
    }

    pub fn evaluate(&self, request: &TradeRequest, top_n: usize) -> Result<TradeEvaluation, ValuationError> {
        evaluate_trade(&self.store, &self.tables, request, top_n)
    }
}

/// Shared, replaceable pointer to the current snapshot.
#[derive(Debug)]
pub struct SnapshotCell {
    current: RwLock<Arc<DataSnapshot>>,
}

impl SnapshotCell {
    pub fn new(snapshot: DataSnapshot) -> Self {
        SnapshotCell {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The current snapshot. Holding the returned `Arc` keeps that snapshot
    /// alive across later replacements.
    pub fn load(&self) -> Arc<DataSnapshot> {
        // The lock only guards a pointer swap, so a poisoned lock still holds
        // a whole snapshot.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Install a new snapshot and return the previous one.
    pub fn replace(&self, snapshot: DataSnapshot) -> Arc<DataSnapshot> {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!("replacing data snapshot loaded at {}", guard.loaded_at);
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::store::PlayerRecord;
    use crate::valuation::trade::{InjuryAdjustment, TradeSide};

    fn snapshot(x_regular: f64) -> DataSnapshot {
        let store = PlayerStore::from_records(vec![
            PlayerRecord::new("Player X", x_regular, x_regular).with_team("Alpha"),
            PlayerRecord::new("Player Y", 5.0, 5.0).with_team("Beta"),
        ]);
        DataSnapshot::new(store, StatTables::default())
    }

    fn request() -> TradeRequest {
        TradeRequest {
            side_a: TradeSide::new("Alpha").with_player("Player X", InjuryAdjustment::None),
            side_b: TradeSide::new("Beta").with_player("Player Y", InjuryAdjustment::None),
            week: 5,
        }
    }

    #[test]
    fn held_snapshot_survives_replace() {
        let cell = SnapshotCell::new(snapshot(5.0));
        let held = cell.load();

        let previous = cell.replace(snapshot(10.0));
        assert!(Arc::ptr_eq(&held, &previous));

        assert_eq!(held.evaluate(&request(), 15).unwrap().ratio, 1.0);
        assert_eq!(cell.load().evaluate(&request(), 15).unwrap().ratio, 0.5);
    }

    #[test]
    fn concurrent_readers_see_whole_snapshots() {
        let cell = SnapshotCell::new(snapshot(5.0));

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let ratio = cell.load().evaluate(&request(), 15).unwrap().ratio;
                        assert!(ratio == 1.0 || ratio == 0.5, "torn ratio {ratio}");
                    }
                });
            }
            s.spawn(|| {
                for i in 0..50 {
                    let regular = if i % 2 == 0 { 10.0 } else { 5.0 };
                    cell.replace(snapshot(regular));
                }
            });
        });
    }
}
