// Player record store: scores, fantasy team, injury info per player.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::injuries::{InjuryInfo, InjuryReport};
use super::roster::RosterAssignment;
use crate::stats::normalize::PlayerKey;
use crate::stats::tables::StatTables;

/// One player's valuation inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub key: PlayerKey,
    /// Current full-season fantasy value.
    pub regular_score: f64,
    /// Rest-of-season projected fantasy value.
    pub projection_score: f64,
    pub recent_14_score: Option<f64>,
    pub recent_30_score: Option<f64>,
    /// Fantasy team, `None` when unrostered.
    pub team: Option<String>,
    #[serde(default)]
    pub injury: InjuryInfo,
}

impl PlayerRecord {
    pub fn new(name: &str, regular_score: f64, projection_score: f64) -> Self {
        PlayerRecord {
            name: name.to_string(),
            key: PlayerKey::new(name),
            regular_score,
            projection_score,
            recent_14_score: None,
            recent_30_score: None,
            team: None,
            injury: InjuryInfo::healthy(),
        }
    }

    pub fn with_recent(mut self, recent_14: Option<f64>, recent_30: Option<f64>) -> Self {
        self.recent_14_score = recent_14;
        self.recent_30_score = recent_30;
        self
    }

    pub fn with_team(mut self, team: &str) -> Self {
        self.team = Some(team.to_string());
        self
    }

    pub fn is_on_team(&self, team: &str) -> bool {
        self.team.as_deref() == Some(team)
    }
}

/// All player records for one data load, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PlayerStore {
    records: Vec<PlayerRecord>,
    index: HashMap<PlayerKey, usize>,
}

impl PlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records. Later duplicates of a key are dropped.
    pub fn from_records(records: impl IntoIterator<Item = PlayerRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert a record. Returns `false` (and keeps the existing record) if the
    /// key is already present.
    pub fn insert(&mut self, record: PlayerRecord) -> bool {
        if self.index.contains_key(&record.key) {
            warn!("duplicate player record for '{}', keeping the first", record.name);
            return false;
        }
        self.index.insert(record.key.clone(), self.records.len());
        self.records.push(record);
        true
    }

    /// Merge the four ranking tables into score records.
    ///
    /// Regular and projection scores come from the season and projection
    /// tables' `TOTAL` column (0 when the player is missing from one of them).
    /// Recent scores come from the 14/30-day tables and stay `None` when the
    /// player has no row there.
    pub fn from_tables(tables: &StatTables) -> Self {
        let season = tables.season.totals();
        let projection = tables.projection.totals();
        let last_14 = tables.last_14.totals();
        let last_30 = tables.last_30.totals();

        let mut store = Self::new();
        let names = tables.season.rows.iter().chain(tables.projection.rows.iter());
        for row in names {
            if store.index.contains_key(&row.key) {
                continue;
            }
            store.insert(PlayerRecord {
                name: row.name.clone(),
                key: row.key.clone(),
                regular_score: season.get(&row.key).copied().unwrap_or(0.0),
                projection_score: projection.get(&row.key).copied().unwrap_or(0.0),
                recent_14_score: last_14.get(&row.key).copied(),
                recent_30_score: last_30.get(&row.key).copied(),
                team: None,
                injury: InjuryInfo::healthy(),
            });
        }

        info!("merged score records for {} players", store.len());
        store
    }

    /// Attach injury info from the report; unreported players are healthy.
    pub fn apply_injuries(&mut self, report: &InjuryReport) {
        for record in &mut self.records {
            record.injury = report
                .get(&record.key)
                .map(|e| e.info.clone())
                .unwrap_or_default();
        }
    }

    /// Set every record's fantasy team from the resolved roster assignment.
    pub fn apply_rosters(&mut self, assignment: &RosterAssignment) {
        for record in &mut self.records {
            record.team = assignment.team_of(&record.key).map(str::to_string);
        }
    }

    /// Look up a player by raw (unnormalized) name.
    pub fn get(&self, name: &str) -> Option<&PlayerRecord> {
        self.get_key(&PlayerKey::new(name))
    }

    pub fn get_key(&self, key: &PlayerKey) -> Option<&PlayerRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn contains(&self, key: &PlayerKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted, de-duplicated fantasy team names (unrostered players excluded).
    pub fn teams(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.team.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records on a fantasy team, in store order.
    pub fn roster(&self, team: &str) -> Vec<&PlayerRecord> {
        self.records.iter().filter(|r| r.is_on_team(team)).collect()
    }

    pub fn roster_keys(&self, team: &str) -> HashSet<PlayerKey> {
        self.roster(team).into_iter().map(|r| r.key.clone()).collect()
    }

    /// Players whose injury is anything other than healthy.
    pub fn injured(&self) -> Vec<&PlayerRecord> {
        self.records.iter().filter(|r| !r.injury.is_healthy()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::injuries::InjuryEntry;
    use crate::stats::tables::{RankedRow, StatLine, StatTable};

    fn row(name: &str, rank: u32, total: f64) -> RankedRow {
        RankedRow {
            name: name.into(),
            key: PlayerKey::new(name),
            rank,
            line: StatLine::default(),
            total: Some(total),
        }
    }

    fn tables() -> StatTables {
        StatTables {
            season: StatTable::new(vec![row("Tyrese Haliburton", 1, 6.0), row("Pascal Siakam", 2, 4.0)]),
            projection: StatTable::new(vec![row("Pascal Siakam", 1, 5.0), row("Bennedict Mathurin", 2, 1.5)]),
            last_14: StatTable::new(vec![row("Tyrese Haliburton", 1, 7.5)]),
            last_30: StatTable::new(vec![row("Pascal Siakam", 1, 3.5)]),
        }
    }

    #[test]
    fn merges_tables_outer_join() {
        let store = PlayerStore::from_tables(&tables());
        assert_eq!(store.len(), 3);

        let hali = store.get("Tyrese Haliburton").unwrap();
        assert_eq!(hali.regular_score, 6.0);
        assert_eq!(hali.projection_score, 0.0);
        assert_eq!(hali.recent_14_score, Some(7.5));
        assert_eq!(hali.recent_30_score, None);

        let siakam = store.get("pascal siakam").unwrap();
        assert_eq!(siakam.regular_score, 4.0);
        assert_eq!(siakam.projection_score, 5.0);
        assert_eq!(siakam.recent_30_score, Some(3.5));

        let mathurin = store.get("Bennedict Mathurin").unwrap();
        assert_eq!(mathurin.regular_score, 0.0);
        assert_eq!(mathurin.projection_score, 1.5);
    }

    #[test]
    fn insertion_order_is_kept_and_duplicates_dropped() {
        let store = PlayerStore::from_records(vec![
            PlayerRecord::new("B Player", 3.0, 3.0),
            PlayerRecord::new("A Player", 4.0, 4.0),
            PlayerRecord::new("b player", 9.0, 9.0),
        ]);
        let names: Vec<&str> = store.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B Player", "A Player"]);
        assert_eq!(store.get("B PLAYER").unwrap().regular_score, 3.0);
    }

    #[test]
    fn teams_and_rosters() {
        let store = PlayerStore::from_records(vec![
            PlayerRecord::new("One", 5.0, 5.0).with_team("Zebras"),
            PlayerRecord::new("Two", 5.0, 5.0).with_team("Antelopes"),
            PlayerRecord::new("Three", 5.0, 5.0).with_team("Zebras"),
            PlayerRecord::new("Four", 5.0, 5.0),
        ]);
        assert_eq!(store.teams(), vec!["Antelopes".to_string(), "Zebras".to_string()]);
        let zebras: Vec<&str> = store.roster("Zebras").iter().map(|r| r.name.as_str()).collect();
        assert_eq!(zebras, vec!["One", "Three"]);
        assert!(store.roster_keys("Zebras").contains(&PlayerKey::new("three")));
        assert!(store.roster("Nobody").is_empty());
    }

    #[test]
    fn injuries_are_applied() {
        let mut store = PlayerStore::from_tables(&tables());
        let report = InjuryReport::new(vec![InjuryEntry {
            name: "Tyrese Haliburton".into(),
            key: PlayerKey::new("Tyrese Haliburton"),
            team: "IND".into(),
            position: "PG".into(),
            info: InjuryInfo {
                injury: "Hamstring".into(),
                status: "Out".into(),
            },
        }]);
        store.apply_injuries(&report);

        let injured: Vec<&str> = store.injured().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(injured, vec!["Tyrese Haliburton"]);
        assert!(store.get("Pascal Siakam").unwrap().injury.is_healthy());
    }
}
