// Ranking table loading.
//
// Reads Hashtag-Basketball style ranking exports. Shooting columns arrive
// either as a combined string (`"0.450 (9.0/20.0)"`) or as a percentage plus a
// separate `FGA`/`FTA` column holding `"made/attempted"`. Rank is the row's
// position in the file.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use super::normalize::PlayerKey;
use super::tables::{RankedRow, ShootingSplit, StatLine, StatTable, StatTables};
use crate::config::DataPaths;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// One ranking row as exported. Extra columns (R#, POS, TEAM, GP, MPG, ...)
/// are ignored.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawRankingRow {
    #[serde(alias = "Player_Name", alias = "Player")]
    PLAYER: String,
    #[serde(rename = "FG%", default)]
    fg_pct: String,
    #[serde(default)]
    FGA: Option<String>,
    #[serde(rename = "FT%", default)]
    ft_pct: String,
    #[serde(default)]
    FTA: Option<String>,
    #[serde(rename = "3PM", default, deserialize_with = "csv::invalid_option")]
    tpm: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    PTS: Option<f64>,
    #[serde(alias = "REB", default, deserialize_with = "csv::invalid_option")]
    TREB: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    AST: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    STL: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    BLK: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    TO: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    TOTAL: Option<f64>,
}

// ---------------------------------------------------------------------------
// Shooting split parsing
// ---------------------------------------------------------------------------

/// Parse a `"made/attempted"` pair.
fn parse_pair(s: &str) -> Option<ShootingSplit> {
    let (made, attempted) = s.trim().split_once('/')?;
    let made: f64 = made.trim().parse().ok()?;
    let attempted: f64 = attempted.trim().parse().ok()?;
    if !(made.is_finite() && attempted.is_finite()) || made < 0.0 || attempted < 0.0 {
        return None;
    }
    Some(ShootingSplit::new(made, attempted))
}

/// Parse a shooting column.
///
/// Accepts `"0.450 (9.0/20.0)"`, or a bare percentage together with a
/// separate `"9.0/20.0"` pair column. Returns `None` if neither form yields a
/// pair.
pub fn parse_shooting(pct: &str, pair: Option<&str>) -> Option<ShootingSplit> {
    if let Some(open) = pct.find('(') {
        let close = pct[open..].find(')')? + open;
        return parse_pair(&pct[open + 1..close]);
    }
    pair.and_then(parse_pair)
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_table_from_reader<R: Read>(rdr: R) -> Result<StatTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut rows = Vec::new();

    for result in reader.deserialize::<RawRankingRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed ranking row: {}", e);
                continue;
            }
        };

        let name = raw.PLAYER.trim().to_string();
        // Exports repeat the header row every few dozen players.
        if name.is_empty() || name == "PLAYER" {
            continue;
        }
        let key = PlayerKey::new(&name);
        if key.is_empty() {
            warn!("skipping ranking row '{}': name normalizes to nothing", name);
            continue;
        }

        let fg = parse_shooting(&raw.fg_pct, raw.FGA.as_deref()).unwrap_or_else(|| {
            warn!("unparseable FG split for '{}': {:?}", name, raw.fg_pct);
            ShootingSplit::default()
        });
        let ft = parse_shooting(&raw.ft_pct, raw.FTA.as_deref()).unwrap_or_else(|| {
            warn!("unparseable FT split for '{}': {:?}", name, raw.ft_pct);
            ShootingSplit::default()
        });

        let counting = [raw.tpm, raw.PTS, raw.TREB, raw.AST, raw.STL, raw.BLK, raw.TO];
        if counting.iter().any(|v| v.is_none()) {
            warn!("'{}' has missing counting stats; treating them as 0", name);
        }
        let [tpm, pts, reb, ast, stl, blk, to] = counting.map(|v| v.unwrap_or(0.0));

        rows.push(RankedRow {
            name,
            key,
            rank: rows.len() as u32 + 1,
            line: StatLine {
                fg,
                ft,
                tpm,
                pts,
                reb,
                ast,
                stl,
                blk,
                to,
            },
            total: raw.TOTAL.filter(|t| t.is_finite()),
        });
    }

    Ok(StatTable::new(rows))
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load one ranking table from a CSV file.
pub fn load_table(path: &Path) -> Result<StatTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_table_from_reader(file).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load all four ranking tables from the configured paths.
///
/// The season and projection tables are required to be non-empty; the recent
/// windows may be empty.
pub fn load_tables(paths: &DataPaths) -> Result<StatTables, LoadError> {
    let season = load_table(Path::new(&paths.season))?;
    let projection = load_table(Path::new(&paths.projection))?;
    let last_14 = load_table(Path::new(&paths.last_14))?;
    let last_30 = load_table(Path::new(&paths.last_30))?;

    if season.is_empty() {
        return Err(LoadError::Validation(
            "season ranking CSV produced zero valid rows".into(),
        ));
    }
    if projection.is_empty() {
        return Err(LoadError::Validation(
            "projection ranking CSV produced zero valid rows".into(),
        ));
    }

    Ok(StatTables {
        season,
        projection,
        last_14,
        last_30,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
