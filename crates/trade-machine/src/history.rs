// SQLite persistence for dated player score snapshots.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::league::store::PlayerStore;
use crate::stats::normalize::PlayerKey;

const FILE_PREFIX: &str = "Player_Scores_";
const FILE_DATE_FORMAT: &str = "%d_%m_%Y";
const DB_DATE_FORMAT: &str = "%Y-%m-%d";

/// One player's scores on one snapshot date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorePoint {
    pub date: NaiveDate,
    pub name: String,
    pub regular: f64,
    pub projection: f64,
}

/// Outcome of importing a directory of dated score files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub files: usize,
    pub rows: usize,
    pub skipped: Vec<PathBuf>,
}

/// SQLite-backed history of per-player regular/projection scores.
pub struct ScoreHistory {
    conn: Mutex<Connection>,
}

impl ScoreHistory {
    /// Open (or create) the history database at `path`. `":memory:"` gives
    /// an in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS score_snapshots (
                snapshot_date TEXT NOT NULL,
                player_key    TEXT NOT NULL,
                player_name   TEXT NOT NULL,
                regular       REAL NOT NULL,
                projection    REAL NOT NULL,
                PRIMARY KEY (snapshot_date, player_key)
            );

            CREATE INDEX IF NOT EXISTS idx_score_snapshots_player
                ON score_snapshots(player_key);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record every player's current scores under `date`. Re-recording a date
    /// overwrites that date's rows. Returns the number of rows written.
    pub fn record_snapshot(&self, date: NaiveDate, store: &PlayerStore) -> Result<usize> {
        let rows: Vec<ScorePoint> = store
            .iter()
            .map(|r| ScorePoint {
                date,
                name: r.name.clone(),
                regular: r.regular_score,
                projection: r.projection_score,
            })
            .collect();
        self.insert_points(&rows)
    }

    fn insert_points(&self, points: &[ScorePoint]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO score_snapshots
                        (snapshot_date, player_key, player_name, regular, projection)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .context("failed to prepare snapshot insert")?;
            for p in points {
                stmt.execute(params![
                    p.date.format(DB_DATE_FORMAT).to_string(),
                    PlayerKey::new(&p.name).as_str(),
                    p.name,
                    p.regular,
                    p.projection,
                ])
                .with_context(|| format!("failed to record score for {}", p.name))?;
            }
        }
        tx.commit().context("failed to commit snapshot")?;
        Ok(points.len())
    }

    /// A player's scores over time, oldest first. Lookup is by normalized name.
    pub fn player_history(&self, name: &str) -> Result<Vec<ScorePoint>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT snapshot_date, player_name, regular, projection
                 FROM score_snapshots WHERE player_key = ?1 ORDER BY snapshot_date",
            )
            .context("failed to prepare player_history query")?;

        let rows = stmt
            .query_map(params![PlayerKey::new(name).as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            })
            .context("failed to query score history")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map score history rows")?;

        rows.into_iter()
            .map(|(date, name, regular, projection)| {
                let date = NaiveDate::parse_from_str(&date, DB_DATE_FORMAT)
                    .with_context(|| format!("bad snapshot date in database: {date}"))?;
                Ok(ScorePoint {
                    date,
                    name,
                    regular,
                    projection,
                })
            })
            .collect()
    }

    /// All recorded snapshot dates, oldest first.
    pub fn snapshot_dates(&self) -> Result<Vec<NaiveDate>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT DISTINCT snapshot_date FROM score_snapshots ORDER BY snapshot_date")
            .context("failed to prepare snapshot_dates query")?;
        let dates = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .context("failed to query snapshot dates")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map snapshot date rows")?;

        dates
            .iter()
            .map(|d| {
                NaiveDate::parse_from_str(d, DB_DATE_FORMAT)
                    .with_context(|| format!("bad snapshot date in database: {d}"))
            })
            .collect()
    }

    /// Import every `Player_Scores_DD_MM_YYYY.csv` file in `dir`.
    ///
    /// Files whose name carries no valid date, or that cannot be read, are
    /// skipped with a warning. Rows without numeric scores are dropped.
    pub fn import_dir(&self, dir: &Path) -> Result<ImportSummary> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read history directory {}", dir.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(FILE_PREFIX) && n.ends_with(".csv"))
            })
            .collect();
        paths.sort();

        let mut summary = ImportSummary::default();
        for path in paths {
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let Some(date) = parse_snapshot_date(file_name) else {
                warn!("no valid date in history file name {}, skipping", path.display());
                summary.skipped.push(path);
                continue;
            };

            let points = match std::fs::File::open(&path)
                .map_err(anyhow::Error::from)
                .and_then(|f| load_points_from_reader(date, f))
            {
                Ok(points) => points,
                Err(e) => {
                    warn!("failed to read history file {}: {}", path.display(), e);
                    summary.skipped.push(path);
                    continue;
                }
            };

            summary.rows += self.insert_points(&points)?;
            summary.files += 1;
        }

        info!(
            "imported {} score rows from {} history files ({} skipped)",
            summary.rows,
            summary.files,
            summary.skipped.len()
        );
        Ok(summary)
    }
}

/// Date encoded in a `Player_Scores_DD_MM_YYYY.csv` file name.
pub fn parse_snapshot_date(file_name: &str) -> Option<NaiveDate> {
    let stem = file_name.strip_prefix(FILE_PREFIX)?.strip_suffix(".csv")?;
    NaiveDate::parse_from_str(stem, FILE_DATE_FORMAT).ok()
}

/// File name for a snapshot taken on `date`.
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("{}{}.csv", FILE_PREFIX, date.format(FILE_DATE_FORMAT))
}

#[derive(Debug, Deserialize, Serialize)]
#[allow(non_snake_case)]
struct RawScoreRow {
    #[serde(alias = "Player")]
    Player_Name: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    Regular: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    Projection: Option<f64>,
}

fn load_points_from_reader<R: Read>(date: NaiveDate, rdr: R) -> Result<Vec<ScorePoint>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut points = Vec::new();
    for result in reader.deserialize::<RawScoreRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed score row: {}", e);
                continue;
            }
        };
        match (raw.Regular, raw.Projection) {
            (Some(regular), Some(projection)) if !raw.Player_Name.is_empty() => points.push(ScorePoint {
                date,
                name: raw.Player_Name,
                regular,
                projection,
            }),
            _ => {}
        }
    }
    Ok(points)
}

/// Write the store's scores as `Player_Scores_DD_MM_YYYY.csv` in `dir`.
pub fn write_snapshot_csv(dir: &Path, date: NaiveDate, store: &PlayerStore) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(snapshot_file_name(date));
    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("failed to create {}", path.display()))?;
    for r in store.iter() {
        writer
            .serialize(RawScoreRow {
                Player_Name: r.name.clone(),
                Regular: Some(r.regular_score),
                Projection: Some(r.projection_score),
            })
            .context("failed to write score row")?;
    }
    writer.flush().context("failed to flush score file")?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
