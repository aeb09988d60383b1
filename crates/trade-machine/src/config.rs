// Configuration loading and parsing (league.toml, trade.toml).

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub averages: AveragesConfig,
    pub db_path: String,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    /// Monday of week 1.
    pub season_start: NaiveDate,
    /// Label shown for players not on any fantasy roster.
    #[serde(default = "default_free_agent_label")]
    pub free_agent_label: String,
    /// Roster-source spellings mapped to ranking-source spellings, applied
    /// before name normalization.
    #[serde(default)]
    pub name_corrections: HashMap<String, String>,
}

fn default_free_agent_label() -> String {
    "Free Agent".into()
}

// ---------------------------------------------------------------------------
// trade.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire trade.toml file.
#[derive(Debug, Clone, Deserialize)]
struct TradeFile {
    averages: AveragesConfig,
    database: DatabaseSection,
    data_paths: DataPaths,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AveragesConfig {
    /// How many of a team's best-ranked players feed the category averages.
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub season: String,
    pub projection: String,
    pub last_14: String,
    pub last_30: String,
    pub injuries: String,
    pub rosters_dir: String,
    pub history_dir: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/trade.toml`, relative to the given `base_dir`.
///
/// Does not copy defaults; `load_config()` does.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    let trade_path = config_dir.join("trade.toml");
    let trade_text = read_file(&trade_path)?;
    let trade_file: TradeFile =
        toml::from_str(&trade_text).map_err(|e| ConfigError::ParseError {
            path: trade_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        averages: trade_file.averages,
        db_path: trade_file.database.path,
        data_paths: trade_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Files read from `config/`, each seeded from `defaults/` on first run.
const CONFIG_FILES: [&str; 2] = ["league.toml", "trade.toml"];

/// Copy every config file missing from `config/` out of `defaults/`. Files
/// already in `config/` are left alone. Returns the paths that were created.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    let missing: Vec<&str> = CONFIG_FILES
        .into_iter()
        .filter(|name| !config_dir.join(name).exists())
        .collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut copied = Vec::with_capacity(missing.len());
    for name in missing {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);

        let mut src = std::fs::File::open(&source).map_err(|e| {
            copy_error(format!(
                "config/{name} is missing and no default could be read from {}: {e}",
                source.display()
            ))
        })?;
        let mut dest = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|e| copy_error(format!("cannot create {}: {e}", target.display())))?;
        std::io::copy(&mut src, &mut dest)
            .map_err(|e| copy_error(format!("cannot write {}: {e}", target.display())))?;

        copied.push(target);
    }

    Ok(copied)
}

/// Loads config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn copy_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.league.name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.name".into(),
            message: "must not be empty".into(),
        });
    }

    if config.league.free_agent_label.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "league.free_agent_label".into(),
            message: "must not be empty".into(),
        });
    }

    if config.averages.top_n == 0 {
        return Err(ConfigError::ValidationError {
            field: "averages.top_n".into(),
            message: "must be > 0".into(),
        });
    }

    let paths = &config.data_paths;
    let path_fields: &[(&str, &str)] = &[
        ("data_paths.season", &paths.season),
        ("data_paths.projection", &paths.projection),
        ("data_paths.last_14", &paths.last_14),
        ("data_paths.last_30", &paths.last_30),
        ("data_paths.injuries", &paths.injuries),
        ("data_paths.rosters_dir", &paths.rosters_dir),
        ("data_paths.history_dir", &paths.history_dir),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
