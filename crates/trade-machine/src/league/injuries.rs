// Injury report (RotoWire export).

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::stats::loader::LoadError;
use crate::stats::normalize::PlayerKey;

pub const HEALTHY: &str = "Healthy";
pub const ACTIVE: &str = "Active";

/// Injury details attached to a player. Players missing from the report are
/// `Healthy` / `Active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryInfo {
    pub injury: String,
    pub status: String,
}

impl InjuryInfo {
    pub fn healthy() -> Self {
        InjuryInfo {
            injury: HEALTHY.into(),
            status: ACTIVE.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.injury.eq_ignore_ascii_case(HEALTHY)
    }
}

impl Default for InjuryInfo {
    fn default() -> Self {
        Self::healthy()
    }
}

/// One row of the injury report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryEntry {
    pub name: String,
    pub key: PlayerKey,
    /// NBA team abbreviation.
    pub team: String,
    pub position: String,
    pub info: InjuryInfo,
}

/// Injury report keyed by player.
#[derive(Debug, Clone, Default)]
pub struct InjuryReport {
    entries: HashMap<PlayerKey, InjuryEntry>,
}

impl InjuryReport {
    pub fn new(entries: Vec<InjuryEntry>) -> Self {
        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            if map.contains_key(&entry.key) {
                warn!("duplicate injury entry for '{}', keeping the first", entry.name);
                continue;
            }
            map.insert(entry.key.clone(), entry);
        }
        InjuryReport { entries: map }
    }

    pub fn get(&self, key: &PlayerKey) -> Option<&InjuryEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawInjury {
    Player: String,
    #[serde(default)]
    Team: String,
    #[serde(default)]
    Pos: String,
    #[serde(default)]
    Injury: String,
    #[serde(default)]
    Status: String,
}

/// Team abbreviations the ranking site spells differently.
fn canonical_team(abbr: &str) -> String {
    match abbr {
        "GSW" => "GS",
        "NOP" => "NO",
        "NYK" => "NY",
        "PHX" => "PHO",
        "SAS" => "SA",
        other => other,
    }
    .to_string()
}

fn load_injuries_from_reader<R: Read>(rdr: R) -> Result<InjuryReport, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut entries = Vec::new();

    for result in reader.deserialize::<RawInjury>() {
        match result {
            Ok(raw) => {
                let key = PlayerKey::new(&raw.Player);
                if key.is_empty() {
                    warn!("skipping injury row with empty player name");
                    continue;
                }
                let injury = if raw.Injury.is_empty() {
                    HEALTHY.to_string()
                } else {
                    raw.Injury
                };
                let status = if raw.Status.is_empty() {
                    ACTIVE.to_string()
                } else {
                    raw.Status
                };
                entries.push(InjuryEntry {
                    name: raw.Player,
                    key,
                    team: canonical_team(&raw.Team),
                    position: raw.Pos,
                    info: InjuryInfo { injury, status },
                });
            }
            Err(e) => {
                warn!("skipping malformed injury row: {}", e);
            }
        }
    }

    Ok(InjuryReport::new(entries))
}

/// Load the injury report from a CSV file.
pub fn load_injuries(path: &Path) -> Result<InjuryReport, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_injuries_from_reader(file).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Player,Team,Pos,Injury,Status,Est. Return
Joel Embiid,PHI,C,Knee,Out,2024-12-01
Stephen Curry,GSW,PG,Ankle,Day-To-Day,
Jimmy Butler,MIA,SF,,,";

    #[test]
    fn parses_report_and_fills_blanks() {
        let report = load_injuries_from_reader(REPORT.as_bytes()).unwrap();
        assert_eq!(report.len(), 3);

        let embiid = report.get(&PlayerKey::new("Joel Embiid")).unwrap();
        assert_eq!(embiid.info.injury, "Knee");
        assert_eq!(embiid.info.status, "Out");
        assert!(!embiid.info.is_healthy());

        let butler = report.get(&PlayerKey::new("Jimmy Butler")).unwrap();
        assert!(butler.info.is_healthy());
        assert_eq!(butler.info.status, ACTIVE);
    }

    #[test]
    fn team_abbreviations_are_canonicalized() {
        let report = load_injuries_from_reader(REPORT.as_bytes()).unwrap();
        let curry = report.get(&PlayerKey::new("stephen curry")).unwrap();
        assert_eq!(curry.team, "GS");
    }

    #[test]
    fn duplicate_rows_keep_first() {
        let csv_data = "\
Player,Team,Pos,Injury,Status
Ja Morant,MEM,PG,Shoulder,Out
Ja Morant,MEM,PG,Hip,Day-To-Day";
        let report = load_injuries_from_reader(csv_data.as_bytes()).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.get(&PlayerKey::new("Ja Morant")).unwrap().info.injury, "Shoulder");
    }
}
