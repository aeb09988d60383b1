// Fantasy roster files and player -> team resolution.
//
// Each fantasy team is one CSV file in the rosters directory; the file stem is
// the team name. Roster names are matched to the player store by normalized
// key after applying the configured name corrections. Names that still don't
// match are reported and left out of every team.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use super::store::PlayerStore;
use crate::stats::loader::LoadError;
use crate::stats::normalize::PlayerKey;

/// One fantasy team's roster as listed by the league provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRoster {
    pub team: String,
    pub players: Vec<String>,
}

/// A roster name that has no counterpart in the player store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedPlayer {
    pub team: String,
    pub name: String,
}

/// Resolved player -> fantasy team mapping.
#[derive(Debug, Clone, Default)]
pub struct RosterAssignment {
    by_player: HashMap<PlayerKey, String>,
    pub unmatched: Vec<UnmatchedPlayer>,
}

impl RosterAssignment {
    pub fn team_of(&self, key: &PlayerKey) -> Option<&str> {
        self.by_player.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_player.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_player.is_empty()
    }
}

/// Match roster names against the store.
///
/// `corrections` maps roster spellings to ranking spellings and is applied to
/// the raw name first. A player listed on two rosters stays with the first
/// team encountered.
pub fn resolve(
    rosters: &[TeamRoster],
    store: &PlayerStore,
    corrections: &HashMap<String, String>,
) -> RosterAssignment {
    let mut assignment = RosterAssignment::default();

    for roster in rosters {
        for name in &roster.players {
            let corrected = corrections.get(name.trim()).map_or(name.as_str(), String::as_str);
            let key = PlayerKey::new(corrected);

            if !store.contains(&key) {
                assignment.unmatched.push(UnmatchedPlayer {
                    team: roster.team.clone(),
                    name: name.clone(),
                });
                continue;
            }

            if let Some(existing) = assignment.by_player.get(&key) {
                warn!(
                    "'{}' is listed on both '{}' and '{}', keeping '{}'",
                    name, existing, roster.team, existing
                );
                continue;
            }
            assignment.by_player.insert(key, roster.team.clone());
        }
    }

    if !assignment.unmatched.is_empty() {
        warn!(
            "{} roster player(s) could not be matched and are excluded from trades",
            assignment.unmatched.len()
        );
    }
    info!("assigned {} players to fantasy teams", assignment.len());

    assignment
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawRosterRow {
    #[serde(alias = "Name", alias = "Player_Name")]
    Player: String,
}

fn load_roster_from_reader<R: Read>(team: &str, rdr: R) -> Result<TeamRoster, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawRosterRow>() {
        match result {
            Ok(raw) if !raw.Player.is_empty() => players.push(raw.Player),
            Ok(_) => {}
            Err(e) => warn!("skipping malformed roster row for '{}': {}", team, e),
        }
    }
    Ok(TeamRoster {
        team: team.to_string(),
        players,
    })
}

/// Load every `*.csv` roster file in `dir`, sorted by team name.
pub fn load_rosters(dir: &Path) -> Result<Vec<TeamRoster>, LoadError> {
    let io_err = |source: std::io::Error| LoadError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut rosters = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Some(team) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let file = std::fs::File::open(&path).map_err(|e| LoadError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let roster = load_roster_from_reader(team, file).map_err(|e| LoadError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
        rosters.push(roster);
    }

    rosters.sort_by(|a, b| a.team.cmp(&b.team));
    Ok(rosters)
}
