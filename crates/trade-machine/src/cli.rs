// Command-line interface definitions.

use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::valuation::trade::{InjuryAdjustment, TradeSide};

/// Fantasy basketball trade machine.
#[derive(Parser, Debug)]
#[command(name = "trade-machine")]
#[command(version)]
#[command(about = "Score players and evaluate fantasy basketball trades", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Evaluate as of this date instead of today (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub date: Option<NaiveDate>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a trade between two fantasy teams
    Evaluate {
        /// First team
        #[arg(long)]
        team_a: String,
        /// Second team
        #[arg(long)]
        team_b: String,
        /// Player sent by the first team, as `Name` or `Name:-1` / `Name:-2`
        /// for a short- or long-term injury (repeatable)
        #[arg(long = "a", value_name = "PLAYER")]
        a: Vec<PlayerSpec>,
        /// Player sent by the second team (repeatable)
        #[arg(long = "b", value_name = "PLAYER")]
        b: Vec<PlayerSpec>,
        /// Override the season week
        #[arg(long)]
        week: Option<u32>,
        /// Also print before/after category averages
        #[arg(long)]
        averages: bool,
    },

    /// Rank every player by blended score
    Scores {
        /// Only show the top N
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List injured players
    Injuries,

    /// List fantasy teams and their rosters
    Teams,

    /// Record today's scores in the history database and as a dated CSV
    Snapshot,

    /// Show a player's score history, or list recorded snapshot dates
    History {
        /// Player name; without it, only the snapshot dates are listed
        #[arg(long)]
        player: Option<String>,
        /// Import dated score files from the history directory first
        #[arg(long)]
        import: bool,
    },
}

/// A traded player with an optional injury adjustment suffix.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSpec {
    pub name: String,
    pub adjustment: InjuryAdjustment,
}

impl FromStr for PlayerSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, adjustment) = match s.rsplit_once(':') {
            Some((name, suffix)) => match suffix.parse::<InjuryAdjustment>() {
                Ok(adj) => (name, adj),
                Err(e) => return Err(e.to_string()),
            },
            None => (s, InjuryAdjustment::None),
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("missing player name in `{s}`"));
        }
        Ok(PlayerSpec {
            name: name.to_string(),
            adjustment,
        })
    }
}

/// Build one side of a trade request from parsed player arguments.
pub fn trade_side(team: &str, specs: &[PlayerSpec]) -> TradeSide {
    specs
        .iter()
        .fold(TradeSide::new(team), |side, p| side.with_player(&p.name, p.adjustment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_player_specs() {
        assert_eq!(
            "Jalen Brunson".parse::<PlayerSpec>(),
            Ok(PlayerSpec {
                name: "Jalen Brunson".into(),
                adjustment: InjuryAdjustment::None
            })
        );
        assert_eq!(
            "Joel Embiid:-2".parse::<PlayerSpec>().unwrap().adjustment,
            InjuryAdjustment::LongTerm
        );
        assert_eq!(
            "Zion Williamson:short".parse::<PlayerSpec>().unwrap().adjustment,
            InjuryAdjustment::ShortTerm
        );
        assert!("Someone:-5".parse::<PlayerSpec>().is_err());
        assert!(":-1".parse::<PlayerSpec>().is_err());
    }

    #[test]
    fn parses_evaluate_command() {
        let cli = Cli::try_parse_from([
            "trade-machine",
            "evaluate",
            "--team-a",
            "Alpha",
            "--team-b",
            "Beta",
            "--a",
            "Player X",
            "--b",
            "Player Y:-1",
            "--week",
            "10",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Evaluate { team_a, b, week, .. } => {
                assert_eq!(team_a, "Alpha");
                assert_eq!(week, Some(10));
                let side = trade_side("Beta", &b);
                assert_eq!(side.players, vec!["Player Y"]);
                assert_eq!(side.adjustments, vec![InjuryAdjustment::ShortTerm]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn history_player_is_optional() {
        let cli = Cli::try_parse_from(["trade-machine", "history", "--import"]).unwrap();
        match cli.command {
            Commands::History { player, import } => {
                assert_eq!(player, None);
                assert!(import);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["trade-machine", "history", "--player", "OG Anunoby"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History { player: Some(ref p), import: false } if p == "OG Anunoby"
        ));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
