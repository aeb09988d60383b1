// Valuation engine: blended player scores, category averages, trade fairness.

pub mod categories;
pub mod report;
pub mod score;
pub mod trade;

use thiserror::Error;

/// Lowest score a rostered player (or an empty slot) can be worth.
pub const SCORE_FLOOR: f64 = 2.0;

/// Value of a synthetic empty slot used to even out unequal trades.
pub const EMPTY_SLOT_SCORE: f64 = SCORE_FLOOR;

/// Assumed regular-season length in weeks; the projection/regular blend
/// reaches full weight on the regular score at this week.
pub const SEASON_WEEKS: u32 = 20;

/// Minimum fairness ratio for a trade to be approved.
pub const APPROVAL_THRESHOLD: f64 = 0.80;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValuationError {
    #[error("player not found: {name}")]
    PlayerNotFound { name: String },

    #[error("invalid data for player {name}: `{field}` is missing or not a number")]
    InvalidPlayerData { name: String, field: &'static str },

    #[error(transparent)]
    Validation(#[from] TradeValidation),
}

/// A trade request that cannot be evaluated. These are expected outcomes
/// reported back to the user, not crashes.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TradeValidation {
    #[error("the following player(s) are selected more than once: {}", .names.join(", "))]
    DuplicatePlayer { names: Vec<String> },

    #[error("select players for at least one team to evaluate a trade")]
    EmptyTrade,

    #[error("not enough teams available for trade evaluation ({available} found)")]
    NotEnoughTeams { available: usize },

    #[error("select two different teams for the trade (both are {team})")]
    SameTeam { team: String },

    #[error("unknown team: {team}")]
    UnknownTeam { team: String },

    #[error("{player} is not on {team}'s roster")]
    PlayerNotOnTeam { player: String, team: String },

    #[error("{team} has {players} player(s) but {adjustments} injury adjustment(s)")]
    InjuryCountMismatch {
        team: String,
        players: usize,
        adjustments: usize,
    },

    #[error("{team} has a total score of zero; both teams must have at least one player")]
    ZeroTotal { team: String },
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round to a fixed number of decimal places.
///
/// Exact halves round away from zero (`f64::round`), so 5 vs 8 shows as
/// 0.63 rather than the banker's 0.62. Only displayed values differ: the
/// approval check compares against 0.80, which no half-way ratio straddles.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Apply the score floor.
pub fn floored(score: f64) -> f64 {
    score.max(SCORE_FLOOR)
}
