// Trade evaluation: adjusted scores, team totals, fairness ratios, and
// before/after category projections for a two-team player swap.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use super::categories::{compare_rosters, CategoryComparison};
use super::score::blended_score;
use super::{floored, round_to, TradeValidation, ValuationError, APPROVAL_THRESHOLD, EMPTY_SLOT_SCORE};
use crate::league::store::{PlayerRecord, PlayerStore};
use crate::stats::normalize::PlayerKey;
use crate::stats::tables::{StatTables, TableKind};

// ---------------------------------------------------------------------------
// Injury adjustment
// ---------------------------------------------------------------------------

/// Flat score penalty for a traded player's injury.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum InjuryAdjustment {
    #[default]
    None,
    /// Out for up to about four weeks.
    ShortTerm,
    /// Out indefinitely.
    LongTerm,
}

impl InjuryAdjustment {
    pub fn value(&self) -> f64 {
        match self {
            InjuryAdjustment::None => 0.0,
            InjuryAdjustment::ShortTerm => -1.0,
            InjuryAdjustment::LongTerm => -2.0,
        }
    }

    pub fn note(&self) -> Option<&'static str> {
        match self {
            InjuryAdjustment::None => None,
            InjuryAdjustment::ShortTerm => Some("IL - Until 4 Weeks"),
            InjuryAdjustment::LongTerm => Some("IL - Indefinitely"),
        }
    }
}

impl fmt::Display for InjuryAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value() as i32)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid injury adjustment `{0}` (expected 0, -1 or -2)")]
pub struct ParseAdjustmentError(pub String);

impl TryFrom<i32> for InjuryAdjustment {
    type Error = ParseAdjustmentError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(InjuryAdjustment::None),
            -1 => Ok(InjuryAdjustment::ShortTerm),
            -2 => Ok(InjuryAdjustment::LongTerm),
            other => Err(ParseAdjustmentError(other.to_string())),
        }
    }
}

impl FromStr for InjuryAdjustment {
    type Err = ParseAdjustmentError;

    /// Accepts the numeric form (`0`, `-1`, `-2`) or `none` / `short` / `long`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "none" => Ok(InjuryAdjustment::None),
            "-1" | "short" => Ok(InjuryAdjustment::ShortTerm),
            "-2" | "long" => Ok(InjuryAdjustment::LongTerm),
            _ => Err(ParseAdjustmentError(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One team's side of a proposed trade: the players it gives away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeSide {
    pub team: String,
    pub players: Vec<String>,
    /// Aligned positionally with `players`.
    pub adjustments: Vec<InjuryAdjustment>,
}

impl TradeSide {
    pub fn new(team: &str) -> Self {
        TradeSide {
            team: team.to_string(),
            ..Default::default()
        }
    }

    pub fn with_player(mut self, name: &str, adjustment: InjuryAdjustment) -> Self {
        self.players.push(name.to_string());
        self.adjustments.push(adjustment);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRequest {
    pub side_a: TradeSide,
    pub side_b: TradeSide,
    pub week: u32,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// A traded player with the score used for the trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradedPlayer {
    pub name: String,
    pub regular_score: f64,
    pub projection_score: f64,
    /// Blended score plus injury adjustment, floored.
    pub score: f64,
    pub adjustment: InjuryAdjustment,
    pub injury_note: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TeamTotals {
    pub total: f64,
    pub regular_total: f64,
    pub recent_14_total: f64,
    pub recent_30_total: f64,
}

/// Which side of a trade gives away more value in a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Giver {
    SideA,
    SideB,
    Equal,
}

/// Fairness ratio for one scoring window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowRatio {
    /// `None` when either side sums to zero in this window.
    pub ratio: Option<f64>,
    pub giving_more: Giver,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamResult {
    pub team: String,
    pub players: Vec<TradedPlayer>,
    /// Synthetic slots added to even out player counts.
    pub empty_slots: usize,
    pub totals: TeamTotals,
    /// Before/after category averages, one per table in `TableKind::ALL` order.
    pub averages: Vec<CategoryComparison>,
}

impl TeamResult {
    pub fn averages_for(&self, kind: TableKind) -> Option<&CategoryComparison> {
        self.averages.iter().find(|c| c.table == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeEvaluation {
    pub week: u32,
    pub side_a: TeamResult,
    pub side_b: TeamResult,
    pub ratio: f64,
    pub regular: WindowRatio,
    pub recent_14: WindowRatio,
    pub recent_30: WindowRatio,
    pub approved: bool,
}

impl TradeEvaluation {
    /// The side that was padded with empty slots, if any.
    pub fn padded_side(&self) -> Option<&TeamResult> {
        [&self.side_a, &self.side_b].into_iter().find(|s| s.empty_slots > 0)
    }
}

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// Symmetric min/max ratio rounded to 2 decimals. `None` if either total is
/// not positive.
pub fn trade_ratio(a: f64, b: f64) -> Option<f64> {
    if a <= 0.0 || b <= 0.0 {
        return None;
    }
    Some(round_to((a / b).min(b / a), 2))
}

fn window_ratio(a: f64, b: f64) -> WindowRatio {
    let giving_more = if a > b {
        Giver::SideA
    } else if b > a {
        Giver::SideB
    } else {
        Giver::Equal
    };
    WindowRatio {
        ratio: trade_ratio(a, b),
        giving_more,
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate a proposed trade.
///
/// Pure: reads the store and tables, never mutates them, and returns the same
/// result for the same inputs. Invalid requests come back as
/// `ValuationError::Validation` before any scoring happens.
pub fn evaluate_trade(
    store: &PlayerStore,
    tables: &StatTables,
    request: &TradeRequest,
    top_n: usize,
) -> Result<TradeEvaluation, ValuationError> {
    let (a, b) = (&request.side_a, &request.side_b);
    validate_request(store, a, b)?;

    let records_a = resolve_side(store, a)?;
    let records_b = resolve_side(store, b)?;

    let players_a = score_side(&records_a, &a.adjustments, request.week)?;
    let players_b = score_side(&records_b, &b.adjustments, request.week)?;

    let slots_a = records_b.len().saturating_sub(records_a.len());
    let slots_b = records_a.len().saturating_sub(records_b.len());

    let totals_a = team_totals(&records_a, &players_a, &a.adjustments, slots_a);
    let totals_b = team_totals(&records_b, &players_b, &b.adjustments, slots_b);

    let ratio = trade_ratio(totals_a.total, totals_b.total).ok_or_else(|| {
        let team = if totals_a.total <= 0.0 { &a.team } else { &b.team };
        TradeValidation::ZeroTotal { team: team.clone() }
    })?;
    let approved = ratio >= APPROVAL_THRESHOLD;

    let keys_a: Vec<PlayerKey> = records_a.iter().map(|r| r.key.clone()).collect();
    let keys_b: Vec<PlayerKey> = records_b.iter().map(|r| r.key.clone()).collect();
    let averages_a = project_averages(store, tables, &a.team, &keys_a, &keys_b, top_n);
    let averages_b = project_averages(store, tables, &b.team, &keys_b, &keys_a, top_n);

    info!(
        "trade {} ({:.2}) vs {} ({:.2}) in week {}: ratio {:.2}, {}",
        a.team,
        totals_a.total,
        b.team,
        totals_b.total,
        request.week,
        ratio,
        if approved { "approved" } else { "not approved" }
    );

    Ok(TradeEvaluation {
        week: request.week,
        regular: window_ratio(totals_a.regular_total, totals_b.regular_total),
        recent_14: window_ratio(totals_a.recent_14_total, totals_b.recent_14_total),
        recent_30: window_ratio(totals_a.recent_30_total, totals_b.recent_30_total),
        side_a: TeamResult {
            team: a.team.clone(),
            players: players_a,
            empty_slots: slots_a,
            totals: totals_a,
            averages: averages_a,
        },
        side_b: TeamResult {
            team: b.team.clone(),
            players: players_b,
            empty_slots: slots_b,
            totals: totals_b,
            averages: averages_b,
        },
        ratio,
        approved,
    })
}

fn validate_request(store: &PlayerStore, a: &TradeSide, b: &TradeSide) -> Result<(), TradeValidation> {
    let teams = store.teams();
    if teams.len() < 2 {
        return Err(TradeValidation::NotEnoughTeams { available: teams.len() });
    }
    if a.team == b.team {
        return Err(TradeValidation::SameTeam { team: a.team.clone() });
    }
    for side in [a, b] {
        if !teams.contains(&side.team) {
            return Err(TradeValidation::UnknownTeam {
                team: side.team.clone(),
            });
        }
    }

    let mut seen: HashSet<PlayerKey> = HashSet::new();
    let mut reported: HashSet<PlayerKey> = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for name in a.players.iter().chain(b.players.iter()) {
        let key = PlayerKey::new(name);
        if seen.contains(&key) {
            if reported.insert(key) {
                duplicates.push(name.clone());
            }
        } else {
            seen.insert(key);
        }
    }
    if !duplicates.is_empty() {
        return Err(TradeValidation::DuplicatePlayer { names: duplicates });
    }

    if a.players.is_empty() && b.players.is_empty() {
        return Err(TradeValidation::EmptyTrade);
    }

    for side in [a, b] {
        if side.players.len() != side.adjustments.len() {
            return Err(TradeValidation::InjuryCountMismatch {
                team: side.team.clone(),
                players: side.players.len(),
                adjustments: side.adjustments.len(),
            });
        }
    }
    Ok(())
}

/// Look up every player on a side and check they belong to that team.
fn resolve_side<'a>(store: &'a PlayerStore, side: &TradeSide) -> Result<Vec<&'a PlayerRecord>, ValuationError> {
    side.players
        .iter()
        .map(|name| -> Result<&'a PlayerRecord, ValuationError> {
            let record = store.get(name).ok_or_else(|| ValuationError::PlayerNotFound { name: name.clone() })?;
            if !record.is_on_team(&side.team) {
                return Err(TradeValidation::PlayerNotOnTeam {
                    player: record.name.clone(),
                    team: side.team.clone(),
                }
                .into());
            }
            Ok(record)
        })
        .collect()
}

fn score_side(
    records: &[&PlayerRecord],
    adjustments: &[InjuryAdjustment],
    week: u32,
) -> Result<Vec<TradedPlayer>, ValuationError> {
    records
        .iter()
        .zip(adjustments)
        .map(|(record, &adjustment)| -> Result<TradedPlayer, ValuationError> {
            let score = floored(blended_score(record, week)? + adjustment.value());
            debug!("{}: adjusted score {:.2} ({})", record.name, score, adjustment);
            Ok(TradedPlayer {
                name: record.name.clone(),
                regular_score: record.regular_score,
                projection_score: record.projection_score,
                score,
                adjustment,
                injury_note: adjustment.note(),
            })
        })
        .collect()
}

/// Sum a side's scores per window, including its empty slots.
///
/// Window values get the same adjustment and floor as the blended score.
/// Players without recent data add nothing to that window.
fn team_totals(
    records: &[&PlayerRecord],
    players: &[TradedPlayer],
    adjustments: &[InjuryAdjustment],
    empty_slots: usize,
) -> TeamTotals {
    let padding = EMPTY_SLOT_SCORE * empty_slots as f64;
    let adjusted = |value: f64, adj: &InjuryAdjustment| floored(value + adj.value());

    let mut totals = TeamTotals {
        total: padding,
        regular_total: padding,
        recent_14_total: padding,
        recent_30_total: padding,
    };
    for ((record, player), adj) in records.iter().zip(players.iter()).zip(adjustments) {
        totals.total += player.score;
        totals.regular_total += adjusted(record.regular_score, adj);
        totals.recent_14_total += record.recent_14_score.map_or(0.0, |v| adjusted(v, adj));
        totals.recent_30_total += record.recent_30_score.map_or(0.0, |v| adjusted(v, adj));
    }
    totals
}

/// Category averages for a team's current roster and its roster after
/// sending `outgoing` and receiving `incoming`, across all four tables.
fn project_averages(
    store: &PlayerStore,
    tables: &StatTables,
    team: &str,
    outgoing: &[PlayerKey],
    incoming: &[PlayerKey],
    top_n: usize,
) -> Vec<CategoryComparison> {
    let before = store.roster_keys(team);
    let mut after = before.clone();
    for key in outgoing {
        after.remove(key);
    }
    after.extend(incoming.iter().cloned());

    TableKind::ALL
        .iter()
        .map(|&kind| compare_rosters(kind, tables.get(kind), &before, &after, top_n))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
