// Blended player score: rest-of-season projection early in the season,
// observed regular-season value late in the season.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::{floored, round_to, ValuationError, SEASON_WEEKS};
use crate::league::store::{PlayerRecord, PlayerStore};

/// Season week for `today`: 0 before the season starts, 1 during the first
/// seven days, and so on. Unclamped; the score blend clamps.
pub fn current_week(today: NaiveDate, season_start: NaiveDate) -> u32 {
    let days = (today - season_start).num_days();
    let week = days.div_euclid(7) + 1;
    week.max(0) as u32
}

/// Week-weighted blend of projection and regular score, without the floor.
///
/// `week` is clamped to `[0, SEASON_WEEKS]` so the projection weight never
/// goes negative in a long season.
pub fn blend(regular: f64, projection: f64, week: u32) -> f64 {
    let w = week.min(SEASON_WEEKS) as f64;
    let season = SEASON_WEEKS as f64;
    ((season - w) * projection + w * regular) / season
}

/// Floored blended score for one record.
pub fn blended_score(record: &PlayerRecord, week: u32) -> Result<f64, ValuationError> {
    check_finite(record, "regular_score", record.regular_score)?;
    check_finite(record, "projection_score", record.projection_score)?;

    let score = floored(blend(record.regular_score, record.projection_score, week));
    debug!("{} week {}: blended score {:.2}", record.name, week, score);
    Ok(score)
}

/// Look up a player by name and compute the floored blended score.
pub fn score_player(store: &PlayerStore, name: &str, week: u32) -> Result<f64, ValuationError> {
    let record = store.get(name).ok_or_else(|| ValuationError::PlayerNotFound {
        name: name.to_string(),
    })?;
    blended_score(record, week)
}

fn check_finite(record: &PlayerRecord, field: &'static str, value: f64) -> Result<(), ValuationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValuationError::InvalidPlayerData {
            name: record.name.clone(),
            field,
        })
    }
}

// ---------------------------------------------------------------------------
// Total-score ranking
// ---------------------------------------------------------------------------

/// One row of the league-wide blended score ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalScoreEntry {
    pub rank: usize,
    pub name: String,
    pub team: Option<String>,
    /// Blend rounded to 2 decimals, no floor.
    pub score: f64,
}

/// Rank every player by blended score, best first.
///
/// Players with non-numeric scores are left out. Ties keep store order.
pub fn total_score_rankings(store: &PlayerStore, week: u32) -> Vec<TotalScoreEntry> {
    let mut scored: Vec<(&PlayerRecord, f64)> = store
        .iter()
        .filter(|r| r.regular_score.is_finite() && r.projection_score.is_finite())
        .map(|r| (r, round_to(blend(r.regular_score, r.projection_score, week), 2)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (record, score))| TotalScoreEntry {
            rank: i + 1,
            name: record.name.clone(),
            team: record.team.clone(),
            score,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_counts_from_season_start() {
        let start = date(2024, 10, 21);
        assert_eq!(current_week(start, start), 1);
        assert_eq!(current_week(date(2024, 10, 27), start), 1);
        assert_eq!(current_week(date(2024, 10, 28), start), 2);
        assert_eq!(current_week(date(2024, 12, 30), start), 11);
    }

    #[test]
    fn week_before_season_is_zero() {
        let start = date(2024, 10, 21);
        assert_eq!(current_week(date(2024, 10, 20), start), 0);
        assert_eq!(current_week(date(2024, 9, 1), start), 0);
    }

    #[test]
    fn blend_interpolates_by_week() {
        // Week 0: pure projection. Week 20: pure regular.
        assert!(approx_eq(blend(10.0, 8.0, 0), 8.0, 1e-12));
        assert!(approx_eq(blend(10.0, 8.0, 20), 10.0, 1e-12));
        // ((20-10)*8 + 10*10) / 20 = 9.0
        assert!(approx_eq(blend(10.0, 8.0, 10), 9.0, 1e-12));
    }

    #[test]
    fn blend_clamps_late_weeks() {
        assert!(approx_eq(blend(10.0, 8.0, 26), 10.0, 1e-12));
        assert!(approx_eq(blend(10.0, 8.0, 26), blend(10.0, 8.0, 20), 1e-12));
    }

    #[test]
    fn blended_score_never_below_floor() {
        let weak = PlayerRecord::new("Deep Bench", -4.0, 0.5);
        for week in 0..=SEASON_WEEKS {
            assert!(blended_score(&weak, week).unwrap() >= 2.0);
        }
        let strong = PlayerRecord::new("Star", 9.0, 8.0);
        assert!(approx_eq(blended_score(&strong, 10).unwrap(), 8.5, 1e-12));
    }

    #[test]
    fn non_finite_scores_are_invalid() {
        let bad = PlayerRecord::new("Broken Row", f64::NAN, 5.0);
        assert_eq!(
            blended_score(&bad, 3),
            Err(ValuationError::InvalidPlayerData {
                name: "Broken Row".into(),
                field: "regular_score",
            })
        );
        let bad = PlayerRecord::new("Broken Row", 5.0, f64::INFINITY);
        assert!(matches!(
            blended_score(&bad, 3),
            Err(ValuationError::InvalidPlayerData { field: "projection_score", .. })
        ));
    }

    #[test]
    fn score_player_looks_up_by_normalized_name() {
        let store = PlayerStore::from_records(vec![PlayerRecord::new("Luka Dončić", 10.0, 12.0)]);
        assert!(approx_eq(score_player(&store, "luka doncic", 0).unwrap(), 12.0, 1e-12));
        assert_eq!(
            score_player(&store, "Kyrie Irving", 0),
            Err(ValuationError::PlayerNotFound {
                name: "Kyrie Irving".into()
            })
        );
    }

    #[test]
    fn rankings_sort_descending_without_floor() {
        let store = PlayerStore::from_records(vec![
            PlayerRecord::new("Low", 1.0, 1.0),
            PlayerRecord::new("High", 9.0, 7.0).with_team("Alpha"),
            PlayerRecord::new("Mid", 4.0, 4.5),
            PlayerRecord::new("Bad", f64::NAN, 1.0),
        ]);
        let ranking = total_score_rankings(&store, 5);
        let names: Vec<&str> = ranking.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["High", "Mid", "Low"]);
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[0].team.as_deref(), Some("Alpha"));
        // (15*7 + 5*9) / 20 = 7.5
        assert!(approx_eq(ranking[0].score, 7.5, 1e-12));
        // Unfloored: stays at 1.0
        assert!(approx_eq(ranking[2].score, 1.0, 1e-12));
    }
}
