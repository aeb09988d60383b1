// Integration tests: fixture CSVs -> snapshot -> scores, averages, trades.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use trade_machine::config::{DataPaths, LeagueConfig};
use trade_machine::history::ScoreHistory;
use trade_machine::snapshot::{DataSnapshot, SnapshotCell};
use trade_machine::stats::tables::TableKind;
use trade_machine::valuation::categories::{category_averages, Category};
use trade_machine::valuation::report;
use trade_machine::valuation::score::{score_player, total_score_rankings};
use trade_machine::valuation::trade::{Giver, InjuryAdjustment, TradeRequest, TradeSide};
use trade_machine::valuation::{TradeValidation, ValuationError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    fixtures().join(name).display().to_string()
}

fn data_paths() -> DataPaths {
    DataPaths {
        season: fixture("season.csv"),
        projection: fixture("projection.csv"),
        last_14: fixture("last14.csv"),
        last_30: fixture("last30.csv"),
        injuries: fixture("injuries.csv"),
        rosters_dir: fixture("rosters"),
        history_dir: fixture("history"),
    }
}

fn league() -> LeagueConfig {
    let mut name_corrections = HashMap::new();
    name_corrections.insert("Kelly Oubre".to_string(), "Kelly Oubre Jr.".to_string());
    LeagueConfig {
        name: "Test League".into(),
        season_start: NaiveDate::from_ymd_opt(2024, 10, 21).unwrap(),
        free_agent_label: "Free Agent".into(),
        name_corrections,
    }
}

fn load() -> DataSnapshot {
    DataSnapshot::load(&data_paths(), &league()).expect("fixtures should load")
}

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

fn brunson_for_embiid(embiid: InjuryAdjustment) -> TradeRequest {
    TradeRequest {
        side_a: TradeSide::new("Knicks Fans").with_player("Jalen Brunson", InjuryAdjustment::None),
        side_b: TradeSide::new("Sixers Fans").with_player("Joel Embiid", embiid),
        week: 10,
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn snapshot_merges_rankings_injuries_and_rosters() {
    let snap = load();
    let store = &snap.store;

    assert_eq!(store.len(), 9);
    assert_eq!(snap.tables.season.len(), 9);
    assert_eq!(snap.tables.last_30.len(), 1);

    // Free-agent roster file is not a team.
    assert_eq!(store.teams(), vec!["Knicks Fans".to_string(), "Sixers Fans".to_string()]);
    assert_eq!(store.get("Cam Johnson").unwrap().team, None);

    // Name correction applied; unknown roster name reported.
    assert!(store.get("Kelly Oubre Jr.").unwrap().is_on_team("Sixers Fans"));
    assert_eq!(snap.unmatched.len(), 1);
    assert_eq!(snap.unmatched[0].name, "Ghost Player");

    let brunson = store.get("jalen brunson").unwrap();
    assert_eq!(brunson.regular_score, 8.0);
    assert_eq!(brunson.projection_score, 7.5);
    assert_eq!(brunson.recent_14_score, Some(9.0));
    assert_eq!(brunson.recent_30_score, Some(8.5));
    assert_eq!(store.get("Tyrese Maxey").unwrap().recent_14_score, None);

    let injured: Vec<&str> = store.injured().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(injured, vec!["Joel Embiid", "Paul George"]);
}

#[test]
fn repeated_header_rows_do_not_shift_ranks() {
    let snap = load();
    let hart = snap.tables.season.rows.iter().find(|r| r.name == "Josh Hart").unwrap();
    assert_eq!(hart.rank, 6);
    assert_eq!(hart.line.fg.made, 5.0);
    assert_eq!(hart.line.fg.attempted, 9.0);
}

#[test]
fn missing_table_is_an_error() {
    let mut paths = data_paths();
    paths.season = fixture("does_not_exist.csv");
    assert!(DataSnapshot::load(&paths, &league()).is_err());
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

#[test]
fn blended_scores_and_rankings() {
    let snap = load();
    assert!(approx_eq(score_player(&snap.store, "Jalen Brunson", 10).unwrap(), 7.75, 1e-12));
    // 1.75 blended, floored to 2.0.
    assert_eq!(score_player(&snap.store, "Kelly Oubre Jr.", 10).unwrap(), 2.0);

    let ranking = total_score_rankings(&snap.store, 10);
    assert_eq!(ranking.len(), 9);
    assert_eq!(ranking[0].name, "Jalen Brunson");
    assert_eq!(ranking[0].team.as_deref(), Some("Knicks Fans"));
    // Maxey and Embiid tie at 7.0; store order decides.
    assert_eq!(ranking[1].name, "Tyrese Maxey");
    assert_eq!(ranking[2].name, "Joel Embiid");
    // The ranking is not floored.
    assert_eq!(ranking[8].name, "Kelly Oubre Jr.");
    assert_eq!(ranking[8].score, 1.75);
}

#[test]
fn category_averages_respect_top_n() {
    let snap = load();
    let knicks = snap.store.roster_keys("Knicks Fans");

    let all = category_averages(&snap.tables.season, &knicks, 15);
    assert_eq!(all.players, 4);
    // (10 + 5 + 7 + 6) / (20 + 9 + 15 + 13)
    assert!(approx_eq(all.fg_pct, 28.0 / 57.0, 1e-12));

    // Top 3 by rank leaves out Josh Hart (rank 6).
    let top3 = category_averages(&snap.tables.season, &knicks, 3);
    assert_eq!(top3.players, 3);
    assert!(approx_eq(top3.pts, (28.0 + 16.0 + 18.0) / 3.0, 1e-12));
}

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

#[test]
fn injured_star_swap_is_not_approved() {
    let snap = load();
    let eval = snap.evaluate(&brunson_for_embiid(InjuryAdjustment::ShortTerm), 15).unwrap();

    assert!(approx_eq(eval.side_a.totals.total, 7.75, 1e-12));
    assert!(approx_eq(eval.side_b.totals.total, 6.0, 1e-12));
    assert_eq!(eval.ratio, 0.77);
    assert!(!eval.approved);

    assert_eq!(eval.regular.ratio, Some(0.63));
    assert_eq!(eval.recent_14.ratio, Some(0.44));
    assert_eq!(eval.recent_30.ratio, None);
    assert_eq!(eval.recent_30.giving_more, Giver::SideA);

    let text = report::trade_summary(&eval);
    assert!(text.contains("Joel Embiid (IL - Until 4 Weeks)"));
    assert!(text.contains(report::NOT_APPROVED));
}

#[test]
fn healthy_star_swap_is_approved() {
    let snap = load();
    let eval = snap.evaluate(&brunson_for_embiid(InjuryAdjustment::None), 15).unwrap();
    assert_eq!(eval.ratio, 0.9);
    assert!(eval.approved);
}

#[test]
fn two_for_one_pads_the_short_side() {
    let snap = load();
    let request = TradeRequest {
        side_a: TradeSide::new("Knicks Fans")
            .with_player("Josh Hart", InjuryAdjustment::None)
            .with_player("Mikal Bridges", InjuryAdjustment::None),
        side_b: TradeSide::new("Sixers Fans").with_player("Paul George", InjuryAdjustment::None),
        week: 10,
    };
    let eval = snap.evaluate(&request, 15).unwrap();

    assert_eq!(eval.side_b.empty_slots, 1);
    assert!(approx_eq(eval.side_a.totals.total, 7.75, 1e-12));
    assert!(approx_eq(eval.side_b.totals.total, 5.5, 1e-12));
    assert_eq!(eval.ratio, 0.71);
    assert_eq!(
        report::empty_slot_info(&eval).as_deref(),
        Some("Sixers Fans receives 1 empty slot(s) with SCORE: 2.00 each.")
    );
}

#[test]
fn trade_projects_category_averages_for_both_teams() {
    let snap = load();
    let eval = snap.evaluate(&brunson_for_embiid(InjuryAdjustment::ShortTerm), 15).unwrap();

    let knicks = eval.side_a.averages_for(TableKind::Season).unwrap();
    let pts = knicks.delta(Category::Points).unwrap();
    assert_eq!(pts.before, 18.75);
    assert_eq!(pts.after, 17.75);
    assert!(approx_eq(pts.diff, -1.0, 1e-12));
    let reb = knicks.delta(Category::Rebounds).unwrap();
    assert_eq!(reb.before, 5.25);
    assert_eq!(reb.after, 6.38);

    let sixers = eval.side_b.averages_for(TableKind::Season).unwrap();
    let pts = sixers.delta(Category::Points).unwrap();
    assert_eq!(pts.before, 20.5);
    assert_eq!(pts.after, 21.5);

    // Only Brunson has a last-30 row: the Knicks lose him, the Sixers gain him.
    let knicks_30 = eval.side_a.averages_for(TableKind::Last30).unwrap();
    assert_eq!(knicks_30.before.players, 1);
    assert_eq!(knicks_30.after.players, 0);
    let sixers_30 = eval.side_b.averages_for(TableKind::Last30).unwrap();
    assert_eq!(sixers_30.after.players, 1);
}

#[test]
fn rejects_players_from_the_wrong_team() {
    let snap = load();
    let mut request = brunson_for_embiid(InjuryAdjustment::None);
    request.side_b.players[0] = "Cam Johnson".into();
    assert_eq!(
        snap.evaluate(&request, 15),
        Err(ValuationError::Validation(TradeValidation::PlayerNotOnTeam {
            player: "Cam Johnson".into(),
            team: "Sixers Fans".into(),
        }))
    );
}

// ---------------------------------------------------------------------------
// Snapshot cell and history
// ---------------------------------------------------------------------------

#[test]
fn snapshot_cell_serves_consistent_evaluations() {
    let cell = SnapshotCell::new(load());
    let request = brunson_for_embiid(InjuryAdjustment::None);

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| cell.load().evaluate(&request, 15).unwrap()))
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    });
}

#[test]
fn history_records_loaded_scores() {
    let snap = load();
    let db = ScoreHistory::open(":memory:").unwrap();
    let day = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
    assert_eq!(db.record_snapshot(day, &snap.store).unwrap(), 9);

    let points = db.player_history("OG Anunoby").unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].date, day);
    assert_eq!(points[0].regular, 5.0);
}
