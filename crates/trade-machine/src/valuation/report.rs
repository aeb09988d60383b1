// Plain-text rendering of trade evaluations, suitable for sharing in a chat.

use super::categories::CategoryComparison;
use super::trade::{Giver, TeamResult, TradeEvaluation, WindowRatio};
use super::EMPTY_SLOT_SCORE;

pub const APPROVED: &str = "TRADE APPROVED";
pub const NOT_APPROVED: &str = "TRADE NOT APPROVED";

pub fn verdict(eval: &TradeEvaluation) -> &'static str {
    if eval.approved {
        APPROVED
    } else {
        NOT_APPROVED
    }
}

/// "Team receives N empty slot(s) ..." for the padded side, if any.
pub fn empty_slot_info(eval: &TradeEvaluation) -> Option<String> {
    eval.padded_side().map(|side| {
        format!(
            "{} receives {} empty slot(s) with SCORE: {:.2} each.",
            side.team, side.empty_slots, EMPTY_SLOT_SCORE
        )
    })
}

/// Full shareable summary: totals, ratios, verdict, and per-player lines.
pub fn trade_summary(eval: &TradeEvaluation) -> String {
    let mut out = String::new();
    let (a, b) = (&eval.side_a, &eval.side_b);

    out.push_str(&format!("Trade Evaluation (week {})\n", eval.week));
    out.push('\n');
    out.push_str(&format!("{} Total Score: {:.2}\n", a.team, a.totals.total));
    out.push_str(&format!("{} Total Score: {:.2}\n", b.team, b.totals.total));
    out.push_str(&format!("Trade Ratio: {:.2}\n", eval.ratio));
    out.push_str(&format!("{}\n", verdict(eval)));
    if let Some(info) = empty_slot_info(eval) {
        out.push_str(&format!("{}\n", info));
    }

    out.push('\n');
    for (label, window) in [
        ("Regular", &eval.regular),
        ("Last 14 days", &eval.recent_14),
        ("Last 30 days", &eval.recent_30),
    ] {
        out.push_str(&format!("{} ratio: {}\n", label, window_line(window, a, b)));
    }

    for side in [a, b] {
        out.push('\n');
        out.push_str(&format!("--- {} players ---\n", side.team));
        out.push_str(&player_lines(side));
    }
    out
}

fn window_line(window: &WindowRatio, a: &TeamResult, b: &TeamResult) -> String {
    let ratio = window
        .ratio
        .map_or_else(|| "n/a".to_string(), |r| format!("{:.2}", r));
    match window.giving_more {
        Giver::SideA => format!("{} ({} giving more)", ratio, a.team),
        Giver::SideB => format!("{} ({} giving more)", ratio, b.team),
        Giver::Equal => format!("{} (equal)", ratio),
    }
}

fn player_lines(side: &TeamResult) -> String {
    let mut out = String::new();
    for p in &side.players {
        let note = p.injury_note.map(|n| format!(" ({})", n)).unwrap_or_default();
        out.push_str(&format!(
            "{}{}: Regular={:.2}, Projection={:.2}, Score={:.2}, Adjustment={}\n",
            p.name, note, p.regular_score, p.projection_score, p.score, p.adjustment
        ));
    }
    for _ in 0..side.empty_slots {
        out.push_str(&format!("Empty Slot: Score={:.2}\n", EMPTY_SLOT_SCORE));
    }
    out
}

/// Before/after/diff table for one team and one stats table.
pub fn category_table(team: &str, comparison: &CategoryComparison) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} - {} averages\n", team, comparison.table));
    out.push_str(&format!("{:<5} {:>9} {:>9} {:>9}\n", "CAT", "BEFORE", "AFTER", "DIFF"));
    for d in &comparison.deltas {
        let prec = d.category.decimals() as usize;
        out.push_str(&format!(
            "{:<5} {:>9.prec$} {:>9.prec$} {:>+9.prec$}\n",
            d.category.label(),
            d.before,
            d.after,
            d.diff,
            prec = prec
        ));
    }
    out
}
