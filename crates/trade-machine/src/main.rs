// Trade machine entry point.
//
// Startup sequence:
// 1. Parse command line
// 2. Initialize tracing (log to file, stdout is for results)
// 3. Load config
// 4. Load the data snapshot (rankings, injuries, rosters) if the command needs it
// 5. Run the command

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use trade_machine::cli::{self, Cli, Commands};
use trade_machine::config::{self, Config};
use trade_machine::history::{self, ScoreHistory};
use trade_machine::snapshot::DataSnapshot;
use trade_machine::valuation::report;
use trade_machine::valuation::score::{current_week, total_score_rankings};
use trade_machine::valuation::trade::TradeRequest;
use trade_machine::valuation::ValuationError;

fn main() -> anyhow::Result<ExitCode> {
    // 1. Parse command line
    let cli = Cli::parse();

    // 2. Initialize tracing
    init_tracing()?;
    info!("Trade machine starting up");

    // 3. Load config
    let config = config::load_config().context("failed to load configuration")?;
    let today = cli.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let week = current_week(today, config.league.season_start);
    info!("Config loaded: league={}, date={}, week={}", config.league.name, today, week);

    match cli.command {
        Commands::History { player, import } => run_history(&config, player.as_deref(), import, cli.json),
        command => {
            // 4. Load the data snapshot
            let snapshot = DataSnapshot::load(&config.data_paths, &config.league)
                .context("failed to load league data")?;
            for p in &snapshot.unmatched {
                warn!("unmatched roster player '{}' on {}", p.name, p.team);
            }

            // 5. Run the command
            run(&config, &snapshot, command, today, week, cli.json)
        }
    }
}

fn run(
    config: &Config,
    snapshot: &DataSnapshot,
    command: Commands,
    today: chrono::NaiveDate,
    week: u32,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let store = &snapshot.store;

    match command {
        Commands::Evaluate {
            team_a,
            team_b,
            a,
            b,
            week: week_override,
            averages,
        } => {
            let request = TradeRequest {
                side_a: cli::trade_side(&team_a, &a),
                side_b: cli::trade_side(&team_b, &b),
                week: week_override.unwrap_or(week),
            };

            let eval = match snapshot.evaluate(&request, config.averages.top_n) {
                Ok(eval) => eval,
                Err(ValuationError::Validation(v)) => {
                    warn!("trade rejected: {}", v);
                    eprintln!("Trade not evaluated: {v}");
                    return Ok(ExitCode::from(2));
                }
                Err(e) => return Err(e).context("trade evaluation failed"),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&eval)?);
            } else {
                print!("{}", report::trade_summary(&eval));
                if averages {
                    for side in [&eval.side_a, &eval.side_b] {
                        for comparison in &side.averages {
                            println!();
                            print!("{}", report::category_table(&side.team, comparison));
                        }
                    }
                }
            }
        }

        Commands::Scores { limit } => {
            let mut ranking = total_score_rankings(store, week);
            if let Some(limit) = limit {
                ranking.truncate(limit);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&ranking)?);
            } else {
                println!("Total scores, week {week}");
                for entry in &ranking {
                    let team = entry.team.as_deref().unwrap_or(&config.league.free_agent_label);
                    println!("{:>4}. {:<28} {:>7.2}  {}", entry.rank, entry.name, entry.score, team);
                }
            }
        }

        Commands::Injuries => {
            let injured = store.injured();
            if json {
                println!("{}", serde_json::to_string_pretty(&injured)?);
            } else {
                for r in &injured {
                    let team = r.team.as_deref().unwrap_or(&config.league.free_agent_label);
                    println!("{:<28} {:<24} {:<14} {}", r.name, r.injury.injury, r.injury.status, team);
                }
            }
        }

        Commands::Teams => {
            let teams: BTreeMap<String, Vec<&str>> = store
                .teams()
                .into_iter()
                .map(|t| {
                    let names = store.roster(&t).into_iter().map(|r| r.name.as_str()).collect();
                    (t, names)
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&teams)?);
            } else {
                for (team, players) in &teams {
                    println!("{} ({} players)", team, players.len());
                    for p in players {
                        println!("  {p}");
                    }
                }
            }
        }

        Commands::Snapshot => {
            let db = ScoreHistory::open(&config.db_path).context("failed to open database")?;
            let rows = db.record_snapshot(today, store)?;
            let path = history::write_snapshot_csv(Path::new(&config.data_paths.history_dir), today, store)?;
            info!("Recorded {} scores for {}", rows, today);
            println!("Recorded {} player scores for {} ({})", rows, today, path.display());
        }

        Commands::History { player, import } => return run_history(config, player.as_deref(), import, json),
    }

    Ok(ExitCode::SUCCESS)
}

fn run_history(config: &Config, player: Option<&str>, import: bool, json: bool) -> anyhow::Result<ExitCode> {
    let db = ScoreHistory::open(&config.db_path).context("failed to open database")?;
    if import {
        let summary = db
            .import_dir(Path::new(&config.data_paths.history_dir))
            .context("failed to import score history")?;
        info!("History import: {} files, {} rows", summary.files, summary.rows);
    }

    let Some(player) = player else {
        let dates = db.snapshot_dates()?;
        if json {
            println!("{}", serde_json::to_string_pretty(&dates)?);
        } else if dates.is_empty() {
            println!("No score snapshots recorded");
        } else {
            println!("{} score snapshots", dates.len());
            for d in &dates {
                println!("  {d}");
            }
        }
        return Ok(ExitCode::SUCCESS);
    };

    let points = db.player_history(player)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else if points.is_empty() {
        println!("No score history for {player}");
    } else {
        println!("{:<12} {:>8} {:>10}", "DATE", "REGULAR", "PROJECTION");
        for p in &points {
            println!("{:<12} {:>8.2} {:>10.2}", p.date.to_string(), p.regular, p.projection);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "trade_machine=info,warn";

/// Append tracing output to `logs/trade-machine.log`. Stdout carries command
/// results only, so text and JSON output stay pipeable.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let log_dir = Path::new("logs");
    std::fs::create_dir_all(log_dir).context("failed to create logs directory")?;
    let log_path = log_dir.join("trade-machine.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))
}
