//! Betting ledger replay entry point.
//!
//! Loads configuration, initialises structured logging, reads match
//! outcomes and player actions, replays them, and writes the result
//! report (plus an optional JSON summary).

use anyhow::Result;
use tracing::info;

use bet_replay::config::AppConfig;
use bet_replay::engine::ReplayEngine;
use bet_replay::{ingest, report};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = AppConfig::path_from_env();
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    info!(
        config = %config_path,
        player_data = %cfg.input.player_data,
        match_data = %cfg.input.match_data,
        strict = cfg.input.strict,
        "Replay starting"
    );

    // Outcomes go in first so every bet can be resolved against them.
    let matches = ingest::read_matches(&cfg.input.match_data, cfg.input.strict).await?;
    let actions = ingest::read_actions(&cfg.input.player_data, cfg.input.strict).await?;

    let run = ReplayEngine::run(matches.records, &actions.records);

    report::write_report(&cfg.output.result, &run).await?;

    if let Some(path) = &cfg.output.summary_json {
        let summary = report::RunSummary::new(&run, &actions.skipped, &matches.skipped);
        report::write_summary(path, &summary).await?;
    }

    info!(
        players = run.legitimate.len(),
        house_balance_change = run.house_balance_change,
        result = %cfg.output.result,
        "Replay finished"
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bet_replay=info"));

    let json_logging = std::env::var("REPLAY_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
