//! File-based runs through the ingestion and reporting adapters.

use bet_replay::engine::ReplayEngine;
use bet_replay::{ingest, report};
use std::path::PathBuf;
use uuid::Uuid;

const P1: &str = "163f23ed-e9a9-4e54-a5b1-4e1fc86f12f4";
const P2: &str = "9e4a2b71-3c5d-4f11-8a0e-2f6d7c9b1a33";
const P3: &str = "d4c0f8a2-6b7e-4e3a-9c15-0b8f2a9e7d44";

fn temp_path(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("bet_replay_it_{name}_{}", Uuid::new_v4()));
    p
}

#[tokio::test]
async fn test_sample_data_end_to_end() {
    let matches = ingest::read_matches("data/match_data.txt", false).await.unwrap();
    let actions = ingest::read_actions("data/player_data.txt", false).await.unwrap();
    assert!(matches.skipped.is_empty());
    assert!(actions.skipped.is_empty());

    let run = ReplayEngine::run(matches.records, &actions.records);

    let expected = format!(
        "Legitimate Players:\n\
         {P1} 3300 0.50\n\
         {P2} 100 0.00\n\
         {P3} 200 0.00\n\
         \n\
         Illegitimate Players:\n\
         {P2} BET null null null\n\
         \n\
         Casino Balance Change:\n\
         450\n"
    );
    assert_eq!(report::render(&run), expected);

    assert_eq!(run.diagnostics.duplicate_matches.len(), 1);
    assert_eq!(run.diagnostics.rejected_bets, 1);
    assert_eq!(run.diagnostics.rejected_withdrawals, 1);
    assert_eq!(run.invalid_first_bets.len(), 1);
    assert_eq!(run.invalid_first_bets[0].0, P2);
}

#[tokio::test]
async fn test_malformed_lines_skipped_and_unknown_match_dropped() {
    let match_path = temp_path("matches");
    let player_path = temp_path("players");
    let known = Uuid::new_v4();
    let unknown = Uuid::new_v4();

    std::fs::write(&match_path, format!("{known},1.1,2.2,B\nnot,a,match\n")).unwrap();
    std::fs::write(
        &player_path,
        format!(
            "p1,DEPOSIT,,500\n\
             p1,BET,{unknown},100,A\n\
             p1,TRANSFER,,5\n\
             p1,BET,{known},100,B\n"
        ),
    )
    .unwrap();

    let matches = ingest::read_matches(&match_path, false).await.unwrap();
    let actions = ingest::read_actions(&player_path, false).await.unwrap();
    assert_eq!(matches.skipped.len(), 1);
    assert_eq!(actions.skipped.len(), 1);
    assert_eq!(actions.skipped[0].line, 3);

    let run = ReplayEngine::run(matches.records, &actions.records);

    assert_eq!(run.legitimate[0].balance, 600);
    assert_eq!(run.house_balance_change, -100);
    assert_eq!(run.diagnostics.unresolved_bets.len(), 1);
    assert_eq!(run.diagnostics.unresolved_bets[0].match_id, Some(unknown));

    std::fs::remove_file(&match_path).unwrap();
    std::fs::remove_file(&player_path).unwrap();
}

#[tokio::test]
async fn test_strict_mode_rejects_malformed_file() {
    let path = temp_path("strict");
    std::fs::write(&path, "p1,DEPOSIT,,10\np1,DEPOSIT,,-3\n").unwrap();

    let result = ingest::read_actions(&path, true).await;

    assert!(result.is_err());
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn test_report_and_summary_written() {
    let m = Uuid::new_v4();
    let matches = ingest::parse_records(&format!("{m},1,1,A\n"), true, ingest::parse_match_line).unwrap();
    let actions = ingest::parse_records(
        &format!("p1,DEPOSIT,,1000\np1,BET,{m},200,A\n"),
        true,
        ingest::parse_action_line,
    )
    .unwrap();
    let run = ReplayEngine::run(matches.records, &actions.records);

    let result_path = temp_path("result.txt");
    let summary_path = temp_path("result.json");
    report::write_report(&result_path, &run).await.unwrap();
    let summary = report::RunSummary::new(&run, &actions.skipped, &matches.skipped);
    report::write_summary(&summary_path, &summary).await.unwrap();

    let text = std::fs::read_to_string(&result_path).unwrap();
    assert!(text.starts_with("Legitimate Players:\np1 1200 1.00\n"));
    assert!(text.ends_with("Casino Balance Change:\n100\n"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
    assert_eq!(json["report"]["house_balance_change"], 100);
    assert_eq!(json["report"]["legitimate"][0]["player_id"], "p1");

    std::fs::remove_file(&result_path).unwrap();
    std::fs::remove_file(&summary_path).unwrap();
}
