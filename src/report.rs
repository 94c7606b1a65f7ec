//! Reporting adapter.
//!
//! Renders a [`RunReport`] to the plain-text result format and, when
//! configured, writes a JSON run summary next to it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use crate::engine::replay::RunReport;
use crate::ingest::MalformedRecord;
use crate::types::AttemptedAction;

/// Win rate as printed: two decimals, halves rounded away from zero.
pub fn format_win_rate(rate: Decimal) -> String {
    let rounded = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Render the three report sections.
pub fn render(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str("Legitimate Players:\n");
    for p in &report.legitimate {
        let _ = writeln!(out, "{} {} {}", p.player_id, p.balance, format_win_rate(p.win_rate));
    }
    out.push('\n');

    // Zero-bet players always print the placeholder shape, whatever the
    // internal cause tag says.
    out.push_str("Illegitimate Players:\n");
    let placeholder = AttemptedAction::unplaced_bet();
    for entry in &report.illegitimate {
        let _ = writeln!(out, "{} {placeholder}", entry.player_id);
    }
    out.push('\n');

    out.push_str("Casino Balance Change:\n");
    let _ = writeln!(out, "{}", report.house_balance_change);

    out
}

/// Write the text report to `path`.
pub async fn write_report(path: impl AsRef<Path>, report: &RunReport) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, render(report))
        .await
        .with_context(|| format!("Failed to write results to {}", path.display()))?;

    info!(
        path = %path.display(),
        players = report.legitimate.len(),
        house_balance_change = report.house_balance_change,
        "Results written"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON summary
// ---------------------------------------------------------------------------

/// Machine-readable run summary: the report plus ingestion diagnostics.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub completed_at: DateTime<Utc>,
    pub skipped_actions: &'a [MalformedRecord],
    pub skipped_matches: &'a [MalformedRecord],
    pub report: &'a RunReport,
}

impl<'a> RunSummary<'a> {
    pub fn new(
        report: &'a RunReport,
        skipped_actions: &'a [MalformedRecord],
        skipped_matches: &'a [MalformedRecord],
    ) -> Self {
        Self {
            completed_at: Utc::now(),
            skipped_actions,
            skipped_matches,
            report,
        }
    }
}

/// Write the JSON summary to `path`.
pub async fn write_summary(path: impl AsRef<Path>, summary: &RunSummary<'_>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(summary).context("Failed to serialise run summary")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;

    info!(path = %path.display(), "Run summary written");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::replay::{IllegitimateEntry, PlayerSummary, RunDiagnostics};
    use crate::ingest::RecordError;
    use crate::types::IllegitimateCause;
    use rust_decimal_macros::dec;

    fn sample_report() -> RunReport {
        RunReport {
            legitimate: vec![
                PlayerSummary { player_id: "p1".into(), balance: 1200, win_rate: Decimal::ONE },
                PlayerSummary { player_id: "p2".into(), balance: 0, win_rate: Decimal::ZERO },
            ],
            illegitimate: vec![IllegitimateEntry {
                player_id: "p2".into(),
                cause: IllegitimateCause::NoBets,
            }],
            house_balance_change: 50,
            invalid_first_bets: vec![],
            diagnostics: RunDiagnostics::default(),
        }
    }

    #[test]
    fn test_format_win_rate() {
        assert_eq!(format_win_rate(Decimal::ZERO), "0.00");
        assert_eq!(format_win_rate(Decimal::ONE), "1.00");
        assert_eq!(format_win_rate(dec!(0.125)), "0.13");
        assert_eq!(format_win_rate(Decimal::ONE / Decimal::from(3)), "0.33");
        assert_eq!(format_win_rate(Decimal::from(2) / Decimal::from(3)), "0.67");
    }

    #[test]
    fn test_render_sections() {
        let text = render(&sample_report());
        let expected = "Legitimate Players:\n\
                        p1 1200 1.00\n\
                        p2 0 0.00\n\
                        \n\
                        Illegitimate Players:\n\
                        p2 BET null null null\n\
                        \n\
                        Casino Balance Change:\n\
                        50\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_negative_house_balance() {
        let mut report = sample_report();
        report.house_balance_change = -350;
        assert!(render(&report).ends_with("Casino Balance Change:\n-350\n"));
    }

    #[test]
    fn test_render_empty_run() {
        let report = RunReport {
            legitimate: vec![],
            illegitimate: vec![],
            house_balance_change: 0,
            invalid_first_bets: vec![],
            diagnostics: RunDiagnostics::default(),
        };
        assert_eq!(
            render(&report),
            "Legitimate Players:\n\nIllegitimate Players:\n\nCasino Balance Change:\n0\n"
        );
    }

    #[test]
    fn test_summary_json_shape() {
        let report = sample_report();
        let skipped = vec![MalformedRecord {
            line: 3,
            reason: RecordError::UnknownOperation("REFUND".into()),
        }];
        let summary = RunSummary::new(&report, &skipped, &[]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["report"]["house_balance_change"], 50);
        assert_eq!(json["skipped_actions"][0]["line"], 3);
        assert_eq!(json["skipped_actions"][0]["reason"]["kind"], "unknown_operation");
        assert_eq!(json["report"]["illegitimate"][0]["cause"], "no_bets");
        assert!(json["completed_at"].is_string());
    }
}
