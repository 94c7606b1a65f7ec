//! Ingestion adapter.
//!
//! Turns the comma-separated player and match files into typed
//! [`Action`] and [`MatchOutcome`] values. Malformed lines never reach
//! the engine: they are either skipped with a warning or, in strict mode,
//! fail the whole read.
//!
//! Line formats:
//! - actions: `playerId,OPERATION[,matchId[,amount[,side]]]`
//! - matches: `matchId,rateA,rateB,result`

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;

use crate::types::{Action, Coins, MatchId, MatchOutcome, Operation};

/// Why a single line could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RecordError {
    #[error("expected {expected} fields, got {got}")]
    FieldCount { expected: &'static str, got: usize },

    #[error("empty {0}")]
    EmptyField(&'static str),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid match id {value:?}: {message}")]
    InvalidMatchId { value: String, message: String },

    #[error("invalid amount {value:?}: {message}")]
    InvalidAmount { value: String, message: String },

    #[error("negative amount {0}")]
    NegativeAmount(Coins),

    #[error("invalid rate {value:?}: {message}")]
    InvalidRate { value: String, message: String },
}

/// A line the adapter refused to convert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("line {line}: {reason}")]
pub struct MalformedRecord {
    /// 1-based line number in the source file.
    pub line: usize,
    pub reason: RecordError,
}

/// Records parsed from one source, in input order, plus what was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested<T> {
    pub records: Vec<T>,
    pub skipped: Vec<MalformedRecord>,
}

// ---------------------------------------------------------------------------
// Line parsers
// ---------------------------------------------------------------------------

/// Parse one player action line.
pub fn parse_action_line(line: &str) -> Result<Action, RecordError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 2 {
        return Err(RecordError::FieldCount { expected: "at least 2", got: fields.len() });
    }
    if fields.len() > 5 {
        return Err(RecordError::FieldCount { expected: "at most 5", got: fields.len() });
    }

    let player_id = fields[0];
    if player_id.is_empty() {
        return Err(RecordError::EmptyField("player id"));
    }
    let operation = Operation::from_str(fields[1])
        .map_err(|_| RecordError::UnknownOperation(fields[1].to_string()))?;

    let match_id = optional(&fields, 2).map(parse_match_id).transpose()?;
    let amount = optional(&fields, 3)
        .map(parse_amount)
        .transpose()?
        .unwrap_or(0);
    let side = optional(&fields, 4).map(str::to_string);

    let player_id = player_id.to_string();
    Ok(match operation {
        Operation::Deposit => Action::Deposit { player_id, amount },
        Operation::Withdraw => Action::Withdraw { player_id, amount },
        Operation::Bet => Action::Bet {
            player_id,
            match_id,
            amount,
            side,
        },
    })
}

/// Parse one match outcome line.
pub fn parse_match_line(line: &str) -> Result<MatchOutcome, RecordError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(RecordError::FieldCount { expected: "4", got: fields.len() });
    }

    let id = parse_match_id(fields[0])?;
    let rate_a = parse_rate(fields[1])?;
    let rate_b = parse_rate(fields[2])?;
    let result = fields[3];
    if result.is_empty() {
        return Err(RecordError::EmptyField("match result"));
    }

    Ok(MatchOutcome {
        id,
        rate_a,
        rate_b,
        result: result.to_string(),
    })
}

/// Field `idx` if present and non-empty.
fn optional<'a>(fields: &[&'a str], idx: usize) -> Option<&'a str> {
    fields.get(idx).copied().filter(|f| !f.is_empty())
}

fn parse_match_id(s: &str) -> Result<MatchId, RecordError> {
    Uuid::parse_str(s).map_err(|e| RecordError::InvalidMatchId {
        value: s.to_string(),
        message: e.to_string(),
    })
}

fn parse_amount(s: &str) -> Result<Coins, RecordError> {
    let amount = s.parse::<Coins>().map_err(|e| RecordError::InvalidAmount {
        value: s.to_string(),
        message: e.to_string(),
    })?;
    if amount < 0 {
        return Err(RecordError::NegativeAmount(amount));
    }
    Ok(amount)
}

fn parse_rate(s: &str) -> Result<Decimal, RecordError> {
    Decimal::from_str(s).map_err(|e| RecordError::InvalidRate {
        value: s.to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Parse every non-blank line of `contents`.
///
/// In strict mode the first malformed line is an error; otherwise it is
/// logged and skipped.
pub fn parse_records<T>(
    contents: &str,
    strict: bool,
    parse: impl Fn(&str) -> Result<T, RecordError>,
) -> Result<Ingested<T>> {
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse(line) {
            Ok(record) => records.push(record),
            Err(reason) => {
                let bad = MalformedRecord { line: idx + 1, reason };
                if strict {
                    return Err(bad).context("Malformed record in strict mode");
                }
                warn!(line = bad.line, reason = %bad.reason, "Skipping malformed record");
                skipped.push(bad);
            }
        }
    }

    Ok(Ingested { records, skipped })
}

/// Read the player action file.
pub async fn read_actions(path: impl AsRef<Path>, strict: bool) -> Result<Ingested<Action>> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read player data: {}", path.display()))?;
    let ingested = parse_records(&contents, strict, parse_action_line)
        .with_context(|| format!("Failed to load player data: {}", path.display()))?;

    info!(
        path = %path.display(),
        actions = ingested.records.len(),
        skipped = ingested.skipped.len(),
        "Player data loaded"
    );
    Ok(ingested)
}

/// Read the match outcome file.
pub async fn read_matches(path: impl AsRef<Path>, strict: bool) -> Result<Ingested<MatchOutcome>> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read match data: {}", path.display()))?;
    let ingested = parse_records(&contents, strict, parse_match_line)
        .with_context(|| format!("Failed to load match data: {}", path.display()))?;

    info!(
        path = %path.display(),
        matches = ingested.records.len(),
        skipped = ingested.skipped.len(),
        "Match data loaded"
    );
    Ok(ingested)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
