//! Shared types for the replay engine.
//!
//! These types form the data model used across all modules: players,
//! match outcomes, the closed set of player actions, and the domain
//! error taxonomy. Ingestion produces them, the engine consumes them,
//! and reporting reads them back out.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque player identifier, taken verbatim from the input.
pub type PlayerId = String;

/// Match identifier (UUID-shaped token).
pub type MatchId = Uuid;

/// Whole-coin amounts and balances.
pub type Coins = i64;

/// The side token that earns the house its half-stake cut.
pub const HOUSE_CUT_SIDE: &str = "A";

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// Per-player account state for a single run.
///
/// Only the ledger mutates a player; everything else reads through the
/// accessors. `balance` never drops below zero and `won_bets` never
/// exceeds `total_bets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) balance: Coins,
    pub(crate) total_bets: u32,
    pub(crate) won_bets: u32,
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} balance={} bets={} (W{}) win_rate={:.2}",
            self.id,
            self.balance,
            self.total_bets,
            self.won_bets,
            self.win_rate(),
        )
    }
}

impl Player {
    /// A fresh player: zero balance, no bets.
    pub fn new(id: impl Into<PlayerId>) -> Self {
        Self {
            id: id.into(),
            balance: 0,
            total_bets: 0,
            won_bets: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn balance(&self) -> Coins {
        self.balance
    }

    pub fn total_bets(&self) -> u32 {
        self.total_bets
    }

    pub fn won_bets(&self) -> u32 {
        self.won_bets
    }

    /// Fraction of bets won, in [0, 1]. Exactly zero when no bets were placed.
    pub fn win_rate(&self) -> Decimal {
        if self.total_bets == 0 {
            Decimal::ZERO
        } else {
            Decimal::from(self.won_bets) / Decimal::from(self.total_bets)
        }
    }

    /// Whether the player never placed a bet that was applied.
    pub fn has_no_bets(&self) -> bool {
        self.total_bets == 0
    }
}

// ---------------------------------------------------------------------------
// Match outcome
// ---------------------------------------------------------------------------

/// A settled match. Rates are informational only; payouts ignore them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub id: MatchId,
    pub rate_a: Decimal,
    pub rate_b: Decimal,
    /// Winning side token, e.g. "A" or "B" (or "DRAW").
    pub result: String,
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (A@{} B@{}) -> {}",
            self.id, self.rate_a, self.rate_b, self.result,
        )
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Operation name as it appears in the input and in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Deposit,
    Withdraw,
    Bet,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Deposit => write!(f, "DEPOSIT"),
            Operation::Withdraw => write!(f, "WITHDRAW"),
            Operation::Bet => write!(f, "BET"),
        }
    }
}

/// Parse an operation name. Exact upper-case match only; unknown names are
/// an error so that nothing is ever silently skipped.
impl std::str::FromStr for Operation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEPOSIT" => Ok(Operation::Deposit),
            "WITHDRAW" => Ok(Operation::Withdraw),
            "BET" => Ok(Operation::Bet),
            _ => Err(anyhow::anyhow!("Unknown operation: {s}")),
        }
    }
}

/// A single player action, applied strictly in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "UPPERCASE")]
pub enum Action {
    Deposit {
        player_id: PlayerId,
        amount: Coins,
    },
    Withdraw {
        player_id: PlayerId,
        amount: Coins,
    },
    Bet {
        player_id: PlayerId,
        match_id: Option<MatchId>,
        amount: Coins,
        /// Missing in the input is kept as `None`; validation rejects it.
        side: Option<String>,
    },
}

impl Action {
    pub fn player_id(&self) -> &str {
        match self {
            Action::Deposit { player_id, .. }
            | Action::Withdraw { player_id, .. }
            | Action::Bet { player_id, .. } => player_id,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Action::Deposit { .. } => Operation::Deposit,
            Action::Withdraw { .. } => Operation::Withdraw,
            Action::Bet { .. } => Operation::Bet,
        }
    }

    pub fn amount(&self) -> Coins {
        match self {
            Action::Deposit { amount, .. }
            | Action::Withdraw { amount, .. }
            | Action::Bet { amount, .. } => *amount,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Deposit { player_id, amount } | Action::Withdraw { player_id, amount } => {
                write!(f, "{player_id} {} {amount}", self.operation())
            }
            Action::Bet {
                player_id,
                match_id,
                amount,
                side,
            } => write!(
                f,
                "{player_id} BET {} {amount} {}",
                match_ref(match_id),
                side.as_deref().unwrap_or("null"),
            ),
        }
    }
}

/// Shape of an attempted action, kept for illegitimate-player reporting.
/// Absent fields render as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptedAction {
    pub operation: Operation,
    pub match_id: Option<MatchId>,
    pub amount: Option<Coins>,
    pub side: Option<String>,
}

impl AttemptedAction {
    /// The placeholder shape reported for players who never bet.
    pub fn unplaced_bet() -> Self {
        Self {
            operation: Operation::Bet,
            match_id: None,
            amount: None,
            side: None,
        }
    }
}

impl From<&Action> for AttemptedAction {
    fn from(action: &Action) -> Self {
        match action {
            Action::Deposit { amount, .. } | Action::Withdraw { amount, .. } => Self {
                operation: action.operation(),
                match_id: None,
                amount: Some(*amount),
                side: None,
            },
            Action::Bet {
                match_id,
                amount,
                side,
                ..
            } => Self {
                operation: Operation::Bet,
                match_id: *match_id,
                amount: Some(*amount),
                side: side.clone(),
            },
        }
    }
}

impl fmt::Display for AttemptedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self
            .amount
            .map(|a| a.to_string())
            .unwrap_or_else(|| "null".to_string());
        write!(
            f,
            "{} {} {} {}",
            self.operation,
            match_ref(&self.match_id),
            amount,
            self.side.as_deref().unwrap_or("null"),
        )
    }
}

/// Why a player ends up in the illegitimate section.
///
/// Both causes render identically in the text report; the tag is kept so
/// diagnostics can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum IllegitimateCause {
    /// No bet was ever applied for this player.
    NoBets,
    /// The player's first bet attempt failed validation.
    InvalidFirstBet { attempt: AttemptedAction },
}

/// Render an optional match id the way the report does.
pub fn match_ref(id: &Option<MatchId>) -> String {
    id.map(|m| m.to_string())
        .unwrap_or_else(|| "null".to_string())
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a bet failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetRejection {
    InsufficientBalance { needed: Coins, available: Coins },
    MissingSide,
}

impl fmt::Display for BetRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetRejection::InsufficientBalance { needed, available } => {
                write!(f, "insufficient balance: need {needed}, have {available}")
            }
            BetRejection::MissingSide => write!(f, "missing or empty side"),
        }
    }
}

/// Domain errors raised while applying a single action.
///
/// None of these abort a run: the engine logs them, records them in the
/// run diagnostics, and moves on to the next action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("Match not found: {}", match_ref(.0))]
    MatchNotFound(Option<MatchId>),

    #[error("Duplicate match ID: {0}")]
    DuplicateMatch(MatchId),

    #[error("Invalid bet by {player}: {reason}")]
    InvalidBet { player: PlayerId, reason: BetRejection },

    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Coins, available: Coins },

    #[error("Negative amount: {0}")]
    NegativeAmount(Coins),

    #[error("Balance overflow for player {0}")]
    BalanceOverflow(PlayerId),

    #[error("House balance overflow")]
    HouseBalanceOverflow,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
