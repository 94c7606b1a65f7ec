//! Replay engine.
//!
//! Drives a full run: registers match outcomes, applies player actions
//! strictly in input order, accumulates the house balance, and builds the
//! final report model.
//!
//! The engine is the single writer of [`RunState`]. Every apply takes
//! `&mut self`, so each action's validate-then-mutate step completes
//! before the next action is looked at.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::ledger::AccountLedger;
use super::registry::MatchRegistry;
use super::resolver::BetResolver;
use crate::types::{
    Action, AttemptedAction, Coins, IllegitimateCause, MatchId, MatchOutcome, PlayerId,
    ReplayError,
};

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

/// Everything a run mutates. Created empty, discarded after the report.
#[derive(Debug, Default)]
pub struct RunState {
    registry: MatchRegistry,
    ledger: AccountLedger,
    house_balance: Coins,
    diagnostics: RunDiagnostics,
}

impl RunState {
    pub fn registry(&self) -> &MatchRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &AccountLedger {
        &self.ledger
    }

    pub fn house_balance(&self) -> Coins {
        self.house_balance
    }

    pub fn diagnostics(&self) -> &RunDiagnostics {
        &self.diagnostics
    }
}

/// Non-fatal problems met during a run. Never part of the text report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunDiagnostics {
    pub duplicate_matches: Vec<MatchId>,
    pub unresolved_bets: Vec<UnresolvedBet>,
    pub rejected_bets: u64,
    pub rejected_withdrawals: u64,
    /// Negative amounts and balance or house overflows.
    pub rejected_other: u64,
}

/// A bet dropped because its match was never registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedBet {
    pub player_id: PlayerId,
    pub match_id: Option<MatchId>,
}

// ---------------------------------------------------------------------------
// Report model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub balance: Coins,
    pub win_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IllegitimateEntry {
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub cause: IllegitimateCause,
}

/// Final state of a run, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Every known player, in id order.
    pub legitimate: Vec<PlayerSummary>,
    /// Every player with zero applied bets. These also appear in
    /// `legitimate`; the duplication is part of the output contract.
    pub illegitimate: Vec<IllegitimateEntry>,
    pub house_balance_change: Coins,
    /// Each player's first bet attempt, when that attempt was invalid.
    pub invalid_first_bets: Vec<(PlayerId, AttemptedAction)>,
    pub diagnostics: RunDiagnostics,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ReplayEngine {
    state: RunState,
}

impl ReplayEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay a complete run: outcomes first, then actions in order.
    pub fn run(outcomes: Vec<MatchOutcome>, actions: &[Action]) -> RunReport {
        let mut engine = Self::new();
        for outcome in outcomes {
            // Conflicts are recorded by the engine; keep going.
            let _ = engine.register_match(outcome);
        }
        for action in actions {
            let _ = engine.apply(action);
        }
        engine.finish()
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn house_balance(&self) -> Coins {
        self.state.house_balance
    }

    /// Register a match outcome. A duplicate id is recorded and returned,
    /// the first outcome stays in place.
    pub fn register_match(&mut self, outcome: MatchOutcome) -> Result<(), ReplayError> {
        let id = outcome.id;
        let result = self.state.registry.register_outcome(outcome);
        if result.is_err() {
            self.state.diagnostics.duplicate_matches.push(id);
        }
        result
    }

    /// Apply one action. Domain errors are recorded in the diagnostics and
    /// returned; they leave the run in a consistent state.
    pub fn apply(&mut self, action: &Action) -> Result<(), ReplayError> {
        // Any reference makes the player known, even a rejected one.
        self.state.ledger.ensure_player(action.player_id());

        let result = match action {
            Action::Deposit { player_id, amount } => self.apply_deposit(player_id, *amount),
            Action::Withdraw { player_id, amount } => self.apply_withdraw(player_id, *amount),
            Action::Bet {
                player_id,
                match_id,
                amount,
                side,
            } => self.apply_bet(action, player_id, match_id.as_ref(), *amount, side.as_deref()),
        };

        if let Err(ref e) = result {
            self.record_rejection(action, e);
        }
        result
    }

    fn apply_deposit(&mut self, player_id: &str, amount: Coins) -> Result<(), ReplayError> {
        let balance = self.state.ledger.deposit(player_id, amount)?;
        debug!(player_id, amount, balance, "Deposit applied");
        Ok(())
    }

    fn apply_withdraw(&mut self, player_id: &str, amount: Coins) -> Result<(), ReplayError> {
        if amount < 0 {
            return Err(ReplayError::NegativeAmount(amount));
        }
        // The house is the counterparty of every cash-out.
        let house = self
            .state
            .house_balance
            .checked_sub(amount)
            .ok_or(ReplayError::HouseBalanceOverflow)?;
        let balance = self.state.ledger.withdraw(player_id, amount)?;
        self.state.house_balance = house;
        debug!(player_id, amount, balance, "Withdrawal applied");
        Ok(())
    }

    fn apply_bet(
        &mut self,
        action: &Action,
        player_id: &str,
        match_id: Option<&MatchId>,
        amount: Coins,
        side: Option<&str>,
    ) -> Result<(), ReplayError> {
        if amount < 0 {
            return Err(ReplayError::NegativeAmount(amount));
        }

        let player = self.state.ledger.ensure_player(player_id);
        let validation = BetResolver::validate(player, amount, side);

        let attempt = AttemptedAction::from(action);
        let flagged = self
            .state
            .ledger
            .record_bet_attempt(player_id, &attempt, validation.is_ok());
        if flagged {
            warn!(player_id, attempt = %attempt, "First bet attempt invalid, player flagged");
        }

        validation.map_err(|reason| ReplayError::InvalidBet {
            player: player_id.to_string(),
            reason,
        })?;

        let side = side.unwrap_or_default();
        let settlement = BetResolver::settle(match_id, amount, side, &self.state.registry)?;

        // Both sides are checked before either is written.
        let house = self
            .state
            .house_balance
            .checked_add(settlement.house_delta)
            .ok_or(ReplayError::HouseBalanceOverflow)?;
        self.state
            .ledger
            .place_bet(player_id, amount, settlement.won)?;
        self.state.house_balance = house;
        Ok(())
    }

    fn record_rejection(&mut self, action: &Action, error: &ReplayError) {
        let diagnostics = &mut self.state.diagnostics;
        match error {
            ReplayError::MatchNotFound(match_id) => {
                warn!(action = %action, error = %error, "Bet dropped");
                diagnostics.unresolved_bets.push(UnresolvedBet {
                    player_id: action.player_id().to_string(),
                    match_id: *match_id,
                });
            }
            ReplayError::InvalidBet { .. } => {
                debug!(action = %action, error = %error, "Bet rejected");
                diagnostics.rejected_bets += 1;
            }
            ReplayError::InsufficientFunds { .. } => {
                debug!(action = %action, error = %error, "Withdrawal rejected");
                diagnostics.rejected_withdrawals += 1;
            }
            ReplayError::NegativeAmount(_)
            | ReplayError::BalanceOverflow(_)
            | ReplayError::HouseBalanceOverflow => {
                warn!(action = %action, error = %error, "Action rejected");
                diagnostics.rejected_other += 1;
            }
            // Only produced by registration.
            ReplayError::DuplicateMatch(_) => {}
        }
    }

    /// Close the run and build the report.
    pub fn finish(self) -> RunReport {
        let state = self.state;
        let ledger = &state.ledger;

        let legitimate: Vec<PlayerSummary> = ledger
            .players()
            .map(|p| PlayerSummary {
                player_id: p.id().to_string(),
                balance: p.balance(),
                win_rate: p.win_rate(),
            })
            .collect();

        let illegitimate: Vec<IllegitimateEntry> = ledger
            .players()
            .filter(|p| p.has_no_bets())
            .map(|p| IllegitimateEntry {
                player_id: p.id().to_string(),
                cause: match ledger.first_invalid_bet(p.id()) {
                    Some(attempt) => IllegitimateCause::InvalidFirstBet {
                        attempt: attempt.clone(),
                    },
                    None => IllegitimateCause::NoBets,
                },
            })
            .collect();

        let invalid_first_bets = ledger
            .invalid_first_bets()
            .map(|(id, attempt)| (id.clone(), attempt.clone()))
            .collect();

        info!(
            players = legitimate.len(),
            zero_bet_players = illegitimate.len(),
            matches = state.registry.len(),
            house_balance = state.house_balance,
            duplicate_matches = state.diagnostics.duplicate_matches.len(),
            unresolved_bets = state.diagnostics.unresolved_bets.len(),
            rejected_bets = state.diagnostics.rejected_bets,
            rejected_withdrawals = state.diagnostics.rejected_withdrawals,
            "Replay complete"
        );

        RunReport {
            legitimate,
            illegitimate,
            house_balance_change: state.house_balance,
            invalid_first_bets,
            diagnostics: state.diagnostics,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
