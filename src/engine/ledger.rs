//! Account ledger.
//!
//! Owns every player's balance and bet counters for a run, applies
//! deposits, withdrawals and settled bets, and remembers each player's
//! first invalid bet attempt.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use tracing::debug;

use crate::types::{AttemptedAction, Coins, Player, PlayerId, ReplayError};

#[derive(Debug, Default)]
pub struct AccountLedger {
    /// Keyed by id so iteration (and therefore the report) is ordered.
    players: BTreeMap<PlayerId, Player>,
    /// Players that have attempted at least one bet, valid or not.
    bet_attempted: HashSet<PlayerId>,
    /// First bet attempt per player, only when that attempt was invalid.
    invalid_first_bets: BTreeMap<PlayerId, AttemptedAction>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a player, creating a zeroed one on first reference.
    pub fn ensure_player(&mut self, id: &str) -> &mut Player {
        self.players.entry(id.to_string()).or_insert_with(|| {
            debug!(player_id = id, "New player");
            Player::new(id)
        })
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    /// All known players in ascending id order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Credit a player's balance. Returns the new balance.
    pub fn deposit(&mut self, id: &str, amount: Coins) -> Result<Coins, ReplayError> {
        check_amount(amount)?;
        let player = self.ensure_player(id);
        player.balance = player
            .balance
            .checked_add(amount)
            .ok_or_else(|| ReplayError::BalanceOverflow(id.to_string()))?;
        Ok(player.balance)
    }

    /// Debit a player's balance if it covers `amount`.
    ///
    /// A withdrawal larger than the balance is rejected whole; the balance
    /// is left unchanged.
    pub fn withdraw(&mut self, id: &str, amount: Coins) -> Result<Coins, ReplayError> {
        check_amount(amount)?;
        let player = self.ensure_player(id);
        if player.balance < amount {
            return Err(ReplayError::InsufficientFunds {
                needed: amount,
                available: player.balance,
            });
        }
        player.balance -= amount;
        Ok(player.balance)
    }

    /// Settle a validated bet against the player's account.
    ///
    /// Counts the bet, then credits `amount` on a win or debits it on a
    /// loss. Must only be called for a bet that passed validation, so a
    /// loss can never take the balance below zero.
    ///
    /// A win that would overflow the balance is rejected with nothing
    /// touched, the bet is not counted. Returns the new balance.
    pub fn place_bet(&mut self, id: &str, amount: Coins, won: bool) -> Result<Coins, ReplayError> {
        let player = self.ensure_player(id);
        let balance = if won {
            player
                .balance
                .checked_add(amount)
                .ok_or_else(|| ReplayError::BalanceOverflow(id.to_string()))?
        } else {
            player.balance - amount
        };
        debug_assert!(balance >= 0, "bet settled without validation");

        player.total_bets += 1;
        if won {
            player.won_bets += 1;
        }
        player.balance = balance;
        Ok(balance)
    }

    /// Win rate for a player; zero for unknown players or players with no bets.
    pub fn win_rate(&self, id: &str) -> Decimal {
        self.players
            .get(id)
            .map(Player::win_rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Note a bet attempt. If it is the player's first attempt and it was
    /// invalid, the attempt is kept as the player's illegitimate marker.
    /// Later attempts never overwrite it.
    ///
    /// Returns `true` when this call flagged the player.
    pub fn record_bet_attempt(&mut self, id: &str, attempt: &AttemptedAction, valid: bool) -> bool {
        let first = self.bet_attempted.insert(id.to_string());
        if first && !valid {
            self.invalid_first_bets
                .insert(id.to_string(), attempt.clone());
            return true;
        }
        false
    }

    pub fn first_invalid_bet(&self, id: &str) -> Option<&AttemptedAction> {
        self.invalid_first_bets.get(id)
    }

    /// Players whose first bet attempt was invalid, in id order.
    pub fn invalid_first_bets(&self) -> impl Iterator<Item = (&PlayerId, &AttemptedAction)> {
        self.invalid_first_bets.iter()
    }
}

fn check_amount(amount: Coins) -> Result<(), ReplayError> {
    if amount < 0 {
        return Err(ReplayError::NegativeAmount(amount));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
