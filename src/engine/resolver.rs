//! Bet resolver.
//!
//! Validates a bet against the player's balance, resolves it against the
//! settled match, and computes how far the house balance moves.
//!
//! House accounting is keyed on the wagered side only: a bet on side "A"
//! earns the house half the stake (truncated), any other side costs the
//! house the full stake. The bet's own win or loss does not enter into it.

use tracing::debug;

use super::registry::MatchRegistry;
use crate::types::{BetRejection, Coins, MatchId, Player, ReplayError, HOUSE_CUT_SIDE};

/// Outcome of a resolved bet, ready to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub won: bool,
    pub house_delta: Coins,
}

pub struct BetResolver;

impl BetResolver {
    /// Check a bet before anything is mutated.
    ///
    /// Valid only if the player can cover the stake and named a side.
    pub fn validate(player: &Player, amount: Coins, side: Option<&str>) -> Result<(), BetRejection> {
        if player.balance() < amount {
            return Err(BetRejection::InsufficientBalance {
                needed: amount,
                available: player.balance(),
            });
        }
        match side {
            Some(s) if !s.is_empty() => Ok(()),
            _ => Err(BetRejection::MissingSide),
        }
    }

    /// Decide win or loss against the registered outcome.
    ///
    /// An unknown (or missing) match is an error, never a loss.
    pub fn resolve(
        match_id: Option<&MatchId>,
        side: &str,
        registry: &MatchRegistry,
    ) -> Result<bool, ReplayError> {
        let id = match_id.ok_or(ReplayError::MatchNotFound(None))?;
        let outcome = registry.outcome(id)?;
        Ok(outcome.result == side)
    }

    /// House balance change for a bet of `amount` on `side`.
    ///
    /// The half-stake cut is taken in floating point and truncated back to
    /// whole coins, so very large stakes round the same way a float cast does.
    pub fn house_delta(amount: Coins, side: &str) -> Coins {
        if side == HOUSE_CUT_SIDE {
            (amount as f64 * 0.5) as Coins
        } else {
            -amount
        }
    }

    /// Resolve a validated bet and price it for the house.
    pub fn settle(
        match_id: Option<&MatchId>,
        amount: Coins,
        side: &str,
        registry: &MatchRegistry,
    ) -> Result<Settlement, ReplayError> {
        let won = Self::resolve(match_id, side, registry)?;
        let house_delta = Self::house_delta(amount, side);
        debug!(amount, side, won, house_delta, "Bet settled");
        Ok(Settlement { won, house_delta })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
