//! Match registry.
//!
//! Holds settled match outcomes for a run. The first registration for a
//! match id wins; later ones are reported as conflicts and discarded.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::types::{MatchId, MatchOutcome, ReplayError};

#[derive(Debug, Default)]
pub struct MatchRegistry {
    matches: HashMap<MatchId, MatchOutcome>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an outcome for an unseen match.
    ///
    /// Returns `DuplicateMatch` if the id is already known; the stored
    /// outcome is left untouched. Callers treat this as non-fatal.
    pub fn register(
        &mut self,
        id: MatchId,
        rate_a: Decimal,
        rate_b: Decimal,
        result: impl Into<String>,
    ) -> Result<(), ReplayError> {
        if self.matches.contains_key(&id) {
            warn!(match_id = %id, "Duplicate match ID, keeping first outcome");
            return Err(ReplayError::DuplicateMatch(id));
        }

        let outcome = MatchOutcome {
            id,
            rate_a,
            rate_b,
            result: result.into(),
        };
        debug!(%outcome, "Match registered");
        self.matches.insert(id, outcome);
        Ok(())
    }

    /// Register a pre-built outcome.
    pub fn register_outcome(&mut self, outcome: MatchOutcome) -> Result<(), ReplayError> {
        let MatchOutcome {
            id,
            rate_a,
            rate_b,
            result,
        } = outcome;
        self.register(id, rate_a, rate_b, result)
    }

    /// Look up a settled match.
    pub fn outcome(&self, id: &MatchId) -> Result<&MatchOutcome, ReplayError> {
        self.matches
            .get(id)
            .ok_or(ReplayError::MatchNotFound(Some(*id)))
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
