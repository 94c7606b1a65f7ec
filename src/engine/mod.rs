//! Core engine: match registry, account ledger, bet resolution, and the
//! replay loop that ties them together.

pub mod registry;
pub mod ledger;
pub mod resolver;
pub mod replay;

pub use ledger::AccountLedger;
pub use registry::MatchRegistry;
pub use replay::{ReplayEngine, RunReport, RunState};
pub use resolver::{BetResolver, Settlement};
