//! Replay scenarios driven through the public engine API.

use bet_replay::engine::ReplayEngine;
use bet_replay::report;
use bet_replay::types::{Action, Coins, MatchId, MatchOutcome, ReplayError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn outcome(id: MatchId, result: &str) -> MatchOutcome {
    MatchOutcome {
        id,
        rate_a: dec!(1.45),
        rate_b: dec!(0.75),
        result: result.to_string(),
    }
}

fn deposit(player: &str, amount: Coins) -> Action {
    Action::Deposit { player_id: player.into(), amount }
}

fn withdraw(player: &str, amount: Coins) -> Action {
    Action::Withdraw { player_id: player.into(), amount }
}

fn bet(player: &str, match_id: MatchId, amount: Coins, side: &str) -> Action {
    Action::Bet {
        player_id: player.into(),
        match_id: Some(match_id),
        amount,
        side: Some(side.into()),
    }
}

#[test]
fn test_single_winning_bet() {
    let m = Uuid::new_v4();
    let mut engine = ReplayEngine::new();
    engine.register_match(outcome(m, "A")).unwrap();
    engine.apply(&deposit("p1", 1000)).unwrap();
    engine.apply(&bet("p1", m, 200, "A")).unwrap();

    let player = engine.state().ledger().player("p1").unwrap();
    assert_eq!(player.total_bets(), 1);
    assert_eq!(player.won_bets(), 1);
    assert_eq!(player.balance(), 1200);
    assert_eq!(engine.house_balance(), 100);
}

#[test]
fn test_unfunded_bet_reported_in_both_sections() {
    let m = Uuid::new_v4();
    let run = ReplayEngine::run(vec![outcome(m, "B")], &[bet("p2", m, 50, "B")]);

    assert_eq!(
        report::render(&run),
        "Legitimate Players:\np2 0 0.00\n\n\
         Illegitimate Players:\np2 BET null null null\n\n\
         Casino Balance Change:\n0\n"
    );
}

#[test]
fn test_duplicate_registration_keeps_first() {
    let m = Uuid::new_v4();
    let mut engine = ReplayEngine::new();
    engine.register_match(outcome(m, "A")).unwrap();
    assert_eq!(
        engine.register_match(outcome(m, "B")),
        Err(ReplayError::DuplicateMatch(m))
    );

    engine.apply(&deposit("p1", 100)).unwrap();
    engine.apply(&bet("p1", m, 100, "A")).unwrap();

    // Settled against the first outcome.
    assert_eq!(engine.state().ledger().player("p1").unwrap().won_bets(), 1);
}

#[test]
fn test_balances_never_negative() {
    let m = Uuid::new_v4();
    let actions = vec![
        deposit("p1", 100),
        bet("p1", m, 100, "B"), // lose everything
        withdraw("p1", 1),
        bet("p1", m, 1, "B"),
        deposit("p1", 10),
        withdraw("p1", 11),
        withdraw("p1", 10),
    ];
    let mut engine = ReplayEngine::new();
    engine.register_match(outcome(m, "A")).unwrap();
    for action in &actions {
        let _ = engine.apply(action);
        assert!(engine.state().ledger().player("p1").unwrap().balance() >= 0);
    }

    let player = engine.state().ledger().player("p1").unwrap();
    assert_eq!(player.balance(), 0);
    assert_eq!(player.total_bets(), 1);
    // -100 for the B bet, -10 for the successful withdrawal.
    assert_eq!(engine.house_balance(), -110);
}

#[test]
fn test_win_rate_bounds() {
    let m = Uuid::new_v4();
    let mut actions = vec![deposit("p1", 1_000)];
    for i in 0..7 {
        let side = if i % 3 == 0 { "A" } else { "B" };
        actions.push(bet("p1", m, 10, side));
    }
    let run = ReplayEngine::run(vec![outcome(m, "A")], &actions);

    let summary = &run.legitimate[0];
    // Bets 0, 3, 6 on A win.
    assert_eq!(summary.win_rate, Decimal::from(3) / Decimal::from(7));
    assert!(summary.win_rate >= Decimal::ZERO && summary.win_rate <= Decimal::ONE);
    assert_eq!(report::format_win_rate(summary.win_rate), "0.43");
}
