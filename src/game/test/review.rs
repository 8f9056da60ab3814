//! Review session and veto tests

use super::super::card::Card;
use super::super::notice::PromptKind;
use super::super::votes::VoteChoice;
use super::super::{Game, GameState, ReviewTurn, VetoStatus};
use super::test_utils::*;
use crate::error::GameError;

/// Elects a reviewer other than Dillon and returns (manager, reviewer).
fn elect(game: &mut Game) -> (String, String) {
    let manager = game.manager.clone();
    let reviewer = safe_reviewer(game);
    game.nominate(&manager, &reviewer).unwrap();
    vote_all(game, VoteChoice::Ja);
    (manager, reviewer)
}

#[test]
fn manager_discards_and_reviewer_plays() {
    let mut game = create_test_game(5, 10);
    game.deck.stack(&[Card::Accept, Card::Reject, Card::Reject]);
    let (manager, reviewer) = elect(&mut game);
    assert_eq!(game.deck.hand().len(), 3);

    // The hand is ordered bottom to top
    assert_eq!(game.deck.hand(), &[Card::Reject, Card::Reject, Card::Accept]);
    game.select_card(&manager, 0).unwrap();
    assert!(matches!(
        game.state,
        GameState::Review { turn: ReviewTurn::Reviewer { veto: VetoStatus::CannotVeto }, .. }
    ));
    assert_eq!(game.deck.hand(), &[Card::Reject, Card::Accept]);

    game.select_card(&reviewer, 1).unwrap();
    assert_eq!(game.board.accept, 1);
    assert_eq!(game.board.reject, 0);
    assert!(game.deck.hand().is_empty());
    assert_eq!(game.deck.discard_count(), 2);
    assert!(matches!(game.state, GameState::Nominate));
    assert_eq!(game.manager, game.turn_order[1]);
    assert_cards_conserved(&game);
}

#[test]
fn cards_are_chosen_by_the_right_player() {
    let mut game = create_test_game(6, 11);
    let (manager, reviewer) = elect(&mut game);

    assert_eq!(game.select_card(&reviewer, 0), Err(GameError::IllegalActor));
    assert_eq!(game.select_card(&manager, 3), Err(GameError::InvalidCard));
    assert_eq!(game.deck.hand().len(), 3);

    game.select_card(&manager, 2).unwrap();
    assert_eq!(game.select_card(&manager, 0), Err(GameError::IllegalActor));
    assert_eq!(game.select_card(&reviewer, 2), Err(GameError::InvalidCard));
    game.select_card(&reviewer, 1).unwrap();
    assert_eq!(game.board.played(), 1);
    assert_cards_conserved(&game);
}

#[test]
fn forms_go_stale_once_answered() {
    let mut game = create_test_game(5, 12);
    let nomination = game.form_id.clone();
    assert!(game.check_form(nomination.as_deref()).is_ok());
    assert_eq!(game.check_form(None), Err(GameError::Stale));

    let (manager, _) = elect(&mut game);
    assert_eq!(game.check_form(nomination.as_deref()), Err(GameError::Stale));

    let discard = game.form_id.clone();
    assert!(discard.is_some());
    game.select_card(&manager, 0).unwrap();
    assert_eq!(game.check_form(discard.as_deref()), Err(GameError::Stale));
    assert!(game.check_form(game.form_id.as_deref()).is_ok());
}

#[test]
fn deck_is_reshuffled_before_drawing() {
    let mut game = create_test_game(5, 13);
    while game.deck.count() >= 3 {
        assert!(game.deck.draw_three());
        game.deck.discard_hand();
    }
    assert_eq!(game.deck.count(), 2);

    elect(&mut game);
    assert_eq!(game.deck.hand().len(), 3);
    assert_eq!(game.deck.count(), 14);
    assert_eq!(game.deck.discard_count(), 0);
    assert_cards_conserved(&game);
}

#[test]
fn veto_is_locked_before_five_rejects() {
    let mut game = create_test_game(7, 14);
    game.board.reject = 4;
    let (manager, reviewer) = elect(&mut game);
    game.select_card(&manager, 0).unwrap();
    assert_eq!(game.propose_veto(&reviewer), Err(GameError::InvalidAction));

    let notices = game.take_notices();
    let form = notices
        .iter()
        .filter(|n| n.is_private_to(&reviewer))
        .find_map(|n| n.prompt.clone())
        .unwrap();
    assert_eq!(form.kind, PromptKind::Play);
    assert!(form.options.iter().all(|o| o.action == "card"));
}

#[test]
fn approved_veto_discards_both_cards() {
    let mut game = create_test_game(7, 15);
    game.board.reject = 5;
    let (manager, reviewer) = elect(&mut game);
    let in_play = game.deck.in_play();
    game.select_card(&manager, 0).unwrap();

    let notices = game.take_notices();
    let form = notices
        .iter()
        .filter(|n| n.is_private_to(&reviewer))
        .find_map(|n| n.prompt.clone())
        .unwrap();
    assert!(form.options.iter().any(|o| o.action == "veto"));

    assert_eq!(game.propose_veto(&manager), Err(GameError::IllegalActor));
    game.propose_veto(&reviewer).unwrap();
    assert!(matches!(game.state, GameState::Review { turn: ReviewTurn::VetoRequested, .. }));
    assert_eq!(game.select_card(&reviewer, 0), Err(GameError::InvalidAction));

    let notices = game.take_notices();
    let form = notices
        .iter()
        .filter(|n| n.is_private_to(&manager))
        .find_map(|n| n.prompt.clone())
        .unwrap();
    assert_eq!(form.kind, PromptKind::VetoResponse);

    assert_eq!(game.respond_to_veto(&reviewer, true), Err(GameError::IllegalActor));
    game.respond_to_veto(&manager, true).unwrap();
    assert_eq!(game.board.reject, 5);
    assert_eq!(game.board.accept, 0);
    assert_eq!(game.promotion_tracker, 1);
    assert!(game.deck.hand().is_empty());
    assert_eq!(game.deck.discard_count(), 3);
    assert_eq!(game.deck.in_play(), in_play);
    assert!(matches!(game.state, GameState::Nominate));
    assert_eq!(game.manager, game.turn_order[1]);
    assert!(!game.game_over());
}

#[test]
fn third_failed_promotion_by_veto_plays_the_top_card() {
    let mut game = create_test_game(7, 16);
    game.board.reject = 5;
    game.promotion_tracker = 2;
    game.deck.stack(&[Card::Reject, Card::Reject, Card::Reject, Card::Accept]);
    let (manager, reviewer) = elect(&mut game);
    game.select_card(&manager, 0).unwrap();
    game.propose_veto(&reviewer).unwrap();
    game.respond_to_veto(&manager, true).unwrap();

    assert_eq!(game.board.accept, 1);
    assert_eq!(game.board.reject, 5);
    assert_eq!(game.promotion_tracker, 0);
    assert!(game.ineligible_reviewers.is_empty());
    assert!(matches!(game.state, GameState::Nominate));
}

#[test]
fn denied_veto_forces_a_play() {
    let mut game = create_test_game(8, 17);
    game.board.reject = 5;
    game.deck.stack(&[Card::Accept, Card::Accept, Card::Accept]);
    let (manager, reviewer) = elect(&mut game);
    game.select_card(&manager, 0).unwrap();
    game.propose_veto(&reviewer).unwrap();
    game.take_notices();

    game.respond_to_veto(&manager, false).unwrap();
    assert!(matches!(
        game.state,
        GameState::Review { turn: ReviewTurn::Reviewer { veto: VetoStatus::VetoDenied }, .. }
    ));
    let notices = game.take_notices();
    let form = notices
        .iter()
        .filter(|n| n.is_private_to(&reviewer))
        .find_map(|n| n.prompt.clone())
        .unwrap();
    assert_eq!(form.options.len(), 2);
    assert!(form.options.iter().all(|o| o.action == "card"));

    assert_eq!(game.propose_veto(&reviewer), Err(GameError::InvalidAction));
    game.select_card(&reviewer, 0).unwrap();
    assert_eq!(game.board.accept, 1);
    assert_eq!(game.promotion_tracker, 0);
}
