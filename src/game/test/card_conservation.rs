//! Randomised playthroughs checking the invariants that must hold in every state

use super::super::votes::VoteChoice;
use super::super::{Game, GameState, ManagerialPower, ReviewTurn, Step, VetoStatus};
use super::test_utils::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Makes one random legal move, as whoever the game is waiting on.
fn random_move(game: &mut Game, rng: &mut ChaCha8Rng) {
    let manager = game.manager.clone();
    match game.state.clone() {
        GameState::Nominate => {
            let reviewer = game.eligible_reviewers().choose(rng).cloned().unwrap();
            game.nominate(&manager, &reviewer).unwrap();
        }
        GameState::Vote { .. } => {
            // Lean towards ja so that games make progress
            for player in game.turn_order.clone() {
                let choice = if rng.gen_bool(0.7) { VoteChoice::Ja } else { VoteChoice::Nein };
                game.cast_vote(&player, choice).unwrap();
            }
        }
        GameState::Review { reviewer, turn } => match turn {
            ReviewTurn::Manager => game.select_card(&manager, rng.gen_range(0..3)).unwrap(),
            ReviewTurn::Reviewer { veto: VetoStatus::CanVeto } if rng.gen_bool(0.5) => {
                game.propose_veto(&reviewer).unwrap()
            }
            ReviewTurn::Reviewer { .. } => game.select_card(&reviewer, rng.gen_range(0..2)).unwrap(),
            ReviewTurn::VetoRequested => game.respond_to_veto(&manager, rng.gen_bool(0.5)).unwrap(),
        },
        GameState::Managerial { power, .. } => {
            let target = game.power_targets(power).choose(rng).cloned().unwrap();
            game.use_power(&manager, &target).unwrap();
        }
        GameState::GameOver(_) => {}
    }
}

fn assert_invariants(game: &Game) {
    assert_cards_conserved(game);
    assert!(game.promotion_tracker < 3);
    assert!(game.board.accept <= 5);
    assert!(game.board.reject <= 6);
    assert!(game.turn_order.contains(&game.manager));
    assert!(game.manager_index < game.turn_order.len());
    for id in &game.turn_order {
        assert!(game.players[id].is_employed());
    }
    assert!(game.players.len() - game.turn_order.len() <= 2);
    if let GameState::Managerial { power, .. } = game.state {
        assert_ne!(power, ManagerialPower::Peek);
    }
    if !matches!(game.state, GameState::Review { .. }) {
        assert!(game.deck.hand().is_empty());
    }
}

#[test]
fn random_playthroughs() {
    for num_players in 5..=10 {
        for seed in 0..20 {
            let mut game = create_test_game(num_players, seed);
            let mut rng = ChaCha8Rng::seed_from_u64(seed * 100 + num_players as u64);
            let mut moves = 0;

            while game.step() != Step::Over {
                random_move(&mut game, &mut rng);
                game.take_notices();
                assert_invariants(&game);

                moves += 1;
                assert!(moves < 1000, "game did not finish");
            }
            assert!(game.outcome().is_some());
        }
    }
}

#[test]
fn games_survive_serialization() {
    let mut game = create_test_game(8, 5);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..12 {
        if game.game_over() {
            break;
        }
        random_move(&mut game, &mut rng);
    }

    let json = serde_json::to_string(&game).unwrap();
    let mut restored: Game = serde_json::from_str(&json).unwrap();
    assert_eq!(serde_json::to_value(&game).unwrap(), serde_json::to_value(&restored).unwrap());

    // The restored game continues exactly as the original would
    let mut a = ChaCha8Rng::seed_from_u64(9);
    let mut b = ChaCha8Rng::seed_from_u64(9);
    for _ in 0..6 {
        if game.game_over() {
            break;
        }
        random_move(&mut game, &mut a);
        random_move(&mut restored, &mut b);
        assert_eq!(game.step(), restored.step());
        assert_eq!(game.deck.peek_three(), restored.deck.peek_three());
    }
}
