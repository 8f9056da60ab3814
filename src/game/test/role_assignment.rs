//! Role assignment and game setup tests

use super::super::player::{assign_roles, num_libbys, Role, MAX_PLAYERS, MIN_PLAYERS};
use super::super::{Game, GameState};
use super::test_utils::*;
use crate::error::GameError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn role_counts_for_every_player_count() {
    let expected = [(5, 3, 1), (6, 4, 1), (7, 4, 2), (8, 5, 2), (9, 5, 3), (10, 6, 3)];
    for (num_players, libbys, conspirators) in expected {
        for seed in 0..10 {
            let game = create_test_game(num_players, seed);
            let count = |role| game.players.values().filter(|p| p.role == role).count();
            assert_eq!(count(Role::Libby), libbys, "{num_players} players");
            assert_eq!(count(Role::Conspirator), conspirators, "{num_players} players");
            assert_eq!(count(Role::Dillon), 1, "{num_players} players");
            assert_eq!(count(Role::Waiting), 0);
            assert_eq!(num_libbys(num_players), Some(libbys));
        }
    }
}

#[test]
fn roles_are_a_partition_of_the_players() {
    let players: Vec<String> = (0..8).map(player_id).collect();
    let roles = assign_roles(&players, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
    let mut all: Vec<String> = roles
        .libbys
        .iter()
        .chain(roles.dillons.iter())
        .chain(std::iter::once(&roles.dillon))
        .cloned()
        .collect();
    all.sort();
    let mut expected = players.clone();
    expected.sort();
    assert_eq!(all, expected);
}

#[test]
fn too_few_players_cannot_start() {
    let lobby = create_lobby(MIN_PLAYERS - 1);
    assert_eq!(Game::start(&lobby, 0).unwrap_err(), GameError::TooFewPlayers);
    // The lobby is untouched
    assert_eq!(lobby.players.len(), MIN_PLAYERS - 1);
}

#[test]
fn too_many_players_are_refused() {
    let players: Vec<String> = (0..MAX_PLAYERS + 1).map(player_id).collect();
    let result = assign_roles(&players, &mut ChaCha8Rng::seed_from_u64(0));
    assert_eq!(result.unwrap_err(), GameError::TooManyPlayers);
}

#[test]
fn game_starts_with_a_nomination() {
    let mut game = create_test_game(5, 42);
    assert!(matches!(game.state, GameState::Nominate));
    assert_eq!(game.manager, game.turn_order[0]);
    assert_eq!(game.promotion_tracker, 0);
    assert_eq!(game.deck.count(), 17);

    let manager = game.manager.clone();
    let notices = game.take_notices();
    let prompt = notices
        .iter()
        .filter(|n| n.is_private_to(&manager))
        .find_map(|n| n.prompt.clone())
        .expect("nomination form");
    assert_eq!(prompt.options.len(), 4);
    assert!(prompt.options.iter().all(|o| o.value != manager));
    assert_eq!(prompt.session, format!("{}:{}", game.game_id, game.form_id.clone().unwrap()));
}

#[test]
fn role_briefings() {
    for (num_players, dillon_knows) in [(5, true), (6, true), (7, false), (10, false)] {
        let mut game = create_test_game(num_players, 3);
        let notices = game.take_notices();
        let dillon = game.roles.dillon.clone();
        let dillon_name = game.players[&dillon].name.clone();

        for conspirator in game.roles.dillons.clone() {
            let texts = private_texts(&notices, &conspirator);
            assert!(texts[0].starts_with("You are a dillon"));
            assert!(texts[0].contains(&format!("Dillon is {dillon_name}")));
        }

        let texts = private_texts(&notices, &dillon);
        assert!(texts[0].starts_with("You are Dillon"));
        assert_eq!(texts[0].contains("The other dillons are"), dillon_knows, "{num_players} players");

        for libby in game.roles.libbys.clone() {
            let texts = private_texts(&notices, &libby);
            assert_eq!(texts[0], "You are a libby");
        }
    }
}

#[test]
fn same_seed_same_game() {
    let a = create_test_game(7, 99);
    let b = create_test_game(7, 99);
    assert_eq!(a.turn_order, b.turn_order);
    assert_eq!(a.roles.dillon, b.roles.dillon);
    assert_eq!(a.deck.peek_three(), b.deck.peek_three());
}
