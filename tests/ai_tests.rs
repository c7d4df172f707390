use std::collections::HashSet;

use broadside::{
    AiOpponent, Board, Coord, Match, Opponent, PlayerSlot, RelayOpponent, Rules, TurnState,
};

#[test]
fn test_ai_layout_passes_validator() {
    let rules = Rules::default();
    for seed in 0..20 {
        let mut ai = AiOpponent::seeded(&rules, seed);
        let layout = ai.place_ships(&rules);
        let mut board = Board::new(rules.clone());
        board.install_fleet(&layout).unwrap();
        assert!(board.is_ready());
    }
}

#[test]
fn test_ai_never_repeats_a_shot() {
    let rules = Rules::default();
    let mut ai = AiOpponent::seeded(&rules, 7);
    let mut seen = HashSet::new();
    let mut last = Coord::new(0, 0);
    // exhaust the entire grid
    for _ in 0..rules.cell_count() {
        let coord = ai.calculate_next_shot();
        assert!(coord.row < rules.height && coord.col < rules.width);
        assert!(seen.insert(coord), "repeated shot at {}", coord);
        // alternate feedback to churn the follow-up queue
        ai.process_last_shot_result(seen.len() % 3 == 0);
        last = coord;
    }
    assert_eq!(seen.len(), rules.cell_count());

    // a spent grid saturates on the final shot
    assert_eq!(ai.calculate_next_shot(), last);
    assert_eq!(ai.calculate_next_shot(), last);
}

#[test]
fn test_hunt_sticks_to_parity() {
    let rules = Rules::default();
    let mut ai = AiOpponent::seeded(&rules, 42);
    for _ in 0..10 {
        let coord = ai.calculate_next_shot();
        assert_eq!((coord.row as usize + coord.col as usize) % 2, 0);
        ai.process_last_shot_result(false);
    }
}

#[test]
fn test_hit_pulls_fire_to_neighbors() {
    let rules = Rules::default();
    let mut ai = AiOpponent::seeded(&rules, 9);
    let first = ai.calculate_next_shot();
    ai.process_last_shot_result(true);

    let second = ai.calculate_next_shot();
    let dr = (first.row as i16 - second.row as i16).abs();
    let dc = (first.col as i16 - second.col as i16).abs();
    assert_eq!(dr + dc, 1, "follow-up {} not adjacent to hit {}", second, first);
}

#[test]
fn test_seeded_ai_is_reproducible() {
    let rules = Rules::default();
    let mut a = AiOpponent::seeded(&rules, 1234);
    let mut b = AiOpponent::seeded(&rules, 1234);
    assert_eq!(a.place_ships(&rules), b.place_ships(&rules));
    for _ in 0..30 {
        let shot_a = a.calculate_next_shot();
        let shot_b = b.calculate_next_shot();
        assert_eq!(shot_a, shot_b);
        a.process_last_shot_result(shot_a.col % 2 == 0);
        b.process_last_shot_result(shot_b.col % 2 == 0);
    }
}

#[test]
fn test_ai_vs_ai_match_terminates() {
    let rules = Rules::default();
    let mut one = AiOpponent::seeded(&rules, 11);
    let mut two = AiOpponent::seeded(&rules, 22);

    let mut game = Match::new(rules.clone());
    game.submit_fleet(PlayerSlot::One, &one.place_ships(&rules))
        .unwrap();
    game.submit_fleet(PlayerSlot::Two, &two.place_ships(&rules))
        .unwrap();

    let mut turns = 0;
    loop {
        let active = match game.state() {
            TurnState::AwaitingShot(active) => active,
            TurnState::GameOver(_) => break,
            other => panic!("unexpected state {:?}", other),
        };
        let ai = match active {
            PlayerSlot::One => &mut one,
            PlayerSlot::Two => &mut two,
        };
        let outcome = game.fire(active, ai.calculate_next_shot()).unwrap();
        ai.process_last_shot_result(outcome.is_hit());

        turns += 1;
        if turns > 200 {
            panic!("game took too many turns");
        }
    }
    assert!(game.winner().is_some());
}

#[test]
fn test_relay_opponent_feeds_from_handle() {
    let rules = Rules::default();
    let (mut relay, handle) = RelayOpponent::channel();

    let mut scripted = AiOpponent::seeded(&rules, 5);
    let layout = scripted.place_ships(&rules);
    handle.layouts.send(layout.clone()).unwrap();
    handle.shots.send(Coord::new(4, 2)).unwrap();

    assert_eq!(relay.place_ships(&rules), layout);
    assert_eq!(relay.calculate_next_shot(), Coord::new(4, 2));

    relay.process_last_shot_result(true);
    assert!(handle.results.recv().unwrap());
}
