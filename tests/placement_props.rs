use std::collections::HashSet;

use broadside::{Board, CellState, Coord, FleetLayout, Rules, ShipType, ShotOutcome};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn ready_board(rules: &Rules, seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let layout = FleetLayout::random(rules, &mut rng);
    let mut board = Board::new(rules.clone());
    board.install_fleet(&layout).unwrap();
    board
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fleet_occupied_set_is_union_of_ships(seed in any::<u64>()) {
        let rules = Rules::default();
        let board = ready_board(&rules, seed);

        let mut union: HashSet<Coord> = HashSet::new();
        for ship in board.fleet().ships() {
            for &cell in ship.cells() {
                prop_assert!(cell.row < rules.height, "row out of bounds: {}", cell);
                prop_assert!(cell.col < rules.width, "col out of bounds: {}", cell);
                prop_assert!(union.insert(cell), "cell occupied twice: {}", cell);
            }
        }
        let occupied: HashSet<Coord> = board.fleet().occupied().collect();
        prop_assert_eq!(&occupied, &union);
        prop_assert_eq!(occupied.len(), rules.fleet_cell_count());

        // the grid's ship cells mirror the fleet exactly
        for coord in board.grid().coords() {
            let on_grid = board.grid().cell(coord) == Some(CellState::Ship);
            prop_assert_eq!(on_grid, union.contains(&coord));
        }
    }

    #[test]
    fn random_layout_fits_cramped_grid(seed in any::<u64>()) {
        let rules = Rules::new(
            5,
            5,
            vec![ShipType::Cruiser, ShipType::Submarine, ShipType::Destroyer],
        );
        let board = ready_board(&rules, seed);
        prop_assert!(board.is_ready());
        prop_assert_eq!(board.fleet().occupied().count(), rules.fleet_cell_count());
    }

    #[test]
    fn second_shot_changes_nothing(seed in any::<u64>(), row in 0u8..10, col in 0u8..10) {
        let mut board = ready_board(&Rules::default(), seed);
        let coord = Coord::new(row, col);

        let first = board.resolve_shot(coord).unwrap();
        prop_assert_ne!(first, ShotOutcome::AlreadyTargeted);
        let after_first = board.clone();

        let second = board.resolve_shot(coord).unwrap();
        prop_assert_eq!(second, ShotOutcome::AlreadyTargeted);
        prop_assert_eq!(board.grid(), after_first.grid());
        prop_assert_eq!(board.fleet(), after_first.fleet());
    }

    #[test]
    fn destroyed_iff_every_cell_hit(seed in any::<u64>()) {
        let mut board = ready_board(&Rules::default(), seed);
        let cells: Vec<Coord> = board.fleet().occupied().collect();

        let (last, rest) = cells.split_last().unwrap();
        for &coord in rest {
            board.resolve_shot(coord).unwrap();
            prop_assert!(!board.fleet().is_destroyed());
        }
        let outcome = board.resolve_shot(*last).unwrap();
        prop_assert!(matches!(outcome, ShotOutcome::Sunk(_)));
        prop_assert!(board.fleet().is_destroyed());
    }

    #[test]
    fn reveal_view_never_leaks_ships(seed in any::<u64>(), shots in prop::collection::vec((0u8..10, 0u8..10), 0..40)) {
        let mut board = ready_board(&Rules::default(), seed);
        for &(row, col) in &shots {
            let _ = board.resolve_shot(Coord::new(row, col));
        }
        let view = board.reveal_view();
        // each distinct shot marks exactly one cell
        let distinct: HashSet<(u8, u8)> = shots.iter().copied().collect();
        prop_assert_eq!(view.targeted(), distinct.len());
        for coord in board.grid().coords() {
            let cell = view.cell(coord).unwrap();
            prop_assert_ne!(cell, CellState::Ship);
            if cell == CellState::Empty {
                // an Empty view cell may hide an unhit ship, never a shot
                let real = board.grid().cell(coord).unwrap();
                prop_assert!(!real.is_targeted());
            }
        }
    }
}
