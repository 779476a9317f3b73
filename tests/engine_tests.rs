//! Rules of the game, exercised through the public engine API.

use disobey2026tetris::{
    Action,
    Court,
    DropOutcome,
    GameConfig,
    GameEngine,
    InputSnapshot,
    PieceKind,
    Rotation,
    bag::{
        BAG_SIZE,
        PieceBag,
    },
    engine::GAME_OVER,
    piece::for_each_occupied_cell,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::SeedableRng,
};

fn new_game(seed: u64) -> GameEngine<ChaCha8Rng> {
    GameEngine::new(GameConfig::default(), ChaCha8Rng::seed_from_u64(seed))
}

fn fill_row(court: &mut Court, y: i32, kind: PieceKind) {
    for x in 0..Court::WIDTH {
        court.set(x, y, Some(kind));
    }
}

/// Leaves columns 0 and 14 open in rows 1 and 2, so no row can complete and
/// every upright piece spawned on row 0 overlaps the stack.
fn block_spawn_rows(court: &mut Court) {
    for y in 1..=2 {
        for x in 1..Court::WIDTH - 1 {
            court.set(x, y, Some(PieceKind::O));
        }
    }
}

#[test]
fn every_shape_has_four_cells() {
    for kind in PieceKind::ALL {
        for rotation in Rotation::ALL {
            let mask = kind.piece_type().mask(rotation);
            let mut cells = 0;
            for_each_occupied_cell(kind, 0, 0, rotation, |_, _| cells += 1);
            assert_eq!(cells, mask.count_ones(), "{kind:?} {rotation:?}");
            assert_eq!(cells, 4);
        }
    }
}

#[test]
fn court_edges_are_occupied_but_the_sky_is_not() {
    let game = new_game(1);
    let kind = PieceKind::O;
    // O occupies columns 0..=1 and rows 0..=1 of its box.
    assert!(game.is_occupied(kind, -1, 5, Rotation::Up));
    assert!(game.is_occupied(kind, Court::WIDTH - 1, 5, Rotation::Up));
    assert!(game.is_occupied(kind, 5, Court::HEIGHT - 1, Rotation::Up));
    assert!(game.is_unoccupied(kind, 5, -2, Rotation::Up));
    assert!(game.is_unoccupied(kind, 5, -1, Rotation::Up));
    assert!(game.is_unoccupied(kind, 0, Court::HEIGHT - 2, Rotation::Up));
    assert!(game.is_unoccupied(kind, Court::WIDTH - 2, 0, Rotation::Up));
}

#[test]
fn bag_deals_four_of_each_kind() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut bag = PieceBag::new();
    let mut counts = [0; 7];
    for _ in 0..BAG_SIZE {
        counts[bag.draw(&mut rng).index()] += 1;
    }
    assert_eq!(counts, [4; 7]);
    assert_eq!(bag.remaining(), 0);

    bag.draw(&mut rng);
    assert_eq!(bag.remaining(), BAG_SIZE - 1);
}

#[test]
fn line_clears_score_by_row_count() {
    for (rows, points) in [(1u8, 100u32), (2, 200), (3, 400), (4, 800)] {
        let mut game = new_game(u64::from(rows));
        for y in Court::HEIGHT - i32::from(rows)..Court::HEIGHT {
            fill_row(game.court_mut(), y, PieceKind::I);
        }
        let score = game.score();
        let cleared = game.rows();

        assert_eq!(game.remove_lines(), rows);
        assert_eq!(game.score() - score, points);
        assert_eq!(game.rows() - cleared, u32::from(rows));
        assert!(game.court().is_empty());
    }
}

#[test]
fn cascading_clear_keeps_rows_between() {
    let mut game = new_game(3);
    let court = game.court_mut();
    fill_row(court, 5, PieceKind::L);
    fill_row(court, 7, PieceKind::J);
    court.set(0, 6, Some(PieceKind::I));
    court.set(14, 6, Some(PieceKind::I));
    court.set(3, 4, Some(PieceKind::T));
    court.set(7, 3, Some(PieceKind::S));
    court.set(2, 14, Some(PieceKind::Z));

    assert_eq!(game.remove_lines(), 2);
    assert_eq!(game.score(), 200);
    assert_eq!(game.rows(), 2);

    let court = game.court();
    assert_eq!(court.get(0, 7), Some(PieceKind::I));
    assert_eq!(court.get(14, 7), Some(PieceKind::I));
    assert_eq!(court.get(3, 6), Some(PieceKind::T));
    assert_eq!(court.get(7, 5), Some(PieceKind::S));
    assert_eq!(court.get(2, 14), Some(PieceKind::Z));
    assert_eq!(court.occupied_cells().count(), 5);
}

#[test]
fn spawn_collision_loses_the_game() {
    let mut game = new_game(11);
    block_spawn_rows(game.court_mut());

    assert_eq!(game.drop(), Some(DropOutcome::Lost { rows: 0 }));
    assert!(game.is_lost());
    assert!(!game.is_playing());
    assert_eq!(game.notification(), Some(GAME_OVER));
    assert_eq!(game.score(), 10);

    // Gravity has stopped.
    assert_eq!(game.drop(), None);
}

#[test]
fn any_move_after_losing_starts_over() {
    for action in [Action::MoveLeft, Action::MoveRight, Action::Rotate] {
        let mut game = new_game(12);
        block_spawn_rows(game.court_mut());
        game.drop();
        assert!(game.is_lost());

        assert!(game.apply(action));
        assert!(!game.is_lost());
        assert!(game.is_playing());
        assert_eq!(game.score(), 0);
        assert_eq!(game.rows(), 0);
        assert_eq!(game.notification(), None);
        assert!(game.court().is_empty());
    }
}

#[test]
fn forfeit_is_applied_before_moves() {
    let mut game = new_game(13);
    game.court_mut().set(0, Court::HEIGHT - 1, Some(PieceKind::T));
    let input = InputSnapshot {
        forfeit: true,
        left: true,
        ..InputSnapshot::NONE
    };
    // Forfeit ends the game, then the left press starts a fresh one.
    assert!(game.handle_input(input));
    assert!(game.is_playing());
    assert!(!game.is_lost());
    assert!(game.court().is_empty());

    let input = InputSnapshot {
        forfeit: true,
        ..InputSnapshot::NONE
    };
    assert!(game.handle_input(input));
    assert!(game.is_lost());
    assert!(!game.handle_input(input), "already lost");
}

#[test]
fn pieces_pile_up_until_the_game_ends() {
    let mut game = new_game(21);
    let mut locked = 0;
    let mut steps = 0;
    while game.is_playing() {
        steps += 1;
        assert!(steps < 10_000, "game never ended");
        if let Some(DropOutcome::Locked { .. }) = game.drop() {
            locked += 1;
        }
    }
    assert!(game.is_lost());
    assert!(locked > 0);
    assert!(game.score() >= 10 * (locked + 1));
}
