//! Full-game scenarios driven through the public API.

use abalone_core::{Cell, Color, Coord, Direction, Game, Piece, SelectionError, Snapshot};

fn coords(pairs: &[(i8, i8)]) -> Vec<Coord> {
    pairs.iter().map(|&(row, col)| Coord::new(row, col)).collect()
}

fn pieces_at(color: Color, cells: &[(i8, i8)]) -> Vec<Piece> {
    cells
        .iter()
        .map(|&(row, col)| Piece::new(color, Coord::new(row, col)))
        .collect()
}

/// Restore a game from marble lists, panicking on an invalid position.
fn position(white: &[(i8, i8)], black: &[(i8, i8)], turn: Color) -> Game {
    let mut pieces = pieces_at(Color::White, white);
    pieces.extend(pieces_at(Color::Black, black));
    Game::from_snapshot(&Snapshot { turn, pieces }).expect("position should be valid")
}

#[test]
fn test_opening_exchange() {
    let mut game = Game::new();

    // White brings the middle row down broadside.
    game.try_move(&coords(&[(-2, 2), (-2, 3), (-2, 4)]), Direction::DownRight)
        .unwrap()
        .expect("white's broadside should be legal");
    assert_eq!(game.turn(), Color::Black);
    assert_eq!(game.board().cell(Coord::new(-1, 4)), Cell::Occupied(Color::White));
    assert_eq!(game.board().cell(Coord::new(-2, 3)), Cell::Empty);

    // Black mirrors.
    game.try_move(&coords(&[(2, 2), (2, 3), (2, 4)]), Direction::UpRight)
        .unwrap()
        .expect("black's broadside should be legal");
    assert_eq!(game.turn(), Color::White);
    assert_eq!(game.board().cell(Coord::new(1, 4)), Cell::Occupied(Color::Black));

    // Picking the opponent's marbles is rejected and burns no turn.
    let result = game.try_move(&coords(&[(1, 3), (1, 4)]), Direction::UpLeft);
    assert_eq!(result, Err(SelectionError::NotOwnPiece));
    assert_eq!(game.turn(), Color::White);

    // A blocked step is refused and burns no turn either.
    let result = game.try_move(&coords(&[(-1, 3), (-1, 4)]), Direction::Right);
    assert_eq!(result, Ok(None));
    assert_eq!(game.turn(), Color::White);

    // White slides the freed pair onward instead.
    game.try_move(&coords(&[(-1, 4), (-1, 5)]), Direction::Right)
        .unwrap()
        .expect("white's in-line advance should be legal");
    assert_eq!(game.board().cell(Coord::new(-1, 6)), Cell::Occupied(Color::White));
    assert_eq!(game.board().cell(Coord::new(-1, 4)), Cell::Empty);

    assert_eq!(game.board().count(Color::White), 14);
    assert_eq!(game.board().count(Color::Black), 14);
    assert_eq!(game.winner(), None);
}

#[test]
fn test_sumito_capture_decides_the_game() {
    // Black sits on nine marbles, two of them trapped against the edge.
    let mut game = position(
        &[
            (0, 4),
            (0, 5),
            (0, 6),
            (-4, 0),
            (-4, 1),
            (-4, 2),
            (-4, 3),
            (-4, 4),
            (-3, 0),
        ],
        &[
            (0, 7),
            (0, 8),
            (4, 0),
            (4, 1),
            (4, 2),
            (4, 3),
            (4, 4),
            (3, 0),
            (3, 1),
        ],
        Color::White,
    );
    assert_eq!(game.winner(), None);

    let mov = game
        .try_move(&coords(&[(0, 4), (0, 5), (0, 6)]), Direction::Right)
        .unwrap()
        .expect("the three-on-two push should be legal");
    assert!(mov.is_push());
    assert_eq!(mov.captured(), Some(Piece::new(Color::Black, Coord::new(0, 8))));

    assert_eq!(game.board().count(Color::Black), 8);
    assert_eq!(game.board().cell(Coord::new(0, 8)), Cell::Occupied(Color::Black));
    assert_eq!(game.board().cell(Coord::new(0, 7)), Cell::Occupied(Color::White));
    assert_eq!(game.winner(), Some(Color::White));
}

#[test]
fn test_undo_walks_back_to_the_start() {
    let mut game = Game::new();
    let initial = game.clone();

    let first = game
        .try_move(&coords(&[(-2, 3)]), Direction::DownLeft)
        .unwrap()
        .expect("move should be legal");
    let second = game
        .try_move(&coords(&[(2, 3)]), Direction::UpRight)
        .unwrap()
        .expect("move should be legal");

    game.undo(&second);
    assert_eq!(game.turn(), Color::Black);
    game.undo(&first);
    assert_eq!(game, initial);
}

#[test]
fn test_snapshot_survives_json() {
    let mut game = Game::new();
    game.try_move(&coords(&[(-2, 2), (-2, 3)]), Direction::DownLeft)
        .unwrap()
        .expect("move should be legal");

    let json = serde_json::to_string(&game.snapshot()).unwrap();
    let snapshot: Snapshot = serde_json::from_str(&json).unwrap();
    let restored = Game::from_snapshot(&snapshot).unwrap();

    assert_eq!(restored, game);
    assert_eq!(restored.turn(), Color::Black);
    assert_eq!(restored.legal_moves().len(), game.legal_moves().len());
}

#[test]
fn test_random_playout_preserves_invariants() {
    use rand::prelude::*;

    let mut rng = rand::rng();

    for _ in 0..10 {
        let mut game = Game::new();

        for _ in 0..200 {
            if game.winner().is_some() {
                break;
            }
            let moves = game.legal_moves();
            if moves.is_empty() {
                break;
            }
            let mov = moves[rng.random_range(0..moves.len())];

            // Replay the generated move through the selection API.
            let mover = game.turn();
            let selection: Vec<Coord> = mov
                .sources()
                .iter()
                .filter(|piece| piece.color == mover)
                .map(|piece| piece.coord)
                .collect();

            let white_before = game.board().count(Color::White);
            let black_before = game.board().count(Color::Black);

            let applied = game
                .try_move(&selection, mov.direction())
                .unwrap()
                .expect("a generated move should validate");
            assert_eq!(applied, mov);
            assert_eq!(game.turn(), mover.opponent());

            let white_lost = white_before - game.board().count(Color::White);
            let black_lost = black_before - game.board().count(Color::Black);
            assert!(white_lost + black_lost <= 1, "a move captures at most one marble");
            assert_eq!(white_lost + black_lost > 0, mov.captured().is_some());
        }

        if let Some(winner) = game.winner() {
            assert!(game.board().count(winner.opponent()) < 9);
        }
    }
}
