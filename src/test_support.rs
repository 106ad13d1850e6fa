//! Helpers shared by the unit tests: algebraic squares and move-list replay.

use crate::board::ChessBoard;
use crate::moves::ChessMove;
use crate::position::Position;

/// `"c2"` -> row 6, col 2. Rank 1 is the bottom row (row 7).
pub(crate) fn pos(square: &str) -> Position {
    let bytes = square.as_bytes();
    assert_eq!(bytes.len(), 2, "bad square {square:?}");
    let col = usize::from(bytes[0] - b'a');
    let rank = usize::from(bytes[1] - b'0');
    Position::new(8 - rank, col)
}

/// `"e2, e4"` -> a normal move between the two squares.
pub(crate) fn mv(text: &str) -> ChessMove {
    let (from, to) = text
        .split_once(',')
        .unwrap_or_else(|| panic!("bad move {text:?}"));
    ChessMove::new(pos(from.trim()), pos(to.trim()))
}

/// Applies the legal move equal to `wanted`, so castling, en passant and
/// promotion moves pick up their generated kind.
pub(crate) fn play(board: &mut ChessBoard, wanted: ChessMove) {
    let found = board
        .possible_moves()
        .into_iter()
        .find(|m| *m == wanted)
        .unwrap_or_else(|| panic!("{wanted} is not legal here"));
    board.apply_move(found).expect("legal move applies");
}

pub(crate) fn apply(board: &mut ChessBoard, moves: &[&str]) {
    for text in moves {
        play(board, mv(text));
    }
}

pub(crate) fn board_from_moves(moves: &[&str]) -> ChessBoard {
    let mut board = ChessBoard::new();
    apply(&mut board, moves);
    board
}

pub(crate) fn moves_from(moves: &[ChessMove], from: Position) -> Vec<ChessMove> {
    moves.iter().filter(|m| m.from == from).cloned().collect()
}
