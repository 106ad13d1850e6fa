//! Error types for board construction and move application.

use thiserror::Error;

use crate::game::Player;
use crate::position::Position;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// A starting layout must place exactly one king per player.
    #[error("a chess board must have a single king for each player; player {} has {count}", .player.number())]
    KingCount { player: Player, count: usize },

    /// A layout entry or move names a square outside the 8x8 grid.
    #[error("square {0} is off the board")]
    OffBoard(Position),

    /// A layout entry names a piece kind but no owner.
    #[error("piece at {0} has no owning player")]
    UnownedPiece(Position),

    /// `apply_move` was handed a move whose start square is empty.
    #[error("no piece at start square {0}")]
    NoPieceAtStart(Position),

    #[error("no move to undo")]
    NothingToUndo,
}

pub type ChessResult<T> = Result<T, ChessError>;
