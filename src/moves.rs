use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::game::{GameMove, Player};
use crate::piece::{Piece, PieceKind};
use crate::position::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    Normal,
    EnPassant,
    PawnPromote,
    CastleKingSide,
    CastleQueenSide,
}

/// One ply. `captured` and `player` are annotations written by
/// `ChessBoard::apply_move`; moves handed out by move generation leave
/// them unset.
///
/// Equality compares start, end and promotion kind only. The move kind is
/// deliberately left out, so a `Normal` and a `CastleKingSide` move between
/// the same squares compare equal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChessMove {
    pub from: Position,
    pub to: Position,
    pub kind: MoveKind,
    pub promotion: Option<PieceKind>,
    pub captured: Option<Piece>,
    pub player: Option<Player>,
}

impl ChessMove {
    pub fn new(from: Position, to: Position) -> Self {
        Self::with_kind(from, to, MoveKind::Normal)
    }

    pub fn with_kind(from: Position, to: Position, kind: MoveKind) -> Self {
        ChessMove {
            from,
            to,
            kind,
            promotion: None,
            captured: None,
            player: None,
        }
    }

    pub fn promotion(from: Position, to: Position, promote_to: PieceKind) -> Self {
        ChessMove {
            promotion: Some(promote_to),
            ..Self::with_kind(from, to, MoveKind::PawnPromote)
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn is_castle(&self) -> bool {
        matches!(self.kind, MoveKind::CastleKingSide | MoveKind::CastleQueenSide)
    }
}

impl PartialEq for ChessMove {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to && self.promotion == other.promotion
    }
}

impl Eq for ChessMove {}

impl Hash for ChessMove {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
        self.promotion.hash(state);
    }
}

impl GameMove for ChessMove {}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, " ({kind:?})")?;
        }
        Ok(())
    }
}
