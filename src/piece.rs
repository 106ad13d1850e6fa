use serde::{Deserialize, Serialize};

use crate::game::Player;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Empty,
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Kinds a pawn may promote to, in the order promotion moves are generated.
pub const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Every occupying kind, in move generation order.
pub const OCCUPYING_KINDS: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

impl PieceKind {
    /// Standard material values in pawns. The king is never traded, so it
    /// carries no material.
    pub const fn value(self) -> u32 {
        match self {
            PieceKind::Pawn => 1,
            PieceKind::Knight | PieceKind::Bishop => 3,
            PieceKind::Rook => 5,
            PieceKind::Queen => 9,
            PieceKind::King | PieceKind::Empty => 0,
        }
    }

    /// Slot within a player's six occupancy masks, `None` for `Empty`.
    pub(crate) const fn slot(self) -> Option<usize> {
        match self {
            PieceKind::Empty => None,
            PieceKind::Pawn => Some(0),
            PieceKind::Knight => Some(1),
            PieceKind::Bishop => Some(2),
            PieceKind::Rook => Some(3),
            PieceKind::Queen => Some(4),
            PieceKind::King => Some(5),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub player: Option<Player>,
}

impl Piece {
    pub const EMPTY: Piece = Piece {
        kind: PieceKind::Empty,
        player: None,
    };

    pub const fn new(kind: PieceKind, player: Player) -> Self {
        Piece {
            kind,
            player: Some(player),
        }
    }

    pub const fn is_empty(self) -> bool {
        matches!(self.kind, PieceKind::Empty)
    }

    /// Owner as reported to UI layers: 0 for an empty square.
    pub fn player_number(self) -> u8 {
        self.player.map_or(0, Player::number)
    }
}

impl Default for Piece {
    fn default() -> Self {
        Piece::EMPTY
    }
}
