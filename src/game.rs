// =============================================================================
// Game-independent abstractions
//
// Anything here is shared by every two-player board game the engine can
// search: the player identity, the material advantage summary, and the
// capability traits the minimax search is written against.
// =============================================================================

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// 1 or 2, as reported to UI layers.
    pub const fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    /// Inverse of `number`; anything but 1 or 2 is `None`.
    pub const fn from_number(n: u8) -> Option<Player> {
        match n {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }

    pub const fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

/// Which player is ahead, and by how much. `player` is `None` exactly when
/// `amount` is zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advantage {
    pub player: Option<Player>,
    pub amount: u32,
}

impl Advantage {
    pub const fn even() -> Self {
        Advantage { player: None, amount: 0 }
    }

    pub const fn new(player: Player, amount: u32) -> Self {
        if amount == 0 {
            Self::even()
        } else {
            Advantage { player: Some(player), amount }
        }
    }

    /// Builds the advantage from per-player totals.
    pub fn from_totals(player_one: u32, player_two: u32) -> Self {
        if player_one > player_two {
            Advantage::new(Player::One, player_one - player_two)
        } else if player_two > player_one {
            Advantage::new(Player::Two, player_two - player_one)
        } else {
            Advantage::even()
        }
    }

    /// Positive when player one leads, negative when player two does.
    pub fn signed(self) -> i64 {
        match self.player {
            Some(Player::One) => i64::from(self.amount),
            Some(Player::Two) => -i64::from(self.amount),
            None => 0,
        }
    }

    /// 0 for an even position, otherwise the leader's number.
    pub fn player_number(self) -> u8 {
        self.player.map_or(0, Player::number)
    }
}

impl Default for Advantage {
    fn default() -> Self {
        Self::even()
    }
}

/// A single ply of some game. Only value equality is required.
pub trait GameMove: Clone + PartialEq + Debug {}

/// The narrow surface the search needs from a game. Implementations mutate
/// in place: `apply_move` followed by `undo_last_move` must restore the
/// exact prior state.
pub trait GameBoard {
    type Move: GameMove;
    type Error: std::error::Error;

    fn current_player(&self) -> Player;

    fn is_finished(&self) -> bool;

    /// Evaluation signed so that positive favors player one.
    fn score(&self) -> i64;

    /// Legal moves for the side to move, recomputed on every call.
    fn possible_moves(&mut self) -> Vec<Self::Move>;

    fn apply_move(&mut self, m: Self::Move) -> Result<(), Self::Error>;

    fn undo_last_move(&mut self) -> Result<(), Self::Error>;
}
