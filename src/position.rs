use std::fmt;

use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: usize = 8;

/// A square on the 8x8 grid. Row 0 is the top of the board (player 2's back
/// rank), column 0 is the left edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    pub fn in_bounds(row: i32, col: i32) -> bool {
        (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
    }

    /// The square `(dr, dc)` away from this one, or `None` if it falls off the board.
    pub fn offset(self, dr: i32, dc: i32) -> Option<Position> {
        let r = self.row as i32 + dr;
        let c = self.col as i32 + dc;
        if Self::in_bounds(r, c) {
            Some(Position::new(r as usize, c as usize))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.row * BOARD_SIZE + self.col
    }

    pub const fn from_index(index: usize) -> Self {
        Position::new(index / BOARD_SIZE, index % BOARD_SIZE)
    }

    pub const fn is_on_board(self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Single-bit occupancy mask for this square, empty for off-board squares.
    pub const fn bit(self) -> u64 {
        if self.is_on_board() {
            1u64 << self.index()
        } else {
            0
        }
    }

    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE * BOARD_SIZE).map(Position::from_index)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Iterates the squares of a bitmask in ascending bit order.
pub struct Squares(pub u64);

impl Iterator for Squares {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 == 0 {
            None
        } else {
            let lsb = self.0.trailing_zeros() as usize;
            self.0 &= self.0 - 1;
            Some(Position::from_index(lsb))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_stays_on_board() {
        let corner = Position::new(0, 7);
        assert_eq!(corner.offset(1, -1), Some(Position::new(1, 6)));
        assert_eq!(corner.offset(-1, 0), None);
        assert_eq!(corner.offset(0, 1), None);
    }

    #[test]
    fn off_board_square_has_empty_mask() {
        assert!(!Position::new(8, 0).is_on_board());
        assert_eq!(Position::new(8, 0).bit(), 0);
        assert_eq!(Position::new(0, 9).bit(), 0);
        assert_eq!(Position::new(7, 7).bit(), 1 << 63);
    }

    #[test]
    fn squares_iterates_in_bit_order() {
        let mask = Position::new(7, 7).bit() | Position::new(0, 2).bit() | Position::new(3, 0).bit();
        let squares: Vec<Position> = Squares(mask).collect();
        assert_eq!(
            squares,
            vec![Position::new(0, 2), Position::new(3, 0), Position::new(7, 7)]
        );
    }
}
