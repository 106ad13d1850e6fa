use log::debug;
use serde::Serialize;

use crate::config::BoardConfig;
use crate::error::{ChessError, ChessResult};
use crate::game::{Advantage, GameBoard, Player};
use crate::moves::{ChessMove, MoveKind};
use crate::piece::{Piece, PieceKind, OCCUPYING_KINDS, PROMOTION_KINDS};
use crate::position::{Position, Squares, BOARD_SIZE};

pub type Bitboard = u64;

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1), (0, -1),
    (0, 1), (1, -1), (1, 0), (1, 1),
];

const STRAIGHT_DIRS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const DIAGONAL_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

const KING_START_COL: usize = 4;
const KINGSIDE_ROOK_COL: usize = 7;
const QUEENSIDE_ROOK_COL: usize = 0;

const BACK_RANK: [PieceKind; BOARD_SIZE] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Player one sits at the bottom (rows 6-7) and pushes pawns toward row 0.
const fn pawn_direction(player: Player) -> i32 {
    match player {
        Player::One => -1,
        Player::Two => 1,
    }
}

const fn pawn_start_row(player: Player) -> usize {
    match player {
        Player::One => 6,
        Player::Two => 1,
    }
}

const fn promotion_row(player: Player) -> usize {
    match player {
        Player::One => 0,
        Player::Two => 7,
    }
}

const fn back_row(player: Player) -> usize {
    match player {
        Player::One => 7,
        Player::Two => 0,
    }
}

/// Rook relocation (from, to) performed alongside a castling move.
fn castle_rook_squares(m: &ChessMove) -> Option<(Position, Position)> {
    let row = m.from.row;
    match m.kind {
        MoveKind::CastleKingSide => Some((
            Position::new(row, KINGSIDE_ROOK_COL),
            Position::new(row, KING_START_COL + 1),
        )),
        MoveKind::CastleQueenSide => Some((
            Position::new(row, QUEENSIDE_ROOK_COL),
            Position::new(row, KING_START_COL - 1),
        )),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    InProgress,
    Check,
    Checkmate,
    Stalemate,
    DrawByCounter,
}

/// What `unmake_move` needs beyond the move itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct UndoRecord {
    moved: Piece,
    captured_at: Option<Position>,
}

/// Chess position plus everything required to walk it back one ply at a
/// time. Twelve occupancy masks, indexed `player * 6 + kind slot`, hold the
/// pieces; `move_history`, `undo_history` and `draw_counters` always have
/// the same length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChessBoard {
    bitboards: [Bitboard; 12],
    current_player: Player,
    move_history: Vec<ChessMove>,
    undo_history: Vec<UndoRecord>,
    draw_counters: Vec<u32>,
    in_check: bool,
    checkmate: bool,
    stalemate: bool,
    advantage: Advantage,
    config: BoardConfig,
}

impl Default for ChessBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ChessBoard {
    fn empty(config: BoardConfig) -> Self {
        ChessBoard {
            bitboards: [0; 12],
            current_player: Player::One,
            move_history: Vec::new(),
            undo_history: Vec::new(),
            draw_counters: Vec::new(),
            in_check: false,
            checkmate: false,
            stalemate: false,
            advantage: Advantage::even(),
            config,
        }
    }

    pub fn new() -> Self {
        Self::with_config(BoardConfig::default())
    }

    /// Standard starting arrangement with custom rule parameters.
    pub fn with_config(config: BoardConfig) -> Self {
        let mut board = Self::empty(config);
        for (col, &kind) in BACK_RANK.iter().enumerate() {
            board.place_piece(Position::new(back_row(Player::Two), col), Piece::new(kind, Player::Two));
            board.place_piece(Position::new(back_row(Player::One), col), Piece::new(kind, Player::One));
        }
        for col in 0..BOARD_SIZE {
            board.place_piece(
                Position::new(pawn_start_row(Player::Two), col),
                Piece::new(PieceKind::Pawn, Player::Two),
            );
            board.place_piece(
                Position::new(pawn_start_row(Player::One), col),
                Piece::new(PieceKind::Pawn, Player::One),
            );
        }
        board.recompute_derived();
        board.refresh_status();
        board
    }

    /// Builds a board from an explicit layout with player one to move. A later
    /// entry for the same square replaces an earlier one.
    pub fn from_pieces<I>(pieces: I) -> ChessResult<Self>
    where
        I: IntoIterator<Item = (Position, Piece)>,
    {
        Self::from_pieces_with_config(pieces, BoardConfig::default())
    }

    pub fn from_pieces_with_config<I>(pieces: I, config: BoardConfig) -> ChessResult<Self>
    where
        I: IntoIterator<Item = (Position, Piece)>,
    {
        let mut board = Self::empty(config);
        let mut count = 0;
        for (pos, piece) in pieces {
            if !pos.is_on_board() {
                return Err(ChessError::OffBoard(pos));
            }
            if !piece.is_empty() && piece.player.is_none() {
                return Err(ChessError::UnownedPiece(pos));
            }
            board.place_piece(pos, piece);
            count += 1;
        }

        for player in [Player::One, Player::Two] {
            let kings = board.pieces(PieceKind::King, player).count_ones() as usize;
            if kings != 1 {
                return Err(ChessError::KingCount { player, count: kings });
            }
        }

        board.recompute_derived();
        board.refresh_status();
        debug!(
            "board built from {count} layout entries, status {:?}, advantage {:?}",
            board.status(),
            board.advantage
        );
        Ok(board)
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn current_advantage(&self) -> Advantage {
        self.advantage
    }

    pub fn move_history(&self) -> &[ChessMove] {
        &self.move_history
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Consecutive plies without a capture or pawn move.
    pub fn draw_counter(&self) -> u32 {
        self.draw_counters.last().copied().unwrap_or(0)
    }

    /// The side to move is in check but still has a legal reply.
    pub fn is_check(&self) -> bool {
        self.in_check && !self.checkmate
    }

    pub fn is_checkmate(&self) -> bool {
        self.checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.stalemate
    }

    pub fn is_draw(&self) -> bool {
        self.draw_counter() >= self.config.draw_threshold
    }

    pub fn is_finished(&self) -> bool {
        self.checkmate || self.stalemate || self.is_draw()
    }

    pub fn status(&self) -> GameStatus {
        if self.checkmate {
            GameStatus::Checkmate
        } else if self.stalemate {
            GameStatus::Stalemate
        } else if self.is_draw() {
            GameStatus::DrawByCounter
        } else if self.in_check {
            GameStatus::Check
        } else {
            GameStatus::InProgress
        }
    }

    fn mask_index(kind: PieceKind, player: Player) -> Option<usize> {
        kind.slot().map(|slot| player.index() * 6 + slot)
    }

    /// Occupancy mask for one piece kind of one player.
    pub fn pieces(&self, kind: PieceKind, player: Player) -> Bitboard {
        Self::mask_index(kind, player).map_or(0, |i| self.bitboards[i])
    }

    fn player_mask(&self, player: Player) -> Bitboard {
        let start = player.index() * 6;
        self.bitboards[start..start + 6].iter().fold(0, |acc, bb| acc | bb)
    }

    fn occupied(&self) -> Bitboard {
        self.bitboards.iter().fold(0, |acc, bb| acc | bb)
    }

    pub fn piece_at(&self, pos: Position) -> Piece {
        let bit = pos.bit();
        for player in [Player::One, Player::Two] {
            for kind in OCCUPYING_KINDS {
                if self.pieces(kind, player) & bit != 0 {
                    return Piece::new(kind, player);
                }
            }
        }
        Piece::EMPTY
    }

    /// 0 for an empty square, otherwise the owner's number.
    pub fn player_at(&self, pos: Position) -> u8 {
        self.piece_at(pos).player_number()
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.occupied() & pos.bit() == 0
    }

    /// True if `pos` holds a piece belonging to `player`'s opponent.
    pub fn is_enemy(&self, pos: Position, player: Player) -> bool {
        self.player_mask(player.other()) & pos.bit() != 0
    }

    pub fn positions_of(&self, kind: PieceKind, player: Player) -> impl Iterator<Item = Position> {
        Squares(self.pieces(kind, player))
    }

    pub fn king_position(&self, player: Player) -> Option<Position> {
        self.positions_of(PieceKind::King, player).next()
    }

    // -------------------------------------------------------------------------
    // Attack detection
    // -------------------------------------------------------------------------

    /// First occupied square walking from `from` (exclusive) along `dir`.
    fn first_blocker(from: Position, (dr, dc): (i32, i32), occupied: Bitboard) -> Option<Position> {
        let mut current = from;
        while let Some(next) = current.offset(dr, dc) {
            if occupied & next.bit() != 0 {
                return Some(next);
            }
            current = next;
        }
        None
    }

    /// Whether any piece of `by` attacks `target`. Looks outward from the
    /// target for each attacker pattern rather than generating moves.
    pub fn is_attacked(&self, target: Position, by: Player) -> bool {
        let hits = |offsets: &[(i32, i32)], attackers: Bitboard| {
            offsets
                .iter()
                .filter_map(|&(dr, dc)| target.offset(dr, dc))
                .any(|p| attackers & p.bit() != 0)
        };

        if hits(&KNIGHT_OFFSETS[..], self.pieces(PieceKind::Knight, by)) {
            return true;
        }
        if hits(&KING_OFFSETS[..], self.pieces(PieceKind::King, by)) {
            return true;
        }

        // An attacking pawn stands one row behind the target from its own side.
        let back = -pawn_direction(by);
        if hits(&[(back, -1), (back, 1)][..], self.pieces(PieceKind::Pawn, by)) {
            return true;
        }

        let occupied = self.occupied();
        let queens = self.pieces(PieceKind::Queen, by);
        let straight = self.pieces(PieceKind::Rook, by) | queens;
        let diagonal = self.pieces(PieceKind::Bishop, by) | queens;
        let ray_hits = |dirs: &[(i32, i32)], attackers: Bitboard| {
            dirs.iter().any(|&dir| {
                Self::first_blocker(target, dir, occupied).is_some_and(|p| attackers & p.bit() != 0)
            })
        };

        ray_hits(&STRAIGHT_DIRS[..], straight) || ray_hits(&DIAGONAL_DIRS[..], diagonal)
    }

    /// Every square `by` currently attacks, in row-major order.
    pub fn attacked_positions(&self, by: Player) -> Vec<Position> {
        Position::all().filter(|&p| self.is_attacked(p, by)).collect()
    }

    pub fn is_in_check(&self, player: Player) -> bool {
        self.king_position(player)
            .is_some_and(|king| self.is_attacked(king, player.other()))
    }

    // -------------------------------------------------------------------------
    // Move generation
    // -------------------------------------------------------------------------

    /// Legal moves for the side to move. Each pseudo-legal candidate is
    /// applied, the mover's king is tested, and the candidate is undone.
    pub fn possible_moves(&mut self) -> Vec<ChessMove> {
        let candidates = self.pseudo_legal_moves(self.current_player);
        candidates.into_iter().filter(|m| self.is_legal(m)).collect()
    }

    fn has_legal_move(&mut self) -> bool {
        let candidates = self.pseudo_legal_moves(self.current_player);
        candidates.iter().any(|m| self.is_legal(m))
    }

    fn is_legal(&mut self, m: &ChessMove) -> bool {
        let player = self.current_player;
        let moved = self.piece_at(m.from);
        if moved.is_empty() {
            return false;
        }
        self.make_move(m.clone(), moved);
        let safe = !self.is_in_check(player);
        self.unmake_move();
        safe
    }

    fn pseudo_legal_moves(&self, player: Player) -> Vec<ChessMove> {
        let mut moves = Vec::new();

        for from in self.positions_of(PieceKind::Pawn, player) {
            self.generate_pawn_moves(from, player, &mut moves);
        }
        for from in self.positions_of(PieceKind::Knight, player) {
            self.generate_step_moves(from, player, &KNIGHT_OFFSETS, &mut moves);
        }
        for from in self.positions_of(PieceKind::Bishop, player) {
            self.generate_sliding_moves(from, player, &DIAGONAL_DIRS, &mut moves);
        }
        for from in self.positions_of(PieceKind::Rook, player) {
            self.generate_sliding_moves(from, player, &STRAIGHT_DIRS, &mut moves);
        }
        for from in self.positions_of(PieceKind::Queen, player) {
            self.generate_sliding_moves(from, player, &STRAIGHT_DIRS, &mut moves);
            self.generate_sliding_moves(from, player, &DIAGONAL_DIRS, &mut moves);
        }
        for from in self.positions_of(PieceKind::King, player) {
            self.generate_step_moves(from, player, &KING_OFFSETS, &mut moves);
        }
        self.generate_castling_moves(player, &mut moves);

        moves
    }

    /// A pawn landing on the final row fans out into one move per promotion kind.
    fn push_pawn_move(from: Position, to: Position, player: Player, moves: &mut Vec<ChessMove>) {
        if to.row == promotion_row(player) {
            for kind in PROMOTION_KINDS {
                moves.push(ChessMove::promotion(from, to, kind));
            }
        } else {
            moves.push(ChessMove::new(from, to));
        }
    }

    fn generate_pawn_moves(&self, from: Position, player: Player, moves: &mut Vec<ChessMove>) {
        let dir = pawn_direction(player);

        if let Some(single) = from.offset(dir, 0) {
            if self.is_empty(single) {
                Self::push_pawn_move(from, single, player, moves);

                if from.row == pawn_start_row(player) {
                    if let Some(double) = single.offset(dir, 0) {
                        if self.is_empty(double) {
                            moves.push(ChessMove::new(from, double));
                        }
                    }
                }
            }
        }

        for dc in [-1, 1] {
            if let Some(target) = from.offset(dir, dc) {
                if self.is_enemy(target, player) {
                    Self::push_pawn_move(from, target, player, moves);
                }
            }
        }

        if let Some(target) = self.en_passant_target(from, player) {
            moves.push(ChessMove::with_kind(from, target, MoveKind::EnPassant));
        }
    }

    /// The square a pawn at `from` may capture into en passant, if the last
    /// move was an enemy pawn's double step landing right beside it.
    fn en_passant_target(&self, from: Position, player: Player) -> Option<Position> {
        let last = self.move_history.last()?;
        let landed = self.piece_at(last.to);
        let double_step = landed == Piece::new(PieceKind::Pawn, player.other())
            && last.from.col == last.to.col
            && last.from.row.abs_diff(last.to.row) == 2;
        if !double_step || last.to.row != from.row || last.to.col.abs_diff(from.col) != 1 {
            return None;
        }
        last.to.offset(pawn_direction(player), 0)
    }

    fn generate_step_moves(
        &self,
        from: Position,
        player: Player,
        offsets: &[(i32, i32)],
        moves: &mut Vec<ChessMove>,
    ) {
        let own = self.player_mask(player);
        for &(dr, dc) in offsets {
            if let Some(to) = from.offset(dr, dc) {
                if own & to.bit() == 0 {
                    moves.push(ChessMove::new(from, to));
                }
            }
        }
    }

    fn generate_sliding_moves(
        &self,
        from: Position,
        player: Player,
        directions: &[(i32, i32)],
        moves: &mut Vec<ChessMove>,
    ) {
        for &(dr, dc) in directions {
            let mut current = from;
            while let Some(to) = current.offset(dr, dc) {
                if !self.is_empty(to) {
                    if self.is_enemy(to, player) {
                        moves.push(ChessMove::new(from, to));
                    }
                    break;
                }
                moves.push(ChessMove::new(from, to));
                current = to;
            }
        }
    }

    /// Whether any move so far started or ended on `pos`. A piece that left
    /// its home square, or one that arrived there later, cannot castle.
    fn square_disturbed(&self, pos: Position) -> bool {
        self.move_history.iter().any(|m| m.from == pos || m.to == pos)
    }

    fn generate_castling_moves(&self, player: Player, moves: &mut Vec<ChessMove>) {
        let row = back_row(player);
        let king_from = Position::new(row, KING_START_COL);
        if self.square_disturbed(king_from) || self.piece_at(king_from) != Piece::new(PieceKind::King, player) {
            return;
        }

        let enemy = player.other();
        if self.is_attacked(king_from, enemy) {
            return;
        }

        let rook_home = |col: usize| {
            let corner = Position::new(row, col);
            !self.square_disturbed(corner) && self.piece_at(corner) == Piece::new(PieceKind::Rook, player)
        };
        let clear = |cols: &[usize]| cols.iter().all(|&c| self.is_empty(Position::new(row, c)));
        let safe = |cols: &[usize]| cols.iter().all(|&c| !self.is_attacked(Position::new(row, c), enemy));

        // Kingside: f and g must be empty, and the king crosses both.
        if rook_home(KINGSIDE_ROOK_COL) && clear(&[5, 6][..]) && safe(&[5, 6][..]) {
            moves.push(ChessMove::with_kind(king_from, Position::new(row, 6), MoveKind::CastleKingSide));
        }

        // Queenside: b, c and d must be empty; the king only crosses d and c.
        if rook_home(QUEENSIDE_ROOK_COL) && clear(&[1, 2, 3][..]) && safe(&[3, 2][..]) {
            moves.push(ChessMove::with_kind(king_from, Position::new(row, 2), MoveKind::CastleQueenSide));
        }
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    fn remove_piece(&mut self, pos: Position) -> Piece {
        let piece = self.piece_at(pos);
        if let Some(player) = piece.player {
            if let Some(i) = Self::mask_index(piece.kind, player) {
                self.bitboards[i] &= !pos.bit();
            }
        }
        piece
    }

    fn place_piece(&mut self, pos: Position, piece: Piece) {
        self.remove_piece(pos);
        if let Some(player) = piece.player {
            if let Some(i) = Self::mask_index(piece.kind, player) {
                self.bitboards[i] |= pos.bit();
            }
        }
    }

    fn material(&self, player: Player) -> u32 {
        OCCUPYING_KINDS
            .iter()
            .map(|&kind| self.pieces(kind, player).count_ones() * kind.value())
            .sum()
    }

    /// Advantage and check flag, both derived purely from the current squares.
    fn recompute_derived(&mut self) {
        self.advantage = Advantage::from_totals(self.material(Player::One), self.material(Player::Two));
        self.in_check = self.is_in_check(self.current_player);
    }

    /// Checkmate and stalemate for the side to move. Relies on `in_check`
    /// being current.
    fn refresh_status(&mut self) {
        let can_move = self.has_legal_move();
        self.checkmate = !can_move && self.in_check;
        self.stalemate = !can_move && !self.in_check;
    }

    /// Raw forward mutation shared by real moves and legality trials. Leaves
    /// every cached flag and the advantage alone; trials never read them.
    fn make_move(&mut self, mut m: ChessMove, moved: Piece) {
        let player = self.current_player;

        // The en passant victim sits beside the mover, not on the destination.
        let capture_square = match m.kind {
            MoveKind::EnPassant => Some(Position::new(m.from.row, m.to.col)),
            MoveKind::CastleKingSide | MoveKind::CastleQueenSide => None,
            MoveKind::Normal | MoveKind::PawnPromote => Some(m.to),
        };
        let captured = capture_square
            .map(|pos| (pos, self.remove_piece(pos)))
            .filter(|(_, piece)| !piece.is_empty());

        self.remove_piece(m.from);
        let placed = match (m.kind, m.promotion) {
            (MoveKind::PawnPromote, Some(kind)) => Piece::new(kind, player),
            _ => moved,
        };
        self.place_piece(m.to, placed);

        if let Some((rook_from, rook_to)) = castle_rook_squares(&m) {
            let rook = self.remove_piece(rook_from);
            self.place_piece(rook_to, rook);
        }

        let counter = if moved.kind == PieceKind::Pawn || captured.is_some() {
            0
        } else {
            self.draw_counter() + 1
        };
        self.draw_counters.push(counter);

        m.player = Some(player);
        m.captured = captured.map(|(_, piece)| piece);
        self.move_history.push(m);
        self.undo_history.push(UndoRecord {
            moved,
            captured_at: captured.map(|(pos, _)| pos),
        });

        self.current_player = player.other();
    }

    /// Exact inverse of `make_move`.
    fn unmake_move(&mut self) -> Option<ChessMove> {
        let undo = self.undo_history.pop()?;
        let m = self.move_history.pop()?;
        self.draw_counters.pop();
        self.current_player = self.current_player.other();

        if let Some((rook_from, rook_to)) = castle_rook_squares(&m) {
            let rook = self.remove_piece(rook_to);
            self.place_piece(rook_from, rook);
        }

        self.remove_piece(m.to);
        self.place_piece(m.from, undo.moved);
        if let (Some(pos), Some(piece)) = (undo.captured_at, m.captured) {
            self.place_piece(pos, piece);
        }

        Some(m)
    }

    /// Applies a move obtained from `possible_moves`. Legality is not checked
    /// again; only off-board squares and an empty start square are rejected.
    pub fn apply_move(&mut self, m: ChessMove) -> ChessResult<()> {
        if let Some(&pos) = [m.from, m.to].iter().find(|p| !p.is_on_board()) {
            return Err(ChessError::OffBoard(pos));
        }
        let moved = self.piece_at(m.from);
        if moved.is_empty() {
            return Err(ChessError::NoPieceAtStart(m.from));
        }
        self.make_move(m, moved);
        self.recompute_derived();
        self.refresh_status();
        Ok(())
    }

    /// Reverts the most recent move and returns it with its annotations.
    pub fn undo_last_move(&mut self) -> ChessResult<ChessMove> {
        let m = self.unmake_move().ok_or(ChessError::NothingToUndo)?;
        self.recompute_derived();
        self.refresh_status();
        Ok(m)
    }
}

impl GameBoard for ChessBoard {
    type Move = ChessMove;
    type Error = ChessError;

    fn current_player(&self) -> Player {
        self.current_player
    }

    fn is_finished(&self) -> bool {
        ChessBoard::is_finished(self)
    }

    fn score(&self) -> i64 {
        self.advantage.signed()
    }

    fn possible_moves(&mut self) -> Vec<ChessMove> {
        ChessBoard::possible_moves(self)
    }

    fn apply_move(&mut self, m: ChessMove) -> ChessResult<()> {
        ChessBoard::apply_move(self, m)
    }

    fn undo_last_move(&mut self) -> ChessResult<()> {
        ChessBoard::undo_last_move(self).map(|_| ())
    }
}
