use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::board::{ChessBoard, GameStatus};
use crate::config::BoardConfig;
use crate::engine::{pick_move, AiConfig};
use crate::game::Player;
use crate::moves::ChessMove;
use crate::piece::PieceKind;
use crate::position::{Position, BOARD_SIZE};

const MAX_DEPTH: u32 = 5;

#[derive(Serialize)]
struct SquarePiece {
    kind: PieceKind,
    player: u8,
}

#[derive(Serialize)]
struct MoveJson {
    from: [usize; 2],
    to: [usize; 2],
    promotion: Option<PieceKind>,
}

impl From<&ChessMove> for MoveJson {
    fn from(m: &ChessMove) -> Self {
        MoveJson {
            from: [m.from.row, m.from.col],
            to: [m.to.row, m.to.col],
            promotion: m.promotion,
        }
    }
}

#[derive(Serialize)]
struct AdvantageJson {
    player: u8,
    amount: u32,
}

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<Option<SquarePiece>>>,
    current_player: u8,
    status: GameStatus,
    finished: bool,
    is_check: bool,
    advantage: AdvantageJson,
    draw_counter: u32,
    legal_moves: Vec<MoveJson>,
    last_move: Option<MoveJson>,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    error: Option<String>,
}

fn build_board_state(board: &mut ChessBoard) -> BoardState {
    let squares = (0..BOARD_SIZE)
        .map(|row| {
            (0..BOARD_SIZE)
                .map(|col| {
                    let piece = board.piece_at(Position::new(row, col));
                    (!piece.is_empty()).then(|| SquarePiece {
                        kind: piece.kind,
                        player: piece.player_number(),
                    })
                })
                .collect()
        })
        .collect();

    let legal_moves = board.possible_moves().iter().map(MoveJson::from).collect();
    let advantage = board.current_advantage();

    BoardState {
        squares,
        current_player: board.current_player().number(),
        status: board.status(),
        finished: board.is_finished(),
        is_check: board.is_check(),
        advantage: AdvantageJson {
            player: advantage.player_number(),
            amount: advantage.amount,
        },
        draw_counter: board.draw_counter(),
        legal_moves,
        last_move: board.move_history().last().map(MoveJson::from),
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn error_result(message: String) -> JsValue {
    to_js(&MoveResult {
        board_state: None,
        error: Some(message),
    })
}

fn parse_promotion(name: &str) -> Option<PieceKind> {
    match name {
        "Queen" => Some(PieceKind::Queen),
        "Rook" => Some(PieceKind::Rook),
        "Bishop" => Some(PieceKind::Bishop),
        "Knight" => Some(PieceKind::Knight),
        _ => None,
    }
}

#[wasm_bindgen]
pub struct Game {
    board: ChessBoard,
    ai_config: AiConfig,
    last_nodes: u64,
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        Game {
            board: ChessBoard::new(),
            ai_config: AiConfig::default(),
            last_nodes: 0,
        }
    }

    /// Starts a fresh game with rules read from JSON; malformed JSON is reported as an error.
    pub fn with_config(config_json: &str) -> Result<Game, JsValue> {
        let config = BoardConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Game {
            board: ChessBoard::with_config(config),
            ai_config: AiConfig::default(),
            last_nodes: 0,
        })
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.ai_config.depth = depth.clamp(1, MAX_DEPTH);
    }

    pub fn get_board_state(&mut self) -> JsValue {
        to_js(&build_board_state(&mut self.board))
    }

    pub fn make_move(
        &mut self,
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
        promotion: Option<String>,
    ) -> JsValue {
        if self.board.is_finished() {
            return error_result("Game is already over".to_string());
        }

        let wanted = match promotion.as_deref().and_then(parse_promotion) {
            Some(kind) => ChessMove::promotion(Position::new(from_row, from_col), Position::new(to_row, to_col), kind),
            None => ChessMove::new(Position::new(from_row, from_col), Position::new(to_row, to_col)),
        };

        let Some(m) = self.board.possible_moves().into_iter().find(|m| *m == wanted) else {
            return error_result("Illegal move".to_string());
        };

        match self.board.apply_move(m) {
            Ok(()) => to_js(&build_board_state(&mut self.board)),
            Err(e) => error_result(e.to_string()),
        }
    }

    pub fn make_ai_move(&mut self) -> JsValue {
        match pick_move(&mut self.board, &self.ai_config) {
            Ok(Some(result)) => {
                self.last_nodes = result.nodes;
                if let Err(e) = self.board.apply_move(result.mv) {
                    return error_result(e.to_string());
                }
            }
            Ok(None) => {}
            Err(e) => return error_result(e.to_string()),
        }
        to_js(&build_board_state(&mut self.board))
    }

    pub fn undo(&mut self) -> JsValue {
        match self.board.undo_last_move() {
            Ok(_) => to_js(&build_board_state(&mut self.board)),
            Err(e) => error_result(e.to_string()),
        }
    }

    pub fn get_hint(&mut self, depth: u32) -> JsValue {
        let hint_config = AiConfig {
            depth: depth.clamp(1, MAX_DEPTH),
            ..self.ai_config.clone()
        };
        match pick_move(&mut self.board, &hint_config) {
            Ok(Some(result)) => to_js(&MoveJson::from(&result.mv)),
            _ => JsValue::NULL,
        }
    }

    pub fn get_legal_moves_for_square(&mut self, row: usize, col: usize) -> JsValue {
        let from = Position::new(row, col);
        let square_moves: Vec<MoveJson> = self
            .board
            .possible_moves()
            .iter()
            .filter(|m| m.from == from)
            .map(MoveJson::from)
            .collect();
        to_js(&square_moves)
    }

    /// Squares attacked by player 1 or 2; null for any other number.
    pub fn get_attacked_squares(&self, player: u8) -> JsValue {
        let Some(by) = Player::from_number(player) else {
            return JsValue::NULL;
        };
        let squares: Vec<[usize; 2]> = self
            .board
            .attacked_positions(by)
            .into_iter()
            .map(|p| [p.row, p.col])
            .collect();
        to_js(&squares)
    }

    pub fn get_last_nodes(&self) -> u64 {
        self.last_nodes
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
