// =============================================================================
// Search
//
// Fixed-depth minimax with alpha-beta pruning, written against the
// `GameBoard` capability trait so it can drive any two-player game. Player
// one maximizes the board score and player two minimizes it. The board is
// mutated in place: every child is reached with apply_move and left with
// undo_last_move, so a search hands the board back exactly as it found it.
//
// Moves are tried in generation order and a child only replaces the current
// best on a strict improvement, so the first of several equal moves wins.
// That makes the result deterministic and identical to plain minimax.
// =============================================================================

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::game::{GameBoard, Player};

// =============================================================================
// Configuration
// =============================================================================

pub const DEFAULT_DEPTH: u32 = 3;

/// Search parameters. Missing JSON fields fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Plies to look ahead.
    pub depth: u32,
    /// When false every branch is expanded; useful as a reference when
    /// checking the pruned search.
    pub pruning: bool,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            depth: DEFAULT_DEPTH,
            pruning: true,
        }
    }
}

impl AiConfig {
    pub fn with_depth(depth: u32) -> Self {
        AiConfig {
            depth,
            ..Self::default()
        }
    }

    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }
}

/// The chosen move, its minimax score, and how many nodes the search visited.
#[derive(Clone, Debug, PartialEq)]
pub struct PickResult<M> {
    pub mv: M,
    pub score: i64,
    pub nodes: u64,
}

/// Score of a subtree and the move leading to it. `mv` is `None` at leaves.
struct BestMove<M> {
    score: i64,
    mv: Option<M>,
}

const fn is_maximizing(player: Player) -> bool {
    matches!(player, Player::One)
}

// =============================================================================
// Minimax
// =============================================================================

struct SearchContext {
    pruning: bool,
    root_depth: u32,
    nodes: u64,
}

/// Fail-soft alpha-beta. With `pruning` off alpha and beta are still tracked
/// but siblings are never skipped, which gives plain minimax.
fn search<B: GameBoard>(
    board: &mut B,
    depth: u32,
    mut alpha: i64,
    mut beta: i64,
    ctx: &mut SearchContext,
) -> Result<BestMove<B::Move>, B::Error> {
    ctx.nodes += 1;

    if depth == 0 || board.is_finished() {
        return Ok(BestMove { score: board.score(), mv: None });
    }

    let moves = board.possible_moves();
    if moves.is_empty() {
        return Ok(BestMove { score: board.score(), mv: None });
    }

    let maximizing = is_maximizing(board.current_player());
    let mut best = BestMove {
        score: if maximizing { i64::MIN } else { i64::MAX },
        mv: None,
    };

    for m in moves {
        board.apply_move(m.clone())?;
        let child = search(board, depth - 1, alpha, beta, ctx);
        board.undo_last_move()?;
        let score = child?.score;
        if depth == ctx.root_depth {
            trace!("root move {:?} scored {}", m, score);
        }

        let improves = if maximizing { score > best.score } else { score < best.score };
        if best.mv.is_none() || improves {
            best = BestMove { score, mv: Some(m) };
        }

        if maximizing {
            alpha = alpha.max(best.score);
        } else {
            beta = beta.min(best.score);
        }
        if ctx.pruning && alpha >= beta {
            break;
        }
    }

    Ok(best)
}

/// Best move for the side to move, or `None` when the game is already over,
/// there is nothing to play, or the depth is zero.
pub fn pick_move<B: GameBoard>(
    board: &mut B,
    config: &AiConfig,
) -> Result<Option<PickResult<B::Move>>, B::Error> {
    let mut ctx = SearchContext {
        pruning: config.pruning,
        root_depth: config.depth,
        nodes: 0,
    };
    let best = search(board, config.depth, i64::MIN, i64::MAX, &mut ctx)?;
    let nodes = ctx.nodes;

    let Some(mv) = best.mv else {
        debug!("no move to pick at depth {} ({nodes} nodes)", config.depth);
        return Ok(None);
    };

    debug!(
        "picked {:?} for player {} with score {} after {nodes} nodes (depth {}, pruning {})",
        mv,
        board.current_player().number(),
        best.score,
        config.depth,
        config.pruning
    );

    Ok(Some(PickResult {
        mv,
        score: best.score,
        nodes,
    }))
}

/// An automated player with a fixed search configuration.
#[derive(Clone, Debug, Default)]
pub struct MinimaxAi {
    config: AiConfig,
}

impl MinimaxAi {
    pub fn new(config: AiConfig) -> Self {
        MinimaxAi { config }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.config.depth = depth;
    }

    pub fn find_best_move<B: GameBoard>(&self, board: &mut B) -> Result<Option<B::Move>, B::Error> {
        Ok(pick_move(board, &self.config)?.map(|result| result.mv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::ChessBoard;
    use crate::game::GameMove;
    use crate::piece::{Piece, PieceKind};
    use crate::test_support::{board_from_moves, mv, pos};
    use proptest::prelude::*;

    // A hand-built game tree, so the search can be checked without chess.
    #[derive(Clone, Debug)]
    struct Node {
        value: i64,
        children: Vec<Node>,
    }

    fn leaf(value: i64) -> Node {
        Node { value, children: Vec::new() }
    }

    fn branch(children: Vec<Node>) -> Node {
        Node { value: 0, children }
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Branch(usize);

    impl GameMove for Branch {}

    #[derive(Debug, thiserror::Error)]
    #[error("no such branch")]
    struct TreeError;

    struct TreeGame {
        root: Node,
        path: Vec<usize>,
    }

    impl TreeGame {
        fn new(root: Node) -> Self {
            TreeGame { root, path: Vec::new() }
        }

        fn node(&self) -> &Node {
            self.path.iter().fold(&self.root, |node, &i| &node.children[i])
        }
    }

    impl GameBoard for TreeGame {
        type Move = Branch;
        type Error = TreeError;

        fn current_player(&self) -> Player {
            if self.path.len() % 2 == 0 { Player::One } else { Player::Two }
        }

        fn is_finished(&self) -> bool {
            self.node().children.is_empty()
        }

        fn score(&self) -> i64 {
            self.node().value
        }

        fn possible_moves(&mut self) -> Vec<Branch> {
            (0..self.node().children.len()).map(Branch).collect()
        }

        fn apply_move(&mut self, m: Branch) -> Result<(), TreeError> {
            if m.0 >= self.node().children.len() {
                return Err(TreeError);
            }
            self.path.push(m.0);
            Ok(())
        }

        fn undo_last_move(&mut self) -> Result<(), TreeError> {
            self.path.pop().map(|_| ()).ok_or(TreeError)
        }
    }

    fn textbook_tree() -> Node {
        branch(vec![
            branch(vec![leaf(3), leaf(12), leaf(8)]),
            branch(vec![leaf(2), leaf(4), leaf(6)]),
            branch(vec![leaf(14), leaf(5), leaf(2)]),
        ])
    }

    fn config(depth: u32, pruning: bool) -> AiConfig {
        AiConfig { depth, pruning }
    }

    #[test]
    fn textbook_tree_prunes_second_branch() {
        let mut game = TreeGame::new(textbook_tree());
        let full = pick_move(&mut game, &config(2, false)).expect("search").expect("move");
        let pruned = pick_move(&mut game, &config(2, true)).expect("search").expect("move");

        assert_eq!(full.mv, Branch(0));
        assert_eq!(full.score, 3);
        assert_eq!(full.nodes, 13);

        assert_eq!(pruned.mv, full.mv);
        assert_eq!(pruned.score, full.score);
        assert_eq!(pruned.nodes, 11);
        assert!(game.path.is_empty());
    }

    #[test]
    fn minimizing_player_picks_lowest() {
        // Player two moves at the root of this tree.
        let mut game = TreeGame::new(branch(vec![branch(vec![
            leaf(7),
            leaf(-4),
            leaf(-4),
            leaf(9),
        ])]));
        game.apply_move(Branch(0)).expect("descend");
        let result = pick_move(&mut game, &config(1, true)).expect("search").expect("move");
        assert_eq!(result.mv, Branch(1));
        assert_eq!(result.score, -4);
    }

    #[test]
    fn depth_limit_uses_interior_scores() {
        let mut game = TreeGame::new(branch(vec![
            Node { value: 1, children: vec![leaf(100)] },
            Node { value: 5, children: vec![leaf(-100)] },
        ]));
        let shallow = pick_move(&mut game, &config(1, true)).expect("search").expect("move");
        assert_eq!(shallow.mv, Branch(1));
        let deep = pick_move(&mut game, &config(2, true)).expect("search").expect("move");
        assert_eq!(deep.mv, Branch(0));
        assert_eq!(deep.score, 100);
    }

    #[test]
    fn finished_or_zero_depth_yields_nothing() {
        let mut game = TreeGame::new(leaf(4));
        assert!(pick_move(&mut game, &config(3, true)).expect("search").is_none());

        let mut game = TreeGame::new(textbook_tree());
        assert!(pick_move(&mut game, &config(0, true)).expect("search").is_none());
    }

    fn uniform_tree(widths: &[usize], values: &[i64], next: &mut usize) -> Node {
        let value = values[*next % values.len()];
        *next += 1;
        match widths.split_first() {
            None => leaf(value),
            Some((&width, rest)) => Node {
                value,
                children: (0..width).map(|_| uniform_tree(rest, values, next)).collect(),
            },
        }
    }

    proptest! {
        #[test]
        fn pruning_matches_plain_minimax_on_trees(
            widths in proptest::collection::vec(1usize..5, 1..5),
            values in proptest::collection::vec(-20i64..20, 1..64),
            depth in 1u32..5,
        ) {
            let mut next = 0;
            let mut game = TreeGame::new(uniform_tree(&widths, &values, &mut next));
            let full = pick_move(&mut game, &config(depth, false)).expect("search");
            let pruned = pick_move(&mut game, &config(depth, true)).expect("search");
            let (full, pruned) = (full.expect("root has children"), pruned.expect("root has children"));
            prop_assert_eq!(pruned.mv, full.mv);
            prop_assert_eq!(pruned.score, full.score);
            prop_assert!(pruned.nodes <= full.nodes);
            prop_assert!(game.path.is_empty());
        }
    }

    #[test]
    fn chess_pruning_matches_plain_minimax() {
        let mut board = ChessBoard::new();
        let before = board.clone();
        let full = pick_move(&mut board, &config(2, false)).expect("search").expect("move");
        let pruned = pick_move(&mut board, &config(2, true)).expect("search").expect("move");
        assert_eq!(pruned.mv, full.mv);
        assert_eq!(pruned.score, full.score);
        assert!(pruned.nodes < full.nodes);
        assert_eq!(board, before);
    }

    #[test]
    fn search_is_deterministic() {
        let mut board = board_from_moves(&["e2, e4", "d7, d5"]);
        let ai = MinimaxAi::new(config(2, true));
        let first = ai.find_best_move(&mut board).expect("search");
        let second = ai.find_best_move(&mut board).expect("search");
        assert!(first.is_some());
        assert_eq!(first, second);

        // One ply deep, taking the pawn is the only way to gain material.
        let mut ai = ai;
        ai.set_depth(1);
        assert_eq!(ai.find_best_move(&mut board).expect("search"), Some(mv("e4, d5")));
    }

    #[test]
    fn takes_hanging_queen() {
        let mut board = ChessBoard::from_pieces([
            (pos("e1"), Piece::new(PieceKind::King, Player::One)),
            (pos("a1"), Piece::new(PieceKind::Rook, Player::One)),
            (pos("a6"), Piece::new(PieceKind::Queen, Player::Two)),
            (pos("h8"), Piece::new(PieceKind::King, Player::Two)),
        ])
        .expect("valid layout");
        let result = pick_move(&mut board, &config(2, true)).expect("search").expect("move");
        assert_eq!(result.mv, mv("a1, a6"));
        assert_eq!(result.score, 5);
    }

    #[test]
    fn no_move_after_checkmate() {
        let mut board = board_from_moves(&["f2, f3", "e7, e5", "g2, g4", "d8, h4"]);
        let ai = MinimaxAi::default();
        assert_eq!(ai.find_best_move(&mut board).expect("search"), None);
    }

    #[test]
    fn config_loads_partial_json() {
        let config = AiConfig::from_json(r#"{"depth": 5}"#).expect("parse");
        assert_eq!(config.depth, 5);
        assert!(config.pruning);
        assert_eq!(AiConfig::from_json("{}").expect("parse"), AiConfig::default());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn chess_pruning_matches_from_random_positions(
            choices in proptest::collection::vec(any::<u16>(), 0..12)
        ) {
            let mut board = ChessBoard::new();
            for choice in choices {
                let moves = board.possible_moves();
                if board.is_finished() || moves.is_empty() {
                    break;
                }
                board.apply_move(moves[usize::from(choice) % moves.len()].clone()).expect("apply");
            }
            let full = pick_move(&mut board, &config(2, false)).expect("search");
            let pruned = pick_move(&mut board, &config(2, true)).expect("search");
            prop_assert_eq!(
                pruned.as_ref().map(|r| (r.mv.clone(), r.score)),
                full.as_ref().map(|r| (r.mv.clone(), r.score))
            );
        }
    }
}
