use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chess_core::board::{ChessBoard, GameStatus};
use chess_core::config::BoardConfig;
use chess_core::engine::{pick_move, AiConfig};
use chess_core::error::ChessError;
use chess_core::game::Player;
use clap::Parser;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Runs depth-vs-depth matchups and prints a summary table.
#[derive(Parser, Debug)]
struct Args {
    /// Depths to pit against each other, e.g. 1,2,3.
    #[arg(long, value_delimiter = ',', default_values_t = [1, 2, 3])]
    depths: Vec<u32>,

    /// Games per matchup, split evenly between colours.
    #[arg(long, default_value_t = 4)]
    games: usize,

    #[arg(long, default_value_t = 150)]
    max_moves: u32,

    /// Random opening plies, so repeated games differ.
    #[arg(long, default_value_t = 4)]
    random_plies: u32,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// JSON file with board rules.
    #[arg(long)]
    board_config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Win(Player),
    Draw,
}

#[derive(Debug, Default)]
struct MatchResult {
    a_wins: u32,
    b_wins: u32,
    draws: u32,
    nodes: u64,
    engine_moves: u64,
}

struct GameSetup<'a> {
    board_config: &'a BoardConfig,
    max_moves: u32,
    random_plies: u32,
}

fn play_game(
    setup: &GameSetup,
    one: &AiConfig,
    two: &AiConfig,
    rng: &mut StdRng,
    result: &mut MatchResult,
) -> Result<Outcome, ChessError> {
    let mut board = ChessBoard::with_config(setup.board_config.clone());
    for ply in 0..setup.max_moves {
        if board.is_finished() {
            break;
        }
        let mv = if ply < setup.random_plies {
            match board.possible_moves().choose(rng) {
                Some(m) => m.clone(),
                None => break,
            }
        } else {
            let config = match board.current_player() {
                Player::One => one,
                Player::Two => two,
            };
            match pick_move(&mut board, config)? {
                Some(pick) => {
                    result.nodes += pick.nodes;
                    result.engine_moves += 1;
                    pick.mv
                }
                None => break,
            }
        };
        board.apply_move(mv)?;
    }

    debug!(
        "game finished after {} plies with {:?}",
        board.move_history().len(),
        board.status()
    );
    Ok(match board.status() {
        GameStatus::Checkmate => Outcome::Win(board.current_player().other()),
        // Stalemate, the draw counter and the move cap all count as draws.
        _ => Outcome::Draw,
    })
}

/// Plays `games` games between depth `a` and depth `b`, alternating colours.
fn run_matchup(
    setup: &GameSetup,
    a: u32,
    b: u32,
    games: usize,
    rng: &mut StdRng,
) -> Result<MatchResult, ChessError> {
    let config_a = AiConfig::with_depth(a);
    let config_b = AiConfig::with_depth(b);
    let mut result = MatchResult::default();

    for game in 0..games {
        let a_is_one = game % 2 == 0;
        let (one, two) = if a_is_one {
            (&config_a, &config_b)
        } else {
            (&config_b, &config_a)
        };
        let a_player = if a_is_one { Player::One } else { Player::Two };

        match play_game(setup, one, two, rng, &mut result)? {
            Outcome::Win(winner) if winner == a_player => result.a_wins += 1,
            Outcome::Win(_) => result.b_wins += 1,
            Outcome::Draw => result.draws += 1,
        }
    }

    Ok(result)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let board_config = match &args.board_config {
        Some(path) => BoardConfig::from_json(&fs::read_to_string(path)?)?,
        None => BoardConfig::default(),
    };
    let setup = GameSetup {
        board_config: &board_config,
        max_moves: args.max_moves,
        random_plies: args.random_plies,
    };
    let mut rng = StdRng::seed_from_u64(args.seed);

    println!("=== Depth matchups ===");
    println!(
        "Games per matchup: {}, max plies per game: {}, random opening plies: {}\n",
        args.games, args.max_moves, args.random_plies
    );
    println!(
        "{:>6} {:>6} {:>7} {:>7} {:>6} {:>14}",
        "A", "B", "A wins", "B wins", "draws", "nodes/move"
    );

    for (i, &a) in args.depths.iter().enumerate() {
        for &b in &args.depths[i + 1..] {
            let result = run_matchup(&setup, a, b, args.games, &mut rng)?;
            let per_move = result.nodes.checked_div(result.engine_moves).unwrap_or(0);
            println!(
                "{:>6} {:>6} {:>7} {:>7} {:>6} {:>14}",
                a, b, result.a_wins, result.b_wins, result.draws, per_move
            );
            std::io::stdout().flush().ok();
        }
    }

    Ok(())
}
