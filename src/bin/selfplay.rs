use std::fs;
use std::path::PathBuf;

use chess_core::board::{ChessBoard, GameStatus};
use chess_core::config::BoardConfig;
use chess_core::engine::{pick_move, AiConfig};
use chess_core::game::Player;
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Plays a single engine-vs-engine game and reports the result.
#[derive(Parser, Debug)]
struct Args {
    /// Search depth in plies for player one.
    #[arg(long, default_value_t = 2)]
    depth_one: u32,

    /// Search depth in plies for player two.
    #[arg(long, default_value_t = 2)]
    depth_two: u32,

    /// Stop after this many plies even if the game is not over.
    #[arg(long, default_value_t = 200)]
    max_moves: u32,

    /// Opening plies played at random before the engines take over.
    #[arg(long, default_value_t = 0)]
    random_plies: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// JSON file with board rules, e.g. {"draw_threshold": 100}.
    #[arg(long)]
    board_config: Option<PathBuf>,

    /// JSON file with search settings. The --depth flags override its depth.
    #[arg(long)]
    ai_config: Option<PathBuf>,

    /// Print the move history as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let board_config = match &args.board_config {
        Some(path) => BoardConfig::from_json(&fs::read_to_string(path)?)?,
        None => BoardConfig::default(),
    };
    let base = match &args.ai_config {
        Some(path) => AiConfig::from_json(&fs::read_to_string(path)?)?,
        None => AiConfig::default(),
    };
    let one = AiConfig { depth: args.depth_one, ..base.clone() };
    let two = AiConfig { depth: args.depth_two, ..base };

    let mut board = ChessBoard::with_config(board_config);
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut plies = 0;

    while !board.is_finished() && plies < args.max_moves {
        let player = board.current_player();
        let mv = if plies < args.random_plies {
            let moves = board.possible_moves();
            match moves.choose(&mut rng) {
                Some(m) => m.clone(),
                None => break,
            }
        } else {
            let config = match player {
                Player::One => &one,
                Player::Two => &two,
            };
            match pick_move(&mut board, config)? {
                Some(result) => result.mv,
                None => break,
            }
        };

        plies += 1;
        info!("ply {plies}: player {} plays {mv}", player.number());
        board.apply_move(mv)?;
    }

    let outcome = match board.status() {
        GameStatus::Checkmate => format!(
            "player {} wins by checkmate",
            board.current_player().other().number()
        ),
        GameStatus::Stalemate => "draw by stalemate".to_string(),
        GameStatus::DrawByCounter => "draw by move counter".to_string(),
        GameStatus::Check | GameStatus::InProgress => "unfinished".to_string(),
    };
    let advantage = board.current_advantage();
    eprintln!(
        "Game over after {plies} plies: {outcome} (advantage {} for player {})",
        advantage.amount,
        advantage.player_number()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(board.move_history())?);
    }
    Ok(())
}
