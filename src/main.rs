//! Engine-vs-engine self-play.
//!
//! Run with:
//! `cargo run --release -- --difficulty easy --plies 60`
//! `cargo run --release -- --chess960 518 --cores 4`
//! `cargo run --release -- --chess960` (random Chess960 start)

use std::process::ExitCode;

use damson_chess::engines::chess_engine::ChessEngine;
use damson_chess::engines::engine_config::EngineConfig;
use damson_chess::errors::{ChessError, ChessResult};
use damson_chess::game_state::board::Board;
use damson_chess::game_state::chess_rules::StartConfig;
use damson_chess::search::pruner::Difficulty;
use damson_chess::search::threading::CancelToken;
use damson_chess::utils::algebraic::moves_text;
use damson_chess::utils::compact_history;
use damson_chess::utils::render_board::render_board;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "self-play aborted");
            ExitCode::FAILURE
        }
    }
}

fn run() -> ChessResult<()> {
    let args: Vec<String> = std::env::args().collect();
    let difficulty: Difficulty = parse_arg(&args, "--difficulty", Difficulty::Easy);
    let plies: usize = parse_arg(&args, "--plies", 200usize);
    // `--chess960` without an index picks a random start.
    let start = match args.iter().position(|a| a == "--chess960") {
        Some(i) => match args.get(i + 1).and_then(|s| s.parse::<u16>().ok()) {
            Some(index) => StartConfig::chess960(index)?,
            None => StartConfig::random_chess960(&mut rand::rng()),
        },
        None => StartConfig::Classic,
    };

    let mut config = EngineConfig {
        difficulty,
        ..EngineConfig::default()
    };
    if args.iter().any(|a| a == "--cores") {
        config.apply_option("core#", &parse_arg(&args, "--cores", 1usize).to_string())?;
    }
    let engine = ChessEngine::new(config)?;

    println!(
        "[Date \"{}\"] [Start \"{}\"] [Difficulty \"{}\"] [Threads \"{}\"]",
        chrono::Local::now().format("%Y.%m.%d %H:%M:%S"),
        start,
        difficulty,
        engine.threads()?
    );

    let cancel = CancelToken::new();
    let mut board = Board::new(&start)?;
    let mut codes: Vec<String> = Vec::new();

    while codes.len() < plies && board.game_end().is_none() {
        let played = match engine.compute_move(&codes, &start, &cancel) {
            Ok(played) => played,
            Err(ChessError::NoLegalMoves) => break,
            Err(err) => return Err(err),
        };
        let mv = played.evaluated.mv;
        if codes.len() % 2 == 0 {
            print!("{}. ", codes.len() / 2 + 1);
        }
        println!("{played}");
        board.apply_move(mv)?;
        codes.push(mv.code());
    }

    println!();
    println!("{}", render_board(&board));
    match board.game_end() {
        Some(end) => println!("Result: {end}"),
        None => println!("Result: stopped after {} plies", codes.len()),
    }
    let played = board.played_moves();
    let history = compact_history::encode(&start, &played)?;
    info!(plies = codes.len(), "game finished");
    println!("Moves: {}", moves_text(&played));
    println!("History: {history}");
    Ok(())
}
