//! Splits a perft run across the worker pool and compares it with the
//! sequential count.
//!
//! Usage: `perft_split [depth] [cores] [fen...]`. Set `RUST_LOG=debug` to see
//! executor lifecycle events.

use std::env;
use std::process::ExitCode;
use std::time::Instant;

use sparsegrid_core::errors::SparseGridResult;
use sparsegrid_core::executor::config::ExecutorConfig;
use sparsegrid_core::executor::thread_pool::ThreadPoolExecutor;
use sparsegrid_core::game_state::chess_rules::STARTING_POSITION_FEN;
use sparsegrid_core::move_generation::perft::{perft, perft_divide, perft_parallel};
use sparsegrid_core::utils::algebraic::square_to_algebraic;
use sparsegrid_core::utils::fen_import::import_fen;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn parse_arg<T: std::str::FromStr>(args: &[String], idx: usize, default: T) -> T {
    args.get(idx)
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn run(args: &[String]) -> SparseGridResult<()> {
    let depth: u8 = parse_arg(args, 1, 4u8);
    let config = ExecutorConfig::with_cores(parse_arg(args, 2, ExecutorConfig::default().requested_cores));
    let fen = if args.len() > 3 {
        args[3..].join(" ")
    } else {
        STARTING_POSITION_FEN.to_owned()
    };

    let mut state = import_fen(&fen)?;
    let executor = ThreadPoolExecutor::with_config(config)?;
    info!(depth, workers = executor.capacity(), "perft split");

    for (mv, nodes) in perft_divide(&mut state, depth) {
        println!(
            "{}{}: {}",
            square_to_algebraic(mv.from)?,
            square_to_algebraic(mv.to)?,
            nodes
        );
    }

    let start = Instant::now();
    let sequential = perft(&mut state, depth);
    let sequential_ms = start.elapsed().as_millis();

    let start = Instant::now();
    let parallel = perft_parallel(&executor, &state, depth)?;
    let parallel_ms = start.elapsed().as_millis();

    println!();
    println!("nodes       {}", sequential.nodes);
    println!("captures    {}", sequential.captures);
    println!("en passant  {}", sequential.en_passant);
    println!("castles     {}", sequential.castles);
    println!("promotions  {}", sequential.promotions);
    println!("sequential  {sequential_ms} ms");
    println!("parallel    {parallel_ms} ms on {} workers", executor.capacity());

    if parallel != sequential {
        println!("MISMATCH: parallel run counted {} nodes", parallel.nodes);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("perft_split: {err}");
            ExitCode::FAILURE
        }
    }
}
