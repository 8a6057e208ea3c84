mod utils;

use crate::utils::*;

use anyhow::{Context, Result};
use clap::Parser;
use seahaven_common::board::Board;
use seahaven_solver::{ABANDON_LIMIT, SearchLimits};

use std::{
    io::{Read, stdin},
    path::PathBuf,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Number of random deals to play
    #[arg(short = 'n', long, default_value_t = 1000, value_name = "NUM")]
    trials: u64,
    /// Base seed; deal N uses SEED + N (random when omitted)
    #[arg(short, long, value_name = "SEED")]
    seed: Option<u64>,
    /// Primitive moves before a deal is abandoned
    #[arg(short, long, default_value_t = ABANDON_LIMIT, value_name = "NUM")]
    max_moves: usize,
    /// Print every deal and its outcome
    #[arg(short, long)]
    verbose: bool,
    /// Print the winning line of solved deals
    #[arg(long)]
    solution: bool,
    /// Solve a single board from a file instead (`-` reads stdin)
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let Cli {
        trials,
        seed,
        max_moves,
        verbose,
        solution,
        file,
    } = Cli::parse();
    let limits = SearchLimits { max_moves };

    if let Some(file) = file {
        let content = if file.as_os_str() == "-" {
            let mut content = String::new();
            stdin()
                .read_to_string(&mut content)
                .context("Failed to read from stdin")?;
            content
        } else {
            std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read '{}'", file.display()))?
        };
        let board = Board::parse(&content).context("Failed to parse board")?;
        return do_solve(board, limits, solution);
    }

    let seed = seed.unwrap_or_else(rand::random);
    do_trials(seed, trials, limits, verbose, solution)
}
