use anyhow::{Result, bail};
use seahaven_common::{action::format_moves, board::Board};
use seahaven_solver::{Outcome, SearchLimits, SolveResult, Solver, replay};

use std::{
    io::{IsTerminal, Write, stderr},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Tally {
    pub total_games: u64,
    pub winnable: u64,
    pub losers: u64,
    pub abandoned: u64,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        self.total_games += 1;
        match outcome {
            Outcome::Solved => self.winnable += 1,
            Outcome::Exhausted => self.losers += 1,
            Outcome::Abandoned => self.abandoned += 1,
        }
    }

    /// Share of finished (not abandoned) games that were won.
    pub fn win_rate(&self) -> f64 {
        let decided = self.winnable + self.losers;
        if decided == 0 {
            0.0
        } else {
            self.winnable as f64 * 100.0 / decided as f64
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Games Played: {}, Winnable: {}, Losers: {}, Abandoned: {}",
            self.total_games, self.winnable, self.losers, self.abandoned
        )
    }
}

pub fn do_solve(board: Board, limits: SearchLimits, show_solution: bool) -> Result<()> {
    println!("{}\n", board.pretty_print());
    let initial = board.clone();
    let result = with_spinner("Solving the game...", move || {
        let mut solver = Solver::new(limits);
        solver.set_board(board);
        solver.solve()
    })?;
    println!("{}", describe_result(&result));
    if show_solution && result.outcome.is_solved() {
        print_solution(&initial, &result)?;
    }
    Ok(())
}

pub fn do_trials(
    seed: u64,
    trials: u64,
    limits: SearchLimits,
    verbose: bool,
    show_solution: bool,
) -> Result<()> {
    println!("Seed: {seed}");
    let progress = stderr().is_terminal() && !verbose;
    let timer = Instant::now();
    let mut tally = Tally::default();
    let mut solver = Solver::new(limits);

    for i in 0..trials {
        let board = Board::new_from_seed(seed.wrapping_add(i));
        if verbose {
            println!("\n===== DEAL {} =====\n{}", i + 1, board.pretty_print());
        }
        solver.set_board(board.clone());
        let result = solver.solve()?;
        tally.record(result.outcome);

        if verbose {
            println!("{}", describe_result(&result));
        }
        if show_solution && result.outcome.is_solved() {
            print_solution(&board, &result)?;
        }
        if progress {
            let mut handle = stderr().lock();
            let _ = write!(handle, "\r\x1b[2K{}", tally.summary());
            let _ = handle.flush();
        }
    }

    if progress {
        let mut handle = stderr().lock();
        let _ = write!(handle, "\r\x1b[2K");
        let _ = handle.flush();
    }
    println!(
        "✓ {}, Win Rate: {:.1}%, Time: {}",
        tally.summary(),
        tally.win_rate(),
        format_elapsed(timer.elapsed())
    );
    Ok(())
}

fn describe_result(result: &SolveResult) -> String {
    let outcome = match result.outcome {
        Outcome::Solved => "Solved",
        Outcome::Exhausted => "No solution",
        Outcome::Abandoned => "Abandoned",
    };
    format!(
        "{outcome}: Moves: {}, Total Moves: {}, Unique Boards: {}, Repeats Avoided: {}, Max Depth: {}, Time: {}",
        result.moves.len(),
        result.primitive_moves,
        result.states,
        result.repeats,
        result.max_depth,
        format_elapsed(result.elapsed)
    )
}

fn print_solution(board: &Board, result: &SolveResult) -> Result<()> {
    if !replay(board, &result.moves)?.is_success() {
        bail!("Replayed solution does not win the game.");
    }
    print!("{}", format_moves(&result.moves));
    Ok(())
}

fn with_spinner<T, F: FnOnce() -> T>(message: &str, f: F) -> T {
    if stderr().is_terminal() {
        let spinning = Arc::new(AtomicBool::new(true));
        let spinning_clone = Arc::clone(&spinning);
        let message = message.to_string();

        let handle = std::thread::spawn(move || {
            let spinner_chars = ['|', '/', '-', '\\'];
            let mut i = 0;
            let stderr = stderr();
            let mut handle = stderr.lock();

            let _ = write!(handle, "\x1b[?25l"); // hide cursor
            let _ = handle.flush();

            while spinning_clone.load(Ordering::Relaxed) {
                let spinner_char = spinner_chars[i % spinner_chars.len()];
                let _ = write!(handle, "\r{spinner_char} {message}",);
                let _ = handle.flush();
                std::thread::sleep(Duration::from_millis(100));
                i += 1;
            }

            let _ = write!(handle, "\r\x1b[2K\r\x1b[?25h"); // clear line and show cursor
            let _ = handle.flush();
        });

        let result = f();
        spinning.store(false, Ordering::Relaxed);
        let _ = handle.join();
        result
    } else {
        f()
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 90 {
        let ms = elapsed.subsec_millis();
        format!("{secs}.{ms:03}s")
    } else {
        let minutes = secs / 60;
        let secs = secs % 60;
        format!("{minutes}m {secs}s")
    }
}
