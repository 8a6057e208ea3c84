//! This crate decides whether a Seahaven Towers deal can be won, using a depth-first search
//! with in-place move/undo and a memory of visited boards.
//!
mod memory;
mod solver;

pub use crate::memory::{StateMemory, Visit};
pub use crate::solver::{ABANDON_LIMIT, Outcome, SearchLimits, SolveResult, Solver, replay, solve};

use seahaven_common::action::{Move, Position};
use seahaven_common::board::{Board, TOTAL_CELLS, TOTAL_TABLEAUS};
