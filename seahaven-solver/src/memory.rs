use super::*;

use rustc_hash::FxHashSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Visit {
    New,
    Seen,
}

/// Fingerprints of every board reached during one search.
#[derive(Debug, Clone, Default)]
pub struct StateMemory {
    seen: FxHashSet<u64>,
    repeats: usize,
}

impl StateMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_board(&mut self, board: &Board) -> Visit {
        if self.seen.insert(board.hash_value()) {
            Visit::New
        } else {
            self.repeats += 1;
            Visit::Seen
        }
    }

    /// Distinct boards observed.
    pub fn size(&self) -> usize {
        self.seen.len()
    }

    pub fn repeats(&self) -> usize {
        self.repeats
    }

    pub fn clear(&mut self) {
        self.seen.clear();
        self.repeats = 0;
    }
}
