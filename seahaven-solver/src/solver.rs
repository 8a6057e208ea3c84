use super::*;

use anyhow::{Result, bail};
use smallvec::SmallVec;
use std::time::{Duration, Instant};

/// Primitive moves after which a search gives up on a deal.
pub const ABANDON_LIMIT: usize = 100_000;
const TOTAL_SOURCES: usize = TOTAL_CELLS + TOTAL_TABLEAUS;

type Candidates = SmallVec<[Move; TOTAL_SOURCES]>;

pub fn solve(board: Board, limits: SearchLimits) -> Result<SolveResult> {
    let mut solver = Solver::new(limits);
    solver.set_board(board);
    solver.solve()
}

/// Replays a line of compound moves on a copy of `board`, refusing any move
/// the board does not allow at that point.
pub fn replay(board: &Board, moves: &[Move]) -> Result<Board> {
    let mut solver = Solver::default();
    solver.set_board(board.clone());
    for (i, &mov) in moves.iter().enumerate() {
        if !solver.board.is_playable(&mov) {
            bail!("Move {} ({mov}) is not playable.", i + 1);
        }
        solver.make_move(mov);
    }
    Ok(solver.board)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Solved,
    /// Every reachable new board was explored without a win.
    Exhausted,
    /// The move ceiling was hit before the search could finish.
    Abandoned,
}

impl Outcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_moves: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_moves: ABANDON_LIMIT,
        }
    }
}

/// Depth-first search over one deal.
///
/// The working board is mutated in place; every primitive card move is
/// pushed on `history` so a failed branch can be unwound card by card.
#[derive(Debug, Clone)]
pub struct Solver {
    initial_board: Board,
    board: Board,
    memory: StateMemory,
    history: Vec<(Position, Position)>,
    line: Vec<Move>,
    limits: SearchLimits,
    moves_total: usize,
    depth: usize,
    max_depth: usize,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SearchLimits::default())
    }
}

impl Solver {
    pub fn new(limits: SearchLimits) -> Self {
        Self {
            initial_board: Board::default(),
            board: Board::default(),
            memory: StateMemory::new(),
            history: Vec::new(),
            line: Vec::new(),
            limits,
            moves_total: 0,
            depth: 0,
            max_depth: 0,
        }
    }

    pub fn set_board(&mut self, board: Board) {
        self.initial_board = board;
        self.reset();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn memory(&self) -> &StateMemory {
        &self.memory
    }

    pub fn moves_total(&self) -> usize {
        self.moves_total
    }

    pub fn solve(&mut self) -> Result<SolveResult> {
        if !self.initial_board.is_valid() {
            bail!("Invalid initial board state.");
        }
        self.reset();
        let timer = Instant::now();

        let outcome = if self.board.is_success() {
            Outcome::Solved
        } else {
            self.memory.register_board(&self.board);
            self.cycle_through_cards()
        };

        Ok(SolveResult {
            outcome,
            moves: self.line.clone(),
            primitive_moves: self.moves_total,
            states: self.memory.size(),
            repeats: self.memory.repeats(),
            max_depth: self.max_depth,
            elapsed: timer.elapsed(),
        })
    }

    /// One search frame: gather the preferred move of every cell and tableau,
    /// then try them goal moves first.
    fn cycle_through_cards(&mut self) -> Outcome {
        if self.moves_total > self.limits.max_moves {
            return Outcome::Abandoned;
        }
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);

        let mut outcome = Outcome::Exhausted;
        for mov in self.candidate_moves() {
            outcome = self.move_and_play_one(mov);
            if outcome != Outcome::Exhausted {
                break;
            }
        }

        self.depth -= 1;
        outcome
    }

    fn candidate_moves(&self) -> Candidates {
        let sources = (0..TOTAL_CELLS)
            .map(Position::Cell)
            .chain((0..TOTAL_TABLEAUS).map(Position::Tableau));
        let mut moves: Candidates = sources
            .filter_map(|source| self.board.find_legal_move(source))
            .collect();
        moves.sort_by_key(|mov| mov.target.target_priority());
        moves
    }

    /// Plays `mov` and searches on from there. A failed branch leaves the
    /// board exactly as it found it.
    fn move_and_play_one(&mut self, mov: Move) -> Outcome {
        let made = self.make_move(mov);
        if self.board.is_success() {
            return Outcome::Solved;
        }

        if self.memory.register_board(&self.board) == Visit::New {
            let outcome = self.cycle_through_cards();
            if outcome != Outcome::Exhausted {
                return outcome;
            }
        }

        for _ in 0..made {
            self.undo_last_move();
        }
        self.line.pop();
        Outcome::Exhausted
    }

    /// Carries out a compound move and returns how many primitive moves it took.
    ///
    /// A run of `extent` cards is relocated by parking all but its root in the
    /// first free cells, moving the root, then bringing the parked cards back
    /// in reverse order.
    fn make_move(&mut self, mov: Move) -> usize {
        self.line.push(mov);
        if !mov.is_extent_move() {
            self.move_card(mov.source, mov.target);
            return 1;
        }

        let free_cells = self.board.find_free_cells();
        let parked = &free_cells[..mov.extent - 1];
        for &cell in parked {
            self.move_card(mov.source, cell);
        }
        self.move_card(mov.source, mov.target);
        for &cell in parked.iter().rev() {
            self.move_card(cell, mov.target);
        }
        mov.primitive_count()
    }

    fn move_card(&mut self, source: Position, target: Position) {
        self.history.push((source, target));
        self.board.move_card(source, target);
        self.moves_total += 1;
    }

    fn undo_last_move(&mut self) {
        if let Some((source, target)) = self.history.pop() {
            self.board.move_card(target, source);
        }
    }

    fn reset(&mut self) {
        self.board.clone_from(&self.initial_board);
        self.memory.clear();
        self.history.clear();
        self.line.clear();
        self.moves_total = 0;
        self.depth = 0;
        self.max_depth = 0;
    }
}

#[derive(Debug, Clone)]
pub struct SolveResult {
    pub outcome: Outcome,
    /// Compound moves from the initial board to the final one.
    pub moves: Vec<Move>,
    pub primitive_moves: usize,
    pub states: usize,
    pub repeats: usize,
    pub max_depth: usize,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACES_ON_TOP: &str = r#"Tableau1: KHQHJHTH9H8H7H6H5H4H3H2HAH
Tableau2: KDQDJDTD9D8D7D6D5D4D3D2DAD
Tableau3: KCQCJCTC9C8C7C6C5C4C3C2CAC
Tableau4: KSQSJSTS9S8S7S6S5S4S3S2SAS"#;

    const DEAD_END: &str = r#"Cell1: 6H
Cell2: 6D
Cell3: 6C
Cell4: 6S
Tableau1: AH2C3D4SQH
Tableau2: AD2S3H4CQD
Tableau3: AC2H3S4DQC
Tableau4: AS2D3C4HQS
Tableau5: 5H7D9CJSTH
Tableau6: 5D7C9SJHTD
Tableau7: 5C7S9HJDTC
Tableau8: 5S7H9DJCTS
Tableau9: KHKD8C8H
Tableau10: KCKS8S8D"#;

    #[test]
    fn test_solve_aces_on_top() {
        let board = Board::parse(ACES_ON_TOP).unwrap();
        let result = solve(board.clone(), SearchLimits::default()).unwrap();
        assert_eq!(result.outcome, Outcome::Solved);
        assert_eq!(result.primitive_moves, 52);
        assert_eq!(result.moves.len(), 52);

        let mut solver = Solver::default();
        solver.set_board(board);
        solver.solve().unwrap();
        assert!(solver.board().is_success());
        for goal in &solver.board().goals {
            let suit = goal.peek_bottom().unwrap().suit();
            assert_eq!(goal.len(), 13);
            assert!(
                goal.cards
                    .iter()
                    .enumerate()
                    .all(|(i, card)| card.suit() == suit && card.rank() as usize == i)
            );
        }
    }

    #[test]
    fn test_solve_exhausted() {
        let board = Board::parse(DEAD_END).unwrap();
        assert!(board.is_valid());
        let mut solver = Solver::default();
        solver.set_board(board.clone());
        let result = solver.solve().unwrap();
        assert_eq!(result.outcome, Outcome::Exhausted);
        assert_eq!(result.primitive_moves, 0);
        assert!(result.moves.is_empty());
        assert_eq!(solver.board(), &board);
    }

    #[test]
    fn test_solve_abandoned() {
        let board = Board::parse(ACES_ON_TOP).unwrap();
        let result = solve(board, SearchLimits { max_moves: 3 }).unwrap();
        assert_eq!(result.outcome, Outcome::Abandoned);
        assert_eq!(result.primitive_moves, 4);
    }

    #[test]
    fn test_solve_invalid_board() {
        let board = Board::parse("Tableau1: AH").unwrap();
        assert!(solve(board, SearchLimits::default()).is_err());
    }

    #[test]
    fn test_solve_already_won() {
        let mut board = Board::parse(ACES_ON_TOP).unwrap();
        for (i, tableau) in board.tableaus.iter_mut().take(4).enumerate() {
            tableau.cards.reverse();
            board.goals[i].cards = std::mem::take(&mut tableau.cards);
        }
        let result = solve(board, SearchLimits::default()).unwrap();
        assert_eq!(result.outcome, Outcome::Solved);
        assert_eq!(result.primitive_moves, 0);
    }

    #[test]
    fn test_candidate_order() {
        let board = Board::parse("Cell1: 4D\nTableau1: 9C\nTableau2: 5D\nTableau3: AH").unwrap();
        let mut solver = Solver::default();
        solver.set_board(board);
        let moves = solver.candidate_moves();
        assert_eq!(
            moves.as_slice(),
            &[
                Move::new(Position::Tableau(2), Position::Goal(0), 1),
                Move::new(Position::Cell(0), Position::Tableau(1), 1),
                Move::new(Position::Tableau(0), Position::Cell(1), 1),
                Move::new(Position::Tableau(1), Position::Cell(1), 1),
            ]
        );
    }

    #[test]
    fn test_extent_move_and_undo() {
        let board = Board::parse("Cell1: AS\nCell2: AD\nTableau1: KC7H6H5H\nTableau2: QD8H").unwrap();
        let mut solver = Solver::default();
        solver.set_board(board.clone());
        let hash = board.hash_value();

        let mov = board.find_legal_move(Position::Tableau(0)).unwrap();
        assert_eq!(mov.extent, 3);
        assert_eq!(solver.make_move(mov), 5);
        assert_eq!(solver.moves_total(), 5);

        let expected = Board::parse("Cell1: AS\nCell2: AD\nTableau1: KC\nTableau2: QD8H7H6H5H").unwrap();
        assert_eq!(solver.board(), &expected);

        for _ in 0..5 {
            solver.undo_last_move();
        }
        assert_eq!(solver.board(), &board);
        assert_eq!(solver.board().hash_value(), hash);
    }

    #[test]
    fn test_move_then_undo_restores_board() {
        for seed in 0..20 {
            let board = Board::new_from_seed(seed);
            let mut solver = Solver::default();
            solver.set_board(board.clone());
            for mov in solver.candidate_moves() {
                let made = solver.make_move(mov);
                assert_eq!(made, mov.primitive_count());
                assert_eq!(solver.board().card_count(), 52);
                for _ in 0..made {
                    solver.undo_last_move();
                }
                assert_eq!(solver.board(), &board);
                assert_eq!(solver.board().hash_value(), board.hash_value());
            }
        }
    }

    #[test]
    fn test_replay() {
        let board = Board::parse(ACES_ON_TOP).unwrap();
        let result = solve(board.clone(), SearchLimits::default()).unwrap();
        let replayed = replay(&board, &result.moves).unwrap();
        assert!(replayed.is_success());

        let bogus = [Move::new(Position::Tableau(5), Position::Tableau(6), 1)];
        assert!(replay(&board, &bogus).is_err());
        let first_ace = [Move::new(Position::Tableau(0), Position::Goal(0), 1)];
        assert!(replay(&board, &first_ace).is_ok());
        let mixed_suits = [
            Move::new(Position::Tableau(0), Position::Goal(0), 1),
            Move::new(Position::Tableau(1), Position::Goal(0), 1),
        ];
        assert!(replay(&board, &mixed_suits).is_err());
    }

    #[test]
    fn test_solve_random_deals() {
        for seed in 0..4 {
            let board = Board::new_from_seed(seed);
            let mut solver = Solver::default();
            solver.set_board(board.clone());
            let result = solver.solve().unwrap();
            assert_eq!(solver.board().card_count(), 52);
            match result.outcome {
                Outcome::Solved => {
                    assert!(solver.board().is_success());
                    assert!(replay(&board, &result.moves).unwrap().is_success());
                }
                Outcome::Exhausted => {
                    assert_eq!(solver.board(), &board);
                    assert!(result.moves.is_empty());
                }
                Outcome::Abandoned => {
                    assert!(result.primitive_moves > ABANDON_LIMIT);
                }
            }
            assert!(result.states >= 1);

            let again = solver.solve().unwrap();
            assert_eq!(again.outcome, result.outcome);
            assert_eq!(again.primitive_moves, result.primitive_moves);
        }
    }
}
