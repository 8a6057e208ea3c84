use crate::action::{Move, Position};
use crate::board::{Board, Stack, TOTAL_CELLS, TOTAL_GOALS, TOTAL_TABLEAUS};
use crate::card::{Card, MAX_CARD};

use smallvec::SmallVec;

/// Run length at which a buried same-suit card can no longer be dug out.
const BLOCKING_RUN: usize = TOTAL_CELLS + 1;

pub type FreeCells = SmallVec<[Position; TOTAL_CELLS]>;

impl Board {
    pub fn find_free_cells(&self) -> FreeCells {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(idx, _)| Position::Cell(idx))
            .collect()
    }

    pub fn free_cell_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_empty()).count()
    }

    pub fn is_success(&self) -> bool {
        self.goal_count() == MAX_CARD as usize
    }

    /// Whether `card`, as the root of `extent_len` moving cards, may land on `target`.
    pub fn is_legal_move(&self, card: Card, target: Position, extent_len: usize) -> bool {
        let target_stack = self.resolve(target);
        let target_card = target_stack.peek_top();

        match target {
            Position::Goal(_) => match target_card {
                None => card.is_ace(),
                Some(top) => top.is_just_below(&card),
            },
            Position::Cell(_) => target_stack.is_empty(),
            Position::Tableau(_) => match target_card {
                None => card.is_king(),
                Some(top) => {
                    card.is_just_below(top) && !Self::is_blocking_move(card, target_stack, extent_len)
                }
            },
        }
    }

    /// A move that would bury a lower card of the same suit beneath a run too
    /// long to ever be relocated.
    pub fn is_blocking_move(card: Card, target_stack: &Stack, extent_len: usize) -> bool {
        let count = target_stack.ordered_count();
        if count + extent_len < BLOCKING_RUN {
            return false;
        }
        let buried = &target_stack.cards[..target_stack.len() - count];
        buried
            .iter()
            .any(|c| c.suit() == card.suit() && c.rank() < card.rank())
    }

    /// Size of the top run when it can be moved as a unit through the free
    /// cells, otherwise zero.
    pub fn find_extent(&self, stack: &Stack) -> usize {
        let count = stack.ordered_count();
        if count <= self.free_cell_count() + 1 {
            count
        } else {
            0
        }
    }

    /// Whether nothing but goal moves can help this tableau stack any more.
    pub fn is_fully_ordered(&self, stack: &Stack) -> bool {
        if stack.is_empty() {
            return false;
        }
        let free_cells = self.free_cell_count();
        let ordered_count = stack.ordered_count();

        if ordered_count == stack.len() && stack.peek_bottom().is_some_and(Card::is_king) {
            return true;
        }
        if stack.len() < free_cells + 1 {
            return false;
        }
        ordered_count > free_cells + 1
    }

    /// The single preferred move out of `source`, if any.
    ///
    /// Goals are tried first, then tableaus (carrying the whole movable run
    /// from a tableau source), and finally the first free cell for a single
    /// card that did not come from a cell.
    pub fn find_legal_move(&self, source: Position) -> Option<Move> {
        let source_stack = self.resolve(source);
        let top = *source_stack.peek_top()?;

        for idx in 0..TOTAL_GOALS {
            let target = Position::Goal(idx);
            if self.is_legal_move(top, target, 1) {
                return Some(Move::new(source, target, 1));
            }
        }

        let (card, extent) = if source.is_tableau() {
            if self.is_fully_ordered(source_stack) {
                return None;
            }
            let extent = self.find_extent(source_stack);
            if extent == 0 {
                return None;
            }
            (*source_stack.peek_nth_from_top(extent - 1)?, extent)
        } else {
            (top, 1)
        };

        for idx in 0..TOTAL_TABLEAUS {
            let target = Position::Tableau(idx);
            if target == source {
                continue;
            }
            if self.is_legal_move(card, target, extent) {
                return Some(Move::new(source, target, extent));
            }
        }

        if source.is_cell() || extent > 1 {
            return None;
        }
        self.find_free_cells()
            .first()
            .map(|&target| Move::new(source, target, 1))
    }

    /// Checks a compound move against the current board before it is replayed.
    pub fn is_playable(&self, mov: &Move) -> bool {
        let source_stack = self.resolve(mov.source);
        if mov.extent == 0 || mov.source == mov.target {
            return false;
        }
        if mov.extent > 1
            && (!mov.is_extent_move()
                || source_stack.ordered_count() < mov.extent
                || self.free_cell_count() + 1 < mov.extent)
        {
            return false;
        }
        match source_stack.peek_nth_from_top(mov.extent - 1) {
            Some(&card) => self.is_legal_move(card, mov.target, mov.extent),
            None => false,
        }
    }
}
