use std::fmt;

/// Identifies a whole stack on the board, never a card within it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Position {
    Goal(usize),
    Cell(usize),
    Tableau(usize),
}

impl Position {
    pub fn index(&self) -> usize {
        match *self {
            Position::Goal(idx) | Position::Cell(idx) | Position::Tableau(idx) => idx,
        }
    }

    pub fn is_tableau(&self) -> bool {
        matches!(self, Position::Tableau(_))
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, Position::Cell(_))
    }

    /// Order in which candidate moves are tried: goals, then tableaus, then cells.
    pub fn target_priority(&self) -> u8 {
        match self {
            Position::Goal(_) => 0,
            Position::Tableau(_) => 1,
            Position::Cell(_) => 2,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Goal(idx) => write!(f, "G{}", idx + 1),
            Position::Cell(idx) => write!(f, "C{}", idx + 1),
            Position::Tableau(idx) => write!(f, "T{}", idx + 1),
        }
    }
}

/// A move of `extent` cards from the top of `source` onto `target`.
///
/// Moves with an extent above one are tableau-to-tableau run relocations,
/// staged through free cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub source: Position,
    pub target: Position,
    pub extent: usize,
}

impl Move {
    pub fn new(source: Position, target: Position, extent: usize) -> Self {
        Self {
            source,
            target,
            extent,
        }
    }

    pub fn is_extent_move(&self) -> bool {
        self.extent > 1 && self.source.is_tableau() && self.target.is_tableau()
    }

    /// Number of single-card moves needed to carry this move out.
    pub fn primitive_count(&self) -> usize {
        if self.is_extent_move() {
            (self.extent - 1) * 2 + 1
        } else {
            1
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.target)?;
        if self.extent > 1 {
            write!(f, "@{}", self.extent)?;
        }
        Ok(())
    }
}

pub fn format_moves(moves: &[Move]) -> String {
    let list: Vec<String> = moves.iter().map(|m| m.to_string()).collect();

    let mut output = String::new();
    let max_width = list.iter().map(|s| s.len()).max().unwrap_or_default() + 1;
    for chunk in list.chunks(10) {
        for cmd in chunk {
            output.push_str(&format!("{cmd:<width$}", width = max_width));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_count() {
        let simple = Move::new(Position::Cell(0), Position::Tableau(3), 1);
        assert_eq!(simple.primitive_count(), 1);
        let extent = Move::new(Position::Tableau(0), Position::Tableau(1), 3);
        assert!(extent.is_extent_move());
        assert_eq!(extent.primitive_count(), 5);
    }

    #[test]
    fn test_format_moves() {
        let moves = [
            Move::new(Position::Tableau(2), Position::Goal(0), 1),
            Move::new(Position::Cell(1), Position::Tableau(9), 1),
            Move::new(Position::Tableau(0), Position::Tableau(4), 3),
        ];
        assert_eq!(format_moves(&moves), "T3:G1   C2:T10  T1:T5@3 \n");
    }
}
