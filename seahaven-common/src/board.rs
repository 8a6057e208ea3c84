use crate::action::Position;
use crate::card::{Card, MAX_CARD};

use anyhow::{Context, Result, bail};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use sha2::{Digest, Sha256};
use smallvec::SmallVec;

pub const TOTAL_GOALS: usize = 4;
pub const TOTAL_CELLS: usize = 4;
pub const TOTAL_TABLEAUS: usize = 10;
pub const DEAL_DEPTH: usize = 5;

const STACK_SIZE: usize = 19;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    pub goals: [Stack; TOTAL_GOALS],
    pub cells: [Stack; TOTAL_CELLS],
    pub tableaus: [Stack; TOTAL_TABLEAUS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deals a shuffled deck: five cards on each tableau, the two leftovers in
    /// the first two cells.
    pub fn deal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck: Vec<Card> = (0..MAX_CARD).map(Card::new_with_id).collect();
        deck.shuffle(rng);

        let mut board = Board::new();
        let mut cards = deck.into_iter();
        for tableau in board.tableaus.iter_mut() {
            tableau.cards.extend(cards.by_ref().take(DEAL_DEPTH));
        }
        for cell in board.cells.iter_mut() {
            cell.cards.extend(cards.next());
        }
        board
    }

    pub fn new_from_seed(seed: u64) -> Self {
        Self::deal(&mut StdRng::seed_from_u64(seed))
    }

    pub fn card_count(&self) -> usize {
        self.goals
            .iter()
            .chain(self.cells.iter())
            .chain(self.tableaus.iter())
            .map(|stack| stack.len())
            .sum()
    }

    pub fn goal_count(&self) -> usize {
        self.goals.iter().map(|goal| goal.len()).sum()
    }

    pub fn is_valid(&self) -> bool {
        let mut seen = [false; MAX_CARD as usize];
        let mut count = 0;
        let mut check_cards = |cards: &[Card]| -> bool {
            for &card in cards {
                let id = card.id() as usize;
                if seen[id] {
                    return false;
                }
                seen[id] = true;
                count += 1;
            }
            true
        };

        for goal in &self.goals {
            let Some(&first) = goal.cards.first() else {
                continue;
            };
            let in_sequence = goal
                .cards
                .iter()
                .enumerate()
                .all(|(i, card)| card.suit() == first.suit() && card.rank() as usize == i);
            if !in_sequence || !check_cards(&goal.cards) {
                return false;
            }
        }
        for cell in &self.cells {
            if cell.len() > 1 || !check_cards(&cell.cards) {
                return false;
            }
        }
        for tableau in &self.tableaus {
            if !check_cards(&tableau.cards) {
                return false;
            }
        }
        count == MAX_CARD as usize
    }

    /// Looks up the stack a position refers to. Panics on an out-of-range index.
    pub fn resolve(&self, position: Position) -> &Stack {
        match position {
            Position::Goal(idx) => &self.goals[idx],
            Position::Cell(idx) => &self.cells[idx],
            Position::Tableau(idx) => &self.tableaus[idx],
        }
    }

    pub fn resolve_mut(&mut self, position: Position) -> &mut Stack {
        match position {
            Position::Goal(idx) => &mut self.goals[idx],
            Position::Cell(idx) => &mut self.cells[idx],
            Position::Tableau(idx) => &mut self.tableaus[idx],
        }
    }

    /// Moves the top card of `source` onto `target` without any rule check.
    pub fn move_card(&mut self, source: Position, target: Position) {
        let card = self.resolve_mut(source).pop_unchecked();
        self.resolve_mut(target).push(card);
    }

    /// Fingerprint of the cell and tableau layout, blind to which cell or
    /// tableau slot holds what. Goals are left out since they follow from the rest.
    pub fn hash_value(&self) -> u64 {
        let mut cells: [u32; TOTAL_CELLS] =
            std::array::from_fn(|i| self.cells[i].peek_top().map_or(0, Card::value));
        cells.sort_unstable();

        let mut tableau_idxs: [usize; TOTAL_TABLEAUS] = std::array::from_fn(|i| i);
        tableau_idxs.sort_by_key(|&i| self.tableaus[i].peek_top().map_or(0, Card::value));

        let mut hasher = Sha256::new();
        for value in cells {
            hasher.update(value.to_le_bytes());
        }
        for idx in tableau_idxs {
            for card in &self.tableaus[idx].cards {
                hasher.update(card.value().to_le_bytes());
            }
            // stack terminator
            hasher.update(0u32.to_le_bytes());
        }
        let digest = hasher.finalize();

        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(prefix)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut board = Board::new();

        for line in content
            .split('\n')
            .map(|v| v.trim())
            .filter(|l| !l.is_empty())
        {
            let line_context = || format!("Failed to parse at '{line}'");
            let Some((name, rest)) = line.split_once(':') else {
                bail!("Missing ':' at '{line}'");
            };
            let name = name.trim();
            let (prefix, total) = if name.starts_with("Goal") {
                ("Goal", TOTAL_GOALS)
            } else if name.starts_with("Cell") {
                ("Cell", TOTAL_CELLS)
            } else if name.starts_with("Tableau") {
                ("Tableau", TOTAL_TABLEAUS)
            } else {
                bail!("Unknown stack '{name}' at '{line}'");
            };
            let idx = name[prefix.len()..]
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid {prefix} index"))
                .with_context(line_context)?;
            if idx == 0 || idx > total {
                bail!("{prefix} index {idx} out of range 1..={total} at '{line}'");
            }
            let cards = Self::parse_cards(rest.trim()).with_context(line_context)?;
            let stack = match prefix {
                "Goal" => &mut board.goals[idx - 1],
                "Cell" => &mut board.cells[idx - 1],
                _ => &mut board.tableaus[idx - 1],
            };
            stack.cards = cards.into_iter().collect();
        }

        Ok(board)
    }

    fn parse_cards(s: &str) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        let mut chars = s.chars().filter(|c| !c.is_whitespace());
        while let Some(rank) = chars.next() {
            let Some(suit) = chars.next() else {
                bail!("Incomplete card '{rank}'");
            };
            cards.push(Card::parse(rank, suit)?);
        }
        Ok(cards)
    }

    pub fn pretty_print(&self) -> String {
        let mut lines = vec![];
        let groups: [(&str, &[Stack]); 3] = [
            ("Goal", &self.goals[..]),
            ("Cell", &self.cells[..]),
            ("Tableau", &self.tableaus[..]),
        ];
        for (name, stacks) in groups {
            for (i, stack) in stacks.iter().enumerate() {
                if stack.is_empty() {
                    continue;
                }
                let cards: String = stack.cards.iter().map(|c| c.pretty_print()).collect();
                lines.push(format!("{name}{}: {cards}", i + 1));
            }
        }
        lines.join("\n")
    }
}

/// Cards in push order: the last element is the top of the stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    pub cards: SmallVec<[Card; STACK_SIZE]>,
}

impl Stack {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn peek_top(&self) -> Option<&Card> {
        self.cards.last()
    }

    pub fn peek_bottom(&self) -> Option<&Card> {
        self.cards.first()
    }

    /// The card `offset` positions below the top; `0` is the top itself.
    pub fn peek_nth_from_top(&self, offset: usize) -> Option<&Card> {
        self.cards.iter().rev().nth(offset)
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn pop_unchecked(&mut self) -> Card {
        self.cards.pop().expect("Cannot pop from an empty stack")
    }

    /// Length of the same-suit run at the top, each card one rank below the
    /// one beneath it.
    pub fn ordered_count(&self) -> usize {
        if self.cards.is_empty() {
            return 0;
        }
        let mut count = 1;
        for pair in self.cards.windows(2).rev() {
            if pair[1].is_just_below(&pair[0]) {
                count += 1;
            } else {
                break;
            }
        }
        count
    }
}
