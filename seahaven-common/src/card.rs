use anyhow::{Context, Result};

use std::fmt;

pub const MAX_RANK: u8 = 13;
pub const MAX_SUIT: u8 = 4;
pub const MAX_CARD: u8 = MAX_SUIT * MAX_RANK;

const SUITS: [char; 4] = ['H', 'D', 'C', 'S'];
const RANKS: [char; 13] = [
    'A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K',
];

/// A single playing card, encoded as `suit * 13 + rank` with a zero-based rank.
///
/// The derived ordering follows that encoding, so cards sort by suit first and
/// rank second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card(u8);

impl Card {
    pub fn new_with_id(id: u8) -> Self {
        assert!(id < MAX_CARD, "Card id {id} out of range");
        Self(id)
    }

    pub fn new_with_rank_suit(rank: u8, suit: u8) -> Self {
        Self::new_with_id(suit * MAX_RANK + rank)
    }

    pub fn parse(rank: char, suit: char) -> Result<Self> {
        let rank_idx = RANKS
            .iter()
            .position(|&r| r == rank.to_ascii_uppercase())
            .with_context(|| format!("Invalid rank at card {rank}{suit}"))?;
        let suit_idx = SUITS
            .iter()
            .position(|&s| s == suit.to_ascii_uppercase())
            .with_context(|| format!("Invalid suit at card {rank}{suit}"))?;
        Ok(Card::new_with_rank_suit(rank_idx as u8, suit_idx as u8))
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    /// Zero-based rank: ace is 0, king is 12.
    pub fn rank(&self) -> u8 {
        self.0 % MAX_RANK
    }

    pub fn suit(&self) -> u8 {
        self.0 / MAX_RANK
    }

    /// Ordinal used for fingerprinting. Zero is reserved for "no card".
    pub fn value(&self) -> u32 {
        self.0 as u32 + 1
    }

    pub fn is_ace(&self) -> bool {
        self.rank() == 0
    }

    pub fn is_king(&self) -> bool {
        self.rank() == MAX_RANK - 1
    }

    /// Whether `self` can sit directly on `other` in a same-suit descending run.
    pub fn is_just_below(&self, other: &Card) -> bool {
        self.suit() == other.suit() && self.rank() + 1 == other.rank()
    }

    pub fn pretty_print(&self) -> String {
        format!(
            "{}{}",
            RANKS[self.rank() as usize],
            SUITS[self.suit() as usize]
        )
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print())
    }
}
