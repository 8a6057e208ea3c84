//! Cards, board layout and move rules for Seahaven Towers Solitaire.
//!
//! Ten tableau stacks, four single-card cells and four goal piles built per
//! suit from ace to king. Tableau runs are same-suit and descending.
pub mod action;
pub mod board;
pub mod card;
mod rules;

pub use crate::rules::FreeCells;
