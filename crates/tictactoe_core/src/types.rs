//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};

/// A player's mark.
///
/// X always moves first. In games against the AI the human plays X and the
/// AI plays O.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Mark {
    /// Mark X (moves first).
    X,
    /// Mark O (moves second).
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A cell on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell occupied by a mark.
    Occupied(Mark),
}

impl Cell {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }

    /// Returns the cell with X and O exchanged.
    pub fn swapped(self) -> Self {
        match self {
            Cell::Empty => Cell::Empty,
            Cell::Occupied(mark) => Cell::Occupied(mark.opponent()),
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        Cell::Occupied(mark)
    }
}
