//! Board coordinates.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A cell position on the board, addressed by row and column.
///
/// Variants are declared in row-major order, so iterating [`Position::ALL`]
/// visits cells left to right, top to bottom.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::EnumIter,
)]
pub enum Position {
    /// Row 0, column 0.
    TopLeft,
    /// Row 0, column 1.
    TopCenter,
    /// Row 0, column 2.
    TopRight,
    /// Row 1, column 0.
    MiddleLeft,
    /// Row 1, column 1.
    Center,
    /// Row 1, column 2.
    MiddleRight,
    /// Row 2, column 0.
    BottomLeft,
    /// Row 2, column 1.
    BottomCenter,
    /// Row 2, column 2.
    BottomRight,
}

impl Position {
    /// All 9 positions in row-major order.
    pub const ALL: [Position; 9] = [
        Position::TopLeft,
        Position::TopCenter,
        Position::TopRight,
        Position::MiddleLeft,
        Position::Center,
        Position::MiddleRight,
        Position::BottomLeft,
        Position::BottomCenter,
        Position::BottomRight,
    ];

    /// Creates a position from a row-major index (0-8).
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Creates a position from row and column (each 0-2).
    pub fn from_row_col(row: usize, col: usize) -> Option<Self> {
        if row < 3 && col < 3 {
            Self::from_index(row * 3 + col)
        } else {
            None
        }
    }

    /// Row-major index (0-8).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Row (0-2).
    pub fn row(self) -> usize {
        self.index() / 3
    }

    /// Column (0-2).
    pub fn col(self) -> usize {
        self.index() % 3
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Position::TopLeft => "Top-left",
            Position::TopCenter => "Top-center",
            Position::TopRight => "Top-right",
            Position::MiddleLeft => "Middle-left",
            Position::Center => "Center",
            Position::MiddleRight => "Middle-right",
            Position::BottomLeft => "Bottom-left",
            Position::BottomCenter => "Bottom-center",
            Position::BottomRight => "Bottom-right",
        }
    }

    /// Parses a position typed by a player.
    ///
    /// Accepts a keypad number (`1`-`9`), a `row col` / `row,col` pair
    /// (0-based), or a label such as `center`.
    #[instrument]
    pub fn parse_input(s: &str) -> Option<Self> {
        let s = s.trim();

        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        match parts.as_slice() {
            [row, col] => {
                let row = row.parse().ok()?;
                let col = col.parse().ok()?;
                Self::from_row_col(row, col)
            }
            [single] => {
                if let Ok(num) = single.parse::<usize>() {
                    return num.checked_sub(1).and_then(Self::from_index);
                }
                let lower = single.to_lowercase();
                Self::ALL
                    .into_iter()
                    .find(|pos| pos.label().to_lowercase() == lower)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}
