//! The 3x3 board value type.

use crate::{Cell, Mark, Position};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 3x3 tic-tac-toe board.
///
/// The board is a small `Copy` value. Search code places marks with
/// [`Board::with`], which returns a new board and leaves the original
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    /// Cells in row-major order (0-8).
    cells: [Cell; 9],
}

impl Board {
    /// Creates a new empty board.
    pub const fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
        }
    }

    /// Creates a board from three rows of cells.
    pub fn from_rows(rows: [[Cell; 3]; 3]) -> Self {
        let mut board = Self::new();
        for (row, cells) in rows.into_iter().enumerate() {
            for (col, cell) in cells.into_iter().enumerate() {
                board.cells[row * 3 + col] = cell;
            }
        }
        board
    }

    /// Gets the cell at the given position.
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.index()]
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Cell::Empty
    }

    /// Returns a copy of this board with `mark` placed at `pos`.
    pub fn with(&self, pos: Position, mark: Mark) -> Self {
        let mut next = *self;
        next.set(pos, Cell::Occupied(mark));
        next
    }

    /// Sets the cell at the given position.
    pub(crate) fn set(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.index()] = cell;
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Returns the cells grouped by row.
    pub fn rows(&self) -> [[Cell; 3]; 3] {
        let mut rows = [[Cell::Empty; 3]; 3];
        for pos in Position::ALL {
            rows[pos.row()][pos.col()] = self.get(pos);
        }
        rows
    }

    /// Number of cells holding `mark`.
    pub fn count(&self, mark: Mark) -> usize {
        self.cells
            .iter()
            .filter(|c| **c == Cell::Occupied(mark))
            .count()
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| **c != Cell::Empty).count()
    }

    /// Returns the board with every X replaced by O and vice versa.
    ///
    /// The search always maximizes for O, so searching on behalf of X is
    /// done on the swapped board.
    pub fn swapped(&self) -> Self {
        Self {
            cells: self.cells.map(Cell::swapped),
        }
    }
}

impl std::fmt::Display for Board {
    /// Three rows separated by rules; empty cells show their keypad number.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                match self.cells[pos] {
                    Cell::Empty => write!(f, "{}", pos + 1)?,
                    Cell::Occupied(mark) => write!(f, "{}", mark)?,
                }
                if col < 2 {
                    f.write_str("|")?;
                }
            }
            if row < 2 {
                f.write_str("\n-+-+-\n")?;
            }
        }
        Ok(())
    }
}

/// Failure to parse a board from text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BoardParseError {
    /// A character that is not a mark, an empty marker or a separator.
    #[display("Unexpected character {:?} in board", _0)]
    UnexpectedChar(char),
    /// The text did not describe exactly 9 cells.
    #[display("Expected 9 cells, found {}", _0)]
    WrongCellCount(usize),
}

impl std::error::Error for BoardParseError {}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Parses a compact board such as `"XO_/X__/___"`.
    ///
    /// `X`/`O` are marks, `_` or `.` are empty cells; `/`, `|` and whitespace
    /// are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::with_capacity(9);
        for ch in s.chars() {
            match ch {
                'X' | 'x' => cells.push(Cell::Occupied(Mark::X)),
                'O' | 'o' => cells.push(Cell::Occupied(Mark::O)),
                '_' | '.' => cells.push(Cell::Empty),
                '/' | '|' => {}
                c if c.is_whitespace() => {}
                c => return Err(BoardParseError::UnexpectedChar(c)),
            }
        }

        let cells: [Cell; 9] = cells
            .try_into()
            .map_err(|v: Vec<Cell>| BoardParseError::WrongCellCount(v.len()))?;
        Ok(Self { cells })
    }
}
