//! Line detection.

use crate::{Board, Cell, Mark, Position};
use tracing::instrument;

/// The eight winning lines: rows, then columns, then the two diagonals.
pub const LINES: [[Position; 3]; 8] = {
    use Position::*;
    [
        [TopLeft, TopCenter, TopRight],
        [MiddleLeft, Center, MiddleRight],
        [BottomLeft, BottomCenter, BottomRight],
        [TopLeft, MiddleLeft, BottomLeft],
        [TopCenter, Center, BottomCenter],
        [TopRight, MiddleRight, BottomRight],
        [TopLeft, Center, BottomRight],
        [TopRight, Center, BottomLeft],
    ]
};

/// Mark owning the first complete line in [`LINES`] order, if any.
// Runs at every search node, so it opens no span.
pub fn winner(board: &Board) -> Option<Mark> {
    LINES.iter().find_map(|line| {
        let first = board.get(line[0]).mark()?;
        line[1..]
            .iter()
            .all(|pos| board.get(*pos) == Cell::Occupied(first))
            .then_some(first)
    })
}

/// Checks whether `mark` owns at least one complete line.
#[instrument(level = "trace", skip(board))]
pub fn has_line(board: &Board, mark: Mark) -> bool {
    let cell = Cell::Occupied(mark);
    LINES
        .iter()
        .any(|line| line.iter().all(|pos| board.get(*pos) == cell))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_has_no_line() {
        assert_eq!(winner(&Board::new()), None);
    }

    #[test]
    fn test_x_completes_first_row() {
        let board: Board = "XXX/OO_/___".parse().unwrap();
        assert_eq!(winner(&board), Some(Mark::X));
    }

    #[test]
    fn test_o_completes_middle_column() {
        let board: Board = "XO_/XO_/_OX".parse().unwrap();
        assert_eq!(winner(&board), Some(Mark::O));
    }

    #[test]
    fn test_main_diagonal() {
        let board: Board = "O_X/_OX/X_O".parse().unwrap();
        assert_eq!(winner(&board), Some(Mark::O));
    }

    #[test]
    fn test_anti_diagonal() {
        let board: Board = "OOX/_X_/X__".parse().unwrap();
        assert_eq!(winner(&board), Some(Mark::X));
    }

    #[test]
    fn test_two_in_a_row_is_not_a_line() {
        let board: Board = "XX_/OO_/___".parse().unwrap();
        assert_eq!(winner(&board), None);
        assert!(!has_line(&board, Mark::X));
    }

    #[test]
    fn test_scan_order_is_fixed() {
        // Not reachable by legal play; the first row scanned wins.
        let board: Board = "OOO/XXX/___".parse().unwrap();
        assert_eq!(winner(&board), Some(Mark::O));
        assert!(has_line(&board, Mark::X));
    }
}
