//! Legal move generation.

use crate::{Board, Position};

/// Returns every empty cell in row-major order.
///
/// The order is fixed so that the search breaks ties the same way on every
/// call.
// Runs at every search node, so it opens no span.
pub fn legal_moves(board: &Board) -> Vec<Position> {
    Position::ALL
        .into_iter()
        .filter(|pos| board.is_empty(*pos))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_has_nine_moves() {
        assert_eq!(legal_moves(&Board::new()), Position::ALL.to_vec());
    }

    #[test]
    fn test_moves_skip_occupied_cells_in_row_major_order() {
        let board: Board = "X_O/_X_/O__".parse().unwrap();
        assert_eq!(
            legal_moves(&board),
            vec![
                Position::TopCenter,
                Position::MiddleLeft,
                Position::MiddleRight,
                Position::BottomCenter,
                Position::BottomRight,
            ]
        );
    }

    #[test]
    fn test_full_board_has_no_moves() {
        let board: Board = "XOX/OXX/OXO".parse().unwrap();
        assert!(legal_moves(&board).is_empty());
    }
}
