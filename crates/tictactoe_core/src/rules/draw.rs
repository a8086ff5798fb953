//! Full-board and draw checks.

use super::win::winner;
use crate::{Board, Cell};
use tracing::instrument;

/// Returns true if no cell is empty.
// Runs at every search node, so it opens no span.
pub fn is_full(board: &Board) -> bool {
    !board.cells().contains(&Cell::Empty)
}

/// Checks if the board is a finished draw.
#[instrument(level = "trace", skip(board))]
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && winner(board).is_none()
}
