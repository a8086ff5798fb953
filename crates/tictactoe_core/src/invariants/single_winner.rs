//! Single winner invariant: never two winning marks, outcome agrees with board.

use super::Invariant;
use crate::rules::{has_line, is_full, winner};
use crate::{GameSession, GameStatus, Mark, Outcome};

/// Invariant: at most one mark owns a line, and the recorded status and
/// outcome agree with the board.
pub struct SingleWinnerInvariant;

impl Invariant<GameSession> for SingleWinnerInvariant {
    fn holds(session: &GameSession) -> bool {
        let board = session.board();
        if has_line(board, Mark::X) && has_line(board, Mark::O) {
            return false;
        }

        match (session.status(), session.outcome()) {
            (GameStatus::Finished, Some(Outcome::Winner(mark))) => winner(board) == Some(mark),
            (GameStatus::Finished, Some(Outcome::Draw)) => {
                is_full(board) && winner(board).is_none()
            }
            (GameStatus::Finished, None) => false,
            (_, Some(_)) => false,
            (_, None) => winner(board).is_none(),
        }
    }

    fn description() -> &'static str {
        "At most one winner, matching the recorded outcome"
    }
}
