//! History consistency invariant: the move log replays to the board.

use super::Invariant;
use crate::{Board, GameSession};

/// Invariant: replaying the move log onto an empty board yields the
/// session's board, with X moving first and marks alternating.
pub struct HistoryConsistentInvariant;

impl Invariant<GameSession> for HistoryConsistentInvariant {
    fn holds(session: &GameSession) -> bool {
        let mut replayed = Board::new();
        let mut expected = crate::Mark::X;

        for record in session.moves() {
            if *record.mark() != expected || !replayed.is_empty(*record.position()) {
                return false;
            }
            replayed = replayed.with(*record.position(), *record.mark());
            expected = expected.opponent();
        }

        replayed == *session.board()
    }

    fn description() -> &'static str {
        "Move log replays to the current board"
    }
}
