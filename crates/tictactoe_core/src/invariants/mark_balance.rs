//! Mark balance invariant: X leads O by zero or one mark.

use super::Invariant;
use crate::{Board, GameSession, Mark};

/// Invariant: X has as many marks as O, or exactly one more.
///
/// Holds on every board reachable by alternating play with X first.
pub struct MarkBalanceInvariant;

impl Invariant<Board> for MarkBalanceInvariant {
    fn holds(board: &Board) -> bool {
        let x = board.count(Mark::X);
        let o = board.count(Mark::O);
        x == o || x == o + 1
    }

    fn description() -> &'static str {
        "X leads O by zero or one mark"
    }
}

impl Invariant<GameSession> for MarkBalanceInvariant {
    fn holds(session: &GameSession) -> bool {
        <Self as Invariant<Board>>::holds(session.board())
    }

    fn description() -> &'static str {
        <Self as Invariant<Board>>::description()
    }
}
