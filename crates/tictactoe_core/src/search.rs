//! Minimax search with alpha-beta pruning.
//!
//! The search always maximizes for O and minimizes for X. A 3x3 board is
//! small enough to search to the end on every call, so there is no depth
//! limit, transposition table or iterative deepening.
//!
//! Terminal scores are depth-adjusted: an O win found at depth `d` scores
//! `WIN_SCORE - d` and an X win scores `-(WIN_SCORE - d)`, so quicker wins and
//! slower losses rank higher.

use crate::rules::{is_full, legal_moves, winner};
use crate::{Board, EngineError, Mark, Position};
use std::cmp;
use tracing::{debug, instrument};

/// Score of an O win found at depth 0.
pub const WIN_SCORE: i32 = 10;

/// Score of a finished draw.
pub const DRAW_SCORE: i32 = 0;

/// Initial search window bound.
pub const INFINITY: i32 = i32::MAX / 2;

/// Returns the minimax value of `board` with O maximizing.
///
/// `board` is taken by value; each child position is a fresh copy. Once
/// `beta <= alpha` the remaining siblings are skipped, which never changes
/// the value returned for a full `[-INFINITY, INFINITY]` window.
pub fn best_score(board: Board, depth: i32, maximizing: bool, mut alpha: i32, mut beta: i32) -> i32 {
    match winner(&board) {
        Some(Mark::O) => return WIN_SCORE - depth,
        Some(Mark::X) => return -(WIN_SCORE - depth),
        None => {}
    }

    if is_full(&board) {
        return DRAW_SCORE;
    }

    if maximizing {
        let mut best = -INFINITY;

        for pos in legal_moves(&board) {
            let score = best_score(board.with(pos, Mark::O), depth + 1, false, alpha, beta);

            best = cmp::max(best, score);

            alpha = cmp::max(alpha, score);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut worst = INFINITY;

        for pos in legal_moves(&board) {
            let score = best_score(board.with(pos, Mark::X), depth + 1, true, alpha, beta);

            worst = cmp::min(worst, score);

            beta = cmp::min(beta, score);
            if beta <= alpha {
                break;
            }
        }
        worst
    }
}

/// Scores every legal O move on `board`, in row-major order.
///
/// Each move is placed and evaluated with X to reply, starting at depth 0
/// with a full window.
#[instrument(skip(board), fields(board = %board))]
pub fn score_moves(board: &Board) -> Vec<(Position, i32)> {
    legal_moves(board)
        .into_iter()
        .map(|pos| {
            let score = best_score(board.with(pos, Mark::O), 0, false, -INFINITY, INFINITY);
            (pos, score)
        })
        .collect()
}

/// Returns the optimal move for O.
///
/// Ties go to the earliest move in row-major order.
///
/// # Errors
///
/// Returns [`EngineError::NoLegalMoves`] if the board is full.
#[instrument(skip(board), fields(board = %board))]
pub fn best_move(board: &Board) -> Result<Position, EngineError> {
    let mut best: Option<(Position, i32)> = None;

    for (pos, score) in score_moves(board) {
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((pos, score));
        }
    }

    let (pos, score) = best.ok_or(EngineError::NoLegalMoves)?;
    debug!(position = %pos, score, "Best move found");
    Ok(pos)
}

/// Returns the optimal move for `mark`.
///
/// Moves for X are found by searching the board with the marks swapped.
///
/// # Errors
///
/// Returns [`EngineError::NoLegalMoves`] if the board is full.
#[instrument(skip(board))]
pub fn best_move_for(board: &Board, mark: Mark) -> Result<Position, EngineError> {
    match mark {
        Mark::O => best_move(board),
        Mark::X => best_move(&board.swapped()),
    }
}
