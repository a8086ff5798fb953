//! AI against AI play-outs.

use crate::rules::{is_full, winner};
use crate::{Board, Difficulty, EngineError, Mark, MovePolicy, Outcome, Position};
use derive_getters::Getters;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A finished play-out.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PlayOut {
    /// Final board.
    board: Board,
    /// How it ended.
    outcome: Outcome,
    /// Plies in order, X first.
    plies: Vec<(Mark, Position)>,
}

/// Plays one game from an empty board, X at `x` difficulty and O at `o`.
///
/// # Errors
///
/// Returns [`EngineError::NoLegalMoves`] only if the rules and the policy
/// disagree about whether the board is finished.
#[instrument(skip(policy, rng))]
pub fn play_out<R: Rng + ?Sized>(
    policy: &MovePolicy,
    x: Difficulty,
    o: Difficulty,
    rng: &mut R,
) -> Result<PlayOut, EngineError> {
    let mut board = Board::new();
    let mut plies = Vec::with_capacity(9);
    let mut turn = Mark::X;

    let outcome = loop {
        if let Some(mark) = winner(&board) {
            break Outcome::Winner(mark);
        }
        if is_full(&board) {
            break Outcome::Draw;
        }

        let difficulty = match turn {
            Mark::X => x,
            Mark::O => o,
        };
        let pos = policy.choose_move_for(&board, turn, difficulty, rng)?;
        board = board.with(pos, turn);
        plies.push((turn, pos));
        turn = turn.opponent();
    };

    debug!(outcome = %outcome, plies = plies.len(), "Play-out finished");
    Ok(PlayOut {
        board,
        outcome,
        plies,
    })
}

/// Tally of many play-outs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SelfPlaySummary {
    x_wins: u32,
    o_wins: u32,
    draws: u32,
}

impl SelfPlaySummary {
    /// Adds one outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Winner(Mark::X) => self.x_wins += 1,
            Outcome::Winner(Mark::O) => self.o_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    /// Games tallied.
    pub fn games(&self) -> u32 {
        self.x_wins + self.o_wins + self.draws
    }
}

/// Plays `games` play-outs and tallies the outcomes.
///
/// # Errors
///
/// Propagates the first [`EngineError`] from [`play_out`].
#[instrument(skip(policy, rng))]
pub fn self_play<R: Rng + ?Sized>(
    policy: &MovePolicy,
    x: Difficulty,
    o: Difficulty,
    games: u32,
    rng: &mut R,
) -> Result<SelfPlaySummary, EngineError> {
    let mut summary = SelfPlaySummary::default();
    for _ in 0..games {
        summary.record(*play_out(policy, x, o, rng)?.outcome());
    }
    Ok(summary)
}
