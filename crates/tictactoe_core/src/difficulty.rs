//! Difficulty tiers and the move-selection policy built on the search.

use crate::rules::legal_moves;
use crate::search::best_move;
use crate::{Board, EngineError, Mark, Position};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Probability that the medium tier plays the optimal move.
pub const DEFAULT_OPTIMAL_RATE: f64 = 0.7;

/// AI skill level.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Difficulty {
    /// Uniformly random legal moves.
    #[serde(rename = "ai_easy")]
    #[strum(to_string = "ai_easy", serialize = "easy")]
    Easy,
    /// Optimal most of the time, random otherwise.
    #[serde(rename = "ai_medium")]
    #[strum(to_string = "ai_medium", serialize = "medium")]
    Medium,
    /// Always optimal.
    #[serde(rename = "ai_hard")]
    #[strum(to_string = "ai_hard", serialize = "hard")]
    Hard,
}

/// Maps a [`Difficulty`] to a concrete move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovePolicy {
    optimal_rate: f64,
}

impl MovePolicy {
    /// Creates a policy whose medium tier plays optimally with probability
    /// `optimal_rate` (clamped to `0.0..=1.0`).
    #[instrument]
    pub fn new(optimal_rate: f64) -> Self {
        let optimal_rate = if optimal_rate.is_nan() {
            DEFAULT_OPTIMAL_RATE
        } else {
            optimal_rate.clamp(0.0, 1.0)
        };
        Self { optimal_rate }
    }

    /// Probability that the medium tier plays optimally.
    pub fn optimal_rate(&self) -> f64 {
        self.optimal_rate
    }

    /// Chooses O's move on `board` at the given difficulty.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoLegalMoves`] if the board is full.
    #[instrument(skip(self, board, rng), fields(board = %board))]
    pub fn choose_move<R: Rng + ?Sized>(
        &self,
        board: &Board,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<Position, EngineError> {
        let pos = match difficulty {
            Difficulty::Easy => random_move(board, rng)?,
            Difficulty::Hard => best_move(board)?,
            Difficulty::Medium => {
                if rng.random_bool(self.optimal_rate) {
                    best_move(board)?
                } else {
                    debug!("Medium tier falling back to a random move");
                    random_move(board, rng)?
                }
            }
        };

        debug!(position = %pos, "AI move chosen");
        Ok(pos)
    }

    /// Chooses a move for `mark`, searching the swapped board for X.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoLegalMoves`] if the board is full.
    pub fn choose_move_for<R: Rng + ?Sized>(
        &self,
        board: &Board,
        mark: Mark,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<Position, EngineError> {
        match mark {
            Mark::O => self.choose_move(board, difficulty, rng),
            Mark::X => self.choose_move(&board.swapped(), difficulty, rng),
        }
    }
}

impl Default for MovePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_OPTIMAL_RATE)
    }
}

/// Chooses O's move with the default policy.
///
/// # Errors
///
/// Returns [`EngineError::NoLegalMoves`] if the board is full.
pub fn choose_move<R: Rng + ?Sized>(
    board: &Board,
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<Position, EngineError> {
    MovePolicy::default().choose_move(board, difficulty, rng)
}

/// Picks a legal move uniformly at random.
///
/// # Errors
///
/// Returns [`EngineError::NoLegalMoves`] if the board is full.
#[instrument(level = "trace", skip(board, rng))]
pub fn random_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Result<Position, EngineError> {
    legal_moves(board)
        .choose(rng)
        .copied()
        .ok_or(EngineError::NoLegalMoves)
}
