//! Error and rejection types for the engine and its collaborators.

use crate::{Mark, Position};
use derive_more::{Display, Error};
use tracing::instrument;

/// Errors that indicate the engine was driven into an impossible state.
///
/// Terminal boards reached through legal play are never errors; they are
/// reported as outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum EngineError {
    /// A move was requested on a board with no empty cells.
    #[display("No legal moves remain on the board")]
    NoLegalMoves,

    /// A session invariant failed after a transition.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for EngineError {}

/// Why a proposed move was ignored.
///
/// Rejections leave the session untouched and are not surfaced to players.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MoveRejection {
    /// The game is waiting for a second player or already finished.
    #[display("Game is not active")]
    GameNotActive,

    /// The submitted mark is not the one due to move.
    #[display("It's {}'s turn, not {}'s", expected, got)]
    WrongTurn {
        /// Mark due to move.
        expected: Mark,
        /// Mark that was submitted.
        got: Mark,
    },

    /// The acting player is not part of this game.
    #[display("Player is not part of this game")]
    NotAParticipant,

    /// The acting player does not own the submitted mark.
    #[display("Player does not play {}", _0)]
    NotYourMark(Mark),

    /// The target cell is already occupied.
    #[display("Cell {} is already occupied", _0)]
    CellOccupied(Position),
}

/// Why an invitation could not be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum InviteRejection {
    /// The invitation was already accepted or the game is over.
    #[display("Invitation is no longer open")]
    NotWaiting,

    /// The inviter tried to accept their own invitation.
    #[display("You cannot accept your own invitation")]
    OwnInvite,
}

/// Kind of store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StoreErrorKind {
    /// The requested record does not exist.
    #[display("not found")]
    NotFound,
    /// A concurrent writer saved the session first.
    #[display("conflict")]
    Conflict,
    /// The backend failed.
    #[display("backend")]
    Backend,
}

/// Store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error ({}): {} at {}:{}", kind, message, file, line)]
pub struct StoreError {
    /// Failure category.
    pub kind: StoreErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Creates a compare-and-swap conflict error.
    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Conflict, message)
    }

    /// Returns true if a concurrent save won the race.
    pub fn is_conflict(&self) -> bool {
        self.kind == StoreErrorKind::Conflict
    }
}

/// Notification delivery error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Notify error: {} at {}:{}", message, file, line)]
pub struct NotifyError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl NotifyError {
    /// Creates a new notification error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
