//! Tic-tac-toe core - rules, search and the game state machine
//!
//! Everything in this crate is synchronous and free of I/O. Storage and
//! message delivery are reached through the [`GameStore`] and [`Notifier`]
//! traits, implemented by the bot crate.
//!
//! # Architecture
//!
//! - **Board / Rules**: the 3x3 value type, win and draw detection, legal moves
//! - **Search**: full-depth minimax with alpha-beta pruning, O maximizing
//! - **Difficulty**: easy/medium/hard move policies over an injectable RNG
//! - **Engine**: waiting → active → finished transitions, including the AI reply
//!
//! # Example
//!
//! ```
//! use tictactoe_core::{Difficulty, GameEngine, Mark, Position, Transition};
//!
//! let mut engine = GameEngine::from_seed(7);
//! let session = engine.create_ai_game("g1".into(), "alice".into(), Difficulty::Hard);
//!
//! let transition = engine
//!     .apply_move(session, "alice", Position::Center, Mark::X)
//!     .unwrap();
//!
//! // The AI answered in the same call.
//! if let Transition::Applied(applied) = transition {
//!     assert_eq!(applied.plies().len(), 2);
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod difficulty;
mod engine;
mod error;
mod notifier;
mod position;
mod selfplay;
mod session;
mod store;
mod types;

// Public modules
pub mod invariants;
pub mod rules;
pub mod search;

// Crate-level exports - Board and primitives
pub use board::{Board, BoardParseError};
pub use position::Position;
pub use types::{Cell, Mark};

// Crate-level exports - AI
pub use difficulty::{DEFAULT_OPTIMAL_RATE, Difficulty, MovePolicy, choose_move, random_move};
pub use search::{best_move, best_move_for};
pub use selfplay::{PlayOut, SelfPlaySummary, play_out, self_play};

// Crate-level exports - State machine
pub use engine::{
    AppliedMove, DEFAULT_INVITE_CODE_LENGTH, GameEngine, PlayerResult, StatUpdate, Transition,
};
pub use session::{
    GameMode, GameSession, GameStatus, MoveRecord, Outcome, PlayerId, SessionId, SessionView,
};

// Crate-level exports - Errors
pub use error::{
    EngineError, InviteRejection, MoveRejection, NotifyError, StoreError, StoreErrorKind,
};

// Crate-level exports - Collaborators
pub use notifier::{Button, Notifier, Rendered};
pub use store::{GameStore, LeaderboardEntry, PlayerStats};
