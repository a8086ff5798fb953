//! Game rules for tic-tac-toe.
//!
//! This module contains pure functions for evaluating a board according to
//! tic-tac-toe rules. Rules are separated from board storage so the search,
//! the engine and the invariants can share them.

pub mod draw;
pub mod moves;
pub mod win;

pub use draw::{is_draw, is_full};
pub use moves::legal_moves;
pub use win::{LINES, has_line, winner};
