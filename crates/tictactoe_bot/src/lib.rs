//! TicTacToe Bot - chat front end for the tic-tac-toe engine
//!
//! Wires [`tictactoe_core`] to a store and a notifier, parses chat commands
//! and renders sessions as text with inline keyboards.
//!
//! # Architecture
//!
//! - **Service**: one engine transition per request, saved with a version check
//! - **Store**: in-memory sessions, invite codes and player counters
//! - **Render**: menus, boards, statistics and leaderboard messages
//! - **Config**: TOML file plus `TICTACTOE_*` environment overrides
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_bot::{BotConfig, GameService, InMemoryStore, LogNotifier};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = BotConfig::load(None)?;
//! let service = GameService::from_config(&config, InMemoryStore::new(), LogNotifier);
//! service.handle_input("alice", "/start").await?;
//! service.handle_input("alice", "play_ai_hard").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod command;
mod config;
mod memory_store;
mod notifier;
mod render;
mod service;

// Crate-level exports - Configuration
pub use config::{BotConfig, ConfigError, ENV_PREFIX};

// Crate-level exports - Commands
pub use command::{ChatCommand, CommandError, MAIN_MENU};

// Crate-level exports - Collaborators
pub use memory_store::InMemoryStore;
pub use notifier::{ConsoleNotifier, LogNotifier, OutboxNotifier};
pub use render::TextRenderer;

// Crate-level exports - Service
pub use service::{GameService, ServiceError};
