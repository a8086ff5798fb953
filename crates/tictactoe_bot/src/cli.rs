//! Command-line interface for tictactoe_bot.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tictactoe_core::Difficulty;

/// TicTacToe Bot - play against the engine from a terminal
#[derive(Parser, Debug)]
#[command(name = "tictactoe_bot")]
#[command(about = "Tic-tac-toe chat bot engine with a terminal front end", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play against the AI in the terminal
    Play {
        /// AI difficulty (easy, medium, hard)
        #[arg(short, long, default_value = "hard")]
        difficulty: Difficulty,

        /// Player name used for statistics
        #[arg(long, default_value = "player")]
        name: String,
    },

    /// Let two AIs play each other and print the tally
    SelfPlay {
        /// Number of games
        #[arg(short, long, default_value_t = 100)]
        games: u32,

        /// Difficulty of X
        #[arg(long, default_value = "hard")]
        white: Difficulty,

        /// Difficulty of O
        #[arg(long, default_value = "hard")]
        black: Difficulty,
    },
}
