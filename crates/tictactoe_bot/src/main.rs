//! TicTacToe Bot - terminal front end
//!
//! Plays the chat flow locally: the terminal user is a chat player and
//! messages addressed to them are printed.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tictactoe_bot::{BotConfig, ConsoleNotifier, GameService, InMemoryStore};
use tictactoe_core::{Difficulty, GameStatus, MovePolicy, Position, Transition, self_play};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = BotConfig::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Play { difficulty, name } => run_play(&config, difficulty, name).await,
        Command::SelfPlay {
            games,
            white,
            black,
        } => run_self_play(&config, games, white, black),
    }
}

/// Interactive game against the AI.
#[instrument(skip(config))]
async fn run_play(config: &BotConfig, difficulty: Difficulty, name: String) -> Result<()> {
    info!("Starting terminal game");
    let service = GameService::from_config(
        config,
        InMemoryStore::new(),
        ConsoleNotifier::new(name.clone()),
    );

    println!("Enter a cell as 1-9 or 'row col'. Commands: new, quit, /stats, /leaderboard");
    let mut session_id = service.start_ai_game(&name, difficulty).await?.id().to_string();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "quit" | "q" => break,
            "new" => {
                session_id = service.start_ai_game(&name, difficulty).await?.id().to_string();
                continue;
            }
            _ => {}
        }

        if input.starts_with('/') {
            if let Err(e) = service.handle_input(&name, input).await {
                println!("{e}");
            }
            continue;
        }

        let Some(position) = Position::parse_input(input) else {
            println!("Not a cell: {input}");
            continue;
        };

        match service.play_move(&name, &session_id, position).await? {
            Transition::Applied(applied) => {
                if applied.session().status() == GameStatus::Finished {
                    println!("Type 'new' to play again or 'quit' to leave.");
                }
            }
            Transition::Rejected { reason, .. } => println!("{reason}"),
        }
    }

    let stats = service.stats(&name).await?;
    println!(
        "Wins: {}, losses: {}, draws: {}",
        stats.wins(),
        stats.losses(),
        stats.draws()
    );
    Ok(())
}

/// AI against AI statistics.
#[instrument(skip(config))]
fn run_self_play(config: &BotConfig, games: u32, white: Difficulty, black: Difficulty) -> Result<()> {
    let mut rng = match config.rng_seed() {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_os_rng(),
    };
    let policy = MovePolicy::new(*config.medium_optimal_rate());

    let summary = self_play(&policy, white, black, games, &mut rng)?;
    info!(?summary, "Self-play finished");

    println!("{games} games, X = {white}, O = {black}");
    println!(
        "X wins: {}, O wins: {}, draws: {}",
        summary.x_wins(),
        summary.o_wins(),
        summary.draws()
    );
    Ok(())
}
