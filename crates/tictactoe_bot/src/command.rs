//! Inbound chat commands and button callbacks.

use derive_more::Display;
use std::str::FromStr;
use tictactoe_core::{Difficulty, Position, SessionId};
use tracing::instrument;

/// Callback data of the main-menu button.
pub const MAIN_MENU: &str = "main_menu";

const MOVE_PREFIX: &str = "move_";
const PLAY_AI_PREFIX: &str = "play_";

/// Something a player asked the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `/start`: greeting and main menu.
    Start,
    /// `/menu` or the menu button.
    Menu,
    /// `/stats` or the stats button.
    Stats,
    /// `/leaderboard` or the leaderboard button.
    Leaderboard,
    /// `/invite`: open a peer game.
    Invite,
    /// `/accept CODE`: join a peer game.
    Accept(String),
    /// `play_ai_*` button: start a game against the AI.
    PlayAi(Difficulty),
    /// `play_multiplayer` button: explain invites.
    PlayMultiplayer,
    /// `move_<id>_<row>_<col>` button.
    Move {
        /// Target session.
        session_id: SessionId,
        /// Tapped cell.
        position: Position,
    },
}

impl ChatCommand {
    /// Callback data for a board cell.
    pub fn move_callback(session_id: &str, position: Position) -> String {
        format!(
            "{MOVE_PREFIX}{session_id}_{}_{}",
            position.row(),
            position.col()
        )
    }

    /// Callback data for this command, if it has a button form.
    pub fn callback(&self) -> Option<String> {
        match self {
            ChatCommand::Menu => Some(MAIN_MENU.to_string()),
            ChatCommand::Stats => Some("stats".to_string()),
            ChatCommand::Leaderboard => Some("leaderboard".to_string()),
            ChatCommand::PlayAi(difficulty) => Some(format!("{PLAY_AI_PREFIX}{difficulty}")),
            ChatCommand::PlayMultiplayer => Some("play_multiplayer".to_string()),
            ChatCommand::Move {
                session_id,
                position,
            } => Some(Self::move_callback(session_id, *position)),
            ChatCommand::Start | ChatCommand::Invite | ChatCommand::Accept(_) => None,
        }
    }

    /// Parses a slash command typed in chat.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for unknown commands or a missing invite code.
    #[instrument]
    pub fn parse_text(text: &str) -> Result<Self, CommandError> {
        let mut words = text.split_whitespace();
        let head = words.next().unwrap_or_default();

        match head {
            "/start" => Ok(ChatCommand::Start),
            "/menu" => Ok(ChatCommand::Menu),
            "/stats" => Ok(ChatCommand::Stats),
            "/leaderboard" => Ok(ChatCommand::Leaderboard),
            "/invite" => Ok(ChatCommand::Invite),
            "/accept" => words
                .next()
                .map(|code| ChatCommand::Accept(code.to_uppercase()))
                .ok_or(CommandError::MissingInviteCode),
            _ => Err(CommandError::Unknown(text.trim().to_string())),
        }
    }

    /// Parses button callback data.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for unknown data or a malformed move.
    #[instrument]
    pub fn parse_callback(data: &str) -> Result<Self, CommandError> {
        match data {
            MAIN_MENU => return Ok(ChatCommand::Menu),
            "stats" => return Ok(ChatCommand::Stats),
            "leaderboard" => return Ok(ChatCommand::Leaderboard),
            "play_multiplayer" => return Ok(ChatCommand::PlayMultiplayer),
            _ => {}
        }

        if let Some(rest) = data.strip_prefix(MOVE_PREFIX) {
            return parse_move(rest).ok_or_else(|| CommandError::BadMove(data.to_string()));
        }

        if let Some(mode) = data.strip_prefix(PLAY_AI_PREFIX)
            && let Ok(difficulty) = Difficulty::from_str(mode)
        {
            return Ok(ChatCommand::PlayAi(difficulty));
        }

        Err(CommandError::Unknown(data.to_string()))
    }
}

impl FromStr for ChatCommand {
    type Err = CommandError;

    /// Text starting with `/` is a chat command, anything else callback data.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('/') {
            Self::parse_text(s)
        } else {
            Self::parse_callback(s)
        }
    }
}

/// `<id>_<row>_<col>`; the ID may itself contain underscores.
fn parse_move(rest: &str) -> Option<ChatCommand> {
    let mut parts = rest.rsplitn(3, '_');
    let col = parts.next()?.parse().ok()?;
    let row = parts.next()?.parse().ok()?;
    let session_id = parts.next().filter(|id| !id.is_empty())?;

    Some(ChatCommand::Move {
        session_id: session_id.to_string(),
        position: Position::from_row_col(row, col)?,
    })
}

/// Input the bot does not understand.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CommandError {
    /// Not a known command or callback.
    #[display("Unknown command: {}", _0)]
    Unknown(String),

    /// `/accept` without a code.
    #[display("Usage: /accept CODE")]
    MissingInviteCode,

    /// `move_` data that does not name a cell.
    #[display("Malformed move: {}", _0)]
    BadMove(String),
}

impl std::error::Error for CommandError {}
