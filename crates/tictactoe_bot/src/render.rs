//! Turns sessions and statistics into chat messages.

use crate::command::{ChatCommand, MAIN_MENU};
use tictactoe_core::{
    Button, Cell, Difficulty, GameMode, GameSession, GameStatus, LeaderboardEntry, Mark, Outcome,
    PlayerStats, Position, Rendered, SessionView,
};
use tracing::instrument;

const EMPTY_CELL: &str = "⬜";

/// Plain-text renderer with inline keyboards.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    bot_name: String,
}

impl TextRenderer {
    /// Creates a renderer that greets players as `bot_name`.
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
        }
    }

    /// Greeting plus the main menu.
    pub fn menu(&self, player: &str) -> Rendered {
        let text = format!(
            "Welcome to {}!\n\nHi, {player}! Choose a game mode:",
            self.bot_name
        );
        let keyboard = vec![
            vec![
                button("Play AI (Easy)", ChatCommand::PlayAi(Difficulty::Easy)),
                button("Play AI (Medium)", ChatCommand::PlayAi(Difficulty::Medium)),
            ],
            vec![
                button("Play AI (Hard)", ChatCommand::PlayAi(Difficulty::Hard)),
                button("Play a friend", ChatCommand::PlayMultiplayer),
            ],
            vec![
                button("Statistics", ChatCommand::Stats),
                button("Leaderboard", ChatCommand::Leaderboard),
            ],
        ];
        Rendered::new(text, keyboard)
    }

    /// How to play against a friend.
    pub fn multiplayer_help(&self) -> Rendered {
        with_menu_button(
            "Play a friend\n\n\
             /invite - create an invitation\n\
             /accept CODE - accept an invitation",
        )
    }

    /// Freshly created invitation.
    pub fn invite(&self, session: &GameSession) -> Rendered {
        let code = session.invite_code().unwrap_or_default();
        with_menu_button(format!(
            "Invitation created!\n\nInvite code: {code}\n\n\
             Send it to a friend so they can join with:\n/accept {code}"
        ))
    }

    /// A player's counters.
    pub fn stats(&self, stats: &PlayerStats) -> Rendered {
        with_menu_button(format!(
            "Your statistics:\n\nWins: {}\nLosses: {}\nDraws: {}\nGames played: {}",
            stats.wins(),
            stats.losses(),
            stats.draws(),
            stats.total()
        ))
    }

    /// Top players.
    pub fn leaderboard(&self, entries: &[LeaderboardEntry]) -> Rendered {
        let mut text = String::from("Leaderboard:\n\n");
        if entries.is_empty() {
            text.push_str("No games recorded yet");
        }
        for entry in entries {
            text.push_str(&format!(
                "{}. {}\n   {} wins ({}%)\n\n",
                entry.rank(),
                entry.player(),
                entry.stats().wins(),
                entry.win_rate_percent()
            ));
        }
        with_menu_button(text.trim_end())
    }

    /// Short message with only the menu button.
    pub fn notice(&self, text: impl Into<String>) -> Rendered {
        with_menu_button(text)
    }

    /// A session as seen by `recipient`.
    ///
    /// Active games get the 3x3 board keyboard; waiting and finished games
    /// only get the menu button.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub fn session(&self, session: &GameSession, recipient: &str) -> Rendered {
        let view = session.view();
        let text = format!(
            "{}\n\n{}\n\n{}",
            headline(session),
            status_line(session, recipient),
            session.board()
        );

        let mut keyboard = match view.status() {
            GameStatus::Active => board_keyboard(&view),
            GameStatus::Waiting | GameStatus::Finished => Vec::new(),
        };
        keyboard.push(vec![menu_button()]);
        Rendered::new(text, keyboard)
    }
}

fn headline(session: &GameSession) -> String {
    match session.mode() {
        GameMode::AiEasy => "Game vs AI (easy)".to_string(),
        GameMode::AiMedium => "Game vs AI (medium)".to_string(),
        GameMode::AiHard => "Game vs AI (hard)".to_string(),
        GameMode::Multiplayer => match session.player_o() {
            Some(o) => format!("{} (X) vs {o} (O)", session.player_x()),
            None => format!("{} (X) vs ?", session.player_x()),
        },
    }
}

fn status_line(session: &GameSession, recipient: &str) -> String {
    let own = session.mark_of(recipient);

    match (session.status(), session.outcome()) {
        (GameStatus::Waiting, _) => format!(
            "Waiting for an opponent. Invite code: {}",
            session.invite_code().unwrap_or_default()
        ),
        (GameStatus::Active, _) => {
            let turn = session.current_turn();
            if own == Some(turn) {
                format!("You play {turn}, your move!")
            } else {
                format!("Waiting for {turn} to move")
            }
        }
        (GameStatus::Finished, Some(Outcome::Draw)) => "Draw! Game over.".to_string(),
        (GameStatus::Finished, Some(Outcome::Winner(mark))) => match own {
            Some(m) if m == mark => "Congratulations! You won!".to_string(),
            Some(_) if session.mode().is_ai() => "The AI won! Try again.".to_string(),
            _ => format!("Game over! {mark} won."),
        },
        (GameStatus::Finished, None) => "Game over.".to_string(),
    }
}

/// 3x3 grid of cells, each carrying its move callback.
fn board_keyboard(view: &SessionView) -> Vec<Vec<Button>> {
    view.cells()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(|(col, cell)| {
                    let position = Position::from_row_col(row, col)?;
                    let label = match cell {
                        Cell::Empty => EMPTY_CELL.to_string(),
                        Cell::Occupied(Mark::X) => "X".to_string(),
                        Cell::Occupied(Mark::O) => "O".to_string(),
                    };
                    Some(Button::new(
                        label,
                        ChatCommand::move_callback(view.id(), position),
                    ))
                })
                .collect()
        })
        .collect()
}

fn button(label: &str, command: ChatCommand) -> Button {
    Button::new(label.to_string(), command.callback().unwrap_or_default())
}

fn menu_button() -> Button {
    Button::new("Main menu".to_string(), MAIN_MENU.to_string())
}

fn with_menu_button(text: impl Into<String>) -> Rendered {
    Rendered::new(text.into(), vec![vec![menu_button()]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictactoe_core::{GameEngine, Transition};

    #[test]
    fn test_active_board_has_move_callbacks() {
        let engine = GameEngine::from_seed(1);
        let session = engine.create_ai_game("g1".into(), "ann".into(), Difficulty::Hard);
        let rendered = TextRenderer::new("Bot").session(&session, "ann");

        assert_eq!(rendered.keyboard().len(), 4);
        assert!(rendered.keyboard()[..3].iter().all(|row| row.len() == 3));
        assert_eq!(rendered.keyboard()[2][1].callback(), "move_g1_2_1");
        assert_eq!(rendered.keyboard()[3][0].callback(), MAIN_MENU);
        assert!(rendered.text().contains("your move"));
    }

    #[test]
    fn test_finished_board_only_offers_menu() {
        let mut engine = GameEngine::from_seed(1);
        let session = engine.create_invite_game("p".into(), "ann".into());
        let mut session = engine.accept_invite(session, "bob".into()).unwrap();
        let moves = [
            ("ann", Mark::X, Position::TopLeft),
            ("bob", Mark::O, Position::MiddleLeft),
            ("ann", Mark::X, Position::TopCenter),
            ("bob", Mark::O, Position::Center),
            ("ann", Mark::X, Position::TopRight),
        ];
        for (actor, mark, pos) in moves {
            session = match engine.apply_move(session, actor, pos, mark).unwrap() {
                Transition::Applied(applied) => applied.into_session(),
                Transition::Rejected { reason, .. } => panic!("{reason}"),
            };
        }

        let renderer = TextRenderer::new("Bot");
        let winner = renderer.session(&session, "ann");
        let loser = renderer.session(&session, "bob");
        assert_eq!(winner.keyboard().len(), 1);
        assert!(winner.text().contains("You won"));
        assert!(loser.text().contains("X won"));
    }

    #[test]
    fn test_leaderboard_lists_rounded_rates() {
        let entries = vec![
            LeaderboardEntry::new(1, "ann".into(), PlayerStats::new(2, 1, 0)),
            LeaderboardEntry::new(2, "bob".into(), PlayerStats::new(1, 0, 1)),
        ];
        let rendered = TextRenderer::new("Bot").leaderboard(&entries);
        assert!(rendered.text().contains("1. ann\n   2 wins (67%)"));
        assert!(rendered.text().contains("2. bob\n   1 wins (50%)"));
    }

    #[test]
    fn test_menu_buttons_parse_as_commands() {
        let rendered = TextRenderer::new("Bot").menu("ann");
        for data in rendered.callbacks() {
            assert!(data.parse::<ChatCommand>().is_ok(), "{data}");
        }
    }
}
