//! Game sessions: the persisted unit the engine transitions.

use crate::rules::legal_moves;
use crate::{Board, Cell, Difficulty, Mark, Position};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Unique identifier for a player.
pub type PlayerId = String;

/// Who plays against whom.
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameMode {
    /// Human X against a random AI.
    AiEasy,
    /// Human X against a mostly optimal AI.
    AiMedium,
    /// Human X against an optimal AI.
    AiHard,
    /// Two humans.
    Multiplayer,
}

impl GameMode {
    /// AI difficulty, or `None` for peer games.
    pub fn difficulty(self) -> Option<Difficulty> {
        match self {
            GameMode::AiEasy => Some(Difficulty::Easy),
            GameMode::AiMedium => Some(Difficulty::Medium),
            GameMode::AiHard => Some(Difficulty::Hard),
            GameMode::Multiplayer => None,
        }
    }

    /// Returns true if O is played by the AI.
    pub fn is_ai(self) -> bool {
        self.difficulty().is_some()
    }
}

impl From<Difficulty> for GameMode {
    fn from(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => GameMode::AiEasy,
            Difficulty::Medium => GameMode::AiMedium,
            Difficulty::Hard => GameMode::AiHard,
        }
    }
}

/// Lifecycle of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Peer game created, second player not joined yet.
    Waiting,
    /// A board is in progress.
    Active,
    /// Terminal; the session no longer changes.
    Finished,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Three in a row for this mark.
    Winner(Mark),
    /// Full board, no line.
    Draw,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(mark) => write!(f, "{mark}"),
            Outcome::Draw => f.write_str("draw"),
        }
    }
}

/// Audit record of one applied ply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct MoveRecord {
    /// 1-based ply number within the game.
    number: u32,
    /// Cell that was marked.
    position: Position,
    /// Mark that was placed.
    mark: Mark,
    /// Acting player, `None` for the AI.
    player: Option<PlayerId>,
    /// When the ply was applied.
    played_at: DateTime<Utc>,
}

impl MoveRecord {
    /// Creates a record stamped with the current time.
    pub fn new(number: u32, position: Position, mark: Mark, player: Option<PlayerId>) -> Self {
        Self {
            number,
            position,
            mark,
            player,
            played_at: Utc::now(),
        }
    }
}

/// A game session.
///
/// Sessions are values: the engine takes one, and hands back the next one.
/// `version` increases with every applied transition and lets a store reject
/// stale writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    id: SessionId,
    mode: GameMode,
    status: GameStatus,
    board: Board,
    current_turn: Mark,
    outcome: Option<Outcome>,
    player_x: PlayerId,
    player_o: Option<PlayerId>,
    invite_code: Option<String>,
    moves: Vec<MoveRecord>,
    version: u64,
    created_at: DateTime<Utc>,
}

impl GameSession {
    /// Creates a session with an empty board and X to move.
    pub(crate) fn new(
        id: SessionId,
        mode: GameMode,
        status: GameStatus,
        player_x: PlayerId,
        invite_code: Option<String>,
    ) -> Self {
        Self {
            id,
            mode,
            status,
            board: Board::new(),
            current_turn: Mark::X,
            outcome: None,
            player_x,
            player_o: None,
            invite_code,
            moves: Vec::new(),
            version: 0,
            created_at: Utc::now(),
        }
    }

    /// Session ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Game mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Lifecycle status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mark due to move. Only meaningful while active.
    pub fn current_turn(&self) -> Mark {
        self.current_turn
    }

    /// Mark due to move, or `None` unless the game is active.
    pub fn next_turn(&self) -> Option<Mark> {
        (self.status == GameStatus::Active).then_some(self.current_turn)
    }

    /// Outcome once finished.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Player holding X (the creator).
    pub fn player_x(&self) -> &str {
        &self.player_x
    }

    /// Player holding O, `None` in AI games or before an invite is accepted.
    pub fn player_o(&self) -> Option<&str> {
        self.player_o.as_deref()
    }

    /// Invite code for peer games.
    pub fn invite_code(&self) -> Option<&str> {
        self.invite_code.as_deref()
    }

    /// Applied plies, oldest first.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Optimistic-concurrency version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Player owning `mark`, if it is a human.
    pub fn owner_of(&self, mark: Mark) -> Option<&str> {
        match mark {
            Mark::X => Some(self.player_x.as_str()),
            Mark::O => self.player_o(),
        }
    }

    /// Mark owned by `player` in this session.
    pub fn mark_of(&self, player: &str) -> Option<Mark> {
        if self.player_x == player {
            Some(Mark::X)
        } else if self.player_o.as_deref() == Some(player) {
            Some(Mark::O)
        } else {
            None
        }
    }

    /// Human participants, X first.
    pub fn participants(&self) -> Vec<&str> {
        std::iter::once(self.player_x.as_str())
            .chain(self.player_o())
            .collect()
    }

    /// Structured snapshot for renderers.
    pub fn view(&self) -> SessionView {
        let selectable = if self.status == GameStatus::Active {
            legal_moves(&self.board)
        } else {
            Vec::new()
        };

        SessionView {
            id: self.id.clone(),
            mode: self.mode,
            status: self.status,
            cells: self.board.rows(),
            outcome: self.outcome,
            next_turn: self.next_turn(),
            selectable,
        }
    }

    pub(crate) fn place(&mut self, position: Position, mark: Mark, player: Option<PlayerId>) -> MoveRecord {
        self.board.set(position, Cell::Occupied(mark));
        let record = MoveRecord::new(self.moves.len() as u32 + 1, position, mark, player);
        self.moves.push(record.clone());
        record
    }

    pub(crate) fn pass_turn(&mut self) {
        self.current_turn = self.current_turn.opponent();
    }

    pub(crate) fn finish(&mut self, outcome: Outcome) {
        self.status = GameStatus::Finished;
        self.outcome = Some(outcome);
    }

    pub(crate) fn join(&mut self, player: PlayerId) {
        self.player_o = Some(player);
        self.status = GameStatus::Active;
        self.current_turn = Mark::X;
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }
}

/// Everything a renderer needs to draw a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SessionView {
    /// Session ID.
    id: SessionId,
    /// Game mode.
    mode: GameMode,
    /// Lifecycle status.
    status: GameStatus,
    /// Cells by row.
    cells: [[Cell; 3]; 3],
    /// Outcome once finished.
    outcome: Option<Outcome>,
    /// Mark due to move while active.
    next_turn: Option<Mark>,
    /// Empty cells a player may pick; empty unless active.
    selectable: Vec<Position>,
}
