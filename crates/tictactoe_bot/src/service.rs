//! Orchestrates the engine, the store and the notifier for chat players.

use crate::command::{ChatCommand, CommandError};
use crate::config::BotConfig;
use crate::render::TextRenderer;
use derive_more::Display;
use tictactoe_core::{
    Difficulty, EngineError, GameEngine, GameSession, GameStore, InviteRejection, LeaderboardEntry,
    MovePolicy, Notifier, PlayerStats, Position, Rendered, StoreError, Transition,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Fresh codes drawn before giving up on a crowded invite space.
const INVITE_ATTEMPTS: u32 = 5;

/// Failures surfaced to the caller of [`GameService`].
#[derive(Debug, Display)]
pub enum ServiceError {
    /// The store failed, including version conflicts.
    #[display("{}", _0)]
    Store(StoreError),

    /// The engine reached an impossible state.
    #[display("{}", _0)]
    Engine(EngineError),

    /// The invitation could not be accepted.
    #[display("{}", _0)]
    Invite(InviteRejection),

    /// The input was not understood.
    #[display("{}", _0)]
    Command(CommandError),

    /// No session with this ID.
    #[display("Game '{}' not found", _0)]
    SessionNotFound(String),

    /// No session with this invite code.
    #[display("Invitation '{}' not found", _0)]
    InviteNotFound(String),
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<EngineError> for ServiceError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}

impl From<InviteRejection> for ServiceError {
    fn from(err: InviteRejection) -> Self {
        Self::Invite(err)
    }
}

impl From<CommandError> for ServiceError {
    fn from(err: CommandError) -> Self {
        Self::Command(err)
    }
}

impl ServiceError {
    /// Returns true if a concurrent update won the race for the session.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Store(err) if err.is_conflict())
    }
}

/// Chat-facing game service.
///
/// Each operation loads a session, runs one engine transition, then persists
/// the session and its stat updates in one versioned save before notifying
/// the players involved. A failed save discards the transition, leaves every
/// counter untouched and notifies nobody.
pub struct GameService<S, N> {
    store: S,
    notifier: N,
    engine: Mutex<GameEngine>,
    renderer: TextRenderer,
    leaderboard_size: usize,
}

impl<S: GameStore, N: Notifier> GameService<S, N> {
    /// Creates a service from its parts.
    pub fn new(
        store: S,
        notifier: N,
        engine: GameEngine,
        renderer: TextRenderer,
        leaderboard_size: usize,
    ) -> Self {
        Self {
            store,
            notifier,
            engine: Mutex::new(engine),
            renderer,
            leaderboard_size,
        }
    }

    /// Creates a service configured by `config`.
    #[instrument(skip(store, notifier))]
    pub fn from_config(config: &BotConfig, store: S, notifier: N) -> Self {
        let engine = match config.rng_seed() {
            Some(seed) => GameEngine::from_seed(*seed),
            None => GameEngine::from_os_rng(),
        }
        .with_policy(MovePolicy::new(*config.medium_optimal_rate()))
        .with_invite_code_length(*config.invite_code_length());

        info!(bot_name = %config.bot_name(), "Game service ready");
        Self::new(
            store,
            notifier,
            engine,
            TextRenderer::new(config.bot_name().clone()),
            *config.leaderboard_size(),
        )
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The renderer used for replies.
    pub fn renderer(&self) -> &TextRenderer {
        &self.renderer
    }

    /// Parses chat text or callback data and handles it.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Command`] for unknown input, or whatever the
    /// command itself fails with.
    #[instrument(skip(self))]
    pub async fn handle_input(&self, player: &str, input: &str) -> Result<(), ServiceError> {
        let command: ChatCommand = input.parse()?;
        self.handle(player, command).await
    }

    /// Runs one command for `player` and delivers the reply.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] if the store or engine fails or the command
    /// names a missing game or invitation.
    #[instrument(skip(self))]
    pub async fn handle(&self, player: &str, command: ChatCommand) -> Result<(), ServiceError> {
        match command {
            ChatCommand::Start | ChatCommand::Menu => {
                self.notify(player, &self.renderer.menu(player)).await;
            }
            ChatCommand::Stats => {
                let stats = self.stats(player).await?;
                self.notify(player, &self.renderer.stats(&stats)).await;
            }
            ChatCommand::Leaderboard => {
                let entries = self.leaderboard().await?;
                self.notify(player, &self.renderer.leaderboard(&entries)).await;
            }
            ChatCommand::PlayMultiplayer => {
                self.notify(player, &self.renderer.multiplayer_help()).await;
            }
            ChatCommand::Invite => {
                self.create_invite(player).await?;
            }
            ChatCommand::Accept(code) => {
                if let Err(e) = self.accept_invite(player, &code).await {
                    if matches!(
                        e,
                        ServiceError::Invite(_) | ServiceError::InviteNotFound(_)
                    ) {
                        self.notify(player, &self.renderer.notice(e.to_string()))
                            .await;
                    }
                    return Err(e);
                }
            }
            ChatCommand::PlayAi(difficulty) => {
                self.start_ai_game(player, difficulty).await?;
            }
            ChatCommand::Move {
                session_id,
                position,
            } => {
                self.play_move(player, &session_id, position).await?;
            }
        }
        Ok(())
    }

    /// Starts a game against the AI and shows the empty board.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the session cannot be stored.
    #[instrument(skip(self))]
    pub async fn start_ai_game(
        &self,
        player: &str,
        difficulty: Difficulty,
    ) -> Result<GameSession, ServiceError> {
        let session = {
            let mut engine = self.engine.lock().await;
            let id = engine.new_session_id();
            engine.create_ai_game(id, player.to_string(), difficulty)
        };

        self.store.insert(&session).await?;
        self.notify(player, &self.renderer.session(&session, player))
            .await;
        Ok(session)
    }

    /// Opens a peer game and sends the inviter the code.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the session cannot be stored, or if
    /// every drawn invite code was already taken.
    #[instrument(skip(self))]
    pub async fn create_invite(&self, player: &str) -> Result<GameSession, ServiceError> {
        let mut attempt = 1;
        let session = loop {
            let session = {
                let mut engine = self.engine.lock().await;
                let id = engine.new_session_id();
                engine.create_invite_game(id, player.to_string())
            };

            let inserted = self.store.insert(&session).await;
            match inserted {
                Ok(()) => break session,
                Err(e) if e.is_conflict() && attempt < INVITE_ATTEMPTS => {
                    debug!(attempt, "Invite code or ID taken, drawing another");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        self.notify(player, &self.renderer.invite(&session)).await;
        Ok(session)
    }

    /// Joins the peer game carrying `code` and shows both players the board.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InviteNotFound`] for unknown codes,
    /// [`ServiceError::Invite`] if the invitation cannot be accepted and
    /// [`ServiceError::Store`] if saving fails.
    #[instrument(skip(self))]
    pub async fn accept_invite(&self, player: &str, code: &str) -> Result<GameSession, ServiceError> {
        let code = code.trim().to_ascii_uppercase();
        let session = self
            .store
            .find_by_invite(&code)
            .await?
            .ok_or_else(|| ServiceError::InviteNotFound(code.clone()))?;

        let expected_version = session.version();
        let session = {
            let engine = self.engine.lock().await;
            engine.accept_invite(session, player.to_string())?
        };

        self.store.save(&session, expected_version, &[]).await?;
        info!(session_id = %session.id(), "Peer game started");
        self.notify_participants(&session).await;
        Ok(session)
    }

    /// Plays `position` for `player` in session `session_id`.
    ///
    /// Rejected moves change nothing and notify nobody; the returned
    /// [`Transition`] says why.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SessionNotFound`] for unknown sessions,
    /// [`ServiceError::Store`] if saving fails (a version conflict included),
    /// and [`ServiceError::Engine`] if the session was inconsistent.
    #[instrument(skip(self))]
    pub async fn play_move(
        &self,
        player: &str,
        session_id: &str,
        position: Position,
    ) -> Result<Transition, ServiceError> {
        let session = self
            .store
            .load(session_id)
            .await?
            .ok_or_else(|| ServiceError::SessionNotFound(session_id.to_string()))?;

        let mark = session
            .mark_of(player)
            .unwrap_or_else(|| session.current_turn());

        let transition = {
            let mut engine = self.engine.lock().await;
            engine.apply_move(session, player, position, mark)?
        };

        let applied = match transition {
            Transition::Applied(applied) => applied,
            rejected @ Transition::Rejected { .. } => {
                debug!("Nothing to save");
                return Ok(rejected);
            }
        };

        self.store
            .save(
                applied.session(),
                *applied.previous_version(),
                applied.stat_updates(),
            )
            .await?;

        self.notify_participants(applied.session()).await;
        Ok(Transition::Applied(applied))
    }

    /// Counters for `player`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store fails.
    pub async fn stats(&self, player: &str) -> Result<PlayerStats, ServiceError> {
        Ok(self.store.stats(player).await?)
    }

    /// The configured number of top players.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store fails.
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        Ok(self.store.leaderboard(self.leaderboard_size).await?)
    }

    async fn notify_participants(&self, session: &GameSession) {
        for player in session.participants() {
            self.notify(player, &self.renderer.session(session, player))
                .await;
        }
    }

    /// Delivery failures are logged; the game state is already saved.
    async fn notify(&self, player: &str, message: &Rendered) {
        if let Err(e) = self.notifier.deliver(player, message).await {
            warn!(player, error = %e, "Notification failed");
        }
    }
}
