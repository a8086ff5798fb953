//! The game state machine.
//!
//! ```text
//! waiting ──accept_invite──▶ active ──apply_move (terminal)──▶ finished
//!                              ▲  │
//!                              └──┘ apply_move (game continues)
//! ```
//!
//! The engine never touches storage or delivery. It takes a session value,
//! returns the next one, and leaves persistence to the caller.

use crate::invariants::{InvariantSet, SessionInvariants};
use crate::rules::{is_full, winner};
use crate::{
    Difficulty, EngineError, GameMode, GameSession, GameStatus, InviteRejection, Mark, MoveRecord,
    MoveRejection, MovePolicy, Outcome, PlayerId, Position, SessionId,
};
use derive_getters::Getters;
use derive_new::new;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Default length of generated invite codes.
pub const DEFAULT_INVITE_CODE_LENGTH: usize = 6;

const INVITE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A finished game from one player's point of view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum PlayerResult {
    /// The player won.
    Win,
    /// The player lost.
    Loss,
    /// The game was drawn.
    Draw,
}

/// A statistic the store must increment for a human player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct StatUpdate {
    /// Player whose counters change.
    player: PlayerId,
    /// Counter to increment.
    result: PlayerResult,
}

/// A move that changed the session.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AppliedMove {
    /// Session after the move (and the AI reply, if any).
    session: GameSession,
    /// Plies applied by this call: the player's, then possibly the AI's.
    plies: Vec<MoveRecord>,
    /// Counters to increment if the game finished.
    stat_updates: Vec<StatUpdate>,
    /// Version the session had before this call.
    previous_version: u64,
}

impl AppliedMove {
    /// Consumes the report, returning the new session.
    pub fn into_session(self) -> GameSession {
        self.session
    }
}

/// Result of [`GameEngine::apply_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The move was legal and the session advanced.
    Applied(AppliedMove),
    /// The move was ignored; `session` is the unchanged input.
    Rejected {
        /// The untouched session.
        session: GameSession,
        /// Why the move was ignored.
        reason: MoveRejection,
    },
}

impl Transition {
    /// Session after the call.
    pub fn session(&self) -> &GameSession {
        match self {
            Transition::Applied(applied) => applied.session(),
            Transition::Rejected { session, .. } => session,
        }
    }

    /// Returns true if the move changed the session.
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }
}

/// Drives sessions through their lifecycle.
///
/// The engine owns the random source used by the easy and medium tiers and
/// for invite codes, so a seeded engine is fully deterministic.
#[derive(Debug, Clone)]
pub struct GameEngine<R = StdRng> {
    rng: R,
    policy: MovePolicy,
    invite_code_length: usize,
}

impl GameEngine<StdRng> {
    /// Creates an engine with a deterministic random source.
    #[instrument]
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Creates an engine seeded from the operating system.
    #[instrument]
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> GameEngine<R> {
    /// Creates an engine with the default policy.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            policy: MovePolicy::default(),
            invite_code_length: DEFAULT_INVITE_CODE_LENGTH,
        }
    }

    /// Replaces the move policy.
    pub fn with_policy(mut self, policy: MovePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the policy with one using the given medium-tier rate.
    pub fn with_optimal_rate(self, optimal_rate: f64) -> Self {
        self.with_policy(MovePolicy::new(optimal_rate))
    }

    /// Sets the invite code length (at least 1).
    pub fn with_invite_code_length(mut self, length: usize) -> Self {
        self.invite_code_length = length.max(1);
        self
    }

    /// The move policy in use.
    pub fn policy(&self) -> &MovePolicy {
        &self.policy
    }

    /// Generates a fresh session identifier.
    pub fn new_session_id(&mut self) -> SessionId {
        format!("{:016x}", self.rng.random::<u64>())
    }

    /// Starts a game against the AI: active, empty board, X to move.
    #[instrument(skip(self))]
    pub fn create_ai_game(
        &self,
        id: SessionId,
        player: PlayerId,
        difficulty: Difficulty,
    ) -> GameSession {
        info!(session_id = %id, player = %player, difficulty = %difficulty, "Creating AI game");
        GameSession::new(id, difficulty.into(), GameStatus::Active, player, None)
    }

    /// Opens a peer game waiting for a second player.
    #[instrument(skip(self))]
    pub fn create_invite_game(&mut self, id: SessionId, player: PlayerId) -> GameSession {
        let code = self.invite_code();
        info!(session_id = %id, player = %player, invite_code = %code, "Creating invite game");
        GameSession::new(id, GameMode::Multiplayer, GameStatus::Waiting, player, Some(code))
    }

    /// Binds the second player and activates the game with X to move.
    ///
    /// # Errors
    ///
    /// Returns [`InviteRejection`] if the game is not waiting or the inviter
    /// tries to join their own game.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub fn accept_invite(
        &self,
        session: GameSession,
        player: PlayerId,
    ) -> Result<GameSession, InviteRejection> {
        if session.status() != GameStatus::Waiting {
            warn!(status = %session.status(), "Invite no longer open");
            return Err(InviteRejection::NotWaiting);
        }
        if session.player_x() == player {
            warn!(player = %player, "Inviter tried to accept own invite");
            return Err(InviteRejection::OwnInvite);
        }

        let mut session = session;
        session.join(player);
        session.bump_version();
        info!(player_o = ?session.player_o(), "Invite accepted");
        Ok(session)
    }

    /// Applies one ply for `actor` and, in AI games, the AI's reply.
    ///
    /// Illegal moves are not errors: they come back as
    /// [`Transition::Rejected`] carrying the unchanged session.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] only if the session was already inconsistent,
    /// e.g. the AI is asked to move on a full board.
    #[instrument(skip(self, session), fields(session_id = %session.id(), version = session.version()))]
    pub fn apply_move(
        &mut self,
        session: GameSession,
        actor: &str,
        position: Position,
        mark: Mark,
    ) -> Result<Transition, EngineError> {
        if let Err(reason) = validate(&session, actor, position, mark) {
            debug!(reason = %reason, "Move ignored");
            return Ok(Transition::Rejected { session, reason });
        }

        let previous_version = session.version();
        let mut session = session;
        let mut stat_updates = Vec::new();

        let mut plies = vec![session.place(position, mark, Some(actor.to_string()))];
        let mut finished = settle(&mut session, &mut stat_updates);

        if !finished
            && session.current_turn() == Mark::O
            && let Some(difficulty) = session.mode().difficulty()
        {
            let reply = self
                .policy
                .choose_move(session.board(), difficulty, &mut self.rng)?;
            plies.push(session.place(reply, Mark::O, None));
            finished = settle(&mut session, &mut stat_updates);
        }

        session.bump_version();
        check_invariants(&session)?;

        info!(
            plies = plies.len(),
            finished,
            status = %session.status(),
            outcome = ?session.outcome(),
            "Move applied"
        );

        Ok(Transition::Applied(AppliedMove {
            session,
            plies,
            stat_updates,
            previous_version,
        }))
    }

    fn invite_code(&mut self) -> String {
        (0..self.invite_code_length)
            .map(|_| {
                let idx = self.rng.random_range(0..INVITE_ALPHABET.len());
                INVITE_ALPHABET[idx] as char
            })
            .collect()
    }
}

/// Checks a proposed move against the session without changing it.
fn validate(
    session: &GameSession,
    actor: &str,
    position: Position,
    mark: Mark,
) -> Result<(), MoveRejection> {
    if session.status() != GameStatus::Active {
        return Err(MoveRejection::GameNotActive);
    }

    if mark != session.current_turn() {
        return Err(MoveRejection::WrongTurn {
            expected: session.current_turn(),
            got: mark,
        });
    }

    match session.mark_of(actor) {
        None => return Err(MoveRejection::NotAParticipant),
        Some(owned) if owned != mark => return Err(MoveRejection::NotYourMark(mark)),
        Some(_) => {}
    }

    if !session.board().is_empty(position) {
        return Err(MoveRejection::CellOccupied(position));
    }

    Ok(())
}

/// Finishes the game if the last ply ended it, otherwise passes the turn.
///
/// Returns true if the game is now finished.
fn settle(session: &mut GameSession, stat_updates: &mut Vec<StatUpdate>) -> bool {
    if let Some(mark) = winner(session.board()) {
        session.finish(Outcome::Winner(mark));
        if let Some(player) = session.owner_of(mark) {
            stat_updates.push(StatUpdate::new(player.to_string(), PlayerResult::Win));
        }
        if let Some(player) = session.owner_of(mark.opponent()) {
            stat_updates.push(StatUpdate::new(player.to_string(), PlayerResult::Loss));
        }
        return true;
    }

    if is_full(session.board()) {
        session.finish(Outcome::Draw);
        for player in session.participants() {
            stat_updates.push(StatUpdate::new(player.to_string(), PlayerResult::Draw));
        }
        return true;
    }

    session.pass_turn();
    false
}

fn check_invariants(session: &GameSession) -> Result<(), EngineError> {
    if !cfg!(debug_assertions) {
        return Ok(());
    }

    SessionInvariants::check_all(session).map_err(|violations| {
        let description = violations
            .into_iter()
            .map(|v| v.description)
            .collect::<Vec<_>>()
            .join("; ");
        EngineError::InvariantViolation(description)
    })
}
