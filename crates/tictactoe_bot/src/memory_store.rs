//! In-memory [`GameStore`] backed by shared maps.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tictactoe_core::{
    GameSession, GameStore, LeaderboardEntry, PlayerId, PlayerResult, PlayerStats, SessionId,
    StatUpdate, StoreError, StoreErrorKind,
};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct StoreState {
    sessions: HashMap<SessionId, GameSession>,
    invites: HashMap<String, SessionId>,
    stats: HashMap<PlayerId, PlayerStats>,
}

/// Thread-safe in-memory store.
///
/// Clones share the same maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory store");
        Self::default()
    }

    #[track_caller]
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::new(StoreErrorKind::Backend, format!("Lock poisoned: {}", e)))
    }
}

#[async_trait::async_trait]
impl GameStore for InMemoryStore {
    #[instrument(skip(self))]
    async fn load(&self, id: &str) -> Result<Option<GameSession>, StoreError> {
        let session = self.lock()?.sessions.get(id).cloned();
        debug!(found = session.is_some(), "Loaded session");
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn find_by_invite(&self, code: &str) -> Result<Option<GameSession>, StoreError> {
        let state = self.lock()?;
        let session = state
            .invites
            .get(&code.trim().to_ascii_uppercase())
            .and_then(|id| state.sessions.get(id))
            .cloned();
        debug!(found = session.is_some(), "Looked up invite code");
        Ok(session)
    }

    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    async fn insert(&self, session: &GameSession) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if state.sessions.contains_key(session.id()) {
            warn!("Session ID already taken");
            return Err(StoreError::conflict(format!(
                "Session '{}' already exists",
                session.id()
            )));
        }

        if let Some(code) = session.invite_code() {
            if state.invites.contains_key(code) {
                warn!(invite_code = code, "Invite code already taken");
                return Err(StoreError::conflict(format!(
                    "Invite code '{}' already exists",
                    code
                )));
            }
            state.invites.insert(code.to_string(), session.id().to_string());
        }
        state
            .sessions
            .insert(session.id().to_string(), session.clone());
        info!(version = session.version(), "Session inserted");
        Ok(())
    }

    #[instrument(
        skip(self, session, updates),
        fields(session_id = %session.id(), version = session.version(), updates = updates.len())
    )]
    async fn save(
        &self,
        session: &GameSession,
        expected_version: u64,
        updates: &[StatUpdate],
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let stored = state.sessions.get_mut(session.id()).ok_or_else(|| {
            StoreError::new(
                StoreErrorKind::NotFound,
                format!("Session '{}' not found", session.id()),
            )
        })?;

        if stored.version() != expected_version {
            warn!(
                stored_version = stored.version(),
                expected_version, "Stale session write rejected"
            );
            return Err(StoreError::conflict(format!(
                "Session '{}' is at version {}, expected {}",
                session.id(),
                stored.version(),
                expected_version
            )));
        }

        *stored = session.clone();
        for update in updates {
            state
                .stats
                .entry(update.player().clone())
                .or_default()
                .record(*update.result());
        }
        debug!("Session saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_result(&self, player: &str, result: PlayerResult) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let stats = state.stats.entry(player.to_string()).or_default();
        stats.record(result);
        info!(total = stats.total(), "Result recorded");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stats(&self, player: &str) -> Result<PlayerStats, StoreError> {
        Ok(self
            .lock()?
            .stats
            .get(player)
            .copied()
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let state = self.lock()?;
        let mut rows: Vec<(&PlayerId, &PlayerStats)> = state.stats.iter().collect();
        rows.sort_by(|(a_id, a), (b_id, b)| b.wins().cmp(a.wins()).then_with(|| a_id.cmp(b_id)));

        let entries = rows
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, (player, stats))| LeaderboardEntry::new(i + 1, player.clone(), *stats))
            .collect();
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictactoe_core::{Difficulty, GameEngine, Mark, Position, Transition};

    fn move_for(engine: &mut GameEngine, session: GameSession, position: Position) -> GameSession {
        match engine.apply_move(session, "ann", position, Mark::X).unwrap() {
            Transition::Applied(applied) => applied.into_session(),
            Transition::Rejected { reason, .. } => panic!("move rejected: {reason}"),
        }
    }

    #[tokio::test]
    async fn test_save_rejects_stale_version() {
        let store = InMemoryStore::new();
        let mut engine = GameEngine::from_seed(1);
        let session = engine.create_ai_game("g1".into(), "ann".into(), Difficulty::Easy);
        store.insert(&session).await.unwrap();

        let Transition::Applied(applied) = engine
            .apply_move(session.clone(), "ann", Position::Center, Mark::X)
            .unwrap()
        else {
            panic!("move rejected");
        };
        store
            .save(applied.session(), *applied.previous_version(), &[])
            .await
            .unwrap();

        let err = store.save(applied.session(), 0, &[]).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.load("g1").await.unwrap().unwrap().version(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let store = InMemoryStore::new();
        let engine = GameEngine::from_seed(1);
        let session = engine.create_ai_game("g1".into(), "ann".into(), Difficulty::Easy);
        store.insert(&session).await.unwrap();
        assert!(store.insert(&session).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_leaderboard_orders_by_wins() {
        let store = InMemoryStore::new();
        store.record_result("bob", PlayerResult::Win).await.unwrap();
        store.record_result("ann", PlayerResult::Win).await.unwrap();
        store.record_result("ann", PlayerResult::Win).await.unwrap();
        store.record_result("cid", PlayerResult::Loss).await.unwrap();

        let board = store.leaderboard(2).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].player(), "ann");
        assert_eq!(*board[0].rank(), 1);
        assert_eq!(board[1].player(), "bob");

        assert_eq!(store.stats("nobody").await.unwrap(), PlayerStats::default());
    }

    #[tokio::test]
    async fn test_stale_save_leaves_counters_untouched() {
        let store = InMemoryStore::new();
        let mut engine = GameEngine::from_seed(1);
        let session = engine.create_ai_game("g1".into(), "ann".into(), Difficulty::Easy);
        store.insert(&session).await.unwrap();
        let next = move_for(&mut engine, session, Position::Center);

        let updates = [StatUpdate::new("ann".into(), PlayerResult::Win)];
        assert!(store.save(&next, 7, &updates).await.unwrap_err().is_conflict());
        assert_eq!(store.stats("ann").await.unwrap(), PlayerStats::default());

        store.save(&next, 0, &updates).await.unwrap();
        assert_eq!(store.stats("ann").await.unwrap(), PlayerStats::new(1, 0, 0));
        assert_eq!(store.load("g1").await.unwrap().unwrap(), next);
    }

    #[tokio::test]
    async fn test_invite_codes_are_unique_and_case_insensitive() {
        let store = InMemoryStore::new();
        let mut first = GameEngine::from_seed(5);
        let mut second = GameEngine::from_seed(5);

        let session = first.create_invite_game("g1".into(), "ann".into());
        let clash = second.create_invite_game("g2".into(), "bob".into());
        assert_eq!(session.invite_code(), clash.invite_code());

        store.insert(&session).await.unwrap();
        assert!(store.insert(&clash).await.unwrap_err().is_conflict());
        assert!(store.load("g2").await.unwrap().is_none());

        let code = session.invite_code().unwrap().to_ascii_lowercase();
        let found = store.find_by_invite(&code).await.unwrap().unwrap();
        assert_eq!(found.id(), "g1");
    }
}
