//! Persistence interface for sessions and player statistics.

use crate::{GameSession, PlayerId, PlayerResult, StatUpdate, StoreError};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Win/loss/draw counters for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct PlayerStats {
    wins: u32,
    losses: u32,
    draws: u32,
}

impl PlayerStats {
    /// Creates counters with the given values.
    pub fn new(wins: u32, losses: u32, draws: u32) -> Self {
        Self {
            wins,
            losses,
            draws,
        }
    }

    /// Games played.
    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.draws
    }

    /// Win rate as a percentage (0.0-100.0).
    #[instrument(skip(self))]
    pub fn win_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            (self.wins as f64 / self.total() as f64) * 100.0
        }
    }

    /// Increments the counter for `result`.
    pub fn record(&mut self, result: PlayerResult) {
        match result {
            PlayerResult::Win => self.wins += 1,
            PlayerResult::Loss => self.losses += 1,
            PlayerResult::Draw => self.draws += 1,
        }
    }
}

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct LeaderboardEntry {
    /// 1-based rank.
    rank: usize,
    /// Player.
    player: PlayerId,
    /// Player's counters.
    stats: PlayerStats,
}

impl LeaderboardEntry {
    /// Creates a leaderboard row.
    pub fn new(rank: usize, player: PlayerId, stats: PlayerStats) -> Self {
        Self {
            rank,
            player,
            stats,
        }
    }

    /// Win rate rounded to the nearest whole percent.
    pub fn win_rate_percent(&self) -> u32 {
        self.stats.win_rate().round() as u32
    }
}

/// Storage for sessions and statistics.
///
/// `save` is a compare-and-swap on [`GameSession::version`]: it succeeds only
/// if the stored session still has `expected_version`, and fails with a
/// conflict otherwise. The stat updates of a finishing move are committed by
/// the same `save`, so a game is never stored finished with its counters
/// missing. Counters are incremented inside the store, never by writing back
/// a previously read snapshot.
#[async_trait::async_trait]
pub trait GameStore: Send + Sync {
    /// Loads a session by ID.
    async fn load(&self, id: &str) -> Result<Option<GameSession>, StoreError>;

    /// Finds the session carrying an invite code.
    async fn find_by_invite(&self, code: &str) -> Result<Option<GameSession>, StoreError>;

    /// Stores a new session. Fails if the ID is taken.
    async fn insert(&self, session: &GameSession) -> Result<(), StoreError>;

    /// Replaces a stored session if its version still equals `expected_version`
    /// and applies `updates` in the same commit.
    ///
    /// On error neither the session nor any counter changes.
    async fn save(
        &self,
        session: &GameSession,
        expected_version: u64,
        updates: &[StatUpdate],
    ) -> Result<(), StoreError>;

    /// Atomically increments one counter for `player`.
    async fn record_result(&self, player: &str, result: PlayerResult) -> Result<(), StoreError>;

    /// Counters for `player`; zeros if they never finished a game.
    async fn stats(&self, player: &str) -> Result<PlayerStats, StoreError>;

    /// Top `limit` players by wins.
    async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError>;
}
