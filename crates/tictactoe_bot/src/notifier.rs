//! [`Notifier`] implementations.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tictactoe_core::{Notifier, NotifyError, PlayerId, Rendered};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Logs every message instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    #[instrument(skip(self, message))]
    async fn deliver(&self, player: &str, message: &Rendered) -> Result<(), NotifyError> {
        info!(
            text = %message.text(),
            buttons = message.callbacks().count(),
            "Message delivered"
        );
        Ok(())
    }
}

/// Writes messages for one local player to stdout; others are only logged.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    player: PlayerId,
}

impl ConsoleNotifier {
    /// Prints messages addressed to `player`.
    pub fn new(player: impl Into<PlayerId>) -> Self {
        Self {
            player: player.into(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    #[instrument(skip(self, message))]
    async fn deliver(&self, player: &str, message: &Rendered) -> Result<(), NotifyError> {
        if player != self.player {
            debug!("Message for another player not printed");
            return Ok(());
        }

        let mut out = String::new();
        out.push('\n');
        out.push_str(message.text());
        out.push('\n');

        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(out.as_bytes())
            .await
            .map_err(|e| NotifyError::new(format!("Failed to write to stdout: {}", e)))?;
        stdout
            .flush()
            .await
            .map_err(|e| NotifyError::new(format!("Failed to flush stdout: {}", e)))?;
        Ok(())
    }
}

/// Records deliveries for later inspection.
///
/// Deliveries to players marked with [`OutboxNotifier::fail_for`] fail and
/// are not recorded.
#[derive(Debug, Clone, Default)]
pub struct OutboxNotifier {
    sent: Arc<Mutex<Vec<(PlayerId, Rendered)>>>,
    unreachable: Arc<Mutex<HashSet<PlayerId>>>,
}

impl OutboxNotifier {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later delivery to `player` fail.
    pub fn fail_for(&self, player: impl Into<PlayerId>) {
        if let Ok(mut unreachable) = self.unreachable.lock() {
            unreachable.insert(player.into());
        }
    }

    /// Removes and returns everything delivered so far.
    pub fn take(&self) -> Vec<(PlayerId, Rendered)> {
        self.sent
            .lock()
            .map(|mut sent| std::mem::take(&mut *sent))
            .unwrap_or_default()
    }

    /// Messages delivered to `player`, oldest first.
    pub fn sent_to(&self, player: &str) -> Vec<Rendered> {
        self.sent
            .lock()
            .map(|sent| {
                sent.iter()
                    .filter(|(to, _)| to == player)
                    .map(|(_, message)| message.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Notifier for OutboxNotifier {
    #[instrument(skip(self, message))]
    async fn deliver(&self, player: &str, message: &Rendered) -> Result<(), NotifyError> {
        let unreachable = self
            .unreachable
            .lock()
            .map_err(|e| NotifyError::new(format!("Lock poisoned: {}", e)))?
            .contains(player);
        if unreachable {
            return Err(NotifyError::new(format!("Player '{}' is unreachable", player)));
        }

        self.sent
            .lock()
            .map_err(|e| NotifyError::new(format!("Lock poisoned: {}", e)))?
            .push((player.to_string(), message.clone()));
        debug!("Message queued in outbox");
        Ok(())
    }
}
