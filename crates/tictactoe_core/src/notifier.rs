//! Delivery interface for rendered sessions.

use crate::NotifyError;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};

/// An inline button: visible label plus the callback data sent back on tap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Button {
    /// Text shown on the button.
    label: String,
    /// Opaque data returned when pressed.
    callback: String,
}

/// A message ready to send: text and rows of buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Rendered {
    /// Message body.
    text: String,
    /// Keyboard rows, top to bottom.
    keyboard: Vec<Vec<Button>>,
}

impl Rendered {
    /// A message without buttons.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    /// Every callback on the keyboard, row by row.
    pub fn callbacks(&self) -> impl Iterator<Item = &str> {
        self.keyboard
            .iter()
            .flatten()
            .map(|button| button.callback.as_str())
    }
}

/// Sends rendered messages to players.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `message` to `player`.
    async fn deliver(&self, player: &str, message: &Rendered) -> Result<(), NotifyError>;
}
