//! Moderation queue.
//!
//! Maps each moderator-facing message to the submission it presents. An item
//! is removed exactly once, by approval or by a concrete reject reason.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::submission::{Post, UserId};

/// Identifier of a message in the moderator chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey(pub i32);

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rendered submission awaiting a moderator decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationItem {
    pub post: Post,
    pub submitter: UserId,
}

/// Moderation queue errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModerationError {
    #[error("moderation item {0} not found or already processed")]
    ItemNotFound(MessageKey),

    #[error("moderation message {0} is already registered")]
    DuplicateKey(MessageKey),
}

/// Outstanding moderation items keyed by moderator message.
#[derive(Debug, Default)]
pub struct ModerationQueue {
    items: Mutex<HashMap<MessageKey, ModerationItem>>,
}

impl ModerationQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the item shown in moderator message `key`.
    pub async fn register(&self, key: MessageKey, item: ModerationItem) -> Result<(), ModerationError> {
        let mut items = self.items.lock().await;
        if items.contains_key(&key) {
            warn!("Moderation message {} registered twice", key);
            return Err(ModerationError::DuplicateKey(key));
        }
        items.insert(key, item);
        debug!("Registered moderation item {} ({} pending)", key, items.len());
        Ok(())
    }

    /// Removes and returns the item for `key`.
    pub async fn resolve(&self, key: MessageKey) -> Result<ModerationItem, ModerationError> {
        let mut items = self.items.lock().await;
        let item = items.remove(&key).ok_or(ModerationError::ItemNotFound(key))?;
        debug!("Resolved moderation item {} ({} pending)", key, items.len());
        Ok(item)
    }

    /// Whether `key` still awaits a decision.
    pub async fn contains(&self, key: MessageKey) -> bool {
        self.items.lock().await.contains_key(&key)
    }

    /// Number of items awaiting a decision.
    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    /// Checks if no items await a decision.
    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}
