//! Outbound messaging capability used by the dispatcher.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Category;
use crate::moderation::MessageKey;
use crate::submission::{Post, UserId};

/// Keyboards the bot attaches to its messages.
///
/// The transport decides how each one is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent menu with the three content types.
    ContentChoice,

    /// Single "back" button shown while waiting for content.
    Back,

    /// Inline category buttons.
    Categories(Vec<Category>),

    /// Approve / reject buttons under a moderation message.
    Moderation,

    /// Concrete reject reasons, shown after the first reject press.
    RejectReasons,
}

/// An outbound send failed.
#[derive(Debug, Error)]
#[error("{context}: {source}")]
pub struct TransportError {
    context: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    /// Wraps a transport error with what was being attempted.
    #[must_use]
    pub fn new(context: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// What was being attempted when the error happened.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Outbound actions against the messaging platform.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a text message to a user's private chat.
    async fn send_to_user(&self, user: UserId, text: &str, keyboard: Option<&Keyboard>) -> Result<(), TransportError>;

    /// Presents a post to the moderator, returning the key of the sent message.
    async fn send_to_moderator(&self, post: &Post, keyboard: &Keyboard) -> Result<MessageKey, TransportError>;

    /// Replaces or removes the keyboard under a moderator message.
    async fn edit_moderator_keyboard(&self, key: MessageKey, keyboard: Option<&Keyboard>) -> Result<(), TransportError>;

    /// Replies to a moderator message.
    async fn reply_to_moderator(&self, key: MessageKey, text: &str) -> Result<(), TransportError>;

    /// Publishes a post to the public channel.
    async fn publish_to_channel(&self, post: &Post) -> Result<(), TransportError>;
}
