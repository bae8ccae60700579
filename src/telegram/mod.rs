//! Telegram transport.
//!
//! Implements outbound messaging over the Bot API and turns incoming
//! updates into dispatcher events.

mod client;
mod updates;

pub use client::{TelegramError, TelegramMessenger};
pub use updates::{PollerMessage, UpdatePoller};
