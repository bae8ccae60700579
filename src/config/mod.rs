//! Configuration module for the submission bot.
//!
//! Handles loading and validation of the Telegram identities, submission
//! limits and the category list.

mod categories;
mod settings;

pub use categories::{Category, CategoryConfig, CategoryError};
pub use settings::{ConfigError, LimitSettings, TelegramConfig};

/// Prefix of inline button payloads that select a category.
pub const CATEGORY_CALLBACK_PREFIX: &str = "hashtag_";

/// Telegram limit on inline button callback data, in bytes.
pub const MAX_CALLBACK_DATA_LEN: usize = 64;
