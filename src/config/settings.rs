//! Bot settings loaded from the environment.

use std::time::Duration;

use secrecy::SecretString;

use crate::submission::{ContentType, UserId};

/// Telegram credentials and chat identities.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token issued by `@BotFather`.
    pub token: SecretString,

    /// User id of the moderator. Also exempt from rate limits.
    pub admin_id: UserId,

    /// Chat id of the public channel approved posts go to.
    pub channel_id: i64,

    /// Bot username used in the attribution link. Resolved via `getMe` when unset.
    pub bot_username: Option<String>,
}

impl TelegramConfig {
    /// Creates configuration from environment variables.
    ///
    /// Expects `BOT_TOKEN`, `ADMIN_ID` and `CHANNEL_ID` to be set.
    /// `BOT_USERNAME` is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var("BOT_TOKEN").map_err(|_| ConfigError::MissingEnvVar("BOT_TOKEN"))?;

        let admin_id: u64 = std::env::var("ADMIN_ID")
            .map_err(|_| ConfigError::MissingEnvVar("ADMIN_ID"))?
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidId("ADMIN_ID"))?;

        let channel_id: i64 = std::env::var("CHANNEL_ID")
            .map_err(|_| ConfigError::MissingEnvVar("CHANNEL_ID"))?
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidId("CHANNEL_ID"))?;

        let bot_username = std::env::var("BOT_USERNAME")
            .ok()
            .map(|s| s.trim().trim_start_matches('@').to_owned())
            .filter(|s| !s.is_empty());

        Ok(Self {
            token: SecretString::new(token),
            admin_id: UserId(admin_id),
            channel_id,
            bot_username,
        })
    }
}

/// Submission limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitSettings {
    /// Posts of type text allowed per window.
    pub text_quota: usize,

    /// Posts of type photo allowed per window.
    pub photo_quota: usize,

    /// Posts of type video allowed per window.
    pub video_quota: usize,

    /// Length of the sliding rate-limit window.
    pub window: Duration,

    /// Maximum characters in a text submission.
    pub text_char_limit: usize,

    /// How many album ids to remember for duplicate album warnings.
    pub album_memory: usize,
}

const DEFAULT_QUOTA: usize = 2;
const DEFAULT_WINDOW_HOURS: u64 = 12;
const DEFAULT_TEXT_CHAR_LIMIT: usize = 500;
const DEFAULT_ALBUM_MEMORY: usize = 1024;

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            text_quota: DEFAULT_QUOTA,
            photo_quota: DEFAULT_QUOTA,
            video_quota: DEFAULT_QUOTA,
            window: window_from_hours(DEFAULT_WINDOW_HOURS),
            text_char_limit: DEFAULT_TEXT_CHAR_LIMIT,
            album_memory: DEFAULT_ALBUM_MEMORY,
        }
    }
}

impl LimitSettings {
    /// Creates limit settings from environment variables with defaults.
    ///
    /// Unparseable values fall back to the default.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        let defaults = Self::default();
        Self {
            text_quota: env_or("TEXT_QUOTA", defaults.text_quota),
            photo_quota: env_or("PHOTO_QUOTA", defaults.photo_quota),
            video_quota: env_or("VIDEO_QUOTA", defaults.video_quota),
            window: window_from_hours(env_or("RATE_WINDOW_HOURS", DEFAULT_WINDOW_HOURS)),
            text_char_limit: env_or("TEXT_CHAR_LIMIT", defaults.text_char_limit),
            album_memory: env_or("ALBUM_MEMORY", defaults.album_memory),
        }
    }

    /// Returns the quota for a content type.
    #[must_use]
    pub const fn quota(&self, content_type: ContentType) -> usize {
        match content_type {
            ContentType::Text => self.text_quota,
            ContentType::Photo => self.photo_quota,
            ContentType::Video => self.video_quota,
        }
    }

    /// Window length in whole hours, for user-facing notices.
    #[must_use]
    pub const fn window_hours(&self) -> u64 {
        self.window.as_secs() / 3600
    }
}

/// Rate window of the given length, clamped instead of overflowing.
const fn window_from_hours(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid {0} (must be an integer chat/user id)")]
    InvalidId(&'static str),
}
