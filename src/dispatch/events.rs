//! Inbound events and user commands.

use crate::config::CATEGORY_CALLBACK_PREFIX;
use crate::moderation::{MessageKey, ModeratorAction};
use crate::submission::{ContentType, UserId};

/// Label of the "back" reply button.
pub const BACK_LABEL: &str = "⬅️ Назад";

/// Commands a user issues through text or reply buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    /// `/start`: greet and reset the conversation.
    Start,

    /// Return to the main menu, dropping staged content.
    Back,

    /// Begin a submission of the given type.
    Choose(ContentType),
}

impl UserCommand {
    /// Parses a command from message text.
    ///
    /// Returns `None` if the text is ordinary content.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if let Some(rest) = text.strip_prefix("/start") {
            // Accept `/start`, `/start@bot_name` and deep-link payloads
            if rest.is_empty() || rest.starts_with('@') || rest.starts_with(char::is_whitespace) {
                return Some(Self::Start);
            }
            return None;
        }

        if text == BACK_LABEL {
            return Some(Self::Back);
        }

        ContentType::ALL
            .into_iter()
            .find(|ct| choice_label(*ct) == text)
            .map(Self::Choose)
    }
}

/// Reply-keyboard label that starts a submission of this type.
#[must_use]
pub const fn choice_label(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Text => "Отправить текст",
        ContentType::Photo => "Загрузить фото",
        ContentType::Video => "Загрузить видео",
    }
}

/// Everything the dispatcher reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    UserText {
        user: UserId,
        name: String,
        text: String,
    },
    UserPhoto {
        user: UserId,
        name: String,
        media: String,
        caption: Option<String>,
        album: Option<String>,
    },
    UserVideo {
        user: UserId,
        name: String,
        media: String,
        caption: Option<String>,
        album: Option<String>,
    },
    UserCommand {
        user: UserId,
        command: UserCommand,
    },
    CategorySelection {
        user: UserId,
        category: String,
    },
    ModeratorDecision {
        key: MessageKey,
        action: ModeratorAction,
    },
    /// Callback data that matched nothing, or a moderator action outside the moderator chat.
    UnknownCallback {
        key: Option<MessageKey>,
    },
}

impl InboundEvent {
    /// Classifies a text message as a command or as submitted text.
    #[must_use]
    pub fn from_text(user: UserId, name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        match UserCommand::parse(&text) {
            Some(command) => Self::UserCommand { user, command },
            None => Self::UserText {
                user,
                name: name.into(),
                text,
            },
        }
    }

    /// Classifies inline button data.
    ///
    /// `moderation_key` is the pressed message's key when it lives in the
    /// moderator chat, `None` otherwise.
    #[must_use]
    pub fn from_callback(user: UserId, moderation_key: Option<MessageKey>, data: &str) -> Self {
        if let Some(tag) = data.strip_prefix(CATEGORY_CALLBACK_PREFIX) {
            return Self::CategorySelection {
                user,
                category: tag.to_owned(),
            };
        }

        match (moderation_key, ModeratorAction::parse(data)) {
            (Some(key), Some(action)) => Self::ModeratorDecision { key, action },
            (key, _) => Self::UnknownCallback { key },
        }
    }

    /// Whether this event came from an inline button press.
    #[must_use]
    pub const fn is_callback(&self) -> bool {
        matches!(
            self,
            Self::CategorySelection { .. } | Self::ModeratorDecision { .. } | Self::UnknownCallback { .. }
        )
    }
}

/// Response to an inline button press.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallbackAnswer {
    /// Text shown to the presser, if any.
    pub text: Option<String>,

    /// Show as a modal alert instead of a toast.
    pub alert: bool,
}

impl CallbackAnswer {
    /// Acknowledges without showing anything.
    #[must_use]
    pub fn silent() -> Self {
        Self::default()
    }

    /// Short notification at the top of the chat.
    #[must_use]
    pub fn toast(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            alert: false,
        }
    }

    /// Modal alert the presser must dismiss.
    #[must_use]
    pub fn alert(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            alert: true,
        }
    }
}
