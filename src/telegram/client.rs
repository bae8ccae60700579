//! Telegram implementation of the [`Messenger`] capability.

use async_trait::async_trait;
use teloxide::payloads::{EditMessageReplyMarkupSetters, SendMessageSetters, SendPhotoSetters, SendVideoSetters};
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, KeyboardButton, KeyboardMarkup, Message,
    MessageId, ParseMode, ReplyMarkup, ReplyParameters,
};
use teloxide::RequestError;
use thiserror::Error;
use tracing::debug;

use crate::dispatch::{choice_label, notices, Keyboard, Messenger, TransportError, BACK_LABEL};
use crate::moderation::{MessageKey, ModeratorAction, RejectReason};
use crate::submission::{ContentType, Post, UserId};

/// Errors produced by the Telegram transport.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Telegram API request failed: {0}")]
    Request(#[from] RequestError),

    #[error("Only inline keyboards can be attached to an existing message")]
    InlineKeyboardRequired,
}

/// Sends messages through the Bot API.
#[derive(Debug, Clone)]
pub struct TelegramMessenger {
    bot: Bot,

    /// Private chat with the moderator.
    moderator_chat: ChatId,

    /// Public channel approved posts go to.
    channel: ChatId,
}

impl TelegramMessenger {
    /// Creates a messenger for the given moderator and channel.
    #[must_use]
    pub fn new(bot: Bot, moderator: UserId, channel: ChatId) -> Self {
        Self {
            bot,
            moderator_chat: user_chat(moderator),
            channel,
        }
    }

    /// Chat the moderation messages are sent to.
    #[must_use]
    pub const fn moderator_chat(&self) -> ChatId {
        self.moderator_chat
    }

    async fn send_post(&self, chat: ChatId, post: &Post, markup: Option<ReplyMarkup>) -> Result<Message, RequestError> {
        match post {
            Post::Text(text) => {
                let request = self.bot.send_message(chat, text).parse_mode(ParseMode::Html);
                match markup {
                    Some(markup) => request.reply_markup(markup).await,
                    None => request.await,
                }
            }
            Post::Photo { media, caption } => {
                let request = self
                    .bot
                    .send_photo(chat, InputFile::file_id(media.clone()))
                    .caption(caption)
                    .parse_mode(ParseMode::Html);
                match markup {
                    Some(markup) => request.reply_markup(markup).await,
                    None => request.await,
                }
            }
            Post::Video { media, caption } => {
                let request = self
                    .bot
                    .send_video(chat, InputFile::file_id(media.clone()))
                    .caption(caption)
                    .parse_mode(ParseMode::Html);
                match markup {
                    Some(markup) => request.reply_markup(markup).await,
                    None => request.await,
                }
            }
        }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_to_user(&self, user: UserId, text: &str, keyboard: Option<&Keyboard>) -> Result<(), TransportError> {
        let request = self
            .bot
            .send_message(user_chat(user), text)
            .parse_mode(ParseMode::Html);
        let result = match keyboard {
            Some(keyboard) => request.reply_markup(render(keyboard)).await,
            None => request.await,
        };

        result
            .map(|_| ())
            .map_err(|e| TransportError::new(format!("send message to user {user}"), TelegramError::from(e)))
    }

    async fn send_to_moderator(&self, post: &Post, keyboard: &Keyboard) -> Result<MessageKey, TransportError> {
        let sent = self
            .send_post(self.moderator_chat, post, Some(render(keyboard)))
            .await
            .map_err(|e| {
                TransportError::new(
                    format!("send {} to moderator", post.content_type()),
                    TelegramError::from(e),
                )
            })?;

        debug!("Moderation message {} sent", sent.id.0);
        Ok(MessageKey(sent.id.0))
    }

    async fn edit_moderator_keyboard(&self, key: MessageKey, keyboard: Option<&Keyboard>) -> Result<(), TransportError> {
        let context = format!("edit keyboard of moderation message {key}");
        let request = self
            .bot
            .edit_message_reply_markup(self.moderator_chat, MessageId(key.0));

        let result = match keyboard {
            Some(keyboard) => {
                let markup = inline_keyboard(keyboard)
                    .ok_or_else(|| TransportError::new(context.clone(), TelegramError::InlineKeyboardRequired))?;
                request.reply_markup(markup).await
            }
            None => request.await,
        };

        result
            .map(|_| ())
            .map_err(|e| TransportError::new(context, TelegramError::from(e)))
    }

    async fn reply_to_moderator(&self, key: MessageKey, text: &str) -> Result<(), TransportError> {
        self.bot
            .send_message(self.moderator_chat, text)
            .parse_mode(ParseMode::Html)
            .reply_parameters(ReplyParameters::new(MessageId(key.0)).allow_sending_without_reply())
            .await
            .map(|_| ())
            .map_err(|e| {
                TransportError::new(format!("reply to moderation message {key}"), TelegramError::from(e))
            })
    }

    async fn publish_to_channel(&self, post: &Post) -> Result<(), TransportError> {
        self.send_post(self.channel, post, None)
            .await
            .map(|_| ())
            .map_err(|e| {
                TransportError::new(
                    format!("publish {} to channel", post.content_type()),
                    TelegramError::from(e),
                )
            })
    }
}

/// Private chat id of a user.
pub(crate) fn user_chat(user: UserId) -> ChatId {
    ChatId::from(teloxide::types::UserId(user.0))
}

/// Renders any keyboard as reply markup.
fn render(keyboard: &Keyboard) -> ReplyMarkup {
    if let Some(markup) = inline_keyboard(keyboard) {
        return markup.into();
    }

    match keyboard {
        Keyboard::Back => KeyboardMarkup::new([[KeyboardButton::new(BACK_LABEL)]])
            .resize_keyboard()
            .one_time_keyboard()
            .into(),
        _ => KeyboardMarkup::new(
            ContentType::ALL.map(|content_type| vec![KeyboardButton::new(choice_label(content_type))]),
        )
        .resize_keyboard()
        .persistent()
        .input_field_placeholder(notices::CHOICE_PLACEHOLDER)
        .into(),
    }
}

/// Renders inline keyboards. Returns `None` for reply keyboards.
fn inline_keyboard(keyboard: &Keyboard) -> Option<InlineKeyboardMarkup> {
    let rows: Vec<Vec<InlineKeyboardButton>> = match keyboard {
        Keyboard::ContentChoice | Keyboard::Back => return None,
        Keyboard::Categories(categories) => categories
            .chunks(2)
            .map(|row| {
                row.iter()
                    .map(|c| InlineKeyboardButton::callback(c.hashtag(), c.callback_data()))
                    .collect()
            })
            .collect(),
        Keyboard::Moderation => vec![vec![
            InlineKeyboardButton::callback("✅ Опубликовать", ModeratorAction::Approve.callback_data()),
            InlineKeyboardButton::callback("❌ Отклонить", ModeratorAction::ChooseRejectReason.callback_data()),
        ]],
        Keyboard::RejectReasons => RejectReason::OFFERED
            .chunks(2)
            .map(|row| {
                row.iter()
                    .map(|reason| {
                        InlineKeyboardButton::callback(
                            reason.button_label(),
                            ModeratorAction::Reject(*reason).callback_data(),
                        )
                    })
                    .collect()
            })
            .collect(),
    };

    Some(InlineKeyboardMarkup::new(rows))
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;
    use crate::config::CategoryConfig;

    fn callback_data(markup: &InlineKeyboardMarkup) -> Vec<Vec<String>> {
        markup
            .inline_keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .filter_map(|button| match &button.kind {
                        InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_categories_two_per_row() {
        let categories = CategoryConfig::default().categories;
        let markup = inline_keyboard(&Keyboard::Categories(categories)).unwrap();
        let rows = callback_data(&markup);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec!["hashtag_еда", "hashtag_путешествия"]);
        assert_eq!(rows[3], vec!["hashtag_простоЮмор"]);
    }

    #[test]
    fn test_moderation_keyboard_payloads() {
        let markup = inline_keyboard(&Keyboard::Moderation).unwrap();
        assert_eq!(callback_data(&markup), vec![vec!["approve", "reject_choose_reason"]]);
    }

    #[test]
    fn test_reject_reason_payloads_parse() {
        let markup = inline_keyboard(&Keyboard::RejectReasons).unwrap();
        for data in callback_data(&markup).into_iter().flatten() {
            assert!(matches!(
                ModeratorAction::parse(&data),
                Some(ModeratorAction::Reject(reason)) if reason != RejectReason::Unspecified
            ));
        }
    }

    #[test]
    fn test_reply_keyboards_are_not_inline() {
        assert!(inline_keyboard(&Keyboard::ContentChoice).is_none());
        assert!(inline_keyboard(&Keyboard::Back).is_none());
    }
}
