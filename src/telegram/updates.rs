//! Long-polling loop feeding Telegram updates into the dispatcher.
//!
//! Each update is handled on its own task so a slow send for one user does
//! not hold up the others. Callback queries are always answered, even when
//! the dispatcher has nothing to say, so clients stop showing a spinner.

use std::sync::Arc;
use std::time::Duration;

use teloxide::payloads::{AnswerCallbackQuerySetters, GetUpdatesSetters};
use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, CallbackQuery, ChatId, Message, UpdateKind};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::TelegramMessenger;
use crate::dispatch::{CallbackAnswer, Dispatcher, InboundEvent};
use crate::moderation::MessageKey;
use crate::submission::UserId;

/// Long-polling timeout passed to `getUpdates`, in seconds.
const POLL_TIMEOUT_SECS: u32 = 30;

/// Pause after a failed `getUpdates` call.
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Messages that can be sent to the poller.
#[derive(Debug, Clone)]
pub enum PollerMessage {
    /// Stop polling.
    Shutdown,
}

/// Pulls updates from Telegram and dispatches them.
pub struct UpdatePoller {
    bot: Bot,
    dispatcher: Arc<Dispatcher<TelegramMessenger>>,
    moderator_chat: ChatId,
}

impl UpdatePoller {
    /// Creates a poller.
    #[must_use]
    pub fn new(bot: Bot, dispatcher: Arc<Dispatcher<TelegramMessenger>>) -> Self {
        let moderator_chat = dispatcher.messenger().moderator_chat();
        Self {
            bot,
            dispatcher,
            moderator_chat,
        }
    }

    /// Runs the polling loop until a shutdown message arrives.
    pub async fn run(&self, mut rx: mpsc::Receiver<PollerMessage>) {
        info!("Update poller started");
        let mut offset: i32 = 0;

        loop {
            let request = self
                .bot
                .get_updates()
                .offset(offset)
                .timeout(POLL_TIMEOUT_SECS)
                .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
                .send();

            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Some(PollerMessage::Shutdown) | None => {
                            info!("Update poller shutting down");
                            break;
                        }
                    }
                }
                result = request => {
                    match result {
                        Ok(updates) => {
                            if !updates.is_empty() {
                                debug!("Received {} updates", updates.len());
                            }
                            for update in updates {
                                offset = update.id.as_offset();
                                self.spawn_handler(update.kind);
                            }
                        }
                        Err(e) => {
                            error!("Failed to fetch updates: {}", e);
                            tokio::time::sleep(RETRY_DELAY).await;
                        }
                    }
                }
            }
        }
    }

    fn spawn_handler(&self, kind: UpdateKind) {
        let bot = self.bot.clone();
        let dispatcher = Arc::clone(&self.dispatcher);
        let moderator_chat = self.moderator_chat;

        tokio::spawn(async move {
            match kind {
                UpdateKind::Message(msg) => {
                    if let Some(event) = message_event(&msg) {
                        dispatcher.handle(event).await;
                    }
                }
                UpdateKind::CallbackQuery(query) => {
                    let event = callback_event(&query, moderator_chat);
                    let answer = dispatcher.handle(event).await.unwrap_or_default();
                    answer_callback(&bot, &query, answer).await;
                }
                other => debug!("Ignoring update: {:?}", other),
            }
        });
    }
}

impl std::fmt::Debug for UpdatePoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdatePoller")
            .field("moderator_chat", &self.moderator_chat)
            .finish_non_exhaustive()
    }
}

/// Converts a private message into an inbound event.
fn message_event(msg: &Message) -> Option<InboundEvent> {
    if !msg.chat.is_private() {
        return None;
    }

    let from = msg.from.as_ref()?;
    let user = UserId(from.id.0);
    let name = from.full_name();

    if let Some(text) = msg.text() {
        return Some(InboundEvent::from_text(user, name, text));
    }

    let caption = msg.caption().map(ToOwned::to_owned);
    let album = msg.media_group_id().map(ToString::to_string);

    if let Some(photo) = msg.photo().and_then(<[_]>::last) {
        return Some(InboundEvent::UserPhoto {
            user,
            name,
            media: photo.file.id.clone(),
            caption,
            album,
        });
    }

    if let Some(video) = msg.video() {
        return Some(InboundEvent::UserVideo {
            user,
            name,
            media: video.file.id.clone(),
            caption,
            album,
        });
    }

    None
}

/// Converts an inline button press into an inbound event.
///
/// Moderator actions are only honoured on messages in the moderator chat.
fn callback_event(query: &CallbackQuery, moderator_chat: ChatId) -> InboundEvent {
    let user = UserId(query.from.id.0);
    let key = query
        .message
        .as_ref()
        .filter(|m| m.chat().id == moderator_chat)
        .map(|m| MessageKey(m.id().0));

    match query.data.as_deref() {
        Some(data) => InboundEvent::from_callback(user, key, data),
        None => InboundEvent::UnknownCallback { key },
    }
}

async fn answer_callback(bot: &Bot, query: &CallbackQuery, answer: CallbackAnswer) {
    let mut request = bot.answer_callback_query(&query.id);
    if let Some(text) = answer.text {
        request = request.text(text);
    }
    if answer.alert {
        request = request.show_alert(true);
    }

    if let Err(e) = request.await {
        warn!("Failed to answer callback query: {}", e);
    }
}
