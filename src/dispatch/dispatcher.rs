//! Event dispatcher.
//!
//! Routes inbound events to the session store and the moderation queue and
//! performs the resulting outbound actions. Every error is turned into a
//! notice here; nothing propagates out of [`Dispatcher::handle`].
//!
//! Decisions are at-most-once: an item is removed from the queue before the
//! post is published, and a failed publish is reported, not retried. The
//! same goes for a submitter who cannot be told about a decision.

use tracing::{debug, error, info, warn};

use super::events::{CallbackAnswer, InboundEvent, UserCommand};
use super::messenger::{Keyboard, Messenger};
use super::notices;
use crate::config::{CategoryConfig, LimitSettings};
use crate::moderation::{MessageKey, ModerationError, ModerationItem, ModerationQueue, ModeratorAction, RejectReason};
use crate::submission::{Capture, Content, SubmissionSession, UserId};

/// Routes events between users, the moderator and the channel.
pub struct Dispatcher<M> {
    messenger: M,
    session: SubmissionSession,
    queue: ModerationQueue,
    categories: CategoryConfig,
    bot_username: String,
}

impl<M: Messenger> Dispatcher<M> {
    /// Creates a dispatcher.
    ///
    /// `bot_username` is used in the call-to-action link of rendered posts.
    #[must_use]
    pub fn new(
        messenger: M,
        session: SubmissionSession,
        categories: CategoryConfig,
        bot_username: impl Into<String>,
    ) -> Self {
        Self {
            messenger,
            session,
            queue: ModerationQueue::new(),
            categories,
            bot_username: bot_username.into(),
        }
    }

    /// The messenger used for outbound actions.
    #[must_use]
    pub const fn messenger(&self) -> &M {
        &self.messenger
    }

    /// The per-user session store.
    #[must_use]
    pub const fn session(&self) -> &SubmissionSession {
        &self.session
    }

    /// The moderation queue.
    #[must_use]
    pub const fn queue(&self) -> &ModerationQueue {
        &self.queue
    }

    /// Handles one inbound event.
    ///
    /// Returns the answer for callback events, `None` for messages.
    pub async fn handle(&self, event: InboundEvent) -> Option<CallbackAnswer> {
        match event {
            InboundEvent::UserCommand { user, command } => {
                self.handle_command(user, command).await;
                None
            }
            InboundEvent::UserText { user, name, text } => {
                self.handle_content(user, &name, Content::Text { body: text }, None)
                    .await;
                None
            }
            InboundEvent::UserPhoto {
                user,
                name,
                media,
                caption,
                album,
            } => {
                self.handle_content(user, &name, Content::Photo { media, caption }, album.as_deref())
                    .await;
                None
            }
            InboundEvent::UserVideo {
                user,
                name,
                media,
                caption,
                album,
            } => {
                self.handle_content(user, &name, Content::Video { media, caption }, album.as_deref())
                    .await;
                None
            }
            InboundEvent::CategorySelection { user, category } => {
                Some(self.handle_category(user, &category).await)
            }
            InboundEvent::ModeratorDecision { key, action } => Some(self.handle_decision(key, action).await),
            InboundEvent::UnknownCallback { key } => Some(self.handle_unknown(key).await),
        }
    }

    async fn handle_command(&self, user: UserId, command: UserCommand) {
        debug!("User {} command: {:?}", user, command);

        match command {
            UserCommand::Start => {
                self.session.start(user).await;
                self.notify(user, notices::WELCOME, Some(&Keyboard::ContentChoice))
                    .await;
            }
            UserCommand::Back => {
                self.session.back(user).await;
                self.notify(user, notices::MAIN_MENU, Some(&Keyboard::ContentChoice))
                    .await;
            }
            UserCommand::Choose(content_type) => match self.session.choose(user, content_type).await {
                Ok(()) => {
                    let prompt = notices::prompt(content_type, self.limits());
                    self.notify(user, &prompt, Some(&Keyboard::Back)).await;
                }
                Err(e) => {
                    let notice = notices::submission_error(&e, self.limits());
                    self.notify(user, &notice, None).await;
                }
            },
        }
    }

    async fn handle_content(&self, user: UserId, name: &str, content: Content, album: Option<&str>) {
        match self.session.capture(user, name, content, album).await {
            Ok(Capture::Staged(content_type)) => {
                let keyboard = Keyboard::Categories(self.categories.categories.clone());
                self.notify(user, notices::category_prompt(content_type), Some(&keyboard))
                    .await;
            }
            Ok(Capture::Ignored) => {}
            Err(e) => {
                debug!("Refused content from user {}: {}", user, e);
                let notice = notices::submission_error(&e, self.limits());
                self.notify(user, &notice, None).await;
            }
        }
    }

    async fn handle_category(&self, user: UserId, tag: &str) -> CallbackAnswer {
        let Some(category) = self.categories.find(tag) else {
            warn!("User {} picked unknown category '{}'", user, tag);
            return CallbackAnswer::alert(notices::UNKNOWN_CATEGORY);
        };

        let pending = match self.session.take_pending(user).await {
            Ok(pending) => pending,
            Err(e) => {
                debug!("Category from user {} without content: {}", user, e);
                return CallbackAnswer::alert(notices::SUBMIT_FIRST);
            }
        };

        let item = ModerationItem {
            post: pending.render(category, &self.bot_username),
            submitter: user,
        };

        match self.messenger.send_to_moderator(&item.post, &Keyboard::Moderation).await {
            Ok(key) => {
                let content_type = item.post.content_type();
                if let Err(e) = self.queue.register(key, item).await {
                    error!("Failed to queue submission from user {}: {}", user, e);
                    self.notify(user, notices::SEND_FAILED, None).await;
                    return CallbackAnswer::silent();
                }

                info!(
                    "Queued {} submission from user {} as {} ({})",
                    content_type,
                    user,
                    key,
                    category.hashtag()
                );
                self.notify(user, notices::SUBMITTED, Some(&Keyboard::ContentChoice))
                    .await;
                CallbackAnswer::toast(notices::CATEGORY_CHOSEN)
            }
            Err(e) => {
                error!("Failed to send submission from user {} to moderator: {}", user, e);
                self.notify(user, notices::SEND_FAILED, None).await;
                CallbackAnswer::silent()
            }
        }
    }

    async fn handle_decision(&self, key: MessageKey, action: ModeratorAction) -> CallbackAnswer {
        debug!("Moderator action on {}: {}", key, action);

        match action {
            ModeratorAction::Approve => self.approve(key).await,
            ModeratorAction::ChooseRejectReason => self.choose_reject_reason(key).await,
            ModeratorAction::Reject(reason) => self.reject(key, reason).await,
        }
    }

    async fn approve(&self, key: MessageKey) -> CallbackAnswer {
        let item = match self.queue.resolve(key).await {
            Ok(item) => item,
            Err(e) => return not_found(&e),
        };

        if let Err(e) = self.messenger.publish_to_channel(&item.post).await {
            error!("Failed to publish {} to the channel: {}", key, e);
            self.clear_keyboard(key).await;
            self.reply(key, notices::PUBLISH_FAILED).await;
            return CallbackAnswer::alert(notices::PUBLISH_FAILED);
        }

        info!("Published {} from user {}", key, item.submitter);
        self.clear_keyboard(key).await;
        self.reply(key, notices::PUBLISHED).await;

        let delivered = self
            .notify_submitter(key, item.submitter, notices::PUBLISHED_TO_USER)
            .await;
        self.decision_answer(key, delivered, notices::PUBLISHED_TOAST).await
    }

    async fn choose_reject_reason(&self, key: MessageKey) -> CallbackAnswer {
        if !self.queue.contains(key).await {
            return not_found(&ModerationError::ItemNotFound(key));
        }

        match self
            .messenger
            .edit_moderator_keyboard(key, Some(&Keyboard::RejectReasons))
            .await
        {
            Ok(()) => CallbackAnswer::silent(),
            Err(e) => {
                warn!("Failed to show reject reasons on {}: {}", key, e);
                CallbackAnswer::alert(notices::ACTION_FAILED)
            }
        }
    }

    async fn reject(&self, key: MessageKey, reason: RejectReason) -> CallbackAnswer {
        let item = match self.queue.resolve(key).await {
            Ok(item) => item,
            Err(e) => return not_found(&e),
        };

        info!("Rejected {} from user {}: {}", key, item.submitter, reason);
        let delivered = self
            .notify_submitter(key, item.submitter, &notices::rejected_to_user(reason))
            .await;
        self.clear_keyboard(key).await;
        self.reply(key, &notices::rejected(reason)).await;
        self.decision_answer(key, delivered, notices::REJECTED_TOAST).await
    }

    /// Tells the submitter about a decision. Returns whether the message went out.
    async fn notify_submitter(&self, key: MessageKey, user: UserId, text: &str) -> bool {
        match self.messenger.send_to_user(user, text, None).await {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to notify user {} about decision on {}: {}", user, key, e);
                false
            }
        }
    }

    /// Answer for a resolved decision; an undelivered submitter notice is
    /// reported to the moderator. The item stays resolved either way.
    async fn decision_answer(&self, key: MessageKey, delivered: bool, toast: &str) -> CallbackAnswer {
        if delivered {
            return CallbackAnswer::toast(toast);
        }

        self.reply(key, notices::NOTIFY_FAILED).await;
        CallbackAnswer::alert(notices::NOTIFY_FAILED)
    }

    async fn handle_unknown(&self, key: Option<MessageKey>) -> CallbackAnswer {
        match key {
            Some(key) if self.queue.contains(key).await => {
                warn!("Unknown action on moderation message {}", key);
                CallbackAnswer::toast(notices::UNKNOWN_ACTION)
            }
            _ => CallbackAnswer::alert(notices::NOT_FOUND),
        }
    }

    /// Sends a message to a user, logging failures.
    async fn notify(&self, user: UserId, text: &str, keyboard: Option<&Keyboard>) {
        if let Err(e) = self.messenger.send_to_user(user, text, keyboard).await {
            warn!("Failed to message user {}: {}", user, e);
        }
    }

    async fn clear_keyboard(&self, key: MessageKey) {
        if let Err(e) = self.messenger.edit_moderator_keyboard(key, None).await {
            warn!("Failed to clear keyboard on {}: {}", key, e);
        }
    }

    async fn reply(&self, key: MessageKey, text: &str) {
        if let Err(e) = self.messenger.reply_to_moderator(key, text).await {
            warn!("Failed to reply to moderator on {}: {}", key, e);
        }
    }

    fn limits(&self) -> &LimitSettings {
        self.session.limiter().limits()
    }
}

fn not_found(err: &ModerationError) -> CallbackAnswer {
    debug!("{}", err);
    CallbackAnswer::alert(notices::NOT_FOUND)
}

impl<M> std::fmt::Debug for Dispatcher<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("bot_username", &self.bot_username)
            .field("categories", &self.categories.len())
            .finish_non_exhaustive()
    }
}
