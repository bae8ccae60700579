//! Per-user submission state machine.
//!
//! ```text
//!          choose(type) [quota ok]
//!   Idle ───────────────────────────► Awaiting(type)
//!    ▲                                    │
//!    │  matching content (valid) / back   │
//!    └────────────────────────────────────┘
//! ```
//!
//! Mismatched or invalid content leaves the phase untouched. Valid content is
//! staged as a [`PendingSubmission`] until the user picks a category.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{Content, ContentType, PendingSubmission, RateLimiter, UserId};

/// Conversation phase of a single user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Awaiting(ContentType),
}

/// Reasons a piece of content is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("text is too long: {length} > {limit} characters")]
    TextTooLong { length: usize, limit: usize },

    #[error("expected {expected}, received {received}")]
    WrongContentType {
        expected: ContentType,
        received: ContentType,
    },

    #[error("albums are not accepted")]
    AlbumNotAllowed,
}

/// Errors surfaced to the submitting user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("rate limit exceeded for {0}")]
    RateLimitExceeded(ContentType),

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("no staged submission")]
    SubmissionNotFound,

    #[error("already waiting for {0}")]
    SubmissionInProgress(ContentType),
}

/// Result of feeding content into a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Content staged; the user should now pick a category.
    Staged(ContentType),

    /// Content has no effect on the session.
    Ignored,
}

/// Remembers recently seen album ids, evicting the oldest past capacity.
#[derive(Debug)]
struct SeenAlbums {
    capacity: usize,
    order: VecDeque<String>,
    ids: HashSet<String>,
}

impl SeenAlbums {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::new(),
            ids: HashSet::new(),
        }
    }

    /// Returns true the first time an album id is seen.
    fn first_sighting(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        if self.order.len() >= self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.ids.remove(&oldest);
        }
        self.order.push_back(id.to_owned());
        self.ids.insert(id.to_owned());
        true
    }
}

#[derive(Debug)]
struct Sessions {
    phases: HashMap<UserId, Phase>,
    pending: HashMap<UserId, PendingSubmission>,
    albums: SeenAlbums,
}

/// Owns every user's phase and staged submission.
#[derive(Debug)]
pub struct SubmissionSession {
    limiter: RateLimiter,
    inner: Mutex<Sessions>,
}

impl SubmissionSession {
    /// Creates a session store gated by the given rate limiter.
    #[must_use]
    pub fn new(limiter: RateLimiter) -> Self {
        let album_memory = limiter.limits().album_memory;
        Self {
            limiter,
            inner: Mutex::new(Sessions {
                phases: HashMap::new(),
                pending: HashMap::new(),
                albums: SeenAlbums::new(album_memory),
            }),
        }
    }

    /// The rate limiter gating content-type choices.
    #[must_use]
    pub const fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Resets the phase to idle. Staged content is kept.
    pub async fn start(&self, user: UserId) {
        let mut inner = self.inner.lock().await;
        inner.phases.remove(&user);
    }

    /// Starts waiting for content of the given type, if the quota allows.
    pub async fn choose(&self, user: UserId, content_type: ContentType) -> Result<(), SubmissionError> {
        let mut inner = self.inner.lock().await;

        if let Some(Phase::Awaiting(current)) = inner.phases.get(&user).copied() {
            return Err(SubmissionError::SubmissionInProgress(current));
        }

        if !self.limiter.allow(user, content_type).await {
            info!("User {} hit the {} limit", user, content_type);
            return Err(SubmissionError::RateLimitExceeded(content_type));
        }

        inner.phases.insert(user, Phase::Awaiting(content_type));
        debug!("User {} is now submitting {}", user, content_type);
        Ok(())
    }

    /// Feeds received content into the user's session.
    ///
    /// `album` is the transport's media group id for multi-item albums.
    pub async fn capture(
        &self,
        user: UserId,
        submitter_name: &str,
        content: Content,
        album: Option<&str>,
    ) -> Result<Capture, SubmissionError> {
        let mut inner = self.inner.lock().await;

        let Some(Phase::Awaiting(expected)) = inner.phases.get(&user).copied() else {
            return Ok(Capture::Ignored);
        };

        if let Some(album) = album {
            if inner.albums.first_sighting(album) {
                return Err(ValidationError::AlbumNotAllowed.into());
            }
            return Ok(Capture::Ignored);
        }

        let received = content.content_type();
        if received != expected {
            return Err(ValidationError::WrongContentType { expected, received }.into());
        }

        if let Content::Text { body } = &content {
            let length = body.chars().count();
            let limit = self.limiter.limits().text_char_limit;
            if length > limit {
                return Err(ValidationError::TextTooLong { length, limit }.into());
            }
        }

        let staged = PendingSubmission {
            content,
            submitter_name: submitter_name.to_owned(),
        };
        if inner.pending.insert(user, staged).is_some() {
            debug!("User {} replaced an untagged submission", user);
        }
        inner.phases.remove(&user);

        info!("Staged {} submission from user {}", received, user);
        Ok(Capture::Staged(received))
    }

    /// Returns to idle and drops any staged content.
    pub async fn back(&self, user: UserId) {
        let mut inner = self.inner.lock().await;
        inner.phases.remove(&user);
        if inner.pending.remove(&user).is_some() {
            debug!("User {} discarded a staged submission", user);
        }
    }

    /// Removes and returns the user's staged content.
    pub async fn take_pending(&self, user: UserId) -> Result<PendingSubmission, SubmissionError> {
        self.inner
            .lock()
            .await
            .pending
            .remove(&user)
            .ok_or(SubmissionError::SubmissionNotFound)
    }

    /// Current phase of a user.
    pub async fn phase(&self, user: UserId) -> Phase {
        self.inner
            .lock()
            .await
            .phases
            .get(&user)
            .copied()
            .unwrap_or_default()
    }

    /// Whether the user has content waiting for a category.
    pub async fn has_pending(&self, user: UserId) -> bool {
        self.inner.lock().await.pending.contains_key(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Category, LimitSettings};
    use crate::submission::{Post, MISSING_CAPTION};

    const USER: UserId = UserId(7);

    fn session() -> SubmissionSession {
        SubmissionSession::new(RateLimiter::new(LimitSettings::default(), None))
    }

    fn text(body: &str) -> Content {
        Content::Text { body: body.to_owned() }
    }

    fn photo(caption: &str) -> Content {
        Content::Photo {
            media: "photo-id".to_owned(),
            caption: Some(caption.to_owned()),
        }
    }

    fn video(caption: Option<&str>) -> Content {
        Content::Video {
            media: "video-id".to_owned(),
            caption: caption.map(ToOwned::to_owned),
        }
    }

    #[tokio::test]
    async fn test_choose_moves_to_awaiting() {
        let session = session();
        session.start(USER).await;
        assert_eq!(session.phase(USER).await, Phase::Idle);

        session.choose(USER, ContentType::Photo).await.unwrap();
        assert_eq!(session.phase(USER).await, Phase::Awaiting(ContentType::Photo));
    }

    #[tokio::test]
    async fn test_choose_while_awaiting_is_refused() {
        let session = session();
        session.choose(USER, ContentType::Text).await.unwrap();

        let err = session.choose(USER, ContentType::Video).await.unwrap_err();
        assert_eq!(err, SubmissionError::SubmissionInProgress(ContentType::Text));
        assert_eq!(session.phase(USER).await, Phase::Awaiting(ContentType::Text));
        // The refused choice did not consume video quota
        assert_eq!(session.limiter().remaining(USER, ContentType::Video).await, 2);
    }

    #[tokio::test]
    async fn test_rate_limited_choice_stays_idle() {
        let session = session();
        for _ in 0..2 {
            session.choose(USER, ContentType::Photo).await.unwrap();
            session.back(USER).await;
        }

        let err = session.choose(USER, ContentType::Photo).await.unwrap_err();
        assert_eq!(err, SubmissionError::RateLimitExceeded(ContentType::Photo));
        assert_eq!(session.phase(USER).await, Phase::Idle);
    }

    #[tokio::test]
    async fn test_content_while_idle_is_ignored() {
        let session = session();
        let result = session.capture(USER, "Anna", text("hello"), None).await;
        assert_eq!(result, Ok(Capture::Ignored));
        assert!(!session.has_pending(USER).await);
    }

    #[tokio::test]
    async fn test_wrong_content_type_keeps_phase() {
        let session = session();
        session.choose(USER, ContentType::Photo).await.unwrap();

        let err = session.capture(USER, "Anna", text("hello"), None).await.unwrap_err();
        assert_eq!(
            err,
            SubmissionError::ValidationFailed(ValidationError::WrongContentType {
                expected: ContentType::Photo,
                received: ContentType::Text,
            })
        );
        assert_eq!(session.phase(USER).await, Phase::Awaiting(ContentType::Photo));
    }

    #[tokio::test]
    async fn test_photo_while_awaiting_video_keeps_phase() {
        let session = session();
        session.choose(USER, ContentType::Video).await.unwrap();

        let err = session.capture(USER, "Anna", photo("nice"), None).await.unwrap_err();
        assert_eq!(
            err,
            SubmissionError::ValidationFailed(ValidationError::WrongContentType {
                expected: ContentType::Video,
                received: ContentType::Photo,
            })
        );
        assert_eq!(session.phase(USER).await, Phase::Awaiting(ContentType::Video));
        assert!(!session.has_pending(USER).await);
    }

    #[tokio::test]
    async fn test_video_without_caption_is_staged() {
        let session = session();
        session.choose(USER, ContentType::Video).await.unwrap();

        let staged = session.capture(USER, "Anna", video(None), None).await;
        assert_eq!(staged, Ok(Capture::Staged(ContentType::Video)));
        assert_eq!(session.phase(USER).await, Phase::Idle);

        let post = session
            .take_pending(USER)
            .await
            .unwrap()
            .render(&Category::new("город"), "TestBot");
        let Post::Video { media, caption } = post else {
            panic!("expected a video post, got {post:?}");
        };
        assert_eq!(media, "video-id");
        assert!(caption.contains(MISSING_CAPTION));
        assert!(caption.contains("#город"));
    }

    #[tokio::test]
    async fn test_video_album_is_refused() {
        let session = session();
        session.choose(USER, ContentType::Video).await.unwrap();

        let first = session.capture(USER, "Anna", video(Some("a")), Some("album-9")).await;
        assert_eq!(
            first,
            Err(SubmissionError::ValidationFailed(ValidationError::AlbumNotAllowed))
        );
        assert_eq!(session.phase(USER).await, Phase::Awaiting(ContentType::Video));
    }

    #[tokio::test]
    async fn test_text_limit() {
        let session = session();
        session.choose(USER, ContentType::Text).await.unwrap();

        let err = session
            .capture(USER, "Anna", text(&"я".repeat(501)), None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SubmissionError::ValidationFailed(ValidationError::TextTooLong {
                length: 501,
                limit: 500
            })
        );
        assert_eq!(session.phase(USER).await, Phase::Awaiting(ContentType::Text));

        let ok = session.capture(USER, "Anna", text(&"я".repeat(500)), None).await;
        assert_eq!(ok, Ok(Capture::Staged(ContentType::Text)));
        assert_eq!(session.phase(USER).await, Phase::Idle);
    }

    #[tokio::test]
    async fn test_album_warned_once() {
        let session = session();
        session.choose(USER, ContentType::Photo).await.unwrap();

        let first = session.capture(USER, "Anna", photo("a"), Some("album-1")).await;
        assert_eq!(
            first,
            Err(SubmissionError::ValidationFailed(ValidationError::AlbumNotAllowed))
        );
        let second = session.capture(USER, "Anna", photo("b"), Some("album-1")).await;
        assert_eq!(second, Ok(Capture::Ignored));

        assert_eq!(session.phase(USER).await, Phase::Awaiting(ContentType::Photo));
        assert!(!session.has_pending(USER).await);
    }

    #[tokio::test]
    async fn test_capture_then_take_once() {
        let session = session();
        session.choose(USER, ContentType::Photo).await.unwrap();
        session.capture(USER, "Anna", photo("nice"), None).await.unwrap();

        let pending = session.take_pending(USER).await.unwrap();
        assert_eq!(pending.content, photo("nice"));
        assert_eq!(pending.submitter_name, "Anna");

        assert_eq!(
            session.take_pending(USER).await,
            Err(SubmissionError::SubmissionNotFound)
        );
    }

    #[tokio::test]
    async fn test_back_clears_phase_and_pending() {
        let session = session();
        session.choose(USER, ContentType::Text).await.unwrap();
        session.capture(USER, "Anna", text("tip"), None).await.unwrap();
        session.choose(USER, ContentType::Video).await.unwrap();

        session.back(USER).await;
        assert_eq!(session.phase(USER).await, Phase::Idle);
        assert!(!session.has_pending(USER).await);
    }

    #[test]
    fn test_seen_albums_evicts_oldest() {
        let mut albums = SeenAlbums::new(2);
        assert!(albums.first_sighting("a"));
        assert!(albums.first_sighting("b"));
        assert!(!albums.first_sighting("a"));
        assert!(albums.first_sighting("c"));
        // "a" was evicted to make room for "c"
        assert!(albums.first_sighting("a"));
        assert!(!albums.first_sighting("c"));
    }
}
