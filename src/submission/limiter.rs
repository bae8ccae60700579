//! Per-user submission rate limiter.
//!
//! Counts how many posts of each content type a user started within a
//! sliding window. Old entries are pruned lazily on every check.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use super::{ContentType, UserId};
use crate::config::LimitSettings;

/// Sliding-window rate limiter with an independent quota per content type.
#[derive(Debug)]
pub struct RateLimiter {
    /// Exempt from limits and never recorded.
    admin: Option<UserId>,

    /// Quotas and window length.
    limits: LimitSettings,

    /// Recorded attempts per user.
    windows: Mutex<HashMap<UserId, Vec<(ContentType, Instant)>>>,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    #[must_use]
    pub fn new(limits: LimitSettings, admin: Option<UserId>) -> Self {
        Self {
            admin,
            limits,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Checks the quota and records the attempt if it is allowed.
    pub async fn allow(&self, user: UserId, content_type: ContentType) -> bool {
        self.allow_at(user, content_type, Instant::now()).await
    }

    /// Same as [`allow`](Self::allow) with an explicit clock reading.
    pub async fn allow_at(&self, user: UserId, content_type: ContentType, now: Instant) -> bool {
        if self.admin == Some(user) {
            return true;
        }

        let quota = self.limits.quota(content_type);
        let mut windows = self.windows.lock().await;
        let entries = windows.entry(user).or_default();
        prune(entries, now, self.limits.window);

        let used = entries.iter().filter(|(ct, _)| *ct == content_type).count();
        if used >= quota {
            debug!(
                "Rate limit hit for user {} ({}): {}/{}",
                user, content_type, used, quota
            );
            if entries.is_empty() {
                windows.remove(&user);
            }
            return false;
        }

        entries.push((content_type, now));
        true
    }

    /// Returns how many more posts of this type the user may start right now.
    pub async fn remaining(&self, user: UserId, content_type: ContentType) -> usize {
        self.remaining_at(user, content_type, Instant::now()).await
    }

    /// Same as [`remaining`](Self::remaining) with an explicit clock reading.
    pub async fn remaining_at(&self, user: UserId, content_type: ContentType, now: Instant) -> usize {
        let quota = self.limits.quota(content_type);
        if self.admin == Some(user) {
            return quota;
        }

        let mut windows = self.windows.lock().await;
        let Some(entries) = windows.get_mut(&user) else {
            return quota;
        };
        prune(entries, now, self.limits.window);

        let used = entries.iter().filter(|(ct, _)| *ct == content_type).count();
        if entries.is_empty() {
            windows.remove(&user);
        }
        quota.saturating_sub(used)
    }

    /// Number of users with live window entries.
    pub async fn tracked_users(&self) -> usize {
        self.windows.lock().await.len()
    }

    /// The limits this limiter enforces.
    #[must_use]
    pub const fn limits(&self) -> &LimitSettings {
        &self.limits
    }
}

/// Drops entries that fell out of the window.
fn prune(entries: &mut Vec<(ContentType, Instant)>, now: Instant, window: Duration) {
    entries.retain(|(_, at)| now.saturating_duration_since(*at) < window);
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: UserId = UserId(42);
    const ADMIN: UserId = UserId(1);

    fn limiter() -> RateLimiter {
        RateLimiter::new(LimitSettings::default(), Some(ADMIN))
    }

    #[tokio::test]
    async fn test_quota_reached() {
        let limiter = limiter();
        let now = Instant::now();

        assert!(limiter.allow_at(USER, ContentType::Photo, now).await);
        assert!(limiter.allow_at(USER, ContentType::Photo, now).await);
        assert!(!limiter.allow_at(USER, ContentType::Photo, now).await);
        assert_eq!(limiter.remaining_at(USER, ContentType::Photo, now).await, 0);
    }

    #[tokio::test]
    async fn test_denied_attempt_is_not_recorded() {
        let limiter = limiter();
        let start = Instant::now();

        assert!(limiter.allow_at(USER, ContentType::Text, start).await);
        assert!(limiter.allow_at(USER, ContentType::Text, start).await);
        for _ in 0..5 {
            assert!(!limiter.allow_at(USER, ContentType::Text, start).await);
        }

        // Only the two accepted entries age out, so both slots free up together
        let later = start + Duration::from_secs(12 * 3600);
        assert_eq!(limiter.remaining_at(USER, ContentType::Text, later).await, 2);
    }

    #[tokio::test]
    async fn test_quotas_are_independent_per_type() {
        let limiter = limiter();
        let now = Instant::now();

        assert!(limiter.allow_at(USER, ContentType::Text, now).await);
        assert!(limiter.allow_at(USER, ContentType::Text, now).await);
        assert!(!limiter.allow_at(USER, ContentType::Text, now).await);

        assert!(limiter.allow_at(USER, ContentType::Photo, now).await);
        assert!(limiter.allow_at(USER, ContentType::Video, now).await);
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = limiter();
        let start = Instant::now();

        assert!(limiter.allow_at(USER, ContentType::Video, start).await);
        let second = start + Duration::from_secs(6 * 3600);
        assert!(limiter.allow_at(USER, ContentType::Video, second).await);

        // First entry still inside the window
        let almost = start + Duration::from_secs(12 * 3600 - 1);
        assert!(!limiter.allow_at(USER, ContentType::Video, almost).await);

        // First entry expired, second still counts
        let expired = start + Duration::from_secs(12 * 3600);
        assert!(limiter.allow_at(USER, ContentType::Video, expired).await);
        assert!(!limiter.allow_at(USER, ContentType::Video, expired).await);
    }

    #[tokio::test]
    async fn test_admin_is_exempt_and_not_recorded() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..10 {
            assert!(limiter.allow_at(ADMIN, ContentType::Photo, now).await);
        }
        assert_eq!(limiter.tracked_users().await, 0);
    }

    #[tokio::test]
    async fn test_expired_users_are_forgotten() {
        let limiter = limiter();
        let start = Instant::now();

        assert!(limiter.allow_at(USER, ContentType::Text, start).await);
        assert_eq!(limiter.tracked_users().await, 1);

        let later = start + Duration::from_secs(13 * 3600);
        assert_eq!(limiter.remaining_at(USER, ContentType::Text, later).await, 2);
        assert_eq!(limiter.tracked_users().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_checks_respect_quota() {
        let limiter = std::sync::Arc::new(limiter());
        let now = Instant::now();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = std::sync::Arc::clone(&limiter);
                tokio::spawn(async move { limiter.allow_at(USER, ContentType::Photo, now).await })
            })
            .collect();

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 2);
    }
}
