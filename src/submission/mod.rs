//! User-side submission handling.
//!
//! Tracks what each user is currently submitting, enforces the per-type
//! quota and stages accepted content until a category is chosen.

mod content;
mod limiter;
mod session;

pub use content::{escape_html, Content, ContentType, PendingSubmission, Post, UserId, MISSING_CAPTION};
pub use limiter::RateLimiter;
pub use session::{Capture, Phase, SubmissionError, SubmissionSession, ValidationError};
