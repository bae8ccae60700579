//! Moderator-side handling: the queue of submissions awaiting a decision
//! and the actions a moderator can take on them.

mod actions;
mod queue;

pub use actions::{ModeratorAction, RejectReason};
pub use queue::{MessageKey, ModerationError, ModerationItem, ModerationQueue};
