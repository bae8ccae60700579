//! Event routing.
//!
//! Converts inbound events into session and queue operations and drives
//! outbound actions through a [`Messenger`].

mod dispatcher;
mod events;
mod messenger;
pub mod notices;

pub use dispatcher::Dispatcher;
pub use events::{choice_label, CallbackAnswer, InboundEvent, UserCommand, BACK_LABEL};
pub use messenger::{Keyboard, Messenger, TransportError};
