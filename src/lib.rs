//! Submission Bot Library
//!
//! A Telegram bot that collects posts from users and republishes them to a
//! channel after moderation.
//!
//! This crate provides the core functionality for:
//! - Rate limiting submissions per user and content type
//! - Walking users through choosing, sending and tagging a post
//! - Queueing tagged posts for a moderator and resolving each exactly once
//! - Talking to Telegram through the Bot API

pub mod config;
pub mod dispatch;
pub mod moderation;
pub mod submission;
pub mod telegram;
