//! Submission Bot - Main Entry Point
//!
//! A Telegram bot that accepts text, photo and video posts from users,
//! forwards them to a moderator and publishes approved ones to a channel.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use secrecy::ExposeSecret;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use submission_bot::config::{CategoryConfig, LimitSettings, TelegramConfig};
use submission_bot::dispatch::{notices, Dispatcher, Messenger};
use submission_bot::submission::{RateLimiter, SubmissionSession};
use submission_bot::telegram::{PollerMessage, TelegramMessenger, UpdatePoller};

/// Telegram bot for moderated channel submissions.
#[derive(Parser, Debug)]
#[command(name = "submission_bot")]
#[command(about = "Collect user posts, moderate them and publish to a channel")]
#[command(version)]
struct Args {
    /// Path to the categories JSON file. Built-in categories are used if it does not exist.
    #[arg(short, long, default_value = "categories.json")]
    categories: String,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Generate an example categories file and exit.
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    if args.generate_config {
        return generate_example_config();
    }

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let tg_config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;

    let limits = LimitSettings::from_env_with_defaults();

    let categories = CategoryConfig::load_or_default(&args.categories)
        .context("Failed to load categories configuration")?;
    categories
        .validate()
        .context("Categories configuration validation failed")?;

    info!(
        "Loaded {} categories, quotas text/photo/video = {}/{}/{} per {}h",
        categories.len(),
        limits.text_quota,
        limits.photo_quota,
        limits.video_quota,
        limits.window_hours()
    );

    // Connect to Telegram
    let bot = Bot::new(tg_config.token.expose_secret());
    let me = bot.get_me().await.context("Failed to connect to Telegram")?;

    let bot_username = tg_config
        .bot_username
        .clone()
        .or_else(|| me.username.clone())
        .context("Bot username is unknown; set BOT_USERNAME")?;

    if let Err(e) = bot.delete_webhook().send().await {
        warn!("Failed to delete webhook: {}", e);
    }

    info!("Connected to Telegram as @{}", bot_username);

    let messenger = TelegramMessenger::new(bot.clone(), tg_config.admin_id, ChatId(tg_config.channel_id));
    let session = SubmissionSession::new(RateLimiter::new(limits, Some(tg_config.admin_id)));
    let dispatcher = Arc::new(Dispatcher::new(messenger, session, categories, bot_username));

    if let Err(e) = dispatcher
        .messenger()
        .send_to_user(tg_config.admin_id, notices::STARTUP, None)
        .await
    {
        warn!("Failed to send startup notice to the moderator: {}", e);
    }

    // Create poller channel
    let (poller_tx, poller_rx) = mpsc::channel::<PollerMessage>(1);
    let poller = UpdatePoller::new(bot, Arc::clone(&dispatcher));

    let poller_handle = tokio::spawn(async move {
        poller.run(poller_rx).await;
    });

    info!("Bot is running. Use Ctrl+C to stop.");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    info!("Received Ctrl+C, shutting down...");

    let _ = poller_tx.send(PollerMessage::Shutdown).await;
    let _ = poller_handle.await;

    let pending = dispatcher.queue().len().await;
    if pending > 0 {
        warn!("{} submissions were awaiting moderation and are discarded", pending);
    }

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Generates an example categories file.
fn generate_example_config() -> Result<()> {
    CategoryConfig::default().save_to_file("categories.example.json")?;

    println!("✓ Example categories written to: categories.example.json");
    println!("\nTo use this bot:");
    println!("1. Copy categories.example.json to categories.json and edit the tags");
    println!("2. Create a .env file with BOT_TOKEN, ADMIN_ID and CHANNEL_ID");
    println!("3. Run: submission_bot");

    Ok(())
}
