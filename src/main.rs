//! Cinevault - media catalogue bot.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB integration (catalogue + users)
//! - `search` - Query normalization and store filters
//! - `ui` - Callback wire format, keyboards, message templates
//! - `enrichment` - TMDB title details for result headers
//! - `subscription` - Trial/paid access gate
//! - `payment` - In-memory payment rendezvous
//! - `bot` - Dispatcher wiring and runtime (with Throttle for rate limiting)
//! - `plugins` - Command and callback handlers
//! - `events` - Feed-channel ingestion
//! - `utils` - Utility functions

mod bot;
mod config;
mod database;
mod enrichment;
mod events;
mod payment;
mod plugins;
mod search;
mod subscription;
mod ui;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use database::Database;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // Default to "info" for our crate when RUST_LOG is not set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cinevault=info,teloxide=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting cinevault bot...");

    let config = Arc::new(Config::from_env());
    info!("Configuration loaded successfully");

    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    let db = Arc::new(db);
    info!("Database connected");

    // Throttle keeps us inside Telegram's rate limits (30 msg/s global,
    // 1 msg/s per chat).
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    let bot_username = config
        .bot_username
        .clone()
        .unwrap_or_else(|| me.username().to_string());
    info!("Using bot username: @{}", bot_username);

    let dispatcher = bot::build_dispatcher(bot, db, config, bot_username);
    bot::run(dispatcher).await;

    Ok(())
}
