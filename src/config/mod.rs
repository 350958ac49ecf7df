//! Configuration module for the cinevault bot.
//!
//! Loads configuration from environment variables.

use std::env;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,

    /// Bot username (without @) for deep link construction.
    /// Optional - will be fetched via getMe if not set.
    pub bot_username: Option<String>,

    /// Admin user ID. The admin ingests files, approves payments and
    /// runs /delete and /link.
    pub admin_id: i64,

    /// Channel the catalogue is fed from. New video posts in this channel
    /// are indexed; /delete removes messages from it.
    pub feed_channel_id: i64,

    /// Channel promotional deep-link posts are published to.
    pub main_channel_id: Option<i64>,

    /// Message id (in the feed channel) of the payment QR image.
    /// Payment prompts are sent without an image when unset.
    pub qr_photo_id: Option<i32>,

    /// Payee handle shown in the payment prompt.
    pub payment_id: Option<String>,

    /// TMDB API key. Enrichment is disabled when unset.
    pub tmdb_api_key: Option<String>,

    /// Search results per page.
    pub results_per_page: u32,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if required environment variables are not set or malformed.
    /// This runs before the bot accepts traffic, so a bad environment
    /// aborts startup instead of failing per-event later.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_id = env::var("ADMIN_ID")
            .expect("ADMIN_ID must be set")
            .trim()
            .parse::<i64>()
            .expect("ADMIN_ID must be an integer user id");

        let feed_channel_id = env::var("FEED_CHANNEL_ID")
            .expect("FEED_CHANNEL_ID must be set")
            .trim()
            .parse::<i64>()
            .expect("FEED_CHANNEL_ID must be an integer chat id");

        let main_channel_id = env::var("MAIN_CHANNEL_ID")
            .ok()
            .map(|s| s.trim().parse::<i64>().expect("MAIN_CHANNEL_ID must be an integer chat id"));

        let qr_photo_id = env::var("QR_PHOTO_ID")
            .ok()
            .map(|s| s.trim().parse::<i32>().expect("QR_PHOTO_ID must be an integer message id"));

        let results_per_page = env::var("RESULTS_PER_PAGE")
            .ok()
            .map(|s| s.trim().parse::<u32>().expect("RESULTS_PER_PAGE must be a positive integer"))
            .unwrap_or(5);
        assert!(results_per_page > 0, "RESULTS_PER_PAGE must be at least 1");

        // Parse bot username (strip @ if present)
        let bot_username = env::var("BOT_USERNAME")
            .ok()
            .map(|s| s.trim_start_matches('@').to_string())
            .filter(|s| !s.is_empty());

        Self {
            bot_token: env::var("BOT_TOKEN").expect("BOT_TOKEN must be set"),
            bot_username,
            admin_id,
            feed_channel_id,
            main_channel_id,
            qr_photo_id,
            payment_id: env::var("PAYMENT_ID").ok().filter(|s| !s.is_empty()),
            tmdb_api_key: env::var("TMDB_API_KEY").ok().filter(|s| !s.is_empty()),
            results_per_page,
            mongodb_uri: env::var("MONGODB_URI").expect("MONGODB_URI must be set"),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "cinevault".to_string()),
        }
    }
}
