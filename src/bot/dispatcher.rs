//! Message dispatcher setup.
//!
//! Builds the dispatcher with all command, message, channel-post and
//! callback handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::config::Config;
use crate::database::{CatalogueRepo, Database, UserRepo};
use crate::enrichment::Enrichment;
use crate::events;
use crate::payment::PendingPayments;
use crate::plugins;
use crate::ui::Messages;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Catalogue repository (indexed media files).
    pub catalogue: Arc<CatalogueRepo>,

    /// User repository (privacy flag + subscription record).
    pub users: Arc<UserRepo>,

    /// Live payment rendezvous registry (process memory only).
    pub pending_payments: Arc<PendingPayments>,

    /// TMDB enrichment client.
    pub enrichment: Enrichment,

    /// Message templates and button labels.
    pub messages: Arc<Messages>,

    /// Application configuration.
    pub config: Arc<Config>,

    /// Bot username (without @) for deep link construction.
    pub bot_username: String,

    /// Searches stashed while the privacy gate is open, replayed on
    /// acceptance. Keyed by user id.
    pub pending_searches: Cache<i64, String>,

    /// Deep links awaiting promo content from the admin.
    pub pending_posts: Cache<i64, String>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Arc<Database>, config: Arc<Config>, bot_username: String) -> Self {
        let session_cache = || {
            Cache::builder()
                .max_capacity(10_000)
                .time_to_live(Duration::from_secs(1800))
                .build()
        };

        Self {
            catalogue: Arc::new(CatalogueRepo::new(&db)),
            users: Arc::new(UserRepo::new(&db)),
            pending_payments: Arc::new(PendingPayments::new()),
            enrichment: Enrichment::new(config.tmdb_api_key.clone()),
            messages: Arc::new(Messages::default()),
            config,
            bot_username,
            pending_searches: session_cache(),
            pending_posts: session_cache(),
        }
    }

    /// Check if a user is the bot admin.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.config.admin_id == user_id
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    db: Arc<Database>,
    config: Arc<Config>,
    bot_username: String,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    let state = AppState::new(db, config, bot_username);

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    use teloxide::dispatching::UpdateFilterExt;

    // Private messages: commands first, then the free-text/photo handler
    // (which also intercepts pending-payment screenshots).
    let message_handler = Update::filter_message()
        .branch(plugins::command_handler())
        .branch(dptree::endpoint(plugins::search::message_handler));

    // Feed channel: new and edited video posts feed the catalogue.
    let channel_handler = Update::filter_channel_post()
        .branch(dptree::endpoint(events::feed::channel_post_handler));
    let edited_channel_handler = Update::filter_edited_channel_post()
        .branch(dptree::endpoint(events::feed::channel_post_handler));

    let callback_handler = Update::filter_callback_query()
        .branch(dptree::endpoint(plugins::browse::callback_handler));

    dptree::entry()
        .branch(message_handler)
        .branch(channel_handler)
        .branch(edited_channel_handler)
        .branch(callback_handler)
}
