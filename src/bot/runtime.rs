//! Bot runtime - long-polling runner.

use teloxide::prelude::*;
use tracing::info;

use super::dispatcher::ThrottledBot;

/// Run the bot with long polling.
///
/// The polling update listener owns transport reconnection: a dropped
/// getUpdates connection is retried with backoff inside teloxide, so
/// per-event handler failures are the only errors that surface here (they
/// are logged by the dispatcher's error handler and never fatal).
pub async fn run(
    mut dispatcher: Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey>,
) {
    info!("Starting bot in polling mode...");
    dispatcher.dispatch().await;
}
