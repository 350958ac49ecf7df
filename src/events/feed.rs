//! Catalogue ingestion from the feed channel.
//!
//! Every video posted (or edited) in the feed channel becomes a catalogue
//! item keyed by its message id. Category and quality are inferred from
//! caption tokens at ingestion time; an edit re-upserts the item under the
//! same id.

use teloxide::prelude::*;
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::models::CatalogueItem;
use crate::utils::format_file_size;

/// Handle a new or edited post in the feed channel.
pub async fn channel_post_handler(
    _bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if msg.chat.id.0 != state.config.feed_channel_id {
        return Ok(());
    }

    let Some(video) = msg.video() else {
        return Ok(());
    };

    let caption = msg.caption().unwrap_or("");
    let item = CatalogueItem::from_feed_post(
        msg.id.0 as i64,
        caption,
        format_file_size(video.file.size as u64),
    );

    match state.catalogue.upsert(&item).await {
        Ok(()) => info!(
            "Indexed catalogue item {} ({:?}/{:?})",
            item.id, item.category, item.quality
        ),
        Err(e) => warn!("Failed to index feed post {}: {}", msg.id.0, e),
    }

    Ok(())
}
