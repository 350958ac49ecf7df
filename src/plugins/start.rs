//! The /start command, with optional deep-link payload.

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, info};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::ui::BrowseState;
use crate::utils::decode_deep_link;

use super::search::{render_page, RenderTarget};

pub async fn start_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    // A deep link carries an encoded query; a plain /start carries none.
    // Garbage payloads degrade to the welcome message.
    let query = match args.trim() {
        "" => None,
        payload => match decode_deep_link(payload) {
            Ok(query) => Some(query),
            Err(e) => {
                debug!("Undecodable start payload from user {}: {}", user_id, e);
                None
            }
        },
    };

    if !state.users.has_accepted_privacy(user_id).await? {
        if let Some(query) = &query {
            state.pending_searches.insert(user_id, query.clone());
        }
        return super::send_privacy_policy(&bot, &state, msg.chat.id, user_id).await;
    }

    match query {
        Some(query) => {
            info!("Deep-link search from user {}: '{}'", user_id, query);
            render_page(
                &bot,
                &state,
                RenderTarget::NewMessage(msg.chat.id),
                &BrowseState::new(query),
            )
            .await
        }
        None => {
            bot.send_message(msg.chat.id, state.messages.start)
                .parse_mode(ParseMode::Html)
                .await?;
            Ok(())
        }
    }
}
