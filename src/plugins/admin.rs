//! Admin commands: /delete and /link.
//!
//! Both are silently ignored for everyone but the configured admin, so
//! regular users cannot probe for them.

use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode,
};
use tracing::{debug, info};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::ui::CallbackAction;
use crate::utils::{deep_link_url, encode_deep_link};

/// Delete catalogue items by id: `/delete 10`, `/delete 10-12`,
/// `/delete 1,5,9`. Removes both the index entries and the feed-channel
/// messages they point at.
pub async fn delete_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if !state.is_admin(user.id.0 as i64) {
        debug!("Ignoring /delete from non-admin {}", user.id);
        return Ok(());
    }

    let Some(ids) = parse_id_spec(args.trim()) else {
        bot.send_message(msg.chat.id, state.messages.delete_usage)
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    };

    let deleted = state.catalogue.delete_many(&ids).await?;

    // The feed-channel messages share their ids with the catalogue
    // entries. Already-gone messages are not an error.
    let feed_chat = ChatId(state.config.feed_channel_id);
    for id in &ids {
        let _ = bot.delete_message(feed_chat, MessageId(*id as i32)).await;
    }

    info!("Admin deleted {} of {} requested item(s)", deleted, ids.len());
    bot.send_message(msg.chat.id, state.messages.delete_confirmation(deleted))
        .await?;
    Ok(())
}

/// Build a promo deep link for a title: `/link Inception`.
///
/// Replies with the link and a yes/no prompt; on yes the next admin
/// message becomes the promo post (see the message handler).
pub async fn link_command(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
    args: String,
) -> anyhow::Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if !state.is_admin(user.id.0 as i64) {
        debug!("Ignoring /link from non-admin {}", user.id);
        return Ok(());
    }

    let title = args.trim();
    if title.is_empty() {
        bot.send_message(msg.chat.id, state.messages.link_no_title)
            .parse_mode(ParseMode::Html)
            .await?;
        return Ok(());
    }

    let deep_link = deep_link_url(&state.bot_username, title);
    let keyboard = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            state.messages.button_yes,
            CallbackAction::PostYes {
                payload: encode_deep_link(title),
            }
            .encode(),
        ),
        InlineKeyboardButton::callback(state.messages.button_no, CallbackAction::PostNo.encode()),
    ]]);

    bot.send_message(msg.chat.id, state.messages.link_prompt(&deep_link))
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// Upper bound on ids a single range may expand to.
const MAX_RANGE_SPAN: i64 = 1000;

/// Parse an id spec: a single id, an inclusive `from-to` range, or a
/// comma-separated list. Returns `None` on anything malformed, including
/// an inverted range or one wider than `MAX_RANGE_SPAN`.
fn parse_id_spec(spec: &str) -> Option<Vec<i64>> {
    if spec.is_empty() {
        return None;
    }

    if let Some((from, to)) = spec.split_once('-') {
        let from: i64 = from.trim().parse().ok()?;
        let to: i64 = to.trim().parse().ok()?;
        if from > to || to.saturating_sub(from) >= MAX_RANGE_SPAN {
            return None;
        }
        return Some((from..=to).collect());
    }

    if spec.contains(',') {
        return spec
            .split(',')
            .map(|part| part.trim().parse().ok())
            .collect();
    }

    spec.parse().ok().map(|id| vec![id])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_id() {
        assert_eq!(parse_id_spec("10"), Some(vec![10]));
    }

    #[test]
    fn test_inclusive_range() {
        assert_eq!(parse_id_spec("10-12"), Some(vec![10, 11, 12]));
    }

    #[test]
    fn test_comma_list_with_spaces() {
        assert_eq!(parse_id_spec("1, 5,9"), Some(vec![1, 5, 9]));
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert_eq!(parse_id_spec("12-10"), None);
    }

    #[test]
    fn test_oversized_range_rejected() {
        assert_eq!(parse_id_spec("1-9999999999"), None);
        // The widest permitted span still expands.
        assert_eq!(parse_id_spec("1-1000").map(|v| v.len()), Some(1000));
        assert_eq!(parse_id_spec("1-1001"), None);
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(parse_id_spec(""), None);
        assert_eq!(parse_id_spec("abc"), None);
        assert_eq!(parse_id_spec("1,two,3"), None);
    }
}
