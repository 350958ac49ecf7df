//! Free-text search handler and the shared result renderer.
//!
//! Every non-command private message lands here. Besides plain searches
//! the handler intercepts two stateful flows: payment screenshots while a
//! rendezvous is live, and promo-post content the admin was asked for.

use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode,
};
use teloxide::{ApiError, RequestError};
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::models::{Category, Quality};
use crate::search::filter::{clamp_page, total_pages};
use crate::search::SearchFilter;
use crate::ui::{render_results, BrowseState};

/// Where a rendered result page goes.
pub enum RenderTarget {
    /// A fresh search: send a new message.
    NewMessage(ChatId),
    /// A browse interaction: edit the existing results message in place.
    Edit { chat_id: ChatId, message_id: MessageId },
}

pub async fn message_handler(
    bot: ThrottledBot,
    msg: Message,
    state: AppState,
) -> anyhow::Result<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    // Promo content requested via /link.
    if state.is_admin(user_id) {
        if let Some(deep_link) = state.pending_posts.remove(&user_id) {
            return publish_promo_post(&bot, &state, &msg, &deep_link).await;
        }
    }

    // A live payment rendezvous swallows everything from this user: a
    // photo becomes the screenshot signal, anything else is removed so
    // the prompt stays visible.
    if state.pending_payments.has_pending(user_id) {
        if msg.photo().is_some() {
            state.pending_payments.notify_screenshot(user_id, msg.id);
        } else {
            let _ = bot.delete_message(msg.chat.id, msg.id).await;
        }
        return Ok(());
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };

    // Unrecognized commands fall through the command branch to here.
    if text.starts_with('/') {
        bot.send_message(msg.chat.id, state.messages.unknown_command)
            .await?;
        return Ok(());
    }

    let query = text.trim();
    if query.chars().count() < 2 {
        bot.send_message(msg.chat.id, state.messages.query_too_short)
            .await?;
        return Ok(());
    }

    if !state.users.has_accepted_privacy(user_id).await? {
        state.pending_searches.insert(user_id, query.to_string());
        return super::send_privacy_policy(&bot, &state, msg.chat.id, user_id).await;
    }

    info!("Search from user {}: '{}'", user_id, query);
    render_page(
        &bot,
        &state,
        RenderTarget::NewMessage(msg.chat.id),
        &BrowseState::new(query),
    )
    .await
}

/// Render one result page into `target`.
///
/// For a fresh search with zero matches this sends the no-results notice;
/// a filtered-down-to-zero browse view instead keeps the keyboard so the
/// user can toggle the facet back off.
pub async fn render_page(
    bot: &ThrottledBot,
    state: &AppState,
    target: RenderTarget,
    browse: &BrowseState,
) -> anyhow::Result<()> {
    let per_page = state.config.results_per_page;
    let filter = SearchFilter::with_facets(&browse.query, browse.category, browse.quality);

    let match_count = state.catalogue.count(&filter).await?;
    if match_count == 0 {
        if let RenderTarget::NewMessage(chat_id) = target {
            bot.send_message(chat_id, state.messages.no_results(&browse.query))
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }
    }

    let pages = total_pages(match_count, per_page);
    let page = clamp_page(browse.page as i64, pages);
    let items = state.catalogue.find_page(&filter, page, per_page).await?;
    let quality_counts = state.catalogue.quality_counts(&filter).await?;
    let category_counts = state.catalogue.category_counts(&filter).await?;

    let browse = BrowseState {
        query: browse.query.clone(),
        page,
        category: browse.category,
        quality: browse.quality,
    };
    let keyboard = render_results(
        &items,
        match_count,
        per_page,
        &browse,
        &quality_counts,
        &category_counts,
        &state.messages,
    );

    let text = match state.enrichment.lookup(&browse.query).await {
        Some(details) => details.caption(),
        None => state.messages.search_header(&browse.query),
    };

    match target {
        RenderTarget::NewMessage(chat_id) => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await?;
        }
        RenderTarget::Edit { chat_id, message_id } => {
            let result = bot
                .edit_message_text(chat_id, message_id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboard)
                .await;
            match result {
                Ok(_) => {}
                // Same page, same state: nothing to change.
                Err(RequestError::Api(ApiError::MessageNotModified)) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

/// Re-render helper used by the browse callbacks.
pub async fn render_page_with(
    bot: &ThrottledBot,
    state: &AppState,
    chat_id: ChatId,
    message_id: MessageId,
    query: String,
    page: i64,
    category: Option<Category>,
    quality: Option<Quality>,
) -> anyhow::Result<()> {
    let browse = BrowseState {
        query,
        page: page.max(0) as u64,
        category,
        quality,
    };
    render_page(
        bot,
        state,
        RenderTarget::Edit { chat_id, message_id },
        &browse,
    )
    .await
}

/// Copy the admin's message to the main channel with the deep-link button.
async fn publish_promo_post(
    bot: &ThrottledBot,
    state: &AppState,
    msg: &Message,
    deep_link: &str,
) -> anyhow::Result<()> {
    let Some(main_channel_id) = state.config.main_channel_id else {
        warn!("MAIN_CHANNEL_ID is not set, dropping promo post");
        bot.send_message(msg.chat.id, state.messages.generic_failure)
            .await?;
        return Ok(());
    };

    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        state.messages.button_deep_link,
        deep_link.parse()?,
    )]]);

    bot.copy_message(ChatId(main_channel_id), msg.chat.id, msg.id)
        .reply_markup(keyboard)
        .await?;

    info!("Promo post published to channel {}", main_channel_id);
    bot.send_message(msg.chat.id, state.messages.post_sent)
        .await?;
    Ok(())
}
