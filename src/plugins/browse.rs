//! Callback-query handler: result browsing, delivery, and payments.
//!
//! Every inline button in the bot lands here. The payload is parsed by
//! `CallbackAction::parse`; malformed payloads (old buttons, truncated
//! data) get a transient notice instead of an error.

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode,
};
use teloxide::{ApiError, RequestError};
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::payment::run_rendezvous;
use crate::subscription::{decide, paid_subscription, AccessDecision};
use crate::ui::{resolve_toggle, BrowseState, CallbackAction};
use crate::utils::decode_deep_link;

use super::search::{render_page, render_page_with, RenderTarget};

/// Subscription plans on offer: (days, price in ₹).
const PLANS: [(i64, i64); 4] = [(30, 40), (90, 120), (180, 240), (360, 480)];

pub async fn callback_handler(
    bot: ThrottledBot,
    q: CallbackQuery,
    state: AppState,
) -> anyhow::Result<()> {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let action = match CallbackAction::parse(&data) {
        Ok(action) => action,
        Err(e) => {
            warn!("Unparseable callback payload '{}': {}", data, e);
            bot.answer_callback_query(q.id.clone())
                .text(state.messages.transient_error)
                .await?;
            return Ok(());
        }
    };

    let user_id = q.from.id.0 as i64;
    if let Err(e) = handle_action(&bot, &state, &q, user_id, action).await {
        warn!("Callback '{}' failed for user {}: {:#}", data, user_id, e);
        let _ = bot
            .answer_callback_query(q.id.clone())
            .text(state.messages.generic_failure)
            .await;
    }
    Ok(())
}

async fn handle_action(
    bot: &ThrottledBot,
    state: &AppState,
    q: &CallbackQuery,
    user_id: i64,
    action: CallbackAction,
) -> anyhow::Result<()> {
    let messages = &state.messages;

    // Privacy acceptance comes before the gate itself.
    if let CallbackAction::AcceptPrivacy { user_id: uid } = &action {
        if *uid != user_id {
            bot.answer_callback_query(q.id.clone())
                .text(messages.transient_error)
                .await?;
            return Ok(());
        }

        state.users.accept_privacy(user_id).await?;
        if let Some(message) = q.message.as_ref() {
            edit_plain(bot, message.chat().id, message.id(), messages.privacy_accepted).await?;
        }
        bot.answer_callback_query(q.id.clone()).await?;

        // Replay the search that hit the gate.
        if let Some(query) = state.pending_searches.remove(&user_id) {
            render_page(
                bot,
                state,
                RenderTarget::NewMessage(ChatId(user_id)),
                &BrowseState::new(query),
            )
            .await?;
        }
        return Ok(());
    }

    if !state.users.has_accepted_privacy(user_id).await? {
        bot.answer_callback_query(q.id.clone()).await?;
        return super::send_privacy_policy(bot, state, ChatId(user_id), user_id).await;
    }

    match action {
        CallbackAction::Select { item_id } => {
            bot.answer_callback_query(q.id.clone()).await?;
            deliver_item(bot, state, user_id, item_id).await
        }

        CallbackAction::Page {
            query,
            page,
            category,
            quality,
        } => {
            if let Some(message) = q.message.as_ref() {
                render_page_with(
                    bot,
                    state,
                    message.chat().id,
                    message.id(),
                    query,
                    page,
                    category,
                    quality,
                )
                .await?;
            }
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }

        CallbackAction::Filter {
            query,
            category,
            quality,
            prev_category,
        } => {
            let category = resolve_toggle(category, prev_category);
            if let Some(message) = q.message.as_ref() {
                render_page_with(
                    bot,
                    state,
                    message.chat().id,
                    message.id(),
                    query,
                    0,
                    category,
                    quality,
                )
                .await?;
            }
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }

        CallbackAction::QualityToggle {
            query,
            quality,
            category,
            prev_quality,
        } => {
            let quality = resolve_toggle(quality, prev_quality);
            if let Some(message) = q.message.as_ref() {
                render_page_with(
                    bot,
                    state,
                    message.chat().id,
                    message.id(),
                    query,
                    0,
                    category,
                    quality,
                )
                .await?;
            }
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }

        CallbackAction::Close => {
            if let Some(message) = q.message.as_ref() {
                edit_plain(bot, message.chat().id, message.id(), messages.closed).await?;
            }
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }

        CallbackAction::Noop => {
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }

        CallbackAction::Recharge => {
            let keyboard = plan_keyboard(state);
            match q.message.as_ref() {
                Some(message) => {
                    bot.edit_message_text(
                        message.chat().id,
                        message.id(),
                        messages.recharge_prompt,
                    )
                    .parse_mode(ParseMode::Html)
                    .reply_markup(keyboard)
                    .await?;
                }
                None => {
                    bot.send_message(ChatId(user_id), messages.recharge_prompt)
                        .parse_mode(ParseMode::Html)
                        .reply_markup(keyboard)
                        .await?;
                }
            }
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }

        CallbackAction::Plan { days, amount } => {
            if let Some(message) = q.message.as_ref() {
                let _ = bot.delete_message(message.chat().id, message.id()).await;
            }
            bot.answer_callback_query(q.id.clone()).await?;

            // The dispatcher runs this user's updates in sequence, so the
            // wait must not hold the handler: spawn it, and let the
            // screenshot/cancel handlers reach it through the registry.
            let bot = bot.clone();
            let state = state.clone();
            tokio::spawn(async move {
                if let Err(e) = run_rendezvous(&bot, &state, user_id, days, amount).await {
                    warn!("Payment rendezvous for user {} failed: {:#}", user_id, e);
                }
            });
            Ok(())
        }

        CallbackAction::CancelPayment { user_id: uid } => {
            if uid == user_id {
                state.pending_payments.notify_cancel(user_id);
            }
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }

        CallbackAction::ConfirmPayment {
            user_id: payer,
            days,
            amount,
        } => {
            if !state.is_admin(user_id) {
                bot.answer_callback_query(q.id.clone())
                    .text(messages.admin_only)
                    .await?;
                return Ok(());
            }

            state
                .users
                .set_subscription(payer, paid_subscription(days, Utc::now()))
                .await?;
            info!("Payment confirmed: user {} / {} days / ₹{}", payer, days, amount);

            bot.send_message(ChatId(payer), messages.payment_confirmed(amount, days))
                .parse_mode(ParseMode::Html)
                .await?;

            if let Some(message) = q.message.as_ref() {
                let _ = bot.delete_message(message.chat().id, message.id()).await;
            }
            bot.send_message(
                ChatId(state.config.admin_id),
                messages.payment_admin_confirmed(payer, amount, days),
            )
            .parse_mode(ParseMode::Html)
            .await?;
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }

        CallbackAction::RejectPayment { user_id: payer } => {
            if !state.is_admin(user_id) {
                bot.answer_callback_query(q.id.clone())
                    .text(messages.admin_only)
                    .await?;
                return Ok(());
            }

            info!("Payment rejected for user {}", payer);
            bot.send_message(ChatId(payer), messages.payment_rejected)
                .parse_mode(ParseMode::Html)
                .await?;

            if let Some(message) = q.message.as_ref() {
                let _ = bot.delete_message(message.chat().id, message.id()).await;
            }
            bot.send_message(
                ChatId(state.config.admin_id),
                messages.payment_admin_rejected(payer),
            )
            .parse_mode(ParseMode::Html)
            .await?;
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }

        CallbackAction::PostYes { payload } => {
            if !state.is_admin(user_id) {
                bot.answer_callback_query(q.id.clone())
                    .text(messages.admin_only)
                    .await?;
                return Ok(());
            }

            let title = decode_deep_link(&payload)?;
            state
                .pending_posts
                .insert(user_id, crate::utils::deep_link_url(&state.bot_username, &title));

            if let Some(message) = q.message.as_ref() {
                edit_plain(bot, message.chat().id, message.id(), messages.post_content_prompt)
                    .await?;
            }
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }

        CallbackAction::PostNo => {
            if !state.is_admin(user_id) {
                bot.answer_callback_query(q.id.clone())
                    .text(messages.admin_only)
                    .await?;
                return Ok(());
            }

            if let Some(message) = q.message.as_ref() {
                edit_plain(bot, message.chat().id, message.id(), messages.post_cancelled).await?;
            }
            bot.answer_callback_query(q.id.clone()).await?;
            Ok(())
        }

        // Handled before the gate.
        CallbackAction::AcceptPrivacy { .. } => Ok(()),
    }
}

/// Run the access check for one item and act on the decision.
async fn deliver_item(
    bot: &ThrottledBot,
    state: &AppState,
    user_id: i64,
    item_id: i64,
) -> anyhow::Result<()> {
    let messages = &state.messages;
    let chat = ChatId(user_id);
    let record = state.users.ensure_exists(user_id).await?;

    match decide(record.subscription.as_ref(), Utc::now()) {
        AccessDecision::ActivateTrial { subscription } => {
            state.users.set_subscription(user_id, subscription).await?;
            info!("Trial activated for user {}", user_id);
            bot.send_message(chat, messages.trial_activated)
                .parse_mode(ParseMode::Html)
                .await?;
            copy_item(bot, state, chat, item_id).await
        }

        AccessDecision::Deliver => copy_item(bot, state, chat, item_id).await,

        AccessDecision::PromptRecharge => {
            bot.send_message(chat, messages.subscription_inactive)
                .parse_mode(ParseMode::Html)
                .reply_markup(recharge_keyboard(state))
                .await?;
            Ok(())
        }

        AccessDecision::Expire { expired, update } => {
            state.users.set_subscription(user_id, update).await?;
            info!("Subscription expired for user {}", user_id);

            bot.send_message(chat, messages.subscription_expired(expired.expiry_date))
                .parse_mode(ParseMode::Html)
                .reply_markup(recharge_keyboard(state))
                .await?;
            bot.send_message(
                ChatId(state.config.admin_id),
                messages.subscription_expired_admin(
                    user_id,
                    &expired.plan_description,
                    expired.expiry_date,
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
            Ok(())
        }
    }
}

/// Copy one catalogue item from the feed channel to the user.
async fn copy_item(
    bot: &ThrottledBot,
    state: &AppState,
    chat: ChatId,
    item_id: i64,
) -> anyhow::Result<()> {
    let feed_chat = ChatId(state.config.feed_channel_id);
    bot.copy_message(chat, feed_chat, MessageId(item_id as i32))
        .await?;
    info!("Delivered item {} to chat {}", item_id, chat.0);
    Ok(())
}

fn plan_keyboard(state: &AppState) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = PLANS
        .iter()
        .map(|&(days, amount)| {
            let months = days / 30;
            let label = if months == 1 {
                format!("₹{} - 1 Month", amount)
            } else {
                format!("₹{} - {} Months", amount, months)
            };
            vec![InlineKeyboardButton::callback(
                label,
                CallbackAction::Plan { days, amount }.encode(),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        state.messages.button_close,
        CallbackAction::Close.encode(),
    )]);
    InlineKeyboardMarkup::new(rows)
}

fn recharge_keyboard(state: &AppState) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        state.messages.button_recharge,
        CallbackAction::Recharge.encode(),
    )]])
}

/// Edit a message to a bare text, tolerating a no-op edit.
async fn edit_plain(
    bot: &ThrottledBot,
    chat_id: ChatId,
    message_id: MessageId,
    text: &str,
) -> anyhow::Result<()> {
    match bot.edit_message_text(chat_id, message_id, text).await {
        Ok(_) => Ok(()),
        Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
