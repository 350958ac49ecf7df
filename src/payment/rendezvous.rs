//! One payment rendezvous, end to end.
//!
//! Runs in a task spawned off the callback handler that received the plan
//! selection. The handler returns immediately; the dispatcher serializes
//! updates per chat, so the screenshot and cancel events from this user
//! can only be processed once that handler is done. They reach the waiting
//! task through the registry.

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use tracing::info;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::ui::CallbackAction;

use super::{await_outcome, Outcome, PAYMENT_WINDOW};

/// Run the rendezvous for one plan selection.
///
/// The plan-selection UI has already been deleted by the caller. Sends the
/// payment prompt, waits for the first of screenshot/cancel/timeout, and
/// cleans up; the registry entry is dropped on every exit path via the
/// guard returned by `register`.
pub async fn run_rendezvous(
    bot: &ThrottledBot,
    state: &AppState,
    user_id: i64,
    days: i64,
    amount: i64,
) -> anyhow::Result<()> {
    let chat = ChatId(user_id);
    let messages = &state.messages;

    let cancel_keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        messages.button_cancel,
        CallbackAction::CancelPayment { user_id }.encode(),
    )]]);

    let prompt_text = messages.payment_request(amount, state.config.payment_id.as_deref());

    // Register before the prompt goes out so a Cancel pressed the instant
    // the prompt lands cannot miss the entry. A failed send drops the
    // guard and deregisters.
    let (_guard, mut rx) = state.pending_payments.register(user_id);

    // Prompt with the reference QR when one is configured, plain text
    // otherwise.
    let prompt_id = match state.config.qr_photo_id {
        Some(qr_id) => {
            bot.copy_message(chat, ChatId(state.config.feed_channel_id), MessageId(qr_id))
                .caption(prompt_text)
                .parse_mode(ParseMode::Html)
                .reply_markup(cancel_keyboard)
                .await?
        }
        None => {
            bot.send_message(chat, prompt_text)
                .parse_mode(ParseMode::Html)
                .reply_markup(cancel_keyboard)
                .await?
                .id
        }
    };
    info!("Payment prompt sent to user {} ({} days / ₹{})", user_id, days, amount);

    match await_outcome(&mut rx, PAYMENT_WINDOW).await {
        Outcome::Screenshot(screenshot_id) => {
            info!("Screenshot received from user {}", user_id);
            let admin_chat = ChatId(state.config.admin_id);
            let review_keyboard = InlineKeyboardMarkup::new(vec![vec![
                InlineKeyboardButton::callback(
                    messages.button_confirm,
                    CallbackAction::ConfirmPayment {
                        user_id,
                        days,
                        amount,
                    }
                    .encode(),
                ),
                InlineKeyboardButton::callback(
                    messages.button_reject,
                    CallbackAction::RejectPayment { user_id }.encode(),
                ),
            ]]);

            bot.copy_message(admin_chat, chat, screenshot_id)
                .caption(messages.payment_admin_request(user_id, amount, days, Utc::now()))
                .parse_mode(ParseMode::Html)
                .reply_markup(review_keyboard)
                .await?;

            let _ = bot.delete_message(chat, screenshot_id).await;
            let _ = bot.delete_message(chat, prompt_id).await;
            bot.send_message(chat, messages.payment_verification)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Outcome::Cancelled => {
            info!("User {} cancelled the payment", user_id);
            let _ = bot.delete_message(chat, prompt_id).await;
            bot.send_message(chat, messages.payment_cancelled)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Outcome::TimedOut => {
            info!("Payment window elapsed for user {}", user_id);
            let _ = bot.delete_message(chat, prompt_id).await;
            let retry_keyboard =
                InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
                    state.messages.button_send_again,
                    CallbackAction::Plan { days, amount }.encode(),
                )]]);
            bot.send_message(chat, messages.payment_timeout)
                .parse_mode(ParseMode::Html)
                .reply_markup(retry_keyboard)
                .await?;
        }
    }

    Ok(())
}
