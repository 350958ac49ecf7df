//! The /plan command: subscription status.

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::ui::CallbackAction;

pub async fn plan_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if !msg.chat.is_private() {
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    if !state.users.has_accepted_privacy(user_id).await? {
        return super::send_privacy_policy(&bot, &state, msg.chat.id, user_id).await;
    }

    let record = state.users.get(user_id).await?;
    let now = Utc::now();

    let text = match record.and_then(|r| r.subscription) {
        None => state.messages.plan_none.to_string(),
        Some(sub) if sub.is_paid && now <= sub.expiry_date => {
            let remaining_days = (sub.expiry_date - now).num_days();
            state.messages.plan_active(
                &sub.plan_description,
                sub.paid_duration,
                sub.expiry_date,
                remaining_days,
            )
        }
        Some(sub) => {
            state
                .messages
                .plan_expired(&sub.plan_description, sub.paid_duration, sub.expiry_date)
        }
    };

    let keyboard = InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(
            state.messages.button_recharge,
            CallbackAction::Recharge.encode(),
        ),
        InlineKeyboardButton::callback(state.messages.button_close, CallbackAction::Close.encode()),
    ]]);

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}
