//! Command and callback handlers.

pub mod admin;
pub mod browse;
pub mod plan;
pub mod search;
pub mod start;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};
use teloxide::utils::command::BotCommands;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::ui::CallbackAction;

/// All bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot (optionally with a deep link)")]
    Start(String),

    #[command(description = "Show your subscription status")]
    Plan,

    #[command(description = "Delete catalogue items by id (admin)")]
    Delete(String),

    #[command(description = "Create a promo deep link (admin)")]
    Link(String),
}

/// Build the combined command handler.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start(args)].endpoint(start::start_command))
        .branch(case![Command::Plan].endpoint(plan::plan_command))
        .branch(case![Command::Delete(args)].endpoint(admin::delete_command))
        .branch(case![Command::Link(args)].endpoint(admin::link_command))
}

/// Send the privacy policy with the accept button.
///
/// Creates the user record (privacy not accepted) so the acceptance
/// callback has something to flip.
pub(crate) async fn send_privacy_policy(
    bot: &ThrottledBot,
    state: &AppState,
    chat_id: ChatId,
    user_id: i64,
) -> anyhow::Result<()> {
    state.users.ensure_exists(user_id).await?;

    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        state.messages.button_accept,
        CallbackAction::AcceptPrivacy { user_id }.encode(),
    )]]);

    bot.send_message(chat_id, state.messages.privacy_policy)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;

    Ok(())
}
