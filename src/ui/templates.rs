//! Message templates and button labels.
//!
//! One immutable `Messages` value lives in `AppState` and is handed to the
//! renderer and handlers; nothing user-facing is formatted anywhere else.

use chrono::{DateTime, Utc};

use crate::utils::html_escape;

const DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// All user- and admin-facing texts.
#[derive(Clone, Debug)]
pub struct Messages {
    pub start: &'static str,
    pub privacy_policy: &'static str,
    pub privacy_accepted: &'static str,
    pub unknown_command: &'static str,
    pub query_too_short: &'static str,
    pub generic_failure: &'static str,
    pub transient_error: &'static str,
    pub admin_only: &'static str,
    pub closed: &'static str,

    pub recharge_prompt: &'static str,
    pub payment_verification: &'static str,
    pub payment_cancelled: &'static str,
    pub payment_timeout: &'static str,
    pub payment_rejected: &'static str,
    pub trial_activated: &'static str,
    pub subscription_inactive: &'static str,
    pub plan_none: &'static str,

    pub delete_usage: &'static str,
    pub link_no_title: &'static str,
    pub post_content_prompt: &'static str,
    pub post_sent: &'static str,
    pub post_cancelled: &'static str,

    pub button_accept: &'static str,
    pub button_prev: &'static str,
    pub button_next: &'static str,
    pub button_tick: &'static str,
    pub button_movies: &'static str,
    pub button_series: &'static str,
    pub button_close: &'static str,
    pub button_recharge: &'static str,
    pub button_cancel: &'static str,
    pub button_confirm: &'static str,
    pub button_reject: &'static str,
    pub button_yes: &'static str,
    pub button_no: &'static str,
    pub button_send_again: &'static str,
    pub button_deep_link: &'static str,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            start: "👋 <b>Welcome!</b>\n\nSend me a movie or series name and I'll search the catalogue for you.\nUse /plan to check your subscription.",
            privacy_policy: "📜 <b>Privacy Policy</b>\n\nThis bot stores your user id and subscription status to provide the service. By continuing you accept this.",
            privacy_accepted: "✅ Privacy policy accepted. You can search now!",
            unknown_command: "🤔 Unknown command. Just send a movie or series name to search.",
            query_too_short: "Please provide a search term (minimum 2 characters).",
            generic_failure: "⚠️ Something went wrong. Please try again.",
            transient_error: "Error processing button. Please try again.",
            admin_only: "Only the admin can do that.",
            closed: "Search closed.",

            recharge_prompt: "🔋 <b>Recharge your subscription</b>\n\nChoose a plan:",
            payment_verification: "🕑 Screenshot received! Your payment is pending verification.",
            payment_cancelled: "❌ Purchase cancelled.",
            payment_timeout: "⏰ Time's up! Tap below to restart the payment.",
            payment_rejected: "🚫 Your payment was rejected. Contact support if you believe this is a mistake.",
            trial_activated: "🎉 <b>7-day free trial activated!</b>\n\nEnjoy unlimited access for a week.",
            subscription_inactive: "🔒 Your subscription is inactive. Recharge to keep watching.",
            plan_none: "You don't have a subscription yet. Your 7-day free trial starts with your first download.",

            delete_usage: "Usage: /delete &lt;id&gt;, /delete &lt;from&gt;-&lt;to&gt; or /delete &lt;id&gt;,&lt;id&gt;,...",
            link_no_title: "Usage: /link &lt;title&gt;",
            post_content_prompt: "📤 Send me the content for the promo post.",
            post_sent: "✅ Promo post published.",
            post_cancelled: "Post cancelled.",

            button_accept: "✅ I Accept",
            button_prev: "⬅️ Previous",
            button_next: "Next ➡️",
            button_tick: " ✅",
            button_movies: "🎬 Movies",
            button_series: "📺 Series",
            button_close: "❌ Close",
            button_recharge: "🔋 Recharge",
            button_cancel: "❌ Cancel",
            button_confirm: "✅ Confirm",
            button_reject: "❌ Reject",
            button_yes: "✅ Yes",
            button_no: "❌ No",
            button_send_again: "♻️ Send Again ♻️",
            button_deep_link: "▶️ Watch Now",
        }
    }
}

impl Messages {
    pub fn no_results(&self, query: &str) -> String {
        format!("😕 No results found for '<b>{}</b>'.", html_escape(query))
    }

    pub fn search_header(&self, query: &str) -> String {
        format!("🔍 Search results for '<b>{}</b>'", html_escape(query))
    }

    pub fn payment_request(&self, amount: i64, payment_id: Option<&str>) -> String {
        let mut text = format!(
            "💳 <b>Payment request</b>\n\nSend ₹{} and reply here with a screenshot of the payment.\nYou have 5 minutes.",
            amount
        );
        if let Some(id) = payment_id {
            text.push_str(&format!("\n\nPay to: <code>{}</code>", id));
        }
        text
    }

    pub fn payment_admin_request(
        &self,
        user_id: i64,
        amount: i64,
        days: i64,
        timestamp: DateTime<Utc>,
    ) -> String {
        format!(
            "💰 <b>Payment screenshot</b>\n\nUser: <code>{}</code>\nAmount: ₹{}\nPlan: {} days\nReceived: {}",
            user_id,
            amount,
            days,
            timestamp.format(DATE_FMT)
        )
    }

    pub fn payment_confirmed(&self, amount: i64, days: i64) -> String {
        format!(
            "✅ Payment of ₹{} confirmed! Your {}-day plan is now active.",
            amount, days
        )
    }

    pub fn payment_admin_confirmed(&self, user_id: i64, amount: i64, days: i64) -> String {
        format!(
            "Confirmed ₹{} / {} days for user <code>{}</code>.",
            amount, days, user_id
        )
    }

    pub fn payment_admin_rejected(&self, user_id: i64) -> String {
        format!("Rejected payment for user <code>{}</code>.", user_id)
    }

    pub fn subscription_expired(&self, expiry: DateTime<Utc>) -> String {
        format!(
            "⌛ Your subscription expired on {}. Recharge to continue.",
            expiry.format(DATE_FMT)
        )
    }

    pub fn subscription_expired_admin(
        &self,
        user_id: i64,
        plan_description: &str,
        expiry: DateTime<Utc>,
    ) -> String {
        format!(
            "User <code>{}</code> expired: {} (ended {}).",
            user_id,
            plan_description,
            expiry.format(DATE_FMT)
        )
    }

    pub fn plan_active(
        &self,
        plan_description: &str,
        paid_duration: i64,
        expiry: DateTime<Utc>,
        remaining_days: i64,
    ) -> String {
        format!(
            "💎 <b>{}</b>\n\nDuration: {} days\nExpires: {}\nRemaining: {} days",
            plan_description,
            paid_duration,
            expiry.format(DATE_FMT),
            remaining_days
        )
    }

    pub fn plan_expired(
        &self,
        plan_description: &str,
        paid_duration: i64,
        expiry: DateTime<Utc>,
    ) -> String {
        format!(
            "⌛ <b>{}</b> (expired)\n\nDuration: {} days\nEnded: {}",
            plan_description,
            paid_duration,
            expiry.format(DATE_FMT)
        )
    }

    pub fn delete_confirmation(&self, count: u64) -> String {
        format!("🗑 Deleted {} item(s) from the catalogue.", count)
    }

    pub fn link_prompt(&self, deep_link: &str) -> String {
        format!(
            "🔗 Deep link ready:\n{}\n\nPost it to the main channel?",
            deep_link
        )
    }
}
