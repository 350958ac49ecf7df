//! Callback payload wire format.
//!
//! Inline buttons are the only place browse state lives between
//! interactions, so every button carries a colon-delimited payload that
//! fully reconstructs {action, query, page, category, quality}. This
//! module is the single serializer/parser pair for that format; handlers
//! never concatenate payload strings themselves.
//!
//! The format is byte-compatible with the deployed button payloads:
//! `none` is the sentinel for an inactive facet, and the `filter`/`quality`
//! payloads carry the *previous* value of their own dimension so the
//! receiving handler can make the toggle decision.

use std::str::FromStr;

use thiserror::Error;

use crate::database::models::{Category, Quality};

/// Decoded callback action.
#[derive(Clone, Debug, PartialEq)]
pub enum CallbackAction {
    /// Deliver one catalogue item (subject to the subscription gate).
    Select { item_id: i64 },
    /// Jump to a result page, keeping the facets.
    Page {
        query: String,
        page: i64,
        category: Option<Category>,
        quality: Option<Quality>,
    },
    /// Toggle a category facet. `prev_category` is the value that was
    /// active when the button was rendered.
    Filter {
        query: String,
        category: Category,
        quality: Option<Quality>,
        prev_category: Option<Category>,
    },
    /// Toggle a quality facet.
    QualityToggle {
        query: String,
        quality: Quality,
        category: Option<Category>,
        prev_quality: Option<Quality>,
    },
    /// Collapse the results message.
    Close,
    /// Non-actionable button (page indicator).
    Noop,
    /// Show the plan selection.
    Recharge,
    /// Start a payment rendezvous for a plan.
    Plan { days: i64, amount: i64 },
    /// Admin approves a pending payment.
    ConfirmPayment { user_id: i64, days: i64, amount: i64 },
    /// Admin rejects a pending payment.
    RejectPayment { user_id: i64 },
    /// User cancels an in-flight payment rendezvous.
    CancelPayment { user_id: i64 },
    /// User accepts the privacy policy.
    AcceptPrivacy { user_id: i64 },
    /// Admin confirms a promo post; payload is the encoded deep-link query.
    PostYes { payload: String },
    /// Admin declines a promo post.
    PostNo,
}

/// Payload decode failure. Handled as a transient notice, never a crash.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackParseError {
    #[error("unknown action tag in payload")]
    UnknownTag,
    #[error("wrong segment count for `{0}` payload")]
    SegmentCount(&'static str),
    #[error("invalid number in payload")]
    InvalidNumber,
    #[error("invalid facet value `{0}`")]
    InvalidFacet(String),
}

const NONE: &str = "none";

fn encode_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NONE.to_string(),
    }
}

fn parse_opt<T: FromStr>(segment: &str) -> Result<Option<T>, CallbackParseError> {
    if segment == NONE {
        return Ok(None);
    }
    segment
        .parse::<T>()
        .map(Some)
        .map_err(|_| CallbackParseError::InvalidFacet(segment.to_string()))
}

fn parse_num(segment: &str) -> Result<i64, CallbackParseError> {
    segment
        .parse::<i64>()
        .map_err(|_| CallbackParseError::InvalidNumber)
}

impl CallbackAction {
    /// Serialize into the wire payload.
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::Select { item_id } => format!("select:{item_id}"),
            CallbackAction::Page {
                query,
                page,
                category,
                quality,
            } => format!(
                "page:{query}:{page}:{}:{}",
                encode_opt(*category),
                encode_opt(*quality)
            ),
            CallbackAction::Filter {
                query,
                category,
                quality,
                prev_category,
            } => format!(
                "filter:{query}:{category}:{}:{}",
                encode_opt(*quality),
                encode_opt(*prev_category)
            ),
            CallbackAction::QualityToggle {
                query,
                quality,
                category,
                prev_quality,
            } => format!(
                "quality:{query}:{quality}:{}:{}",
                encode_opt(*category),
                encode_opt(*prev_quality)
            ),
            CallbackAction::Close => "close".to_string(),
            CallbackAction::Noop => "noop".to_string(),
            CallbackAction::Recharge => "recharge".to_string(),
            CallbackAction::Plan { days, amount } => format!("plan:{days}:{amount}"),
            CallbackAction::ConfirmPayment {
                user_id,
                days,
                amount,
            } => format!("confirm_payment:{user_id}:{days}:{amount}"),
            CallbackAction::RejectPayment { user_id } => format!("reject_payment:{user_id}"),
            CallbackAction::CancelPayment { user_id } => format!("cancel_payment:{user_id}"),
            CallbackAction::AcceptPrivacy { user_id } => format!("accept_privacy:{user_id}"),
            CallbackAction::PostYes { payload } => format!("post_yes:{payload}"),
            CallbackAction::PostNo => "post_no".to_string(),
        }
    }

    /// Parse a wire payload.
    pub fn parse(data: &str) -> Result<Self, CallbackParseError> {
        let segments: Vec<&str> = data.split(':').collect();

        match segments[0] {
            "select" => match segments.as_slice() {
                [_, id] => Ok(CallbackAction::Select {
                    item_id: parse_num(id)?,
                }),
                _ => Err(CallbackParseError::SegmentCount("select")),
            },
            "page" => match segments.as_slice() {
                [_, query, page, category, quality] => Ok(CallbackAction::Page {
                    query: (*query).to_string(),
                    page: parse_num(page)?,
                    category: parse_opt(category)?,
                    quality: parse_opt(quality)?,
                }),
                _ => Err(CallbackParseError::SegmentCount("page")),
            },
            "filter" => match segments.as_slice() {
                [_, query, category, quality, prev_category] => Ok(CallbackAction::Filter {
                    query: (*query).to_string(),
                    category: category
                        .parse()
                        .map_err(|_| CallbackParseError::InvalidFacet((*category).to_string()))?,
                    quality: parse_opt(quality)?,
                    prev_category: parse_opt(prev_category)?,
                }),
                _ => Err(CallbackParseError::SegmentCount("filter")),
            },
            "quality" => match segments.as_slice() {
                [_, query, quality, category, prev_quality] => Ok(CallbackAction::QualityToggle {
                    query: (*query).to_string(),
                    quality: quality
                        .parse()
                        .map_err(|_| CallbackParseError::InvalidFacet((*quality).to_string()))?,
                    category: parse_opt(category)?,
                    prev_quality: parse_opt(prev_quality)?,
                }),
                _ => Err(CallbackParseError::SegmentCount("quality")),
            },
            "close" => Ok(CallbackAction::Close),
            "noop" => Ok(CallbackAction::Noop),
            "recharge" => Ok(CallbackAction::Recharge),
            "plan" => match segments.as_slice() {
                [_, days, amount] => Ok(CallbackAction::Plan {
                    days: parse_num(days)?,
                    amount: parse_num(amount)?,
                }),
                _ => Err(CallbackParseError::SegmentCount("plan")),
            },
            "confirm_payment" => match segments.as_slice() {
                [_, user_id, days, amount] => Ok(CallbackAction::ConfirmPayment {
                    user_id: parse_num(user_id)?,
                    days: parse_num(days)?,
                    amount: parse_num(amount)?,
                }),
                _ => Err(CallbackParseError::SegmentCount("confirm_payment")),
            },
            "reject_payment" => match segments.as_slice() {
                [_, user_id] => Ok(CallbackAction::RejectPayment {
                    user_id: parse_num(user_id)?,
                }),
                _ => Err(CallbackParseError::SegmentCount("reject_payment")),
            },
            "cancel_payment" => match segments.as_slice() {
                [_, user_id] => Ok(CallbackAction::CancelPayment {
                    user_id: parse_num(user_id)?,
                }),
                _ => Err(CallbackParseError::SegmentCount("cancel_payment")),
            },
            "accept_privacy" => match segments.as_slice() {
                [_, user_id] => Ok(CallbackAction::AcceptPrivacy {
                    user_id: parse_num(user_id)?,
                }),
                _ => Err(CallbackParseError::SegmentCount("accept_privacy")),
            },
            "post_yes" => match segments.as_slice() {
                [_, payload] => Ok(CallbackAction::PostYes {
                    payload: (*payload).to_string(),
                }),
                _ => Err(CallbackParseError::SegmentCount("post_yes")),
            },
            "post_no" => Ok(CallbackAction::PostNo),
            _ => Err(CallbackParseError::UnknownTag),
        }
    }
}

/// Toggle rule shared by both facet dimensions: selecting the value that
/// is already active clears the facet.
pub fn resolve_toggle<T: PartialEq>(selected: T, previous: Option<T>) -> Option<T> {
    if previous.as_ref() == Some(&selected) {
        None
    } else {
        Some(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_actions() {
        let actions = vec![
            CallbackAction::Select { item_id: 42 },
            CallbackAction::Page {
                query: "inception".into(),
                page: 1,
                category: None,
                quality: None,
            },
            CallbackAction::Page {
                query: "loki s01".into(),
                page: 3,
                category: Some(Category::Series),
                quality: Some(Quality::P720),
            },
            CallbackAction::Filter {
                query: "dune".into(),
                category: Category::Movie,
                quality: Some(Quality::P1080),
                prev_category: None,
            },
            CallbackAction::QualityToggle {
                query: "dune".into(),
                quality: Quality::P2160,
                category: Some(Category::Movie),
                prev_quality: Some(Quality::P2160),
            },
            CallbackAction::Close,
            CallbackAction::Noop,
            CallbackAction::Recharge,
            CallbackAction::Plan {
                days: 30,
                amount: 40,
            },
            CallbackAction::ConfirmPayment {
                user_id: 7,
                days: 90,
                amount: 120,
            },
            CallbackAction::RejectPayment { user_id: 7 },
            CallbackAction::CancelPayment { user_id: 7 },
            CallbackAction::AcceptPrivacy { user_id: 7 },
            CallbackAction::PostYes {
                payload: "ZHVuZQ".into(),
            },
            CallbackAction::PostNo,
        ];

        for action in actions {
            let encoded = action.encode();
            assert_eq!(CallbackAction::parse(&encoded), Ok(action), "payload: {encoded}");
        }
    }

    #[test]
    fn test_wire_shapes() {
        let action = CallbackAction::Page {
            query: "inception".into(),
            page: 1,
            category: None,
            quality: None,
        };
        assert_eq!(action.encode(), "page:inception:1:none:none");

        let action = CallbackAction::QualityToggle {
            query: "dune".into(),
            quality: Quality::P720,
            category: None,
            prev_quality: Some(Quality::P1080),
        };
        assert_eq!(action.encode(), "quality:dune:720p:none:1080p");
    }

    #[test]
    fn test_malformed_rejected() {
        assert_eq!(
            CallbackAction::parse("page:inception:1:none"),
            Err(CallbackParseError::SegmentCount("page"))
        );
        assert_eq!(
            CallbackAction::parse("select:abc"),
            Err(CallbackParseError::InvalidNumber)
        );
        assert_eq!(
            CallbackAction::parse("quality:dune:999p:none:none"),
            Err(CallbackParseError::InvalidFacet("999p".into()))
        );
        assert_eq!(
            CallbackAction::parse("frobnicate"),
            Err(CallbackParseError::UnknownTag)
        );
    }

    #[test]
    fn test_toggle_clears_active_value() {
        assert_eq!(resolve_toggle(Quality::P720, Some(Quality::P720)), None);
        assert_eq!(
            resolve_toggle(Quality::P720, Some(Quality::P1080)),
            Some(Quality::P720)
        );
        assert_eq!(resolve_toggle(Category::Movie, None), Some(Category::Movie));
    }
}
