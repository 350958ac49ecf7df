//! User record model.
//!
//! One document per end user. The subscription sub-record stays absent
//! until the user first requests content; its fields live flattened in the
//! user document, matching the deployed collection layout.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription sub-record. Present only after the first content request
/// (trial activation), a payment confirmation or an expiry flip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub is_paid: bool,
    /// Granted duration in days. Zeroed on expiry.
    pub paid_duration: i64,
    pub plan_description: String,
    /// Absolute expiry timestamp. Kept as-is when the record flips to
    /// expired, so notices can still report when access ran out.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub expiry_date: DateTime<Utc>,
}

/// One bot user.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    /// Telegram user id (doubles as the private chat id).
    #[serde(rename = "_id")]
    pub id: i64,

    #[serde(default)]
    pub privacy_accepted: bool,

    /// Absent for users who never requested content.
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
}

impl UserRecord {
    /// Fresh record for a first-time user (privacy not yet accepted).
    pub fn new(id: i64) -> Self {
        Self {
            id,
            privacy_accepted: false,
            subscription: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;
    use chrono::Duration;

    #[test]
    fn test_expiry_serializes_as_bson_datetime() {
        let record = UserRecord {
            id: 1,
            privacy_accepted: true,
            subscription: Some(Subscription {
                is_paid: true,
                paid_duration: 30,
                plan_description: "30-Day Plan".into(),
                expiry_date: Utc::now() + Duration::days(30),
            }),
        };

        let doc = bson::to_document(&record).unwrap();
        // Range queries on expiry depend on the native date type, not a
        // string rendering.
        assert!(matches!(doc.get("expiry_date"), Some(Bson::DateTime(_))));

        let back: UserRecord = bson::from_document(doc).unwrap();
        let sub = back.subscription.unwrap();
        assert!(sub.is_paid);
        assert_eq!(sub.plan_description, "30-Day Plan");
    }

    #[test]
    fn test_record_without_subscription_round_trips() {
        let doc = bson::to_document(&UserRecord::new(7)).unwrap();
        assert!(!doc.contains_key("expiry_date"));

        let back: UserRecord = bson::from_document(doc).unwrap();
        assert!(back.subscription.is_none());
    }
}
