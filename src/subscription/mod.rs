//! Subscription gate.
//!
//! Per-user access state machine: NoRecord -> TrialActive -> Paid ->
//! Expired. Expiry is evaluated lazily at access time on every content
//! request; there is no background sweep, so the expiry notices fire on
//! the first request after the deadline.
//!
//! The decision is a pure function of the stored sub-record and the
//! current time; the caller applies the returned record update and sends
//! the notices.

use chrono::{DateTime, Duration, Utc};

use crate::database::models::Subscription;

pub const TRIAL_DAYS: i64 = 7;
pub const TRIAL_PLAN: &str = "7-Days Free Trial";
pub const EXPIRED_PLAN: &str = "Plan Expired";

/// Outcome of an access check for one content request.
#[derive(Clone, Debug, PartialEq)]
pub enum AccessDecision {
    /// First content request ever: store the trial record, then deliver.
    ActivateTrial { subscription: Subscription },
    /// Active subscription: deliver.
    Deliver,
    /// Known user with an inactive subscription: block with a recharge
    /// prompt, no delivery.
    PromptRecharge,
    /// Subscription just ran out: store `update`, notify the user, and
    /// notify the admin with the details captured in `expired` (taken
    /// before the overwrite).
    Expire {
        expired: Subscription,
        update: Subscription,
    },
}

/// Evaluate a content request against the stored sub-record.
pub fn decide(subscription: Option<&Subscription>, now: DateTime<Utc>) -> AccessDecision {
    let Some(sub) = subscription else {
        return AccessDecision::ActivateTrial {
            subscription: Subscription {
                is_paid: true,
                paid_duration: TRIAL_DAYS,
                plan_description: TRIAL_PLAN.to_string(),
                expiry_date: now + Duration::days(TRIAL_DAYS),
            },
        };
    };

    if !sub.is_paid {
        return AccessDecision::PromptRecharge;
    }

    if now <= sub.expiry_date {
        return AccessDecision::Deliver;
    }

    AccessDecision::Expire {
        expired: sub.clone(),
        update: Subscription {
            is_paid: false,
            paid_duration: 0,
            plan_description: EXPIRED_PLAN.to_string(),
            // Keep the old deadline so later /plan output can show it.
            expiry_date: sub.expiry_date,
        },
    }
}

/// Sub-record written when the admin confirms a payment.
pub fn paid_subscription(days: i64, now: DateTime<Utc>) -> Subscription {
    Subscription {
        is_paid: true,
        paid_duration: days,
        plan_description: format!("{}-Day Plan", days),
        expiry_date: now + Duration::days(days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paid(expiry: DateTime<Utc>) -> Subscription {
        Subscription {
            is_paid: true,
            paid_duration: 30,
            plan_description: "30-Day Plan".into(),
            expiry_date: expiry,
        }
    }

    #[test]
    fn test_first_request_activates_trial() {
        let now = Utc::now();
        match decide(None, now) {
            AccessDecision::ActivateTrial { subscription } => {
                assert!(subscription.is_paid);
                assert_eq!(subscription.paid_duration, 7);
                assert_eq!(subscription.plan_description, "7-Days Free Trial");
                assert_eq!(subscription.expiry_date, now + Duration::days(7));
            }
            other => panic!("expected trial activation, got {other:?}"),
        }
    }

    #[test]
    fn test_second_request_before_expiry_delivers() {
        let now = Utc::now();
        let sub = Subscription {
            is_paid: true,
            paid_duration: 7,
            plan_description: TRIAL_PLAN.into(),
            expiry_date: now + Duration::days(3),
        };
        // No re-activation, just delivery.
        assert_eq!(decide(Some(&sub), now), AccessDecision::Deliver);
    }

    #[test]
    fn test_inactive_subscription_blocks() {
        let now = Utc::now();
        let sub = Subscription {
            is_paid: false,
            paid_duration: 0,
            plan_description: EXPIRED_PLAN.into(),
            expiry_date: now - Duration::days(1),
        };
        assert_eq!(decide(Some(&sub), now), AccessDecision::PromptRecharge);
    }

    #[test]
    fn test_expiry_transition_captures_prior_plan() {
        let now = Utc::now();
        let sub = paid(now - Duration::hours(1));
        match decide(Some(&sub), now) {
            AccessDecision::Expire { expired, update } => {
                // Prior description survives for the admin notice.
                assert_eq!(expired.plan_description, "30-Day Plan");
                assert_eq!(expired.expiry_date, sub.expiry_date);

                assert!(!update.is_paid);
                assert_eq!(update.paid_duration, 0);
                assert_eq!(update.plan_description, EXPIRED_PLAN);
                assert_eq!(update.expiry_date, sub.expiry_date);
            }
            other => panic!("expected expiry, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_expiry_instant_still_delivers() {
        let now = Utc::now();
        let sub = paid(now);
        assert_eq!(decide(Some(&sub), now), AccessDecision::Deliver);
    }

    #[test]
    fn test_paid_subscription_shape() {
        let now = Utc::now();
        let sub = paid_subscription(90, now);
        assert!(sub.is_paid);
        assert_eq!(sub.paid_duration, 90);
        assert_eq!(sub.plan_description, "90-Day Plan");
        assert_eq!(sub.expiry_date, now + Duration::days(90));
    }
}
