//! Subscription plans and review quotas.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::ids::{SubscriptionId, UserId};

/// Total reviews a free-plan business may collect.
pub const FREE_PLAN_REVIEW_LIMIT: u64 = 5;

/// Available plans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Free tier, capped at [`FREE_PLAN_REVIEW_LIMIT`] collected reviews.
    #[default]
    Free,

    /// Paid tier, unlimited reviews.
    Paid,
}

impl Plan {
    /// The plan's review cap, `None` when unlimited.
    #[must_use]
    pub const fn review_limit(self) -> Option<u64> {
        match self {
            Self::Free => Some(FREE_PLAN_REVIEW_LIMIT),
            Self::Paid => None,
        }
    }

    /// Whether a business already holding `current_total` reviews may collect one more.
    #[must_use]
    pub const fn can_collect(self, current_total: u64) -> bool {
        match self.review_limit() {
            Some(limit) => current_total < limit,
            None => true,
        }
    }

    /// Reviews still collectable, `None` when unlimited.
    #[must_use]
    pub const fn remaining(self, current_total: u64) -> Option<u64> {
        match self.review_limit() {
            Some(limit) => Some(limit.saturating_sub(current_total)),
            None => None,
        }
    }

    /// Like [`Plan::can_collect`], but as an error for write paths.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::QuotaExceeded` when the cap has been reached.
    pub fn ensure_can_collect(self, current_total: u64) -> Result<()> {
        match self.review_limit() {
            Some(limit) if current_total >= limit => Err(DomainError::QuotaExceeded { limit }),
            _ => Ok(()),
        }
    }

    /// Stable lowercase name, as stored and serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
        }
    }
}

impl std::str::FromStr for Plan {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            other => Err(DomainError::validation("plan", format!("unknown plan: {other}"))),
        }
    }
}

/// A user's subscription record.
///
/// Written by the billing integration; Trustlet only reads it to decide the
/// review quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription ID.
    pub id: SubscriptionId,
    /// Subscribing user.
    #[serde(rename = "user_id")]
    pub owner_user_id: UserId,
    /// Stripe customer reference, if billing has been set up.
    pub stripe_customer_id: Option<String>,
    /// Stripe subscription reference.
    pub stripe_subscription_id: Option<String>,
    /// Plan tier.
    pub plan: Plan,
    /// Billing status as reported by the payment provider (e.g. `active`).
    pub status: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// A new active subscription on `plan`.
    #[must_use]
    pub fn new(owner_user_id: UserId, plan: Plan) -> Self {
        let now = Utc::now();
        Self {
            id: SubscriptionId::generate(),
            owner_user_id,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            plan,
            status: "active".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// The plan in effect for an optional subscription. No subscription means free.
#[must_use]
pub fn effective_plan(subscription: Option<&Subscription>) -> Plan {
    subscription.map_or(Plan::Free, |s| s.plan)
}

/// Whether `subscription` permits collecting another review given `current_total`.
#[must_use]
pub fn can_collect(subscription: Option<&Subscription>, current_total: u64) -> bool {
    effective_plan(subscription).can_collect(current_total)
}
