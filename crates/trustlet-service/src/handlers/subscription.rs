//! Subscription handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use trustlet_core::{effective_plan, Plan, Subscription};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Quota view derived from the plan and the current review count.
#[derive(Debug, Serialize)]
pub struct QuotaResponse {
    /// Plan in effect (free when there is no subscription).
    pub plan: Plan,
    /// Reviews collected so far.
    pub review_count: u64,
    /// Whether another review can be collected.
    pub can_collect: bool,
    /// Reviews left before the cap; `null` when unlimited.
    pub remaining: Option<u64>,
}

/// Subscription response.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    /// The stored subscription record, if any.
    pub subscription: Option<Subscription>,
    /// Collection quota.
    pub quota: QuotaResponse,
}

/// Get the current user's subscription and review quota.
pub async fn get_subscription(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let subscription = state.store.get_subscription(&auth.user_id).await?;
    let plan = effective_plan(subscription.as_ref());

    let review_count = match state.store.get_business_by_owner(&auth.user_id).await? {
        Some(business) => state.store.count_reviews(&business.id).await?,
        None => 0,
    };

    Ok(Json(SubscriptionResponse {
        subscription,
        quota: QuotaResponse {
            plan,
            review_count,
            can_collect: plan.can_collect(review_count),
            remaining: plan.remaining(review_count),
        },
    }))
}
