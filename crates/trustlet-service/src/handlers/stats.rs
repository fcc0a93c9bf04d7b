//! Review statistics handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use trustlet_core::ReviewStats;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Review statistics response.
#[derive(Debug, Serialize)]
pub struct ReviewStatsResponse {
    /// Aggregates over the caller's reviews; all zero without a business.
    pub stats: ReviewStats,
}

/// Get statistics for the current user's reviews.
pub async fn get_review_stats(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ReviewStatsResponse>, ApiError> {
    let stats = match state.store.get_business_by_owner(&auth.user_id).await? {
        Some(business) => state.store.review_stats(&business.id).await?,
        None => ReviewStats::default(),
    };

    Ok(Json(ReviewStatsResponse { stats }))
}
