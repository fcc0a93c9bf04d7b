//! Review listing handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use trustlet_core::{Page, PageRequest, Review};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Recent reviews query parameters.
///
/// Kept as raw strings: non-numeric values fall back to the defaults instead
/// of failing the request.
#[derive(Debug, Deserialize)]
pub struct RecentReviewsQuery {
    /// Page size (default: 10, max: 100).
    pub limit: Option<String>,
    /// Reviews to skip (default: 0).
    pub offset: Option<String>,
}

/// Recent reviews response.
#[derive(Debug, Serialize)]
pub struct RecentReviewsResponse {
    /// Reviews, newest first.
    pub reviews: Vec<Review>,
    /// Total reviews for the business.
    pub total: u64,
    /// Effective page size.
    pub limit: u64,
    /// Effective offset.
    pub offset: u64,
}

/// List the current user's reviews, newest first.
pub async fn list_recent_reviews(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<RecentReviewsQuery>,
) -> Result<Json<RecentReviewsResponse>, ApiError> {
    let page = PageRequest::from_raw(query.limit.as_deref(), query.offset.as_deref());

    let Page { items, total } = match state.store.get_business_by_owner(&auth.user_id).await? {
        Some(business) => state.store.list_reviews(&business.id, page).await?,
        None => Page::empty(),
    };

    Ok(Json(RecentReviewsResponse {
        reviews: items,
        total,
        limit: page.limit,
        offset: page.offset,
    }))
}
