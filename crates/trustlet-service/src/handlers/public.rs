//! Public review intake.
//!
//! These routes back the review link a business owner shares with customers,
//! so they take no credentials. The plan's review cap is enforced here, at
//! insertion time, inside the same store transaction as the insert.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use trustlet_core::{
    effective_plan, Business, BusinessId, PublicBusiness, Review, ReviewSubmission,
};
use trustlet_store::StoreError;

use crate::error::ApiError;
use crate::state::AppState;

/// Public business response.
#[derive(Debug, Serialize)]
pub struct PublicBusinessResponse {
    /// Business details shown on the review form.
    pub business: PublicBusiness,
}

/// Review submission request.
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    /// Reviewer's name.
    pub customer_name: Option<String>,
    /// Star rating, 1 to 5.
    pub rating: Option<i64>,
    /// Optional comment.
    pub comment: Option<String>,
}

/// Review submission response.
#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    /// The stored review.
    pub review: Review,
}

/// Resolve a path segment to an existing business.
///
/// Malformed IDs are reported as not found rather than as bad input.
async fn load_business(state: &AppState, raw_id: &str) -> Result<Business, ApiError> {
    let not_found = || ApiError::NotFound("Business not found".into());
    let business_id: BusinessId = raw_id.parse().map_err(|_| not_found())?;

    state
        .store
        .get_business(&business_id)
        .await?
        .ok_or_else(not_found)
}

/// Get the public details of a business.
pub async fn get_public_business(
    State(state): State<Arc<AppState>>,
    Path(business_id): Path<String>,
) -> Result<Json<PublicBusinessResponse>, ApiError> {
    let business = load_business(&state, &business_id).await?;

    Ok(Json(PublicBusinessResponse {
        business: PublicBusiness::from(&business),
    }))
}

/// Submit a review for a business.
pub async fn submit_review(
    State(state): State<Arc<AppState>>,
    Path(business_id): Path<String>,
    body: Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitReviewResponse>), ApiError> {
    let Json(body) = body?;
    let rating = body
        .rating
        .ok_or_else(|| ApiError::BadRequest("Rating is required".into()))?;
    let submission = ReviewSubmission::parse(
        body.customer_name.as_deref().unwrap_or_default(),
        rating,
        body.comment.as_deref(),
    )?;

    let business = load_business(&state, &business_id).await?;

    let subscription = state.store.get_subscription(&business.owner_user_id).await?;
    let plan = effective_plan(subscription.as_ref());

    let review = Review::new(business.id, submission);
    state
        .store
        .insert_review(&review, plan)
        .await
        .map_err(|e| {
            if let StoreError::QuotaExceeded { limit } = &e {
                tracing::info!(
                    business_id = %business.id,
                    plan = %plan.as_str(),
                    limit = %limit,
                    "Review refused: plan limit reached"
                );
            }
            ApiError::from(e)
        })?;

    tracing::info!(
        business_id = %business.id,
        review_id = %review.id,
        rating = %review.rating.stars(),
        "Review submitted"
    );

    Ok((StatusCode::CREATED, Json(SubmitReviewResponse { review })))
}
