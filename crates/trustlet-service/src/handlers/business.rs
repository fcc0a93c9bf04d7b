//! Business profile handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use trustlet_core::{Business, BusinessProfile};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Business info response. `business` is `null` until the profile is set up.
#[derive(Debug, Serialize)]
pub struct BusinessInfoResponse {
    /// The caller's business.
    pub business: Option<Business>,
}

/// Business profile submission.
#[derive(Debug, Deserialize)]
pub struct BusinessInfoRequest {
    /// Business name (required, non-blank).
    pub name: Option<String>,
    /// Website URL; blank clears it.
    pub website: Option<String>,
    /// Logo URL; blank clears it.
    pub logo_url: Option<String>,
}

/// Get the current user's business.
pub async fn get_business_info(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<BusinessInfoResponse>, ApiError> {
    let business = state.store.get_business_by_owner(&auth.user_id).await?;

    Ok(Json(BusinessInfoResponse { business }))
}

/// Create or update the current user's business.
pub async fn save_business_info(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<BusinessInfoRequest>, JsonRejection>,
) -> Result<Json<BusinessInfoResponse>, ApiError> {
    let Json(body) = body?;
    let name = body
        .name
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Business name is required".into()))?;

    // Validation never reaches the store.
    let profile =
        BusinessProfile::parse(name, body.website.as_deref(), body.logo_url.as_deref())?;

    let business = state.store.upsert_business(&auth.user_id, &profile).await?;

    tracing::info!(
        user_id = %auth.user_id,
        business_id = %business.id,
        "Business profile saved"
    );

    Ok(Json(BusinessInfoResponse {
        business: Some(business),
    }))
}
