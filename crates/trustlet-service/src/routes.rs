//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{business, health, public, reviews, stats, subscription};
use crate::state::AppState;

/// Maximum concurrent requests for API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /api/public/businesses/:business_id` - Review form header
/// - `POST /api/public/businesses/:business_id/reviews` - Submit a review
///
/// ## Owner (bearer token)
/// - `GET /api/business-info` - Get the caller's business
/// - `POST /api/business-info` - Create or update the caller's business
/// - `GET /api/review-stats` - Review statistics
/// - `GET /api/recent-reviews` - Paginated reviews, newest first
/// - `GET /api/subscription` - Plan and review quota
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        .route(
            "/business-info",
            get(business::get_business_info).post(business::save_business_info),
        )
        .route("/review-stats", get(stats::get_review_stats))
        .route("/recent-reviews", get(reviews::list_recent_reviews))
        .route("/subscription", get(subscription::get_subscription))
        .route(
            "/public/businesses/:business_id",
            get(public::get_public_business),
        )
        .route(
            "/public/businesses/:business_id/reviews",
            post(public::submit_review),
        )
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
