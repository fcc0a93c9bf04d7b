//! Public review intake and quota integration tests.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;

use trustlet_core::{BusinessId, Plan, FREE_PLAN_REVIEW_LIMIT};
use trustlet_store::Store;

fn review_path(business_id: &serde_json::Value) -> String {
    format!(
        "/api/public/businesses/{}/reviews",
        business_id.as_str().unwrap()
    )
}

async fn submit(harness: &TestHarness, path: &str, name: &str, rating: i64) -> StatusCode {
    harness
        .server
        .post(path)
        .json(&json!({ "customer_name": name, "rating": rating, "comment": "Lovely" }))
        .await
        .status_code()
}

async fn quota(harness: &TestHarness) -> serde_json::Value {
    let response = harness
        .server
        .get("/api/subscription")
        .add_header(AUTHORIZATION, harness.user_auth_header())
        .await;
    response.assert_status_ok();
    response.json()
}

// ============================================================================
// Public business lookup
// ============================================================================

#[tokio::test]
async fn public_business_shows_form_details() {
    let harness = TestHarness::new();
    let business = harness.create_business("Corner Bakery").await;

    let response = harness
        .server
        .get(&format!(
            "/api/public/businesses/{}",
            business["id"].as_str().unwrap()
        ))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["business"]["name"], "Corner Bakery");
    assert_eq!(body["business"]["id"], business["id"]);
    assert!(body["business"].get("user_id").is_none());
}

#[tokio::test]
async fn public_business_unknown_id_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get(&format!("/api/public/businesses/{}", BusinessId::generate()))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn public_business_malformed_id_is_not_found() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/api/public/businesses/not-a-uuid")
        .await;

    response.assert_status_not_found();
}

// ============================================================================
// Review submission
// ============================================================================

#[tokio::test]
async fn submit_review_creates_pending_review() {
    let harness = TestHarness::new();
    let business = harness.create_business("Shop").await;

    let response = harness
        .server
        .post(&review_path(&business["id"]))
        .json(&json!({ "customer_name": " Dana ", "rating": 4, "comment": "Great service" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["review"]["customer_name"], "Dana");
    assert_eq!(body["review"]["rating"], 4);
    assert_eq!(body["review"]["business_id"], business["id"]);
    assert_eq!(body["review"]["is_published"], false);

    let stored = harness.stored_business().await.unwrap();
    assert_eq!(harness.store.count_reviews(&stored.id).await.unwrap(), 1);
}

#[tokio::test]
async fn submit_review_rejects_out_of_range_rating() {
    let harness = TestHarness::new();
    let business = harness.create_business("Shop").await;
    let path = review_path(&business["id"]);

    for rating in [0, 6, -1] {
        let status = submit(&harness, &path, "Eve", rating).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "rating {rating}");
    }

    let stored = harness.stored_business().await.unwrap();
    assert_eq!(harness.store.count_reviews(&stored.id).await.unwrap(), 0);
}

#[tokio::test]
async fn submit_review_requires_rating_and_name() {
    let harness = TestHarness::new();
    let business = harness.create_business("Shop").await;
    let path = review_path(&business["id"]);

    let response = harness
        .server
        .post(&path)
        .json(&json!({ "customer_name": "Finn" }))
        .await;
    response.assert_status_bad_request();

    let response = harness
        .server
        .post(&path)
        .json(&json!({ "customer_name": "   ", "rating": 5 }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn submit_review_with_mistyped_rating_is_bad_request() {
    let harness = TestHarness::new();
    let business = harness.create_business("Shop").await;
    let path = review_path(&business["id"]);

    for rating in [json!("5"), json!(4.5), json!(null), json!([5])] {
        let response = harness
            .server
            .post(&path)
            .json(&json!({ "customer_name": "Hal", "rating": rating }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"]["code"], "bad_request", "rating {rating}");
    }

    let stored = harness.stored_business().await.unwrap();
    assert_eq!(harness.store.count_reviews(&stored.id).await.unwrap(), 0);
}

#[tokio::test]
async fn submit_review_for_unknown_business_is_not_found() {
    let harness = TestHarness::new();

    let status = submit(
        &harness,
        &format!("/api/public/businesses/{}/reviews", BusinessId::generate()),
        "Gus",
        5,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Quota
// ============================================================================

#[tokio::test]
async fn free_plan_stops_at_limit() {
    let harness = TestHarness::new();
    let business = harness.create_business("Free Shop").await;
    let path = review_path(&business["id"]);

    for i in 0..FREE_PLAN_REVIEW_LIMIT {
        let status = submit(&harness, &path, &format!("customer {i}"), 5).await;
        assert_eq!(status, StatusCode::CREATED, "review {i}");
    }

    let response = harness
        .server
        .post(&path)
        .json(&json!({ "customer_name": "One too many", "rating": 5 }))
        .await;

    response.assert_status(StatusCode::PAYMENT_REQUIRED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "quota_exceeded");
    assert_eq!(body["error"]["details"]["limit"], FREE_PLAN_REVIEW_LIMIT);

    let stored = harness.stored_business().await.unwrap();
    assert_eq!(
        harness.store.count_reviews(&stored.id).await.unwrap(),
        FREE_PLAN_REVIEW_LIMIT
    );
}

#[tokio::test]
async fn paid_plan_is_unlimited() {
    let harness = TestHarness::new();
    let business = harness.create_business("Paid Shop").await;
    harness.set_plan(Plan::Paid).await;
    let path = review_path(&business["id"]);

    for i in 0..=FREE_PLAN_REVIEW_LIMIT + 2 {
        let status = submit(&harness, &path, &format!("customer {i}"), 3).await;
        assert_eq!(status, StatusCode::CREATED, "review {i}");
    }

    let body = quota(&harness).await;
    assert_eq!(body["quota"]["plan"], "paid");
    assert_eq!(body["quota"]["review_count"], FREE_PLAN_REVIEW_LIMIT + 3);
    assert_eq!(body["quota"]["can_collect"], true);
    assert!(body["quota"]["remaining"].is_null());
}

#[tokio::test]
async fn subscription_defaults_to_free_quota() {
    let harness = TestHarness::new();

    let body = quota(&harness).await;

    assert!(body["subscription"].is_null());
    assert_eq!(body["quota"]["plan"], "free");
    assert_eq!(body["quota"]["review_count"], 0);
    assert_eq!(body["quota"]["can_collect"], true);
    assert_eq!(body["quota"]["remaining"], FREE_PLAN_REVIEW_LIMIT);
}

#[tokio::test]
async fn subscription_quota_tracks_submissions() {
    let harness = TestHarness::new();
    let business = harness.create_business("Shop").await;
    let path = review_path(&business["id"]);

    for i in 0..FREE_PLAN_REVIEW_LIMIT {
        submit(&harness, &path, &format!("customer {i}"), 4).await;
    }

    let body = quota(&harness).await;
    assert_eq!(body["quota"]["review_count"], FREE_PLAN_REVIEW_LIMIT);
    assert_eq!(body["quota"]["can_collect"], false);
    assert_eq!(body["quota"]["remaining"], 0);
}

#[tokio::test]
async fn subscription_record_is_returned() {
    let harness = TestHarness::new();
    harness.set_plan(Plan::Paid).await;

    let body = quota(&harness).await;

    assert_eq!(body["subscription"]["plan"], "paid");
    assert_eq!(body["subscription"]["user_id"], harness.test_user_id.to_string());
}

#[tokio::test]
async fn subscription_without_auth_fails() {
    let harness = TestHarness::new();

    let response = harness.server.get("/api/subscription").await;

    response.assert_status_unauthorized();
}
