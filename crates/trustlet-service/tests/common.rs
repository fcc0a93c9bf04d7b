//! Common test utilities for Trustlet integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::Router;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::json;

use trustlet_core::{Business, Plan, Review, ReviewSubmission, Subscription, UserId};
use trustlet_service::{create_router, AppState, IdentityError, IdentityProvider, ServiceConfig};
use trustlet_store::{MemoryStore, Store};

/// Prefix of tokens accepted by [`TestIdentity`].
const TEST_TOKEN_PREFIX: &str = "test-token:";

/// Identity provider that accepts `test-token:<uuid>` and rejects everything else.
pub struct TestIdentity;

#[async_trait]
impl IdentityProvider for TestIdentity {
    async fn resolve(&self, token: &str) -> Result<UserId, IdentityError> {
        token
            .strip_prefix(TEST_TOKEN_PREFIX)
            .and_then(|id| id.parse().ok())
            .ok_or(IdentityError::Rejected)
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct handle on the store, for seeding and for checking side effects.
    pub store: Arc<MemoryStore>,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
}

impl TestHarness {
    /// Create a new test harness with an empty store.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            ..ServiceConfig::default()
        };

        let state = AppState::with_identity(store.clone(), Arc::new(TestIdentity), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            test_user_id: UserId::generate(),
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> HeaderValue {
        auth_header_for(self.test_user_id)
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header() -> HeaderValue {
        auth_header_for(UserId::generate())
    }

    /// Create the test user's business through the API.
    pub async fn create_business(&self, name: &str) -> serde_json::Value {
        let response = self
            .server
            .post("/api/business-info")
            .add_header(AUTHORIZATION, self.user_auth_header())
            .json(&json!({ "name": name }))
            .await;
        response.assert_status_ok();
        response.json::<serde_json::Value>()["business"].clone()
    }

    /// The test user's business, read straight from the store.
    pub async fn stored_business(&self) -> Option<Business> {
        self.store
            .get_business_by_owner(&self.test_user_id)
            .await
            .expect("store read failed")
    }

    /// Put the test user on `plan`.
    pub async fn set_plan(&self, plan: Plan) {
        self.store
            .put_subscription(&Subscription::new(self.test_user_id, plan))
            .await
            .expect("store write failed");
    }

    /// Insert a review directly, bypassing the quota.
    pub async fn seed_review(
        &self,
        business: &Business,
        customer_name: &str,
        rating: i64,
        published: bool,
        created_at: DateTime<Utc>,
    ) -> Review {
        let submission =
            ReviewSubmission::parse(customer_name, rating, Some("seeded")).expect("bad seed");
        let mut review = Review::new(business.id, submission);
        review.is_published = published;
        review.created_at = created_at;
        self.store
            .insert_review(&review, Plan::Paid)
            .await
            .expect("store write failed");
        review
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a bearer header for `user_id`.
pub fn auth_header_for(user_id: UserId) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {TEST_TOKEN_PREFIX}{user_id}"))
        .expect("valid header value")
}
