//! Storage layer for Trustlet.
//!
//! This crate persists businesses, reviews and subscriptions behind the
//! [`Store`] trait, with two implementations:
//!
//! - [`PgStore`]: PostgreSQL via `sqlx`, with embedded migrations.
//! - [`MemoryStore`]: process-local maps, used by tests and local runs.
//!
//! # Ownership
//!
//! Owner-facing callers resolve the business through the owner's `UserId`
//! ([`Store::get_business_by_owner`]) and only then pass its ID on, so a
//! caller-supplied business ID never reaches an owner query. Only the public
//! review intake addresses a business by an ID taken from the request.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> trustlet_store::Result<()> {
//! use trustlet_core::{BusinessProfile, UserId};
//! use trustlet_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let owner = UserId::generate();
//! let profile = BusinessProfile::parse("Acme Bakery", None, None).unwrap();
//! let business = store.upsert_business(&owner, &profile).await?;
//! assert_eq!(store.get_business_by_owner(&owner).await?, Some(business));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use trustlet_core::{
    Business, BusinessId, BusinessProfile, Page, PageRequest, Plan, Review, ReviewStats,
    Subscription, UserId,
};

/// The storage trait defining all database operations.
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // Business Operations
    // =========================================================================

    /// Get the business owned by `owner`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_business_by_owner(&self, owner: &UserId) -> Result<Option<Business>>;

    /// Get a business by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_business(&self, business_id: &BusinessId) -> Result<Option<Business>>;

    /// Create the owner's business, or update it in place if one exists.
    ///
    /// Must be atomic with respect to concurrent calls for the same owner:
    /// at most one business per owner ever exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn upsert_business(&self, owner: &UserId, profile: &BusinessProfile)
        -> Result<Business>;

    // =========================================================================
    // Review Operations
    // =========================================================================

    /// Insert a review, enforcing `plan`'s review cap atomically.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the business doesn't exist.
    /// - `StoreError::QuotaExceeded` if the business already holds as many
    ///   reviews as `plan` allows.
    async fn insert_review(&self, review: &Review, plan: Plan) -> Result<()>;

    /// List a business's reviews, newest first, ties in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_reviews(&self, business_id: &BusinessId, page: PageRequest)
        -> Result<Page<Review>>;

    /// Count a business's reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn count_reviews(&self, business_id: &BusinessId) -> Result<u64>;

    /// Aggregate statistics over a business's reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn review_stats(&self, business_id: &BusinessId) -> Result<ReviewStats>;

    // =========================================================================
    // Subscription Operations
    // =========================================================================

    /// Get the subscription belonging to `owner`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_subscription(&self, owner: &UserId) -> Result<Option<Subscription>>;

    /// Insert or replace `owner`'s subscription record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn put_subscription(&self, subscription: &Subscription) -> Result<()>;
}
