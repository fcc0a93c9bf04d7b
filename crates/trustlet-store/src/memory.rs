//! In-memory storage implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use trustlet_core::{
    compute_stats, Business, BusinessId, BusinessProfile, Page, PageRequest, Plan, Review,
    ReviewStats, Subscription, UserId,
};

use crate::error::{Result, StoreError};
use crate::Store;

#[derive(Default)]
struct Tables {
    businesses: HashMap<BusinessId, Business>,
    business_by_owner: HashMap<UserId, BusinessId>,
    /// Reviews per business in insertion order.
    reviews: HashMap<BusinessId, Vec<Review>>,
    subscriptions: HashMap<UserId, Subscription>,
}

/// Store backed by process-local maps behind a single lock.
///
/// Every write happens under the write lock, which gives the same
/// one-business-per-owner and quota guarantees as the PostgreSQL constraints.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_business_by_owner(&self, owner: &UserId) -> Result<Option<Business>> {
        let tables = self.tables.read().await;
        Ok(tables
            .business_by_owner
            .get(owner)
            .and_then(|id| tables.businesses.get(id))
            .cloned())
    }

    async fn get_business(&self, business_id: &BusinessId) -> Result<Option<Business>> {
        Ok(self.tables.read().await.businesses.get(business_id).cloned())
    }

    async fn upsert_business(
        &self,
        owner: &UserId,
        profile: &BusinessProfile,
    ) -> Result<Business> {
        let mut tables = self.tables.write().await;

        if let Some(id) = tables.business_by_owner.get(owner).copied() {
            let business = tables.businesses.get_mut(&id).ok_or_else(|| {
                StoreError::Database(format!("owner index points at missing business {id}"))
            })?;
            business.apply(profile.clone());
            return Ok(business.clone());
        }

        let business = Business::new(*owner, profile.clone());
        tables.business_by_owner.insert(*owner, business.id);
        tables.businesses.insert(business.id, business.clone());
        Ok(business)
    }

    async fn insert_review(&self, review: &Review, plan: Plan) -> Result<()> {
        let mut tables = self.tables.write().await;

        if !tables.businesses.contains_key(&review.business_id) {
            return Err(StoreError::NotFound {
                entity: "business",
                id: review.business_id.to_string(),
            });
        }

        let reviews = tables.reviews.entry(review.business_id).or_default();
        let current = reviews.len() as u64;
        plan.ensure_can_collect(current)?;
        reviews.push(review.clone());
        Ok(())
    }

    async fn list_reviews(
        &self,
        business_id: &BusinessId,
        page: PageRequest,
    ) -> Result<Page<Review>> {
        let tables = self.tables.read().await;
        let Some(reviews) = tables.reviews.get(business_id) else {
            return Ok(Page::empty());
        };

        // Stable sort keeps insertion order among equal timestamps.
        let mut ordered: Vec<&Review> = reviews.iter().collect();
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(Page {
            items: page.slice(&ordered).iter().map(|r| (*r).clone()).collect(),
            total: ordered.len() as u64,
        })
    }

    async fn count_reviews(&self, business_id: &BusinessId) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables.reviews.get(business_id).map_or(0, |r| r.len() as u64))
    }

    async fn review_stats(&self, business_id: &BusinessId) -> Result<ReviewStats> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .get(business_id)
            .map(|reviews| compute_stats(reviews))
            .unwrap_or_default())
    }

    async fn get_subscription(&self, owner: &UserId) -> Result<Option<Subscription>> {
        Ok(self.tables.read().await.subscriptions.get(owner).cloned())
    }

    async fn put_subscription(&self, subscription: &Subscription) -> Result<()> {
        self.tables
            .write()
            .await
            .subscriptions
            .insert(subscription.owner_user_id, subscription.clone());
        Ok(())
    }
}
