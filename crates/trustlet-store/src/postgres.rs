//! PostgreSQL storage implementation.
//!
//! Column names follow the hosted schema the web client already uses
//! (`businesses.user_id`, `subscriptions.user_id`). Ownership uniqueness and
//! the rating range are enforced by table constraints; see `migrations/`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use trustlet_core::{
    summarize, Business, BusinessId, BusinessProfile, Page, PageRequest, Plan, Rating, Review,
    ReviewStats, Subscription, UserId,
};

use crate::error::{Result, StoreError};
use crate::Store;

/// Maximum time to wait for a pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgreSQL-backed storage implementation.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to `database_url` and run pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;

        let store = Self::from_pool(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Wrap an existing pool without running migrations.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct BusinessRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    website: Option<String>,
    logo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BusinessRow> for Business {
    fn from(row: BusinessRow) -> Self {
        Self {
            id: row.id.into(),
            owner_user_id: row.user_id.into(),
            name: row.name,
            website: row.website,
            logo_url: row.logo_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    business_id: Uuid,
    customer_name: String,
    rating: i16,
    comment: String,
    is_published: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = StoreError;

    fn try_from(row: ReviewRow) -> Result<Self> {
        Ok(Self {
            id: row.id.into(),
            business_id: row.business_id.into(),
            customer_name: row.customer_name,
            rating: Rating::new(i64::from(row.rating))?,
            comment: row.comment,
            is_published: row.is_published,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    user_id: Uuid,
    stripe_customer_id: Option<String>,
    stripe_subscription_id: Option<String>,
    plan: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = StoreError;

    fn try_from(row: SubscriptionRow) -> Result<Self> {
        Ok(Self {
            id: row.id.into(),
            owner_user_id: row.user_id.into(),
            stripe_customer_id: row.stripe_customer_id,
            stripe_subscription_id: row.stripe_subscription_id,
            plan: row.plan.parse()?,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Convert a page bound to a SQL `BIGINT`, saturating.
fn sql_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Convert a SQL `COUNT(*)` to `u64`.
fn count_from_sql(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

const BUSINESS_COLUMNS: &str = "id, user_id, name, website, logo_url, created_at, updated_at";
const REVIEW_COLUMNS: &str =
    "id, business_id, customer_name, rating, comment, is_published, created_at";

#[async_trait]
impl Store for PgStore {
    // =========================================================================
    // Business Operations
    // =========================================================================

    async fn get_business_by_owner(&self, owner: &UserId) -> Result<Option<Business>> {
        let row: Option<BusinessRow> = sqlx::query_as(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE user_id = $1"
        ))
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Business::from))
    }

    async fn get_business(&self, business_id: &BusinessId) -> Result<Option<Business>> {
        let row: Option<BusinessRow> = sqlx::query_as(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1"
        ))
        .bind(business_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Business::from))
    }

    async fn upsert_business(
        &self,
        owner: &UserId,
        profile: &BusinessProfile,
    ) -> Result<Business> {
        // The unique constraint on user_id turns a concurrent first insert
        // into an update instead of a second row.
        let row: BusinessRow = sqlx::query_as(&format!(
            "INSERT INTO businesses (id, user_id, name, website, logo_url) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 website = EXCLUDED.website, \
                 logo_url = EXCLUDED.logo_url, \
                 updated_at = now() \
             RETURNING {BUSINESS_COLUMNS}"
        ))
        .bind(BusinessId::generate().as_uuid())
        .bind(owner.as_uuid())
        .bind(profile.name())
        .bind(profile.website())
        .bind(profile.logo_url())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    // =========================================================================
    // Review Operations
    // =========================================================================

    async fn insert_review(&self, review: &Review, plan: Plan) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Lock the business row so concurrent submissions serialize on the count.
        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM businesses WHERE id = $1 FOR UPDATE")
                .bind(review.business_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound {
                entity: "business",
                id: review.business_id.to_string(),
            });
        }

        if plan.review_limit().is_some() {
            let (count,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE business_id = $1")
                    .bind(review.business_id.as_uuid())
                    .fetch_one(&mut *tx)
                    .await?;
            plan.ensure_can_collect(count_from_sql(count))?;
        }

        sqlx::query(
            "INSERT INTO reviews \
                 (id, business_id, customer_name, rating, comment, is_published, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(review.id.as_uuid())
        .bind(review.business_id.as_uuid())
        .bind(&review.customer_name)
        .bind(i16::from(review.rating.stars()))
        .bind(&review.comment)
        .bind(review.is_published)
        .bind(review.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_reviews(
        &self,
        business_id: &BusinessId,
        page: PageRequest,
    ) -> Result<Page<Review>> {
        // One snapshot for both statements so `total` matches `items`.
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let (total,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE business_id = $1")
                .bind(business_id.as_uuid())
                .fetch_one(&mut *tx)
                .await?;
        if total == 0 {
            tx.commit().await?;
            return Ok(Page::empty());
        }

        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE business_id = $1 \
             ORDER BY created_at DESC, seq ASC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(business_id.as_uuid())
        .bind(sql_bound(page.limit))
        .bind(sql_bound(page.offset))
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(Review::try_from)
                .collect::<Result<_>>()?,
            total: count_from_sql(total),
        })
    }

    async fn count_reviews(&self, business_id: &BusinessId) -> Result<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE business_id = $1")
                .bind(business_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(count_from_sql(count))
    }

    async fn review_stats(&self, business_id: &BusinessId) -> Result<ReviewStats> {
        let rows: Vec<(i16, bool)> =
            sqlx::query_as("SELECT rating, is_published FROM reviews WHERE business_id = $1")
                .bind(business_id.as_uuid())
                .fetch_all(&self.pool)
                .await?;

        let entries = rows
            .into_iter()
            .map(|(rating, published)| Ok((Rating::new(i64::from(rating))?, published)))
            .collect::<Result<Vec<_>>>()?;
        Ok(summarize(entries))
    }

    // =========================================================================
    // Subscription Operations
    // =========================================================================

    async fn get_subscription(&self, owner: &UserId) -> Result<Option<Subscription>> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            "SELECT id, user_id, stripe_customer_id, stripe_subscription_id, plan, status, \
                    created_at, updated_at \
             FROM subscriptions WHERE user_id = $1",
        )
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Subscription::try_from).transpose()
    }

    async fn put_subscription(&self, subscription: &Subscription) -> Result<()> {
        sqlx::query(
            "INSERT INTO subscriptions \
                 (id, user_id, stripe_customer_id, stripe_subscription_id, plan, status, \
                  created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 stripe_customer_id = EXCLUDED.stripe_customer_id, \
                 stripe_subscription_id = EXCLUDED.stripe_subscription_id, \
                 plan = EXCLUDED.plan, \
                 status = EXCLUDED.status, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.owner_user_id.as_uuid())
        .bind(&subscription.stripe_customer_id)
        .bind(&subscription.stripe_subscription_id)
        .bind(subscription.plan.as_str())
        .bind(&subscription.status)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_saturate() {
        assert_eq!(sql_bound(10), 10);
        assert_eq!(sql_bound(u64::MAX), i64::MAX);
        assert_eq!(count_from_sql(-1), 0);
        assert_eq!(count_from_sql(15), 15);
    }

    #[test]
    fn review_row_rejects_out_of_range_rating() {
        let row = ReviewRow {
            id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            customer_name: "Ann".into(),
            rating: 9,
            comment: String::new(),
            is_published: false,
            created_at: Utc::now(),
        };
        assert!(matches!(
            Review::try_from(row),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn subscription_row_parses_plan() {
        let row = SubscriptionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            stripe_customer_id: None,
            stripe_subscription_id: None,
            plan: "paid".into(),
            status: "active".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(Subscription::try_from(row).unwrap().plan, Plan::Paid);
    }
}
