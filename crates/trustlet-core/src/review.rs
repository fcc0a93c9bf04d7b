//! Review types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};
use crate::ids::{BusinessId, ReviewId};
use crate::validate::{bounded, required_text, MAX_COMMENT_CHARS, MAX_NAME_CHARS};

/// Lowest accepted star rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted star rating.
pub const MAX_RATING: u8 = 5;

/// A star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Build a rating, rejecting values outside `1..=5`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for out-of-range values.
    pub fn new(value: i64) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| (MIN_RATING..=MAX_RATING).contains(v))
            .map(Self)
            .ok_or_else(|| {
                DomainError::validation(
                    "rating",
                    format!("must be between {MIN_RATING} and {MAX_RATING}"),
                )
            })
    }

    /// The rating as a number of stars.
    #[must_use]
    pub const fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A customer review of a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review ID.
    pub id: ReviewId,
    /// The reviewed business.
    pub business_id: BusinessId,
    /// Name given by the reviewer.
    pub customer_name: String,
    /// Star rating.
    pub rating: Rating,
    /// Free-form comment, possibly empty.
    pub comment: String,
    /// Whether the owner has published the review.
    pub is_published: bool,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Create an unpublished review for `business_id` from a validated submission.
    #[must_use]
    pub fn new(business_id: BusinessId, submission: ReviewSubmission) -> Self {
        Self {
            id: ReviewId::generate(),
            business_id,
            customer_name: submission.customer_name,
            rating: submission.rating,
            comment: submission.comment,
            is_published: false,
            created_at: Utc::now(),
        }
    }
}

/// A validated public review submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    customer_name: String,
    rating: Rating,
    comment: String,
}

impl ReviewSubmission {
    /// Validate raw submission input. The comment is trimmed and may be empty.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a blank name, an out-of-range
    /// rating or an oversized comment.
    pub fn parse(customer_name: &str, rating: i64, comment: Option<&str>) -> Result<Self> {
        let customer_name = required_text("customer_name", customer_name, MAX_NAME_CHARS)?;
        let rating = Rating::new(rating)?;
        let comment = comment.unwrap_or_default().trim();
        bounded("comment", comment, MAX_COMMENT_CHARS)?;

        Ok(Self {
            customer_name,
            rating,
            comment: comment.to_string(),
        })
    }

    /// The submitted rating.
    #[must_use]
    pub const fn rating(&self) -> Rating {
        self.rating
    }
}
