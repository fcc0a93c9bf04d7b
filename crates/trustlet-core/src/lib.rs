//! Core types and rules for Trustlet.
//!
//! This crate holds everything about reviews that does not need a database or
//! an HTTP stack:
//!
//! - **Identifiers**: `UserId`, `BusinessId`, `ReviewId`, `SubscriptionId`
//! - **Profiles**: `Business`, `BusinessProfile` (validated input)
//! - **Reviews**: `Review`, `Rating`, `ReviewSubmission`
//! - **Statistics**: `ReviewStats`, `compute_stats`
//! - **Quota**: `Plan`, `Subscription`, `FREE_PLAN_REVIEW_LIMIT`
//! - **Paging**: `PageRequest`, `Page`
//!
//! # Review quota
//!
//! Free accounts may collect at most 5 reviews in total. The cap applies to
//! collection only; existing reviews stay visible after it is reached.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod business;
pub mod error;
pub mod ids;
pub mod page;
pub mod plan;
pub mod review;
pub mod stats;
mod validate;

pub use business::{Business, BusinessProfile, PublicBusiness};
pub use error::{DomainError, Result};
pub use ids::{BusinessId, IdError, ReviewId, SubscriptionId, UserId};
pub use page::{Page, PageRequest, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use plan::{can_collect, effective_plan, Plan, Subscription, FREE_PLAN_REVIEW_LIMIT};
pub use review::{Rating, Review, ReviewSubmission, MAX_RATING, MIN_RATING};
pub use stats::{compute_stats, summarize, RatingDistribution, ReviewStats};
pub use validate::{MAX_COMMENT_CHARS, MAX_NAME_CHARS, MAX_URL_CHARS};
