//! Business profile types.
//!
//! A user owns at most one [`Business`]. The profile is created on the first
//! submission and updated in place afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{BusinessId, UserId};
use crate::validate::{optional_url, required_text, MAX_NAME_CHARS};

/// A review-collecting business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    /// Business ID, also used in the public review link.
    pub id: BusinessId,

    /// Owning user. Unique across businesses.
    #[serde(rename = "user_id")]
    pub owner_user_id: UserId,

    /// Display name (never empty).
    pub name: String,

    /// Public website.
    pub website: Option<String>,

    /// Logo shown on the review form.
    pub logo_url: Option<String>,

    /// When the profile was first submitted.
    pub created_at: DateTime<Utc>,

    /// When the profile was last submitted.
    pub updated_at: DateTime<Utc>,
}

impl Business {
    /// Create a new business from a validated profile.
    #[must_use]
    pub fn new(owner_user_id: UserId, profile: BusinessProfile) -> Self {
        let now = Utc::now();
        Self {
            id: BusinessId::generate(),
            owner_user_id,
            name: profile.name,
            website: profile.website,
            logo_url: profile.logo_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields and refresh `updated_at`.
    pub fn apply(&mut self, profile: BusinessProfile) {
        self.name = profile.name;
        self.website = profile.website;
        self.logo_url = profile.logo_url;
        self.updated_at = Utc::now();
    }
}

/// The editable part of a business, validated and normalized.
///
/// Only constructible through [`BusinessProfile::parse`], so holding one
/// means the name is non-empty and both URLs are either absent or valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessProfile {
    name: String,
    website: Option<String>,
    logo_url: Option<String>,
}

impl BusinessProfile {
    /// Validate raw profile input.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the name is blank or too long, or
    /// if a non-blank website/logo is not an http(s) URL.
    pub fn parse(name: &str, website: Option<&str>, logo_url: Option<&str>) -> Result<Self> {
        Ok(Self {
            name: required_text("name", name, MAX_NAME_CHARS)?,
            website: optional_url("website", website)?,
            logo_url: optional_url("logo_url", logo_url)?,
        })
    }

    /// The trimmed business name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The normalized website.
    #[must_use]
    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    /// The normalized logo URL.
    #[must_use]
    pub fn logo_url(&self) -> Option<&str> {
        self.logo_url.as_deref()
    }
}

/// The subset of a business shown to anonymous reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicBusiness {
    /// Business ID.
    pub id: BusinessId,
    /// Display name.
    pub name: String,
    /// Public website.
    pub website: Option<String>,
    /// Logo URL.
    pub logo_url: Option<String>,
}

impl From<&Business> for PublicBusiness {
    fn from(business: &Business) -> Self {
        Self {
            id: business.id,
            name: business.name.clone(),
            website: business.website.clone(),
            logo_url: business.logo_url.clone(),
        }
    }
}
