//! Authentication extractor.
//!
//! Handlers that take an [`AuthUser`] argument only run once the bearer token
//! has been resolved to a user, so no store access can happen for an
//! unauthenticated request.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use trustlet_core::UserId;

use crate::error::ApiError;
use crate::identity::IdentityProvider;
use crate::state::AppState;

/// An authenticated business owner.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The user ID.
    pub user_id: UserId,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let user_id = authenticate(state.identity.as_ref(), credential).await?;

        Ok(AuthUser { user_id })
    }
}

/// Resolve an `Authorization` header value to a user.
///
/// # Errors
///
/// `ApiError::Unauthorized` if the value is not `Bearer <token>` with a
/// non-empty token, or if the provider rejects the token.
pub async fn authenticate(
    identity: &dyn IdentityProvider,
    credential: &str,
) -> Result<UserId, ApiError> {
    let token = credential
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let user_id = identity.resolve(token).await?;
    tracing::debug!(user_id = %user_id, "Request authenticated");
    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityError;

    struct OneUser(UserId);

    #[async_trait]
    impl IdentityProvider for OneUser {
        async fn resolve(&self, token: &str) -> Result<UserId, IdentityError> {
            if token == "valid" {
                Ok(self.0)
            } else {
                Err(IdentityError::Rejected)
            }
        }
    }

    #[tokio::test]
    async fn accepts_bearer_token() {
        let user = UserId::generate();
        let id = authenticate(&OneUser(user), "Bearer valid").await.unwrap();
        assert_eq!(id, user);
    }

    #[tokio::test]
    async fn rejects_malformed_credentials() {
        let provider = OneUser(UserId::generate());
        for credential in ["", "valid", "Basic valid", "Bearer ", "Bearer    ", "bearervalid"] {
            assert!(
                matches!(authenticate(&provider, credential).await, Err(ApiError::Unauthorized)),
                "{credential:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn rejects_unknown_token() {
        let provider = OneUser(UserId::generate());
        assert!(matches!(
            authenticate(&provider, "Bearer forged").await,
            Err(ApiError::Unauthorized)
        ));
    }
}
