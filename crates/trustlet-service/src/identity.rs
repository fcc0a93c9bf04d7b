//! Identity provider clients.
//!
//! The service never looks inside the identity provider; it only asks "which
//! user does this bearer token belong to?". Two strategies are available:
//!
//! - [`UserInfoProvider`] forwards the token to the provider's user endpoint.
//! - [`JwksProvider`] verifies the JWT signature locally against the
//!   provider's published key set, refreshing it hourly.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use trustlet_core::UserId;

use crate::config::{AuthMode, ServiceConfig};

// ============================================================================
// Constants
// ============================================================================

/// How long to cache JWKS keys before refreshing.
const JWKS_CACHE_DURATION: Duration = Duration::from_secs(3600); // 1 hour

/// Minimum time between two JWKS downloads triggered by an unknown `kid`.
const JWKS_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Timeout for identity provider requests.
const IDENTITY_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Signing algorithms accepted in JWKS mode.
const ACCEPTED_ALGORITHMS: [Algorithm; 2] = [Algorithm::RS256, Algorithm::ES256];

/// Errors returned when resolving a credential.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The provider does not recognise the credential.
    #[error("credential rejected")]
    Rejected,

    /// The provider could not be reached or answered unexpectedly.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Resolves bearer tokens to users.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bare token (without the `Bearer ` prefix) to its user.
    async fn resolve(&self, token: &str) -> Result<UserId, IdentityError>;
}

/// Build the provider selected by `config.auth_mode`.
///
/// # Errors
///
/// Returns `IdentityError::Unavailable` if the HTTP client cannot be built.
pub fn from_config(
    config: &ServiceConfig,
) -> Result<std::sync::Arc<dyn IdentityProvider>, IdentityError> {
    Ok(match config.auth_mode {
        AuthMode::UserInfo => std::sync::Arc::new(UserInfoProvider::new(
            &config.auth_url,
            config.auth_api_key.clone(),
        )?),
        AuthMode::Jwks => std::sync::Arc::new(JwksProvider::new(
            &config.auth_url,
            &config.auth_audience,
        )?),
    })
}

fn http_client() -> Result<reqwest::Client, IdentityError> {
    reqwest::Client::builder()
        .timeout(IDENTITY_FETCH_TIMEOUT)
        .build()
        .map_err(|e| IdentityError::Unavailable(format!("failed to build HTTP client: {e}")))
}

// ============================================================================
// User-info endpoint
// ============================================================================

/// Asks the provider's `/auth/v1/user` endpoint who owns a token.
pub struct UserInfoProvider {
    client: reqwest::Client,
    user_url: String,
    api_key: Option<String>,
}

/// The fields of the user-info response we rely on.
#[derive(Debug, Deserialize)]
struct UserInfo {
    id: String,
}

impl UserInfoProvider {
    /// Create a provider for the given base URL and public API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(auth_url: &str, api_key: Option<String>) -> Result<Self, IdentityError> {
        Ok(Self {
            client: http_client()?,
            user_url: format!("{}/auth/v1/user", auth_url.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait]
impl IdentityProvider for UserInfoProvider {
    async fn resolve(&self, token: &str) -> Result<UserId, IdentityError> {
        let mut request = self.client.get(&self.user_url).bearer_auth(token);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, url = %self.user_url, "Failed to reach identity provider");
            IdentityError::Unavailable("failed to reach identity provider".into())
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(IdentityError::Rejected);
        }
        if !status.is_success() {
            tracing::error!(status = %status, "Identity provider returned non-success status");
            return Err(IdentityError::Unavailable(format!(
                "identity provider returned {status}"
            )));
        }

        let user: UserInfo = response.json().await.map_err(|e| {
            tracing::debug!(error = %e, "Unparseable user-info response");
            IdentityError::Rejected
        })?;

        user.id.parse().map_err(|_| {
            tracing::debug!(id = %user.id, "User-info id is not a UUID");
            IdentityError::Rejected
        })
    }
}

// ============================================================================
// JWKS verification
// ============================================================================

/// JWT claims we read from provider tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Expiration time.
    pub exp: i64,
}

/// JWKS (JSON Web Key Set) response structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    /// List of JWK keys.
    pub keys: Vec<Jwk>,
}

/// Single JSON Web Key.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" or "EC").
    pub kty: String,
    /// Key ID.
    pub kid: Option<String>,
    /// RSA modulus (base64url).
    pub n: Option<String>,
    /// RSA exponent (base64url).
    pub e: Option<String>,
    /// EC x coordinate (base64url).
    pub x: Option<String>,
    /// EC y coordinate (base64url).
    pub y: Option<String>,
}

/// Cached decoding keys.
struct KeyCache {
    keys: HashMap<String, DecodingKey>,
    /// Key used for tokens without a `kid`.
    default_key: Option<DecodingKey>,
    last_updated: Option<Instant>,
}

impl KeyCache {
    fn is_expired(&self) -> bool {
        self.last_updated
            .map_or(true, |at| at.elapsed() >= JWKS_CACHE_DURATION)
    }

    /// True while an unknown `kid` must not trigger another download.
    fn refreshed_recently(&self) -> bool {
        self.last_updated
            .is_some_and(|at| at.elapsed() < JWKS_MIN_REFRESH_INTERVAL)
    }

    fn lookup(&self, kid: Option<&str>) -> Option<DecodingKey> {
        match kid {
            Some(kid) => self.keys.get(kid).cloned(),
            None => self.default_key.clone(),
        }
    }
}

/// Verifies JWTs against the provider's JWKS.
pub struct JwksProvider {
    client: reqwest::Client,
    jwks_url: String,
    issuer: String,
    audience: String,
    cache: RwLock<KeyCache>,
}

impl JwksProvider {
    /// Create a verifier for the provider at `auth_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(auth_url: &str, audience: &str) -> Result<Self, IdentityError> {
        let base = format!("{}/auth/v1", auth_url.trim_end_matches('/'));
        Ok(Self {
            client: http_client()?,
            jwks_url: format!("{base}/.well-known/jwks.json"),
            issuer: base,
            audience: audience.to_string(),
            cache: RwLock::new(KeyCache {
                keys: HashMap::new(),
                default_key: None,
                last_updated: None,
            }),
        })
    }

    /// Get a decoding key from cache or refresh the key set.
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, IdentityError> {
        {
            let cache = self.cache.read().await;
            if !cache.is_expired() {
                if let Some(key) = cache.lookup(kid) {
                    return Ok(key);
                }
                // Unknown kid: refetch at most once per interval.
                if cache.refreshed_recently() {
                    tracing::debug!(kid = ?kid, "Unknown JWT key id, JWKS refreshed recently");
                    return Err(IdentityError::Rejected);
                }
            }
        }

        let mut cache = self.cache.write().await;
        // Another request may have refreshed the set while we waited.
        if !cache.is_expired() {
            if let Some(key) = cache.lookup(kid) {
                return Ok(key);
            }
            if cache.refreshed_recently() {
                return Err(IdentityError::Rejected);
            }
        }

        let jwks = self.fetch_jwks().await?;

        cache.keys.clear();
        cache.default_key = None;
        cache.last_updated = Some(Instant::now());

        for jwk in &jwks.keys {
            if let Some(key) = jwk_to_decoding_key(jwk) {
                if let Some(kid) = &jwk.kid {
                    cache.keys.insert(kid.clone(), key.clone());
                }
                if cache.default_key.is_none() {
                    cache.default_key = Some(key);
                }
            }
        }

        cache.lookup(kid).ok_or(IdentityError::Rejected)
    }

    async fn fetch_jwks(&self) -> Result<Jwks, IdentityError> {
        tracing::debug!(url = %self.jwks_url, "Fetching JWKS");

        let response = self.client.get(&self.jwks_url).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %self.jwks_url, "Failed to fetch JWKS");
            IdentityError::Unavailable("failed to fetch authentication keys".into())
        })?;

        if !response.status().is_success() {
            tracing::error!(
                status = %response.status(),
                url = %self.jwks_url,
                "JWKS fetch returned non-success status"
            );
            return Err(IdentityError::Unavailable(
                "failed to fetch authentication keys".into(),
            ));
        }

        let jwks: Jwks = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse JWKS response");
            IdentityError::Unavailable("failed to parse authentication keys".into())
        })?;

        tracing::info!(keys_count = %jwks.keys.len(), "JWKS fetched");
        Ok(jwks)
    }
}

#[async_trait]
impl IdentityProvider for JwksProvider {
    async fn resolve(&self, token: &str) -> Result<UserId, IdentityError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode JWT header");
            IdentityError::Rejected
        })?;

        if !ACCEPTED_ALGORITHMS.contains(&header.alg) {
            tracing::debug!(alg = ?header.alg, "Rejecting JWT with unsupported algorithm");
            return Err(IdentityError::Rejected);
        }

        let key = self.decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<JwtClaims>(token, &key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            IdentityError::Rejected
        })?;

        data.claims.sub.parse().map_err(|_| IdentityError::Rejected)
    }
}

/// Convert a JWK to a `DecodingKey`. Unsupported key types are skipped.
fn jwk_to_decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
    match jwk.kty.as_str() {
        "RSA" => DecodingKey::from_rsa_components(jwk.n.as_ref()?, jwk.e.as_ref()?).ok(),
        "EC" => DecodingKey::from_ec_components(jwk.x.as_ref()?, jwk.y.as_ref()?).ok(),
        other => {
            tracing::debug!(kty = %other, "Skipping unsupported JWK");
            None
        }
    }
}
