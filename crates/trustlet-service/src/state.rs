//! Application state.

use std::sync::Arc;

use trustlet_store::Store;

use crate::config::ServiceConfig;
use crate::identity::{self, IdentityError, IdentityProvider};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Resolves bearer tokens to users.
    pub identity: Arc<dyn IdentityProvider>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create state with the identity provider selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity provider client cannot be built.
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Result<Self, IdentityError> {
        let identity = identity::from_config(&config)?;

        tracing::info!(
            auth_url = %config.auth_url,
            auth_mode = ?config.auth_mode,
            api_key_configured = %config.auth_api_key.is_some(),
            "Identity provider configured"
        );
        if config.auth_api_key.is_none() {
            tracing::warn!("AUTH_API_KEY not set - identity requests are sent without an apikey");
        }

        Ok(Self::with_identity(store, identity, config))
    }

    /// Create state with an explicit identity provider.
    #[must_use]
    pub fn with_identity(
        store: Arc<dyn Store>,
        identity: Arc<dyn IdentityProvider>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            identity,
            config,
        }
    }
}
