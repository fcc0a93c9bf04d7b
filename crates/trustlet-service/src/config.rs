//! Service configuration.

use std::str::FromStr;

/// How bearer tokens are checked against the identity provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// Ask the provider's user-info endpoint about every token.
    #[default]
    UserInfo,
    /// Verify JWT signatures locally against the provider's published keys.
    Jwks,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "userinfo" | "user_info" | "user-info" => Ok(Self::UserInfo),
            "jwks" | "jwt" => Ok(Self::Jwks),
            other => Err(format!("unknown auth mode: {other}")),
        }
    }
}

/// Service configuration, read once at startup and passed to constructors.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// PostgreSQL connection string. Without one the service runs on the
    /// in-memory store.
    pub database_url: Option<String>,

    /// Maximum pooled database connections.
    pub database_max_connections: u32,

    /// Identity provider base URL (e.g. `https://<project>.supabase.co`).
    pub auth_url: String,

    /// Public API key sent to the identity provider as `apikey`.
    pub auth_api_key: Option<String>,

    /// Token checking strategy.
    pub auth_mode: AuthMode,

    /// Expected JWT audience in JWKS mode (default: "authenticated").
    pub auth_audience: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let auth_mode = match std::env::var("AUTH_MODE") {
            Ok(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "Invalid AUTH_MODE, using user-info");
                AuthMode::UserInfo
            }),
            Err(_) => defaults.auth_mode,
        };

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database_max_connections),
            auth_url: std::env::var("AUTH_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.auth_url),
            auth_api_key: std::env::var("AUTH_API_KEY").ok().filter(|s| !s.is_empty()),
            auth_mode,
            auth_audience: std::env::var("AUTH_AUDIENCE").unwrap_or(defaults.auth_audience),
            cors_origins: std::env::var("CORS_ORIGINS").map_or(defaults.cors_origins, |s| {
                s.split(',').map(|o| o.trim().to_string()).collect()
            }),
            max_body_bytes: parse_env("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: parse_env("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            database_url: None,
            database_max_connections: 10,
            auth_url: "http://localhost:54321".into(),
            auth_api_key: None,
            auth_mode: AuthMode::UserInfo,
            auth_audience: "authenticated".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024, // 64KB
            request_timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_mode_parses() {
        assert_eq!("jwks".parse::<AuthMode>().unwrap(), AuthMode::Jwks);
        assert_eq!(" UserInfo ".parse::<AuthMode>().unwrap(), AuthMode::UserInfo);
        assert!("ldap".parse::<AuthMode>().is_err());
    }
}
