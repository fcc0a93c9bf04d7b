//! Trustlet HTTP API Service.
//!
//! This crate provides the HTTP API behind the Trustlet dashboard:
//!
//! - Business profile management
//! - Review statistics and paginated review listings
//! - Subscription plan and review quota
//! - Public review intake for shared review links
//!
//! # Authentication
//!
//! Owner endpoints require `Authorization: Bearer <token>`. Tokens are
//! resolved to a user by an [`identity::IdentityProvider`]; handlers only ever
//! see the resulting `UserId`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod routes;
pub mod state;

pub use config::{AuthMode, ServiceConfig};
pub use error::ApiError;
pub use identity::{IdentityError, IdentityProvider};
pub use routes::create_router;
pub use state::AppState;
