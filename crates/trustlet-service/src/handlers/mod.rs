//! API handlers.

pub mod business;
pub mod health;
pub mod public;
pub mod reviews;
pub mod stats;
pub mod subscription;
