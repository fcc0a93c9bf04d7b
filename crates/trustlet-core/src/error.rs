//! Error types for Trustlet domain operations.

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

/// Errors raised by domain validation and quota rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Input failed validation.
    #[error("{field}: {message}")]
    Validation {
        /// The offending input field.
        field: &'static str,
        /// Human readable explanation.
        message: String,
    },

    /// The plan does not allow collecting another review.
    #[error("review limit reached: the free plan allows {limit} reviews")]
    QuotaExceeded {
        /// The plan's review cap.
        limit: u64,
    },
}

impl DomainError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
