//! Validation errors for domain-primitive construction.

use thiserror::Error;

/// Errors raised when a domain primitive rejects its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A string identifier failed format validation.
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier {
        /// Which identifier type rejected the value.
        kind: &'static str,
        /// The offending input.
        value: String,
    },

    /// A party principal failed format validation.
    #[error("invalid party principal: {0:?}")]
    InvalidParty(String),

    /// A content digest string was not 64 hex characters.
    #[error("invalid content digest: {0:?}")]
    InvalidDigest(String),

    /// A timestamp string was malformed or not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
