//! Domain-specific error types for token issuance and verification.

use thiserror::Error;

use crate::domain::value_objects::SigningAlgorithm;

/// Token-related errors
///
/// Every failure kind of `issue` and `verify` is a distinct variant so callers
/// can map, say, an expired token differently from a forged one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid claim '{field}': {reason}")]
    InvalidClaims { field: String, reason: String },

    #[error("Unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("Malformed token: {reason}")]
    MalformedToken { reason: String },

    #[error("Token signature verification failed")]
    SignatureMismatch,

    #[error("Token expired at {expired_at}")]
    Expired { expired_at: i64 },
}

impl TokenError {
    pub(crate) fn invalid_claim(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TokenError::InvalidClaims {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        TokenError::MalformedToken {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(algorithm: impl ToString) -> Self {
        TokenError::UnsupportedAlgorithm {
            algorithm: algorithm.to_string(),
        }
    }

    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::InvalidClaims { .. } => "INVALID_CLAIMS",
            TokenError::UnsupportedAlgorithm { .. } => "UNSUPPORTED_ALGORITHM",
            TokenError::MalformedToken { .. } => "MALFORMED_TOKEN",
            TokenError::SignatureMismatch => "SIGNATURE_MISMATCH",
            TokenError::Expired { .. } => "TOKEN_EXPIRED",
        }
    }
}

/// Errors raised while constructing a token service
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Signing secret is not valid base64: {0}")]
    InvalidSecret(#[from] base64::DecodeError),

    #[error("Signing secret is empty")]
    EmptySecret,

    #[error("Signing key too short for {algorithm}: {actual} bytes, at least {required} required")]
    KeyTooShort {
        algorithm: SigningAlgorithm,
        required: usize,
        actual: usize,
    },

    #[error("No signing algorithm configured")]
    NoAlgorithms,

    #[error("Unsupported algorithm in configuration: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("Token lifetime must be a positive whole number of seconds, got {seconds}s")]
    InvalidTtl { seconds: i64 },
}

/// Result of token issuance and verification
pub type TokenResult<T> = Result<T, TokenError>;
