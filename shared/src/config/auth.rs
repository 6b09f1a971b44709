//! Token signing configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

use crate::errors::LoadError;

/// Environment variable holding the base64-encoded signing secret
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";

/// Environment variable holding the accepted algorithm list
pub const JWT_ALGORITHM_VAR: &str = "JWT_ALGORITHM";

/// Environment variable holding the default token lifetime in seconds
pub const JWT_EXPIRATION_VAR: &str = "JWT_EXPIRATION_SECONDS";

/// JWT signing configuration
///
/// The secret stays base64-encoded here; it is decoded exactly once when the
/// token service is constructed.
#[derive(Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Base64-encoded HMAC signing secret
    pub secret: String,

    /// Accepted signing algorithms, comma separated, primary first
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Default token lifetime in seconds
    #[serde(default = "default_expiration_seconds")]
    pub expiration_seconds: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("expiration_seconds", &self.expiration_seconds)
            .finish()
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret and defaults for the rest
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: default_algorithm(),
            expiration_seconds: default_expiration_seconds(),
        }
    }

    /// Set the accepted algorithm list
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Set token lifetime in hours
    pub fn with_expiration_hours(mut self, hours: i64) -> Self {
        self.expiration_seconds = hours * 3600;
        self
    }

    /// Load from environment variables
    ///
    /// `JWT_SECRET` is required; there is no built-in fallback secret.
    pub fn from_env() -> Result<Self, LoadError> {
        let secret = env::var(JWT_SECRET_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| LoadError::Missing {
                var: JWT_SECRET_VAR.to_string(),
            })?;

        let algorithm = env::var(JWT_ALGORITHM_VAR).unwrap_or_else(|_| default_algorithm());

        let expiration_seconds = match env::var(JWT_EXPIRATION_VAR) {
            Ok(raw) => raw.trim().parse().map_err(|e| LoadError::Invalid {
                var: JWT_EXPIRATION_VAR.to_string(),
                reason: format!("{}", e),
            })?,
            Err(_) => default_expiration_seconds(),
        };

        Ok(Self {
            secret,
            algorithm,
            expiration_seconds,
        })
    }

    /// Algorithm names in configured order, primary first
    pub fn algorithm_names(&self) -> Vec<&str> {
        self.algorithm
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn default_algorithm() -> String {
    String::from("HS512")
}

fn default_expiration_seconds() -> i64 {
    86_400 // 24 hours
}
