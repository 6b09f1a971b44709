//! Configuration for the token service

use chrono::Duration;
use ec_shared::JwtConfig;

use crate::domain::SigningAlgorithm;
use crate::errors::SetupError;

/// Default token lifetime (24 hours)
pub const DEFAULT_TTL_SECONDS: i64 = 86_400;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Accepted signing algorithms; the first entry is the primary
    pub algorithms: Vec<SigningAlgorithm>,
    /// Lifetime used by `issue_default`
    pub default_ttl: Duration,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            algorithms: vec![SigningAlgorithm::HS512],
            default_ttl: Duration::seconds(DEFAULT_TTL_SECONDS),
        }
    }
}

impl TokenServiceConfig {
    /// Config pinned to a single algorithm
    pub fn pinned(algorithm: SigningAlgorithm) -> Self {
        Self {
            algorithms: vec![algorithm],
            ..Self::default()
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// The algorithm used when the caller does not name one
    pub fn primary_algorithm(&self) -> Option<SigningAlgorithm> {
        self.algorithms.first().copied()
    }

    pub fn accepts(&self, algorithm: SigningAlgorithm) -> bool {
        self.algorithms.contains(&algorithm)
    }
}

impl TryFrom<&JwtConfig> for TokenServiceConfig {
    type Error = SetupError;

    fn try_from(config: &JwtConfig) -> Result<Self, Self::Error> {
        let mut algorithms = Vec::new();
        for name in config.algorithm_names() {
            let algorithm = name
                .parse::<SigningAlgorithm>()
                .map_err(|_| SetupError::UnsupportedAlgorithm {
                    algorithm: name.to_string(),
                })?;
            if !algorithms.contains(&algorithm) {
                algorithms.push(algorithm);
            }
        }
        if algorithms.is_empty() {
            return Err(SetupError::NoAlgorithms);
        }
        if config.expiration_seconds <= 0 {
            return Err(SetupError::InvalidTtl {
                seconds: config.expiration_seconds,
            });
        }

        Ok(Self {
            algorithms,
            default_ttl: Duration::seconds(config.expiration_seconds),
        })
    }
}
