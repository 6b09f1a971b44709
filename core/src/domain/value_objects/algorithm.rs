//! HMAC signing algorithms accepted for session tokens.

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::TokenError;

/// HMAC variant used to sign a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    HS256,
    HS384,
    HS512,
}

impl SigningAlgorithm {
    /// All supported variants
    pub const ALL: [SigningAlgorithm; 3] = [
        SigningAlgorithm::HS256,
        SigningAlgorithm::HS384,
        SigningAlgorithm::HS512,
    ];

    /// Minimum key length in bytes (digest size, RFC 7518 section 3.2)
    pub fn min_key_len(&self) -> usize {
        match self {
            SigningAlgorithm::HS256 => 32,
            SigningAlgorithm::HS384 => 48,
            SigningAlgorithm::HS512 => 64,
        }
    }

    /// Header `alg` value
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningAlgorithm::HS256 => "HS256",
            SigningAlgorithm::HS384 => "HS384",
            SigningAlgorithm::HS512 => "HS512",
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(SigningAlgorithm::HS256),
            "HS384" => Ok(SigningAlgorithm::HS384),
            "HS512" => Ok(SigningAlgorithm::HS512),
            _ => Err(TokenError::unsupported(s.trim())),
        }
    }
}

impl From<SigningAlgorithm> for Algorithm {
    fn from(alg: SigningAlgorithm) -> Self {
        match alg {
            SigningAlgorithm::HS256 => Algorithm::HS256,
            SigningAlgorithm::HS384 => Algorithm::HS384,
            SigningAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

impl TryFrom<Algorithm> for SigningAlgorithm {
    type Error = TokenError;

    fn try_from(alg: Algorithm) -> Result<Self, Self::Error> {
        match alg {
            Algorithm::HS256 => Ok(SigningAlgorithm::HS256),
            Algorithm::HS384 => Ok(SigningAlgorithm::HS384),
            Algorithm::HS512 => Ok(SigningAlgorithm::HS512),
            other => Err(TokenError::unsupported(format!("{:?}", other))),
        }
    }
}
