//! Main token service implementation

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Duration;
use constant_time_eq::constant_time_eq;
use ec_shared::JwtConfig;
use jsonwebtoken::{encode, Header};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::entities::claims::CLAIM_EXPIRES_AT;
use crate::domain::{Claims, SigningAlgorithm, UserClaims};
use crate::errors::{SetupError, TokenError, TokenResult};

use super::bearer::bearer_token;
use super::clock::{Clock, SystemClock};
use super::config::TokenServiceConfig;
use super::key::SigningKey;

/// Issues and verifies signed session tokens
///
/// Immutable after construction: share it behind an `Arc` and call it from
/// any number of threads without locking.
pub struct TokenService<C: Clock = SystemClock> {
    key: SigningKey,
    config: TokenServiceConfig,
    primary: SigningAlgorithm,
    clock: C,
}

impl TokenService<SystemClock> {
    /// Creates a token service reading the system clock
    ///
    /// # Arguments
    ///
    /// * `key` - Signing key decoded from configuration
    /// * `config` - Accepted algorithms and default lifetime
    pub fn new(key: SigningKey, config: TokenServiceConfig) -> Result<Self, SetupError> {
        Self::with_clock(key, config, SystemClock)
    }

    /// Decodes the configured secret once and builds the service
    pub fn from_jwt_config(jwt: &JwtConfig) -> Result<Self, SetupError> {
        let key = SigningKey::from_base64(&jwt.secret)?;
        let config = TokenServiceConfig::try_from(jwt)?;
        Self::new(key, config)
    }
}

impl<C: Clock> TokenService<C> {
    /// Creates a token service with an explicit time source
    ///
    /// # Returns
    ///
    /// * `Ok(TokenService)` - Service ready for use
    /// * `Err(SetupError)` - No algorithm configured, key too short for one of
    ///   them, or a non-positive default lifetime
    pub fn with_clock(
        key: SigningKey,
        config: TokenServiceConfig,
        clock: C,
    ) -> Result<Self, SetupError> {
        let primary = config.primary_algorithm().ok_or(SetupError::NoAlgorithms)?;
        for algorithm in &config.algorithms {
            key.check_strength(*algorithm)?;
        }
        let ttl_seconds = config.default_ttl.num_seconds();
        if ttl_seconds <= 0 || config.default_ttl != Duration::seconds(ttl_seconds) {
            return Err(SetupError::InvalidTtl {
                seconds: ttl_seconds,
            });
        }

        tracing::info!(
            algorithms = ?config.algorithms,
            default_ttl_seconds = ttl_seconds,
            "token service initialised"
        );

        Ok(Self {
            key,
            config,
            primary,
            clock,
        })
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn primary_algorithm(&self) -> SigningAlgorithm {
        self.primary
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Issues a signed token for `claims`
    ///
    /// `iat` is read from the clock once and `exp` is `iat + ttl`. `ttl` must
    /// be a whole number of seconds.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The three-segment token
    /// * `Err(TokenError::UnsupportedAlgorithm)` - `algorithm` is not accepted
    /// * `Err(TokenError::InvalidClaims)` - A claim is missing or invalid, or
    ///   `ttl` is not a positive whole number of seconds
    pub fn issue(
        &self,
        claims: &UserClaims,
        ttl: Duration,
        algorithm: SigningAlgorithm,
    ) -> TokenResult<String> {
        self.ensure_accepted(algorithm)?;
        claims.validate()?;

        let ttl_seconds = ttl.num_seconds();
        if ttl_seconds <= 0 {
            return Err(TokenError::invalid_claim(
                CLAIM_EXPIRES_AT,
                format!("ttl must be at least one second, got {}s", ttl_seconds),
            ));
        }
        if ttl != Duration::seconds(ttl_seconds) {
            return Err(TokenError::invalid_claim(
                CLAIM_EXPIRES_AT,
                format!("ttl must be whole seconds, got {}ms", ttl.num_milliseconds()),
            ));
        }

        let issued_at = self.clock.now().timestamp();
        let expires_at = issued_at
            .checked_add(ttl_seconds)
            .ok_or_else(|| TokenError::invalid_claim(CLAIM_EXPIRES_AT, "expiry out of range"))?;

        let payload = Claims::new(claims.clone(), issued_at, expires_at);
        let token = encode(&Header::new(algorithm.into()), &payload, self.key.encoding_key())
            .map_err(|e| TokenError::invalid_claim("*", format!("failed to encode claims: {}", e)))?;

        tracing::debug!(
            user_id = claims.user_id,
            %algorithm,
            expires_at,
            "issued token"
        );
        Ok(token)
    }

    /// Issues with the primary algorithm and the configured default lifetime
    pub fn issue_default(&self, claims: &UserClaims) -> TokenResult<String> {
        self.issue(claims, self.config.default_ttl, self.primary)
    }

    /// Issues from an untyped claim mapping
    pub fn issue_value(
        &self,
        claims: Value,
        ttl: Duration,
        algorithm: SigningAlgorithm,
    ) -> TokenResult<String> {
        self.ensure_accepted(algorithm)?;
        let claims = UserClaims::try_from(claims)?;
        self.issue(&claims, ttl, algorithm)
    }

    /// Verifies `token` under exactly `algorithm` and returns its claims
    ///
    /// The header's `alg` is never trusted to pick the algorithm: a token
    /// whose header names anything else is rejected.
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - Signature valid and not expired
    /// * `Err(TokenError::UnsupportedAlgorithm)` - `algorithm` is not accepted,
    ///   or the header names a different algorithm
    /// * `Err(TokenError::MalformedToken)` - Wrong segment structure, or the
    ///   header or payload does not decode
    /// * `Err(TokenError::SignatureMismatch)` - Signature does not match
    /// * `Err(TokenError::Expired)` - Current time is past `exp`
    pub fn verify(&self, token: &str, algorithm: SigningAlgorithm) -> TokenResult<Claims> {
        self.ensure_accepted(algorithm)?;

        let parts = TokenParts::split(token)?;

        let header: RawHeader = decode_segment(parts.header, "header")?;
        if header.alg != algorithm.as_str() {
            return Err(TokenError::unsupported(header.alg));
        }

        let claims: Claims = decode_segment(parts.payload, "payload")?;
        if claims.expires_at <= claims.issued_at {
            return Err(TokenError::malformed("expiry does not follow issuance"));
        }

        let expected = jsonwebtoken::crypto::sign(
            parts.message.as_bytes(),
            self.key.encoding_key(),
            algorithm.into(),
        )
        .map_err(|_| TokenError::SignatureMismatch)?;
        if !constant_time_eq(expected.as_bytes(), parts.signature.as_bytes()) {
            return Err(TokenError::SignatureMismatch);
        }

        let now = self.clock.now().timestamp();
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired {
                expired_at: claims.expires_at,
            });
        }

        Ok(claims)
    }

    /// Verifies under the primary algorithm
    pub fn verify_default(&self, token: &str) -> TokenResult<Claims> {
        self.verify(token, self.primary)
    }

    /// Verifies the token carried in an `Authorization` header value
    pub fn verify_bearer(
        &self,
        header_value: &str,
        algorithm: SigningAlgorithm,
    ) -> TokenResult<Claims> {
        let token = bearer_token(header_value)
            .ok_or_else(|| TokenError::malformed("missing bearer token"))?;
        self.verify(token, algorithm)
    }

    /// Boolean check that logs why a token was rejected
    pub fn is_valid(&self, token: &str, algorithm: SigningAlgorithm) -> bool {
        match self.verify(token, algorithm) {
            Ok(_) => true,
            Err(TokenError::Expired { expired_at }) => {
                tracing::debug!(expired_at, "token expired");
                false
            }
            Err(e) => {
                tracing::warn!(code = e.code(), %algorithm, "token rejected");
                false
            }
        }
    }

    fn ensure_accepted(&self, algorithm: SigningAlgorithm) -> TokenResult<()> {
        if self.config.accepts(algorithm) {
            Ok(())
        } else {
            Err(TokenError::unsupported(algorithm))
        }
    }
}

/// Token split into its dot-separated segments
struct TokenParts<'a> {
    /// `header.payload`, the signed input
    message: &'a str,
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
}

impl<'a> TokenParts<'a> {
    fn split(token: &'a str) -> TokenResult<Self> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenError::malformed("expected three dot-separated segments"));
        };

        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(TokenError::malformed("empty segment"));
        }

        Ok(Self {
            message: &token[..header.len() + 1 + payload.len()],
            header,
            payload,
            signature,
        })
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

fn decode_segment<T: DeserializeOwned>(segment: &str, what: &str) -> TokenResult<T> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| TokenError::malformed(format!("{} is not base64url: {}", what, e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::malformed(format!("{} does not decode: {}", what, e)))
}
