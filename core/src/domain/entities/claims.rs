//! Claim sets carried by session tokens.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::TokenError;

/// Wire name of the subject claim
pub const CLAIM_SUBJECT: &str = "sub";
/// Wire name of the user id claim
pub const CLAIM_USER_ID: &str = "userId";
/// Wire name of the email claim
pub const CLAIM_EMAIL: &str = "email";
/// Wire name of the role claim
pub const CLAIM_ROLE: &str = "role";
/// Wire name of the full name claim
pub const CLAIM_FULL_NAME: &str = "fullName";
/// Wire name of the issued-at claim
pub const CLAIM_ISSUED_AT: &str = "iat";
/// Wire name of the expiry claim
pub const CLAIM_EXPIRES_AT: &str = "exp";

/// Caller-supplied claims describing the principal
///
/// `iat` and `exp` are stamped by the token service at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Principal identifier, usually a username or email
    #[serde(rename = "sub")]
    pub subject: String,

    /// Numeric user id
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Email address
    pub email: String,

    /// Role name, e.g. `STUDENT` or `ADMIN`; opaque to this crate
    pub role: String,

    /// Display name, for consumers that require it
    #[serde(rename = "fullName", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl UserClaims {
    pub fn new(
        subject: impl Into<String>,
        user_id: i64,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            user_id,
            email: email.into(),
            role: role.into(),
            full_name: None,
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Checks the semantic rules the type system cannot express
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.subject.trim().is_empty() {
            return Err(TokenError::invalid_claim(CLAIM_SUBJECT, "must not be blank"));
        }
        if self.email.trim().is_empty() {
            return Err(TokenError::invalid_claim(CLAIM_EMAIL, "must not be blank"));
        }
        if !self.email.contains('@') {
            return Err(TokenError::invalid_claim(CLAIM_EMAIL, "must be an email address"));
        }
        if self.role.trim().is_empty() {
            return Err(TokenError::invalid_claim(CLAIM_ROLE, "must not be blank"));
        }
        if let Some(name) = &self.full_name {
            if name.trim().is_empty() {
                return Err(TokenError::invalid_claim(CLAIM_FULL_NAME, "must not be blank when present"));
            }
        }
        Ok(())
    }
}

impl TryFrom<Value> for UserClaims {
    type Error = TokenError;

    /// Builds claims from an untyped key/value mapping.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(TokenError::invalid_claim("*", "claims must be a JSON object"));
        };

        for key in map.keys() {
            match key.as_str() {
                CLAIM_ISSUED_AT | CLAIM_EXPIRES_AT => {
                    return Err(TokenError::invalid_claim(
                        key.as_str(),
                        "computed at issuance and may not be supplied",
                    ));
                }
                CLAIM_SUBJECT | CLAIM_USER_ID | CLAIM_EMAIL | CLAIM_ROLE | CLAIM_FULL_NAME => {}
                other => return Err(TokenError::invalid_claim(other, "unknown claim")),
            }
        }

        let user_id = match map.get(CLAIM_USER_ID) {
            None | Some(Value::Null) => {
                return Err(TokenError::invalid_claim(CLAIM_USER_ID, "is required"));
            }
            Some(v) => v
                .as_i64()
                .ok_or_else(|| TokenError::invalid_claim(CLAIM_USER_ID, "expected an integer"))?,
        };

        let full_name = match map.get(CLAIM_FULL_NAME) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(TokenError::invalid_claim(CLAIM_FULL_NAME, "expected a string"));
            }
        };

        let claims = Self {
            subject: required_string(&map, CLAIM_SUBJECT)?,
            user_id,
            email: required_string(&map, CLAIM_EMAIL)?,
            role: required_string(&map, CLAIM_ROLE)?,
            full_name,
        };
        claims.validate()?;
        Ok(claims)
    }
}

fn required_string(map: &Map<String, Value>, key: &str) -> Result<String, TokenError> {
    match map.get(key) {
        None | Some(Value::Null) => Err(TokenError::invalid_claim(key, "is required")),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(TokenError::invalid_claim(key, "expected a string")),
    }
}

/// Full token payload: user claims plus issuance timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject
    #[serde(rename = "sub")]
    pub subject: String,

    #[serde(rename = "userId")]
    pub user_id: i64,

    pub email: String,

    pub role: String,

    #[serde(rename = "fullName", default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    /// Issued at (Unix seconds)
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Expiration (Unix seconds)
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl Claims {
    /// Stamps user claims with issuance and expiry times
    pub fn new(user: UserClaims, issued_at: i64, expires_at: i64) -> Self {
        Self {
            subject: user.subject,
            user_id: user.user_id,
            email: user.email,
            role: user.role,
            full_name: user.full_name,
            issued_at,
            expires_at,
        }
    }

    /// The caller-supplied part of the payload
    pub fn user_claims(&self) -> UserClaims {
        UserClaims {
            subject: self.subject.clone(),
            user_id: self.user_id,
            email: self.email.clone(),
            role: self.role.clone(),
            full_name: self.full_name.clone(),
        }
    }

    /// Lifetime the token was issued with, saturating on out-of-range timestamps
    pub fn ttl_seconds(&self) -> i64 {
        self.expires_at.saturating_sub(self.issued_at)
    }

    /// Whether the token is past its expiry at `now` (Unix seconds)
    ///
    /// The expiry second itself is still valid.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_at
    }

    /// Expiry as a UTC datetime
    pub fn expires_at_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expires_at, 0).single()
    }

    /// Issuance time as a UTC datetime
    pub fn issued_at_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.issued_at, 0).single()
    }
}
