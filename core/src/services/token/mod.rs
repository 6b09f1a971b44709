//! Token service module
//!
//! This module handles all token-related operations:
//! - Signing key decoding and strength checks
//! - Token issuance from a validated claim set
//! - Verification pinned to a caller-chosen algorithm, with distinct
//!   failure kinds for structure, signature and expiry

mod bearer;
mod clock;
mod config;
mod key;
mod service;

#[cfg(test)]
mod tests;

pub use bearer::bearer_token;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{TokenServiceConfig, DEFAULT_TTL_SECONDS};
pub use key::{SigningKey, GENERATED_SECRET_LEN};
pub use service::TokenService;
