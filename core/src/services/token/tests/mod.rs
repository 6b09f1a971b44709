//! Unit tests for the token service

mod property_tests;

use std::sync::Arc;

use crate::domain::{SigningAlgorithm, UserClaims};
use crate::services::token::{FixedClock, SigningKey, TokenService, TokenServiceConfig};

/// Development secret shared by the EduConnect services (95 bytes decoded)
pub(super) const TEST_SECRET: &str = "dGhpcyBpcyBhIHZlcnkgc2VjdXJlIHNlY3JldCBrZXkgZm9yIGp3dCB0b2tlbiBnZW5lcmF0aW9uIHdoaWNoIHNob3VsZCBiZSBjaGFuZ2VkIGluIHByb2R1Y3Rpb24=";

/// 2023-11-14T22:13:20Z
pub(super) const T0: i64 = 1_700_000_000;

pub(super) type TestService = TokenService<Arc<FixedClock>>;

pub(super) fn alice() -> UserClaims {
    UserClaims::new("alice", 42, "a@x.com", "ADMIN")
}

pub(super) fn test_key() -> SigningKey {
    SigningKey::from_base64(TEST_SECRET).unwrap()
}

/// Service accepting `algorithms`, with a clock pinned at `T0`
pub(super) fn service_with(algorithms: &[SigningAlgorithm]) -> (TestService, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::at_timestamp(T0));
    let config = TokenServiceConfig {
        algorithms: algorithms.to_vec(),
        ..TokenServiceConfig::default()
    };
    let service = TokenService::with_clock(test_key(), config, Arc::clone(&clock)).unwrap();
    (service, clock)
}

/// Service pinned to HS512
pub(super) fn pinned_service() -> (TestService, Arc<FixedClock>) {
    service_with(&[SigningAlgorithm::HS512])
}

/// Service accepting every HMAC variant
pub(super) fn permissive_service() -> (TestService, Arc<FixedClock>) {
    service_with(&SigningAlgorithm::ALL)
}
