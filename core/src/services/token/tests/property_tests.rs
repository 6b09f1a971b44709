//! Property-based tests over arbitrary claim sets and lifetimes.
//!
//! Increase cases locally with: PROPTEST_CASES=1000 cargo test -p ec_core

use chrono::{DateTime, Duration};
use proptest::prelude::*;
use proptest::sample::Index;

use super::*;
use crate::errors::TokenError;

fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(64);

    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

fn arb_algorithm() -> impl Strategy<Value = SigningAlgorithm> {
    prop::sample::select(SigningAlgorithm::ALL.to_vec())
}

fn arb_claims() -> impl Strategy<Value = UserClaims> {
    (
        "[a-z][a-z0-9._-]{0,31}",
        any::<i64>(),
        "[a-z0-9.]{1,16}@[a-z]{1,12}\\.(com|edu|org)",
        "[A-Z][A-Z_]{0,15}",
        prop::option::of("[A-Za-z][A-Za-z ]{0,30}"),
    )
        .prop_map(|(subject, user_id, email, role, full_name)| UserClaims {
            subject,
            user_id,
            email,
            role,
            full_name,
        })
}

const SIGNATURE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_!=";

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn prop_issue_then_verify_round_trips(
        claims in arb_claims(),
        ttl in 1i64..=10_000_000,
        algorithm in arb_algorithm(),
    ) {
        let (service, _) = permissive_service();

        let token = service.issue(&claims, Duration::seconds(ttl), algorithm).unwrap();
        let verified = service.verify(&token, algorithm).unwrap();

        prop_assert_eq!(verified.user_claims(), claims);
        prop_assert_eq!(verified.issued_at, T0);
        prop_assert_eq!(verified.expires_at - verified.issued_at, ttl);
    }

    #[test]
    fn prop_any_signature_mutation_is_rejected(
        claims in arb_claims(),
        algorithm in arb_algorithm(),
        position in any::<Index>(),
        replacement in any::<Index>(),
    ) {
        let (service, _) = permissive_service();
        let token = service.issue(&claims, Duration::hours(1), algorithm).unwrap();

        let (message, signature) = token.rsplit_once('.').unwrap();
        let mut bytes = signature.as_bytes().to_vec();
        let at = position.index(bytes.len());
        let mut new_byte = SIGNATURE_ALPHABET[replacement.index(SIGNATURE_ALPHABET.len())];
        if new_byte == bytes[at] {
            new_byte = if new_byte == b'A' { b'B' } else { b'A' };
        }
        bytes[at] = new_byte;
        let tampered = format!("{}.{}", message, String::from_utf8(bytes).unwrap());

        prop_assert_eq!(
            service.verify(&tampered, algorithm).unwrap_err(),
            TokenError::SignatureMismatch
        );
    }

    #[test]
    fn prop_expiry_boundary(ttl in 1i64..=1_000_000, algorithm in arb_algorithm()) {
        let (service, clock) = permissive_service();
        let token = service.issue(&alice(), Duration::seconds(ttl), algorithm).unwrap();

        clock.set(DateTime::from_timestamp(T0 + ttl - 1, 0).unwrap());
        prop_assert!(service.verify(&token, algorithm).is_ok());

        clock.set(DateTime::from_timestamp(T0 + ttl + 1, 0).unwrap());
        prop_assert_eq!(
            service.verify(&token, algorithm).unwrap_err(),
            TokenError::Expired { expired_at: T0 + ttl }
        );
    }

    #[test]
    fn prop_cross_algorithm_verify_never_succeeds(
        claims in arb_claims(),
        issued_with in arb_algorithm(),
        verified_with in arb_algorithm(),
    ) {
        prop_assume!(issued_with != verified_with);
        let (service, _) = permissive_service();
        let token = service.issue(&claims, Duration::hours(1), issued_with).unwrap();

        let err = service.verify(&token, verified_with).unwrap_err();
        let rejected = matches!(
            err,
            TokenError::UnsupportedAlgorithm { .. } | TokenError::SignatureMismatch
        );
        prop_assert!(rejected, "unexpected error {:?}", err);
    }
}
