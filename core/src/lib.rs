//! # EduConnect Token Core
//!
//! Issuance and verification of signed session tokens.
//! This crate contains the claim types, the signing algorithm set, the error
//! taxonomy, and the `TokenService` that ties them to a signing key.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
