//! Domain entities

pub mod claims;

pub use claims::{Claims, UserClaims};
