//! Domain layer: claim sets and signing algorithms.

pub mod entities;
pub mod value_objects;

pub use entities::{Claims, UserClaims};
pub use value_objects::SigningAlgorithm;
