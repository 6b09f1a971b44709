//! Value objects for the token domain

pub mod algorithm;

pub use algorithm::SigningAlgorithm;
