//! Shared configuration and logging setup for EduConnect token services
//!
//! This crate provides:
//! - Configuration types (JWT signing, environment, logging)
//! - Configuration loading from TOML files and environment variables
//! - Tracing subscriber initialisation

pub mod config;
pub mod errors;
pub mod logging;

// Re-export commonly used items at crate root
pub use config::{AppConfig, Environment, JwtConfig, LogFormat, LoggingConfig};
pub use errors::{LoadError, LoadResult};
pub use logging::init_tracing;
