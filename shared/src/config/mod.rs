//! Configuration module
//!
//! - `auth` - token signing secret, accepted algorithms and lifetime
//! - `environment` - environment detection and logging configuration

pub mod auth;
pub mod environment;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::LoadError;

pub use auth::JwtConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Prefix for environment overrides, e.g. `APP__JWT__SECRET`
pub const ENV_PREFIX: &str = "APP";

/// Complete application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment the process runs in
    #[serde(default)]
    pub environment: Environment,

    /// Token signing configuration
    pub jwt: JwtConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Build a configuration for an environment around the given JWT settings
    pub fn for_environment(environment: Environment, jwt: JwtConfig) -> Self {
        Self {
            environment,
            jwt,
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from an optional TOML file, then `APP__*` environment overrides
    ///
    /// `environment` defaults to the one detected by [`Environment::from_env`], and a
    /// missing `[logging]` section falls back to that environment's logging defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, LoadError> {
        let detected = Environment::from_env();
        let mut builder =
            config::Config::builder().set_default("environment", detected.to_string())?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let raw: RawAppConfig = builder.build()?.try_deserialize()?;
        let config = Self {
            environment: raw.environment,
            jwt: raw.jwt,
            logging: raw
                .logging
                .unwrap_or_else(|| LoggingConfig::for_environment(raw.environment)),
        };

        tracing::debug!(
            environment = %config.environment,
            algorithm = %config.jwt.algorithm,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Load `config.<environment>.toml` from `dir` if present, then environment overrides
    pub fn load_from_dir(dir: &Path) -> Result<Self, LoadError> {
        let file = dir.join(Environment::from_env().config_file());
        if file.is_file() {
            Self::load(Some(file.as_path()))
        } else {
            tracing::debug!(path = %file.display(), "no environment config file, using overrides only");
            Self::load(None)
        }
    }
}

/// Shape of the merged sources before environment-specific defaults are applied
#[derive(Deserialize)]
struct RawAppConfig {
    environment: Environment,
    jwt: JwtConfig,
    #[serde(default)]
    logging: Option<LoggingConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const DETECTION_VARS: [&str; 3] = ["ENVIRONMENT", "ENV", "RUST_ENV"];

    fn clear_detection_vars() {
        for var in DETECTION_VARS {
            std::env::remove_var(var);
        }
    }

    fn jwt_only_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[jwt]\nsecret = \"c2VjcmV0\"").unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_load_from_toml_file() {
        clear_detection_vars();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
environment = "production"

[jwt]
secret = "c2VjcmV0"
algorithm = "HS256"
expiration_seconds = 600

[logging]
level = "warn"
format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.jwt.secret, "c2VjcmV0");
        assert_eq!(config.jwt.algorithm, "HS256");
        assert_eq!(config.jwt.expiration_seconds, 600);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_detection_vars();
        let file = jwt_only_file();

        std::env::set_var("APP__JWT__EXPIRATION_SECONDS", "120");
        let config = AppConfig::load(Some(file.path()));
        std::env::remove_var("APP__JWT__EXPIRATION_SECONDS");

        let config = config.unwrap();
        assert_eq!(config.jwt.expiration_seconds, 120);
        assert_eq!(config.jwt.algorithm, "HS512");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    #[serial]
    fn test_detected_environment_seeds_defaults() {
        clear_detection_vars();
        std::env::set_var("ENVIRONMENT", "production");
        let config = AppConfig::load(Some(jwt_only_file().path()));
        clear_detection_vars();

        let config = config.unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    #[serial]
    fn test_file_environment_wins_over_detection() {
        clear_detection_vars();
        std::env::set_var("RUST_ENV", "production");
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "environment = \"staging\"\n\n[jwt]\nsecret = \"c2VjcmV0\"").unwrap();
        let config = AppConfig::load(Some(file.path()));
        clear_detection_vars();

        let config = config.unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    #[serial]
    fn test_load_from_dir_picks_environment_file() {
        clear_detection_vars();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(Environment::Staging.config_file()),
            "[jwt]\nsecret = \"c3RhZ2luZw==\"\n",
        )
        .unwrap();

        std::env::set_var("ENV", "staging");
        let config = AppConfig::load_from_dir(dir.path());
        clear_detection_vars();

        let config = config.unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.jwt.secret, "c3RhZ2luZw==");
    }

    #[test]
    #[serial]
    fn test_missing_jwt_section_is_an_error() {
        clear_detection_vars();
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let result = AppConfig::load(Some(file.path()));
        assert!(matches!(result, Err(LoadError::Source(_))));
    }

    #[test]
    fn test_for_environment_picks_logging() {
        let config = AppConfig::for_environment(Environment::Staging, JwtConfig::new("c2VjcmV0"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
