//! Configuration management for the feedback service.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under the platform config dir.
const APP_DIR_NAME: &str = "feedback-service";

/// Default database location, suitable for a mounted container volume.
const DEFAULT_DATABASE_PATH: &str = "/data/feedback.db";

/// Default listen address (all interfaces).
const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port.
const DEFAULT_PORT: u16 = 5000;

/// Prefix for namespaced environment variables.
const ENV_PREFIX: &str = "FEEDBACK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. `DB_PATH` and `PORT` environment variables
/// 2. Environment variables prefixed with `FEEDBACK_`, sections split on `__`
///    (e.g. `FEEDBACK_SERVER__PORT`)
/// 3. TOML config file at `~/.config/feedback-service/config.toml`
/// 4. Default values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the `SQLite` database file.
    pub database_path: PathBuf,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing config file is not an error; defaults and the environment
    /// still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let config: Config = Self::figment(&config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the layered figment for the given config file.
    #[must_use]
    pub fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&["DB_PATH"])
                    .map(|_| "storage.database_path".into()),
            )
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::config_validation("server.host must not be empty"));
        }

        if self.server.port == 0 {
            return Err(Error::config_validation(
                "server.port must be greater than 0",
            ));
        }

        if self.storage.database_path.as_os_str().is_empty() {
            return Err(Error::config_validation(
                "storage.database_path must not be empty",
            ));
        }

        Ok(())
    }

    /// Get the database path.
    #[must_use]
    pub fn database_path(&self) -> &std::path::Path {
        &self.storage.database_path
    }

    /// Get the address the server binds to, as `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        if self.server.host.contains(':') {
            format!("[{}]:{}", self.server.host, self.server.port)
        } else {
            format!("{}:{}", self.server.host, self.server.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.database_path(), PathBuf::from("/data/feedback.db"));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_port() {
        let mut config = Config::default();
        config.server.port = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.port"));
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = Config::default();
        config.server.host = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.host"));
    }

    #[test]
    fn test_validate_empty_database_path() {
        let mut config = Config::default();
        config.storage.database_path = PathBuf::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("database_path"));
    }

    #[test]
    fn test_bind_address() {
        let mut config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5000");

        config.server.host = "::1".to_string();
        config.server.port = 8080;
        assert_eq!(config.bind_address(), "[::1]:8080");
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("feedback-service"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")))
                .expect("defaults should load");
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "feedback.toml",
                r#"
                [storage]
                database_path = "/srv/feedback.db"

                [server]
                port = 8080
                "#,
            )?;

            let config = Config::load_from(Some(PathBuf::from("feedback.toml")))
                .expect("config should load");
            assert_eq!(config.database_path(), PathBuf::from("/srv/feedback.db"));
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.server.host, "0.0.0.0");
            Ok(())
        });
    }

    #[test]
    fn test_prefixed_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("feedback.toml", "[server]\nport = 8080\n")?;
            jail.set_env("FEEDBACK_SERVER__PORT", "9090");
            jail.set_env("FEEDBACK_SERVER__HOST", "127.0.0.1");

            let config = Config::load_from(Some(PathBuf::from("feedback.toml")))
                .expect("config should load");
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.server.host, "127.0.0.1");
            Ok(())
        });
    }

    #[test]
    fn test_deployment_env_vars() {
        Jail::expect_with(|jail| {
            jail.set_env("FEEDBACK_SERVER__PORT", "9090");
            jail.set_env("PORT", "7000");
            jail.set_env("DB_PATH", "/var/lib/feedback/feedback.db");

            let config = Config::load_from(Some(PathBuf::from("missing.toml")))
                .expect("config should load");
            assert_eq!(config.server.port, 7000);
            assert_eq!(
                config.database_path(),
                PathBuf::from("/var/lib/feedback/feedback.db")
            );
            Ok(())
        });
    }

    #[test]
    fn test_invalid_port_env_is_error() {
        Jail::expect_with(|jail| {
            jail.set_env("PORT", "not-a-port");

            let result = Config::load_from(Some(PathBuf::from("missing.toml")));
            assert!(matches!(result, Err(Error::ConfigLoad(_))));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_error() {
        Jail::expect_with(|jail| {
            jail.create_file("broken.toml", "[server\nport = ")?;

            let result = Config::load_from(Some(PathBuf::from("broken.toml")));
            assert!(matches!(result, Err(Error::ConfigLoad(_))));
            Ok(())
        });
    }

    #[test]
    fn test_file_failing_validation_is_error() {
        Jail::expect_with(|jail| {
            jail.create_file("zero.toml", "[server]\nport = 0\n")?;

            let result = Config::load_from(Some(PathBuf::from("zero.toml")));
            assert!(matches!(result, Err(Error::ConfigValidation { .. })));
            Ok(())
        });
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("database_path"));
        assert!(json.contains("port"));
    }
}
