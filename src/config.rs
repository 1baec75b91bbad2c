//! Configuration.
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. built-in defaults
//! 2. a TOML file (`reql.toml` in the working directory, or an explicit path)
//! 3. environment variables prefixed with `PHOTONDB_REQL`, using `__` as the
//!    section separator, e.g. `PHOTONDB_REQL__LIMITS__ARRAY_SIZE=5000`
//!
//! ```toml
//! reql_version = "2.4"
//!
//! [limits]
//! array_size = 100000
//! nesting_depth = 64
//!
//! [log]
//! level = "debug"
//! ```

use crate::error::{Error, Result};
use crate::reql::{Limits, ReqlVersion};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Prefix of environment variables read by [`ReqlConfig::load`].
pub const ENV_PREFIX: &str = "PHOTONDB_REQL";

/// Default config file stem looked up in the working directory.
const DEFAULT_FILE: &str = "reql";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level directive (trace, debug, info, warn, error)
    pub level: String,
    /// Directory for rolling log files
    pub dir: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReqlConfig {
    pub limits: Limits,
    pub reql_version: ReqlVersion,
    pub log: LogConfig,
}

impl ReqlConfig {
    /// Load defaults, then the config file, then the environment.
    ///
    /// An explicit `path` must exist; the default `reql.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&ReqlConfig::default()).map_err(config_error)?;

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };

        let config: ReqlConfig = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        debug!(
            reql_version = %config.reql_version,
            array_size = config.limits.array_size,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }
}

fn config_error(e: config::ConfigError) -> Error {
    Error::Config(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReqlConfig::default();
        assert_eq!(config.limits, Limits::default());
        assert_eq!(config.reql_version, ReqlVersion::LATEST);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_from_toml_str() {
        let config = ReqlConfig::from_toml_str(
            r#"
            reql_version = "2.1"

            [limits]
            array_size = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.reql_version, ReqlVersion::V2_1);
        assert_eq!(config.limits.array_size, 10);
        assert_eq!(config.limits.nesting_depth, Limits::default().nesting_depth);
    }

    #[test]
    fn test_from_toml_str_rejects_unknown_version() {
        let err = ReqlConfig::from_toml_str(r#"reql_version = "1.9""#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_load_layers_file_and_env() {
        let path = std::env::temp_dir().join(format!("reql-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[limits]\narray_size = 7\nobject_size = 9\n").unwrap();
        std::env::set_var("PHOTONDB_REQL__LIMITS__OBJECT_SIZE", "11");

        let config = ReqlConfig::load(Some(&path));

        std::env::remove_var("PHOTONDB_REQL__LIMITS__OBJECT_SIZE");
        std::fs::remove_file(&path).ok();

        let config = config.unwrap();
        assert_eq!(config.limits.array_size, 7);
        assert_eq!(config.limits.object_size, 11);
        assert_eq!(config.limits.string_bytes, Limits::default().string_bytes);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let path = std::env::temp_dir().join(format!("missing-{}.toml", uuid::Uuid::new_v4()));
        let err = ReqlConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
