//! Top-level configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{CollectorConfig, InstrumentConfig, RuntimeConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`TYPETRACE_*`)
/// 2. Project config (`typetrace.toml` in the project root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypetraceConfig {
    pub instrument: InstrumentConfig,
    pub runtime: RuntimeConfig,
    pub collector: CollectorConfig,
}

impl TypetraceConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config = root.join("typetrace.toml");
        if project_config.exists() {
            let text = std::fs::read_to_string(&project_config).map_err(|e| {
                ConfigError::ReadError {
                    path: project_config.display().to_string(),
                    message: e.to_string(),
                }
            })?;
            config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
                path: project_config.display().to_string(),
                message: e.to_string(),
            })?;
        }

        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn apply_env_overrides(config: &mut Self) {
        if let Ok(v) = std::env::var("TYPETRACE_COLLECTOR_URL") {
            config.runtime.collector_url.clone_from(&v);
            config.instrument.collector_url = v;
        }
        if let Ok(v) = std::env::var("TYPETRACE_DATABASE_PATH") {
            config.collector.database_path = v;
        }
        if let Ok(v) = std::env::var("TYPETRACE_BIND") {
            config.collector.bind = v;
        }
        if let Ok(v) = std::env::var("TYPETRACE_FLUSH_INTERVAL_MS") {
            if let Ok(ms) = v.parse() {
                config.runtime.flush_interval_ms = ms;
            }
        }
    }

    fn validate(config: &Self) -> Result<(), ConfigError> {
        if config.runtime.flush_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "runtime.flush_interval_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        if config.runtime.max_buffer_keys == 0 {
            return Err(ConfigError::InvalidValue {
                field: "runtime.max_buffer_keys",
                message: "must be greater than zero".to_string(),
            });
        }
        if config.collector.max_page_size < config.collector.default_page_size {
            return Err(ConfigError::InvalidValue {
                field: "collector.max_page_size",
                message: "must be at least default_page_size".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TypetraceConfig::default();
        assert!(TypetraceConfig::validate(&config).is_ok());
        assert_eq!(config.runtime.flush_interval_ms, 2000);
        assert_eq!(config.collector.bind, "127.0.0.1:4302");
    }

    #[test]
    fn from_toml_partial_overrides() {
        let config = TypetraceConfig::from_toml(
            r#"
            [collector]
            database_path = "/tmp/profiles.db"

            [runtime]
            flush_interval_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.collector.database_path, "/tmp/profiles.db");
        assert_eq!(config.runtime.flush_interval_ms, 500);
        // Untouched sections keep their defaults.
        assert_eq!(config.collector.max_page_size, 500);
        assert_eq!(config.instrument.exclude, vec!["**/node_modules/**"]);
    }

    #[test]
    fn zero_flush_interval_rejected() {
        let err = TypetraceConfig::from_toml("[runtime]\nflush_interval_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field, .. }
            if field == "runtime.flush_interval_ms"));
    }

    #[test]
    fn page_size_bounds_enforced() {
        let err = TypetraceConfig::from_toml(
            "[collector]\ndefault_page_size = 100\nmax_page_size = 10\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
