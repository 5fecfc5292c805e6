// Configuration for mocks and verifiers
//
// This module provides the knobs shared by every mock: whether verification is
// exclusive by default, whether failure messages carry the ledger dump, and
// whether recording logs each call.

use serde::{Deserialize, Serialize};

use mimic_error::{ConfigError, ConfigResult};

pub const ENV_EXCLUSIVE: &str = "MIMIC_EXCLUSIVE";
pub const ENV_LEDGER_DUMP: &str = "MIMIC_LEDGER_DUMP";
pub const ENV_LOG_CALLS: &str = "MIMIC_LOG_CALLS";

/// Configuration for mocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Flag calls to a verified signature made with other types
    pub exclusive_by_default: bool,

    /// Append the ledger dump to verification failures
    pub include_ledger_dump: bool,

    /// Emit a debug event for every recorded call
    pub log_calls: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            exclusive_by_default: true,
            include_ledger_dump: true,
            log_calls: true,
        }
    }
}

impl MockConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive_by_default = exclusive;
        self
    }

    pub fn with_ledger_dump(mut self, include: bool) -> Self {
        self.include_ledger_dump = include;
        self
    }

    pub fn with_call_logging(mut self, enable: bool) -> Self {
        self.log_calls = enable;
        self
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults overridden by `MIMIC_*` environment variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_EXCLUSIVE) {
            config.exclusive_by_default = parse_flag(ENV_EXCLUSIVE, &value)?;
        }
        if let Some(value) = lookup(ENV_LEDGER_DUMP) {
            config.include_ledger_dump = parse_flag(ENV_LEDGER_DUMP, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_CALLS) {
            config.log_calls = parse_flag(ENV_LOG_CALLS, &value)?;
        }
        Ok(config)
    }
}

fn parse_flag(variable: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            variable: variable.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = MockConfig::default();
        assert!(config.exclusive_by_default);
        assert!(config.include_ledger_dump);
        assert!(config.log_calls);
    }

    #[test]
    fn test_config_builder() {
        let config = MockConfig::new()
            .with_exclusive(false)
            .with_ledger_dump(false)
            .with_call_logging(false);

        assert!(!config.exclusive_by_default);
        assert!(!config.include_ledger_dump);
        assert!(!config.log_calls);
    }

    #[test]
    fn test_from_toml() {
        let config = MockConfig::from_toml_str("exclusive_by_default = false").unwrap();
        assert!(!config.exclusive_by_default);
        assert!(config.include_ledger_dump);

        let err = MockConfig::from_toml_str("exclusive_by_default = \"maybe\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> =
            [(ENV_EXCLUSIVE, "0"), (ENV_LOG_CALLS, "TRUE")].into_iter().collect();
        let config = MockConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert!(!config.exclusive_by_default);
        assert!(config.include_ledger_dump);
        assert!(config.log_calls);

        let err = MockConfig::from_lookup(|name| {
            (name == ENV_LEDGER_DUMP).then(|| "yes".to_string())
        })
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidFlag {
                variable: ENV_LEDGER_DUMP.to_string(),
                value: "yes".to_string(),
            }
        );
    }
}
