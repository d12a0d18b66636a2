//! Configuration for fieldguard
//!
//! A [`GuardConfig`] describes the default permissions a schema falls back
//! to and, optionally, the log level. It can be written in TOML or JSON and
//! accepts two equivalent layouts for the defaults:
//!
//! ```toml
//! default_can_read = true
//! default_can_write = false
//! ```
//!
//! ```toml
//! [defaults]
//! can_read = false
//! can_write = true
//! ```
//!
//! The camelCase spellings (`defaultCanRead`, `canWrite`, ...) are accepted
//! too. When both layouts set the same default, the `[defaults]` table wins.

use crate::error::{GuardError, GuardResult};
use crate::permissions::types::{PermissionsPolicy, DEFAULT_CAN_READ, DEFAULT_CAN_WRITE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Structured `[defaults]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, alias = "canRead")]
    pub can_read: Option<bool>,
    #[serde(default, alias = "canWrite")]
    pub can_write: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default, alias = "defaultCanRead")]
    pub default_can_read: Option<bool>,
    #[serde(default, alias = "defaultCanWrite")]
    pub default_can_write: Option<bool>,
    #[serde(default)]
    pub defaults: Option<DefaultsConfig>,
    /// One of TRACE, DEBUG, INFO, WARN, ERROR (any case)
    #[serde(default, alias = "logLevel")]
    pub log_level: Option<String>,
}

impl GuardConfig {
    pub fn from_toml_str(data: &str) -> GuardResult<Self> {
        let config: Self = toml::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(data: &str) -> GuardResult<Self> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file. Files ending in `.json` are parsed as
    /// JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> GuardResult<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&data)
        } else {
            Self::from_toml_str(&data)
        }
    }

    /// Resolves the effective, immutable policy.
    #[must_use]
    pub fn policy(&self) -> PermissionsPolicy {
        let structured = self.defaults.clone().unwrap_or_default();
        PermissionsPolicy::new(
            structured
                .can_read
                .or(self.default_can_read)
                .unwrap_or(DEFAULT_CAN_READ),
            structured
                .can_write
                .or(self.default_can_write)
                .unwrap_or(DEFAULT_CAN_WRITE),
        )
    }

    /// Parsed log level, `None` when not configured.
    pub fn level_filter(&self) -> GuardResult<Option<log::LevelFilter>> {
        self.log_level
            .as_deref()
            .map(|level| {
                level.parse::<log::LevelFilter>().map_err(|_| {
                    GuardError::Config(format!("Unknown log level: {level}"))
                })
            })
            .transpose()
    }

    fn validate(&self) -> GuardResult<()> {
        self.level_filter().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_builtin_defaults() {
        let config = GuardConfig::from_toml_str("").unwrap();
        assert_eq!(config.policy(), PermissionsPolicy::new(true, false));
    }

    #[test]
    fn test_flat_layout() {
        let config =
            GuardConfig::from_toml_str("default_can_read = false\ndefault_can_write = true\n")
                .unwrap();
        assert_eq!(config.policy(), PermissionsPolicy::new(false, true));
    }

    #[test]
    fn test_structured_layout_camel_case_json() {
        let config =
            GuardConfig::from_json_str(r#"{"defaults": {"canRead": false, "canWrite": true}}"#)
                .unwrap();
        assert_eq!(config.policy(), PermissionsPolicy::new(false, true));
    }

    #[test]
    fn test_structured_wins_over_flat() {
        let config = GuardConfig::from_toml_str(
            "default_can_read = true\ndefault_can_write = false\n[defaults]\ncan_write = true\n",
        )
        .unwrap();
        assert_eq!(config.policy(), PermissionsPolicy::new(true, true));
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let err = GuardConfig::from_toml_str("log_level = \"loud\"").unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));

        let config = GuardConfig::from_toml_str("log_level = \"debug\"").unwrap();
        assert_eq!(config.level_filter().unwrap(), Some(log::LevelFilter::Debug));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = GuardConfig::from_toml_str("default_can_read = ").unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_load_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("guard.json");
        let mut file = fs::File::create(&json_path).unwrap();
        write!(file, r#"{{"defaultCanRead": false}}"#).unwrap();
        let config = GuardConfig::load(&json_path).unwrap();
        assert_eq!(config.policy(), PermissionsPolicy::new(false, false));

        let toml_path = dir.path().join("guard.toml");
        fs::write(&toml_path, "[defaults]\ncanRead = true\ncanWrite = true\n").unwrap();
        let config = GuardConfig::load(&toml_path).unwrap();
        assert_eq!(config.policy(), PermissionsPolicy::new(true, true));

        let missing = GuardConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, GuardError::Io(_)));
    }
}
