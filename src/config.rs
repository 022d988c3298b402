//! Runtime configuration read from the environment.
//!
//! Every setting has a default, so a bare `cardiorisk` run loads
//! `models/heart_disease_model.json` and logs to `cardiorisk.log` when
//! attached to a terminal.

use std::path::PathBuf;

use crate::adapters::artifact::IntegrityPolicy;

pub const DEFAULT_MODEL_PATH: &str = "models/heart_disease_model.json";
pub const DEFAULT_LOG_FILE: &str = "cardiorisk.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when attached to a terminal, stdout otherwise.
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Serialized classifier (`CARDIORISK_MODEL_PATH`)
    pub model_path: PathBuf,

    /// Artifact integrity requirements
    pub integrity: IntegrityPolicy,

    /// `CARDIORISK_LOG_MODE`: auto | file | stdout
    pub log_mode: LogMode,

    /// `CARDIORISK_LOG_FILE`
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            integrity: IntegrityPolicy::default(),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

impl AppConfig {
    /// Read settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            model_path: lookup("CARDIORISK_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            integrity: IntegrityPolicy {
                require_signature: lookup("CARDIORISK_REQUIRE_SIGNED_MODEL")
                    .is_some_and(|v| parse_bool(&v)),
                pubkey_file: lookup("CARDIORISK_MODEL_SIGNING_PUBKEY_B64_FILE")
                    .map(|v| PathBuf::from(v.trim())),
            },
            log_mode: lookup("CARDIORISK_LOG_MODE")
                .map(|v| LogMode::parse(&v))
                .unwrap_or(defaults.log_mode),
            log_file: lookup("CARDIORISK_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert!(!config.integrity.require_signature);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("CARDIORISK_MODEL_PATH", "/srv/model.json"),
            ("CARDIORISK_REQUIRE_SIGNED_MODEL", "TRUE"),
            ("CARDIORISK_MODEL_SIGNING_PUBKEY_B64_FILE", " /run/secrets/pub "),
            ("CARDIORISK_LOG_MODE", "stdout"),
        ]);
        assert_eq!(config.model_path, PathBuf::from("/srv/model.json"));
        assert!(config.integrity.require_signature);
        assert_eq!(
            config.integrity.pubkey_file,
            Some(PathBuf::from("/run/secrets/pub"))
        );
        assert_eq!(config.log_mode, LogMode::Stdout);
    }

    #[test]
    fn test_log_mode_resolution() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert_eq!(LogMode::parse("bogus"), LogMode::Auto);
    }
}
