//! Journal configuration.
//!
//! # Responsibility
//! - Hold storage key layout, reveal-session parameters and log level.
//! - Load from TOML with per-field defaults.
//!
//! # Invariants
//! - A validated config never has empty keys or zero durations.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

/// Storage key holding the JSON array of record ids.
pub const DEFAULT_INDEX_KEY: &str = "record_keys";
/// Prefix joined with a record id to form its storage key.
pub const DEFAULT_RECORD_KEY_PREFIX: &str = "record_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    pub index_key: String,
    pub record_key_prefix: String,
    /// Validity window advertised in reveal challenges.
    pub duration_days: u32,
    /// Upper bound on waiting for a signature prompt.
    pub signature_timeout_secs: u64,
    /// Overrides the wallet-reported chain id in challenges.
    pub chain_id: Option<u64>,
    /// Overrides the store-reported address in challenges.
    pub contract_address: Option<String>,
    pub log_level: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            index_key: DEFAULT_INDEX_KEY.to_string(),
            record_key_prefix: DEFAULT_RECORD_KEY_PREFIX.to_string(),
            duration_days: 30,
            signature_timeout_secs: 60,
            chain_id: None,
            contract_address: None,
            log_level: crate::default_log_level().to_string(),
        }
    }
}

impl JournalConfig {
    /// Parses and validates a TOML document; missing fields take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(source) => Self::from_toml_str(&source),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(format!("{}: {err}", path.display()))),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index_key.trim().is_empty() {
            return Err(ConfigError::Invalid("index_key must not be empty"));
        }
        if self.record_key_prefix.is_empty() {
            return Err(ConfigError::Invalid("record_key_prefix must not be empty"));
        }
        if self.duration_days == 0 {
            return Err(ConfigError::Invalid("duration_days must be positive"));
        }
        if self.signature_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "signature_timeout_secs must be positive",
            ));
        }
        Ok(())
    }

    pub fn signature_timeout(&self) -> Duration {
        Duration::from_secs(self.signature_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(message) => write!(f, "failed to read config: {message}"),
            Self::Parse(message) => write!(f, "failed to parse config: {message}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, JournalConfig, DEFAULT_INDEX_KEY};
    use std::time::Duration;

    #[test]
    fn empty_document_yields_defaults() {
        let config = JournalConfig::from_toml_str("").unwrap();
        assert_eq!(config, JournalConfig::default());
        assert_eq!(config.index_key, DEFAULT_INDEX_KEY);
        assert_eq!(config.duration_days, 30);
        assert_eq!(config.signature_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = JournalConfig::from_toml_str(
            "signature_timeout_secs = 5\nchain_id = 11155111\ncontract_address = \"0xfeed\"\n",
        )
        .unwrap();
        assert_eq!(config.signature_timeout_secs, 5);
        assert_eq!(config.chain_id, Some(11_155_111));
        assert_eq!(config.contract_address.as_deref(), Some("0xfeed"));
        assert_eq!(config.record_key_prefix, "record_");
    }

    #[test]
    fn rejects_invalid_values() {
        let err = JournalConfig::from_toml_str("duration_days = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = JournalConfig::from_toml_str("index_key = \"  \"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = JournalConfig::from_toml_str("duration_days = \"ten\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, JournalConfig::default());
    }
}
