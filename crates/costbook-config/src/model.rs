use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::ConfigError;

/// Stores user-configurable settings for ledger storage and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for ledger documents. Defaults to `<base>/ledgers`.
    pub data_root: Option<PathBuf>,

    #[serde(default = "Config::default_max_write_attempts")]
    pub max_write_attempts: u32,

    /// Report budget in milliseconds; `None` disables the deadline.
    #[serde(default = "Config::default_report_timeout_ms")]
    pub report_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            data_root: None,
            max_write_attempts: Self::default_max_write_attempts(),
            report_timeout_ms: Self::default_report_timeout_ms(),
        }
    }
}

impl Config {
    pub fn default_max_write_attempts() -> u32 {
        5
    }

    pub fn default_report_timeout_ms() -> Option<u64> {
        Some(30_000)
    }

    pub fn report_timeout(&self) -> Option<Duration> {
        self.report_timeout_ms.map(Duration::from_millis)
    }

    pub fn resolve_data_root(&self, base: &Path) -> PathBuf {
        match &self.data_root {
            Some(path) => path.clone(),
            None => base.join("ledgers"),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_write_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_write_attempts must be at least 1".into(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(ConfigError::Invalid("currency must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: Config =
            serde_json::from_str(r#"{"currency":"EUR"}"#).unwrap();
        assert_eq!(cfg.max_write_attempts, 5);
        assert_eq!(cfg.report_timeout(), Some(Duration::from_secs(30)));
        assert!(cfg.data_root.is_none());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let cfg: Config =
            serde_json::from_str(r#"{"locale":"pt-PT","currency":"EUR"}"#).unwrap();
        assert_eq!(cfg.currency, "EUR");
    }

    #[test]
    fn explicit_null_timeout_disables_deadline() {
        let cfg: Config = serde_json::from_str(
            r#"{"currency":"USD","report_timeout_ms":null}"#,
        )
        .unwrap();
        assert_eq!(cfg.report_timeout(), None);
    }

    #[test]
    fn custom_data_root_wins() {
        let cfg = Config {
            data_root: Some(PathBuf::from("/srv/costbook")),
            ..Config::default()
        };
        assert_eq!(
            cfg.resolve_data_root(Path::new("/home/user/.costbook")),
            PathBuf::from("/srv/costbook")
        );
        assert_eq!(
            Config::default().resolve_data_root(Path::new("/tmp/cb")),
            PathBuf::from("/tmp/cb/ledgers")
        );
    }

    #[test]
    fn zero_attempts_is_invalid() {
        let cfg = Config {
            max_write_attempts: 0,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }
}
