// file: src/config/mod.rs
// version: 2.0.0
// guid: 745285bf-c8a1-4284-a3fb-dacb1b714387

//! Configuration module for Ubuntu System Manager
//!
//! Every section has defaults, so an absent or partial TOML file is valid.

pub mod loader;

pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub execution: ExecutionConfig,
    pub logging: LoggingConfig,
    pub snapshot: SnapshotConfig,
    pub safety: SafetyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Kill commands running longer than this; `None` or 0 waits forever
    pub timeout_seconds: Option<u64>,
    /// Stream command output to the terminal while it runs
    pub echo: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            echo: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub timeshift_path: PathBuf,
    /// Directory whose presence means timeshift has been set up
    pub config_path: PathBuf,
    /// Prefix for generated snapshot comments
    pub comment_prefix: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            timeshift_path: PathBuf::from("/usr/bin/timeshift"),
            config_path: PathBuf::from("/etc/timeshift"),
            comment_prefix: "Ubuntu".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Ask before every firewall rule deletion, not only the SSH rule
    pub confirm_all_deletions: bool,
}

impl Config {
    pub fn timeout(&self) -> Option<Duration> {
        self.execution
            .timeout_seconds
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.execution.echo);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.snapshot.config_path, PathBuf::from("/etc/timeshift"));
        assert!(!config.safety.confirm_all_deletions);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let mut config = Config::default();
        config.execution.timeout_seconds = Some(0);
        assert_eq!(config.timeout(), None);

        config.execution.timeout_seconds = Some(90);
        assert_eq!(config.timeout(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[snapshot]\ncomment_prefix = \"Mint\"\n").unwrap();
        assert_eq!(config.snapshot.comment_prefix, "Mint");
        assert_eq!(config.snapshot.timeshift_path, PathBuf::from("/usr/bin/timeshift"));
        assert!(config.execution.echo);
    }
}
