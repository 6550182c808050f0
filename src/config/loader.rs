// file: src/config/loader.rs
// version: 2.0.0
// guid: b0e3a935-5f9e-4b9a-b0e9-cb13771faab3

//! Configuration file loading and environment variable overrides

use super::Config;
use crate::error::AdminError;
use crate::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const ENV_TIMEOUT: &str = "USM_TIMEOUT";
pub const ENV_ECHO: &str = "USM_ECHO";
pub const ENV_LOG_LEVEL: &str = "USM_LOG_LEVEL";

/// Configuration loader with environment variable overrides
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader seeded from the process environment
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Loader that ignores the process environment
    pub fn empty() -> Self {
        Self {
            env_vars: HashMap::new(),
        }
    }

    /// Set environment variable for overrides
    pub fn set_env_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env_vars.insert(key.into(), value.into());
    }

    /// Default location: `<config dir>/ubuntu-system-manager/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ubuntu-system-manager").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// read when present and built-in defaults are used otherwise.
    /// Environment overrides are applied last.
    pub fn load(&self, path: Option<&Path>) -> Result<Config> {
        let config = match path {
            Some(path) => self.load_from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => self.load_from_file(&default)?,
                _ => {
                    debug!("No configuration file found, using defaults");
                    Config::default()
                }
            },
        };

        Ok(self.apply_env_overrides(config))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(&self, path: &Path) -> Result<Config> {
        info!("Loading configuration from: {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| {
            AdminError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, mut config: Config) -> Config {
        if let Some(timeout) = self.env_vars.get(ENV_TIMEOUT) {
            match timeout.trim().parse::<u64>() {
                Ok(0) => config.execution.timeout_seconds = None,
                Ok(secs) => config.execution.timeout_seconds = Some(secs),
                Err(_) => warn!("Ignoring invalid {}={}", ENV_TIMEOUT, timeout),
            }
        }

        if let Some(echo) = self.env_vars.get(ENV_ECHO) {
            match echo.trim().parse::<bool>() {
                Ok(echo) => config.execution.echo = echo,
                Err(_) => warn!("Ignoring invalid {}={}", ENV_ECHO, echo),
            }
        }

        if let Some(level) = self.env_vars.get(ENV_LOG_LEVEL) {
            config.logging.level = level.trim().to_string();
        }

        config
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[execution]
timeout_seconds = 600
echo = false

[snapshot]
comment_prefix = "Mint_XFCE"

[safety]
confirm_all_deletions = true
"#
        )
        .unwrap();

        let config = ConfigLoader::empty().load(Some(file.path()))?;

        assert_eq!(config.timeout(), Some(Duration::from_secs(600)));
        assert!(!config.execution.echo);
        assert_eq!(config.snapshot.comment_prefix, "Mint_XFCE");
        assert!(config.safety.confirm_all_deletions);
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = ConfigLoader::empty().load(Some(Path::new("/nonexistent/usm.toml")));
        assert!(matches!(result, Err(AdminError::Config(_))));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[execution\ntimeout_seconds = ").unwrap();

        let result = ConfigLoader::empty().load(Some(file.path()));

        assert!(matches!(result, Err(AdminError::ConfigParse(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut loader = ConfigLoader::empty();
        loader.set_env_var(ENV_TIMEOUT, "45");
        loader.set_env_var(ENV_ECHO, "false");
        loader.set_env_var(ENV_LOG_LEVEL, "debug");

        let config = loader.apply_env_overrides(Config::default());

        assert_eq!(config.timeout(), Some(Duration::from_secs(45)));
        assert!(!config.execution.echo);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut loader = ConfigLoader::empty();
        loader.set_env_var(ENV_TIMEOUT, "soon");
        loader.set_env_var(ENV_ECHO, "maybe");

        let config = loader.apply_env_overrides(Config::default());

        assert_eq!(config, Config::default());
    }
}
