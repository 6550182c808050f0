// file: src/utils/system.rs
// version: 2.0.0
// guid: e2e17994-3182-490a-a4c7-348f77c9a0e2

//! System utility functions

use tracing::{debug, warn};

/// External tools the manager shells out to
pub const REQUIRED_COMMANDS: &[&str] = &["ufw", "apt", "apt-get", "timeshift", "ip", "ss"];

/// System utility functions
pub struct SystemUtils;

impl SystemUtils {
    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        match which::which(command) {
            Ok(path) => {
                debug!("Found {} at {}", command, path.display());
                true
            }
            Err(_) => false,
        }
    }

    /// Check if running with an effective uid of 0
    pub fn is_root() -> bool {
        #[cfg(unix)]
        {
            unsafe { libc::geteuid() == 0 }
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Return the subset of `commands` missing from PATH
    pub fn missing_commands(commands: &[&str]) -> Vec<String> {
        let missing: Vec<String> = commands
            .iter()
            .filter(|cmd| !Self::command_exists(cmd))
            .map(|cmd| cmd.to_string())
            .collect();

        if !missing.is_empty() {
            warn!("Missing commands: {}", missing.join(", "));
        }
        missing
    }

    /// Check the tools this manager depends on
    pub fn check_prerequisites() -> Vec<String> {
        Self::missing_commands(REQUIRED_COMMANDS)
    }

    /// Debian package that provides a given command
    pub fn package_for(command: &str) -> Option<&'static str> {
        match command {
            "ufw" => Some("ufw"),
            "apt" | "apt-get" => Some("apt"),
            "timeshift" => Some("timeshift"),
            "ip" | "ss" => Some("iproute2"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        assert!(SystemUtils::command_exists("sh"));
        assert!(!SystemUtils::command_exists("nonexistent-command-12345"));
    }

    #[test]
    fn test_missing_commands_filters_present_ones() {
        let missing = SystemUtils::missing_commands(&["sh", "nonexistent-command-12345"]);
        assert_eq!(missing, vec!["nonexistent-command-12345".to_string()]);
    }

    #[test]
    fn test_package_for_known_tools() {
        assert_eq!(SystemUtils::package_for("ss"), Some("iproute2"));
        assert_eq!(SystemUtils::package_for("apt-get"), Some("apt"));
        assert_eq!(SystemUtils::package_for("unknown"), None);
    }

    #[test]
    fn test_is_root_matches_uid() {
        #[cfg(unix)]
        assert_eq!(SystemUtils::is_root(), unsafe { libc::geteuid() } == 0);
    }
}
