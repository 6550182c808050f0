// file: src/error.rs
// version: 1.0.0
// guid: 61b5a671-8492-47b2-9fd4-2a21ed18c604

use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AdminError>;

/// Error types for the Ubuntu System Manager
///
/// Expected command failures are never errors: they come back as
/// [`crate::runner::CommandResult`] values and get classified. These variants
/// cover input rejection, configuration problems and broken plumbing.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Command execution error: {0}")]
    Execution(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("System error: {0}")]
    System(String),
}

impl AdminError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new execution error
    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new permission error
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    /// Create a new system error
    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// Whether this error was caused by operator input rather than the host
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
