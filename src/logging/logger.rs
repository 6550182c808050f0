// file: src/logging/logger.rs
// version: 2.0.0
// guid: 27dab5cd-1825-46c8-9a3c-da77ca14895f

//! Logger initialization and configuration
//!
//! Diagnostics go to stderr so they never mix with the menus and echoed
//! command output on stdout.

use crate::error::AdminError;
use crate::Result;
use tracing::Instrument;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the filter directive from CLI flags and the configured level
pub fn resolve_level(verbose: bool, quiet: bool, configured: &str) -> String {
    if quiet {
        "error".to_string()
    } else if verbose {
        "debug".to_string()
    } else if configured.trim().is_empty() {
        "info".to_string()
    } else {
        configured.trim().to_string()
    }
}

/// Initialize the logging system; `RUST_LOG` wins over `level` when set
pub fn init_logger(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AdminError::config(format!("Invalid log level '{}': {}", level, e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| AdminError::config(format!("Failed to initialize logger: {}", e)))?;

    Ok(())
}

/// Run `f` inside an `operation` span
pub async fn with_async_operation_span<F, Fut, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = R>,
{
    let span = tracing::info_span!("operation", name = operation);
    async move { f().await }.instrument(span).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level_precedence() {
        assert_eq!(resolve_level(true, true, "trace"), "error");
        assert_eq!(resolve_level(true, false, "warn"), "debug");
        assert_eq!(resolve_level(false, false, "warn"), "warn");
        assert_eq!(resolve_level(false, false, "  "), "info");
    }

    #[test]
    fn test_init_logger_twice_fails_gracefully() {
        // Arrange
        // The global subscriber can only be installed once per process.
        let _ = init_logger("info");

        // Act
        let second = init_logger("info");

        // Assert
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_with_async_operation_span() {
        // Arrange
        let operation = "snapshot_create";

        // Act
        let result = with_async_operation_span(operation, || async {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            42
        })
        .await;

        // Assert
        assert_eq!(result, 42);
    }
}
