// file: src/manager/snapshot.rs
// version: 1.0.0
// guid: 4154d879-9db0-48a5-8127-541f3650000e

//! System snapshots through timeshift
//!
//! timeshift reports some failed snapshots with exit code 0: when rsync runs
//! out of space it deletes the half-written snapshot, prints
//! `Removing snapshots (incomplete)` and exits cleanly. Creation is therefore
//! classified with [`snapshot_create_rules`] instead of trusting the exit code.

use crate::config::SnapshotConfig;
use crate::runner::{classify, CommandExecutor, CommandSpec, MarkerRule, Outcome, OutcomeKind};
use crate::utils::validation::validate_comment;
use crate::Result;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{info, warn};

pub const RSYNC_ERROR_MESSAGE: &str =
    "rsync error — verify backup destination has sufficient space.";
pub const INCOMPLETE_MESSAGE: &str = "snapshot incomplete and was cleaned up.";

/// Markers for `timeshift --create`, most severe first
pub fn snapshot_create_rules() -> Vec<MarkerRule> {
    vec![
        MarkerRule::failed_on_stderr("rsync returned an error", RSYNC_ERROR_MESSAGE),
        MarkerRule::failed_on_stderr("Failed to create new snapshot", RSYNC_ERROR_MESSAGE),
        MarkerRule::failed_on_stdout("Removing snapshots (incomplete)", INCOMPLETE_MESSAGE),
    ]
}

/// Comment used when the operator does not supply one
pub fn default_comment(prefix: &str, now: DateTime<Local>) -> String {
    format!("{}_snapshot_{}", prefix, now.format("%Y%m%d_%H%M%S"))
}

/// Creates and lists timeshift snapshots
pub struct SnapshotManager {
    executor: Arc<dyn CommandExecutor>,
    echo: bool,
    settings: SnapshotConfig,
}

impl SnapshotManager {
    pub fn new(executor: Arc<dyn CommandExecutor>, echo: bool, settings: SnapshotConfig) -> Self {
        Self {
            executor,
            echo,
            settings,
        }
    }

    fn timeshift(&self) -> CommandSpec {
        CommandSpec::new(self.settings.timeshift_path.to_string_lossy())
    }

    /// Install timeshift and run its first-time setup when either is missing
    pub async fn ensure_timeshift(&self) -> Outcome {
        if !self.settings.timeshift_path.exists() {
            info!("Timeshift is not installed. Installing now...");
            let spec = CommandSpec::new("apt-get").args(["install", "timeshift", "-y"]);
            let installed = classify(&self.executor.execute(&spec, self.echo).await, &[]);
            if installed.is_failed() {
                warn!("Timeshift installation failed: {}", installed.message());
                return Outcome::failed(format!(
                    "Failed to install Timeshift ({}). Please install it manually with: sudo apt-get install timeshift",
                    installed.message()
                ));
            }
        }

        if !self.settings.config_path.exists() {
            info!("Timeshift is not configured. Running initial setup...");
            let setup = classify(
                &self.executor.execute(&self.timeshift().arg("--setup"), self.echo).await,
                &[],
            );
            if setup.is_failed() {
                warn!("Timeshift setup failed: {}", setup.message());
                return Outcome::failed(format!(
                    "Timeshift setup failed ({}). Please run 'sudo timeshift-gtk' to configure Timeshift graphically",
                    setup.message()
                ));
            }
        }

        Outcome::success("Timeshift is installed and configured")
    }

    /// Create a snapshot, generating a timestamped comment when none is given
    pub async fn create_snapshot(&self, description: Option<&str>) -> Result<Outcome> {
        let comment = match description.map(validate_comment).transpose()? {
            Some(comment) if !comment.is_empty() => comment,
            _ => default_comment(&self.settings.comment_prefix, Local::now()),
        };

        let ready = self.ensure_timeshift().await;
        if ready.is_failed() {
            return Ok(ready);
        }

        info!("Creating system snapshot '{}'...", comment);
        let spec = self
            .timeshift()
            .args(["--create", "--comments", comment.as_str(), "--verbose"]);
        let result = self.executor.execute(&spec, self.echo).await;
        let outcome = classify(&result, &snapshot_create_rules());

        Ok(match outcome.kind() {
            OutcomeKind::Success => {
                Outcome::success(format!("Snapshot '{}' created and verified successfully", comment))
            }
            OutcomeKind::Degraded | OutcomeKind::Failed => {
                warn!("Snapshot creation did not complete: {}", outcome.message());
                outcome
            }
        })
    }

    /// Print the existing snapshots; listing output is always shown
    pub async fn list_snapshots(&self) -> Outcome {
        let ready = self.ensure_timeshift().await;
        if ready.is_failed() {
            return ready;
        }

        let result = self
            .executor
            .execute(&self.timeshift().args(["--list", "--verbose"]), true)
            .await;
        classify(&result, &[])
    }

    /// Launch the graphical timeshift front-end
    pub async fn open_gui(&self) -> Outcome {
        let result = self
            .executor
            .execute(&CommandSpec::new("timeshift-gtk"), self.echo)
            .await;
        classify(&result, &[])
    }
}
