// file: src/manager/update.rs
// version: 1.0.0
// guid: e153af56-4721-4710-a539-4c0b60f4f187

//! Package updates through apt

use crate::runner::{classify, CommandExecutor, CommandSpec, MarkerRule, Outcome, StreamKind};
use crate::utils::validation::validate_package_name;
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

const LOCK_HINT: &str =
    "package database is locked by another process; wait for it to finish and retry.";

/// Markers for `apt update`
pub fn refresh_rules() -> Vec<MarkerRule> {
    vec![
        MarkerRule::failed_on_stderr("Could not get lock", LOCK_HINT),
        MarkerRule::degraded_on(
            StreamKind::Stderr,
            "Some index files failed to download",
            "some package sources could not be refreshed; older package lists were used.",
        ),
    ]
}

/// Markers for `apt upgrade` and `apt-get install`
pub fn upgrade_rules() -> Vec<MarkerRule> {
    vec![
        MarkerRule::failed_on_stderr("Could not get lock", LOCK_HINT),
        MarkerRule::degraded_on(
            StreamKind::Stdout,
            "have been kept back",
            "some packages were kept back and not upgraded.",
        ),
    ]
}

/// Runs apt on behalf of the operator
pub struct SystemUpdater {
    executor: Arc<dyn CommandExecutor>,
    echo: bool,
}

impl SystemUpdater {
    pub fn new(executor: Arc<dyn CommandExecutor>, echo: bool) -> Self {
        Self { executor, echo }
    }

    /// Refresh package lists, then upgrade only if the refresh did not fail
    pub async fn update_system(&self) -> Outcome {
        info!("Updating package lists...");
        let refresh = self
            .executor
            .execute(&CommandSpec::new("apt").arg("update"), self.echo)
            .await;
        let refresh = classify(&refresh, &refresh_rules());
        if refresh.is_failed() {
            return Outcome::failed(format!("Updating package lists failed: {}", refresh.message()));
        }

        info!("Upgrading packages...");
        let upgrade = self
            .executor
            .execute(&CommandSpec::new("apt").args(["upgrade", "-y"]), self.echo)
            .await;
        let upgrade = classify(&upgrade, &upgrade_rules());
        if upgrade.is_failed() {
            return Outcome::failed(format!("Upgrading packages failed: {}", upgrade.message()));
        }

        let warnings: Vec<&str> = [&refresh, &upgrade]
            .into_iter()
            .filter(|o| o.is_degraded())
            .map(Outcome::message)
            .collect();

        if warnings.is_empty() {
            Outcome::success("System update completed successfully")
        } else {
            warn!("System update finished with warnings");
            Outcome::degraded(format!(
                "System update completed with warnings: {}",
                warnings.join(" ")
            ))
        }
    }

    /// Install a single package
    pub async fn install_package(&self, name: &str) -> Result<Outcome> {
        let name = validate_package_name(name)?;
        info!("Installing package {}", name);

        let spec = CommandSpec::new("apt-get").args(["install", name.as_str(), "-y"]);
        let result = self.executor.execute(&spec, self.echo).await;
        let outcome = classify(&result, &upgrade_rules());

        if outcome.is_success() {
            return Ok(Outcome::success(format!("Package {} installed", name)));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::testing::FakeExecutor;
    use crate::runner::CommandResult;

    fn updater(fake: &Arc<FakeExecutor>) -> SystemUpdater {
        SystemUpdater::new(fake.clone(), false)
    }

    #[tokio::test]
    async fn test_update_runs_refresh_then_upgrade() {
        let fake = Arc::new(FakeExecutor::new());

        let outcome = updater(&fake).update_system().await;

        assert!(outcome.is_success());
        assert_eq!(fake.calls(), vec!["apt update", "apt upgrade -y"]);
    }

    #[tokio::test]
    async fn test_failed_refresh_skips_upgrade() {
        let fake = Arc::new(FakeExecutor::with_responses(vec![CommandResult::from_text(
            100,
            "",
            "E: Could not get lock /var/lib/apt/lists/lock",
        )]));

        let outcome = updater(&fake).update_system().await;

        assert!(outcome.is_failed());
        assert!(outcome.message().contains("locked by another process"));
        assert_eq!(fake.calls(), vec!["apt update"]);
    }

    #[tokio::test]
    async fn test_index_warning_degrades_update() {
        let fake = Arc::new(FakeExecutor::with_responses(vec![
            CommandResult::from_text(
                0,
                "Reading package lists...",
                "W: Some index files failed to download. They have been ignored.",
            ),
            CommandResult::from_text(0, "0 upgraded, 0 newly installed", ""),
        ]));

        let outcome = updater(&fake).update_system().await;

        assert!(outcome.is_degraded());
        assert!(outcome.message().contains("could not be refreshed"));
    }

    #[tokio::test]
    async fn test_failed_upgrade_is_reported() {
        let fake = Arc::new(FakeExecutor::with_responses(vec![
            CommandResult::from_text(0, "", ""),
            CommandResult::from_text(100, "", "E: Sub-process /usr/bin/dpkg returned an error code (1)"),
        ]));

        let outcome = updater(&fake).update_system().await;

        assert!(outcome.is_failed());
        assert!(outcome.message().starts_with("Upgrading packages failed"));
        assert!(outcome.message().contains("dpkg"));
    }

    #[tokio::test]
    async fn test_install_rejects_bad_name_without_running() {
        let fake = Arc::new(FakeExecutor::new());

        let result = updater(&fake).install_package("vim; rm -rf /").await;

        assert!(result.unwrap_err().is_validation());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_install_package() {
        let fake = Arc::new(FakeExecutor::new());

        let outcome = updater(&fake).install_package("htop").await.unwrap();

        assert!(outcome.is_success());
        assert_eq!(fake.calls(), vec!["apt-get install htop -y"]);
    }
}
