// file: src/cli/commands.rs
// version: 2.0.0
// guid: 0c7d2e94-5f8a-4b31-a6e2-91d4b7f3c058

//! Non-interactive command implementations for the CLI
//!
//! Each command prints its outcome. A failed outcome becomes an error so the
//! process exits non-zero; degraded outcomes still exit zero.

use super::output::{print_firewall_status, print_stat_sections, report_outcome};
use super::prompt::{PromptConfirm, TerminalPrompt};
use crate::error::AdminError;
use crate::logging::with_async_operation_span;
use crate::manager::{Managers, PortRule, Protocol};
use crate::runner::Outcome;
use crate::security::Guarded;
use crate::utils::system::{SystemUtils, REQUIRED_COMMANDS};
use crate::Result;
use tracing::{error, info};

fn finish(outcome: Outcome) -> Result<()> {
    report_outcome(&outcome);
    if outcome.is_failed() {
        return Err(AdminError::execution(outcome.message().to_string()));
    }
    Ok(())
}

/// Refresh package lists and upgrade
pub async fn update_command(managers: &Managers) -> Result<()> {
    finish(with_async_operation_span("update", || managers.updater.update_system()).await)
}

pub async fn install_command(managers: &Managers, package: &str) -> Result<()> {
    let outcome =
        with_async_operation_span("install", || managers.updater.install_package(package)).await?;
    finish(outcome)
}

pub async fn snapshot_create_command(managers: &Managers, comment: Option<&str>) -> Result<()> {
    let outcome =
        with_async_operation_span("snapshot", || managers.snapshots.create_snapshot(comment)).await?;
    finish(outcome)
}

pub async fn snapshot_list_command(managers: &Managers) -> Result<()> {
    finish(managers.snapshots.list_snapshots().await)
}

pub async fn firewall_status_command(managers: &Managers) -> Result<()> {
    let status = managers.firewall.status().await;
    print_firewall_status(&status);
    Ok(())
}

pub async fn firewall_enable_command(managers: &Managers) -> Result<()> {
    finish(managers.firewall.enable().await)
}

pub async fn firewall_disable_command(managers: &Managers) -> Result<()> {
    finish(managers.firewall.disable().await)
}

pub async fn firewall_allow_command(managers: &Managers, port: u16, protocol: Protocol) -> Result<()> {
    finish(managers.firewall.add_rule(&PortRule::allow(port, protocol)).await)
}

/// Close a port; guarded rules ask for confirmation on the terminal
pub async fn firewall_close_command(managers: &Managers, port: u16, protocol: Protocol) -> Result<()> {
    let mut prompt = TerminalPrompt;
    let mut confirm = PromptConfirm::new(&mut prompt);
    match managers
        .firewall
        .delete_rule(&PortRule::allow(port, protocol), &mut confirm)
        .await?
    {
        Guarded::Declined => Ok(()),
        Guarded::Executed(outcome) => finish(outcome),
    }
}

pub async fn network_stats_command(managers: &Managers) -> Result<()> {
    let sections = managers.firewall.network_stats().await;
    print_stat_sections(&sections);
    Ok(())
}

/// Check system prerequisites
pub async fn check_prerequisites_command() -> Result<()> {
    info!("Checking system prerequisites");

    let missing = SystemUtils::check_prerequisites();
    for command in REQUIRED_COMMANDS {
        if missing.iter().any(|m| m == command) {
            println!("✗ {} not found", command);
        } else {
            println!("✓ {}", command);
        }
    }

    if missing.is_empty() {
        info!("✓ All required system commands are available");
    } else {
        error!("✗ Missing required commands: {}", missing.join(", "));
        let mut packages: Vec<&str> = missing
            .iter()
            .filter_map(|cmd| SystemUtils::package_for(cmd))
            .collect();
        packages.dedup();
        println!("\nInstall missing packages:\n  sudo apt install {}", packages.join(" "));
    }

    if SystemUtils::is_root() {
        println!("✓ Running as root");
    } else {
        println!("⚠ Not running as root - all other commands require sudo");
    }

    Ok(())
}
