// file: src/cli/menu.rs
// version: 1.1.0
// guid: 5e9a13c7-b4f2-4d08-8c6e-a21f70d3b945

//! Interactive menus
//!
//! Every action ends with a pause so the operator can read its output. An
//! error inside an action is logged, shown on one line and the menu carries
//! on; only closed input leaves the loops early.

use super::output::{
    print_firewall_status, print_services, print_stat_sections, report_error, report_outcome,
};
use super::prompt::{is_input_closed, Prompt, PromptConfirm};
use crate::error::AdminError;
use crate::manager::firewall::COMMON_SERVICES;
use crate::manager::{
    FirewallManager, IpManager, Managers, PortRule, Preset, Protocol, SnapshotManager,
    SystemUpdater,
};
use crate::security::Guarded;
use crate::utils::validation::parse_port;
use crate::Result;
use tracing::error;

/// Finish one menu action: report an error if there was one, then pause
fn settle(result: Result<()>, prompt: &mut dyn Prompt) -> Result<()> {
    if let Err(e) = result {
        if is_input_closed(&e) {
            return Err(e);
        }
        error!("Menu action failed: {}", e);
        report_error(&e);
    }
    prompt.pause()
}

fn invalid_choice() -> Result<()> {
    println!("\nInvalid choice. Please try again.");
    Ok(())
}

fn header(prompt: &mut dyn Prompt, title: &str, entries: &[&str]) {
    prompt.clear_screen();
    println!("=== {} ===\n", title);
    for (i, entry) in entries.iter().enumerate() {
        println!("{}. {}", i + 1, entry);
    }
}

fn ask_choice(prompt: &mut dyn Prompt, count: usize) -> Result<String> {
    let choice = prompt.ask(&format!("\nEnter your choice (1-{}): ", count))?;
    Ok(choice.trim().to_string())
}

/// Top-level loop; returns when the operator picks Exit
pub async fn run_main_menu(managers: &Managers, prompt: &mut dyn Prompt) -> Result<()> {
    const ENTRIES: &[&str] = &[
        "System Updates",
        "System Snapshots",
        "Firewall Management",
        "IP Address Management",
        "Exit",
    ];

    loop {
        header(prompt, "Ubuntu System Management Tool", ENTRIES);
        match ask_choice(prompt, ENTRIES.len())?.as_str() {
            "1" => update_menu(&managers.updater, prompt).await?,
            "2" => snapshot_menu(&managers.snapshots, prompt).await?,
            "3" => firewall_menu(&managers.firewall, prompt).await?,
            "4" => ip_menu(&managers.ip, prompt).await?,
            "5" => {
                println!("\nExiting...");
                return Ok(());
            }
            _ => settle(invalid_choice(), prompt)?,
        }
    }
}

async fn update_menu(updater: &SystemUpdater, prompt: &mut dyn Prompt) -> Result<()> {
    const ENTRIES: &[&str] = &[
        "Update and upgrade system",
        "Install a package",
        "Back to main menu",
    ];

    loop {
        header(prompt, "System Update Menu", ENTRIES);
        let result = match ask_choice(prompt, ENTRIES.len())?.as_str() {
            "1" => {
                report_outcome(&updater.update_system().await);
                Ok(())
            }
            "2" => install_package(updater, prompt).await,
            "3" => return Ok(()),
            _ => invalid_choice(),
        };
        settle(result, prompt)?;
    }
}

async fn install_package(updater: &SystemUpdater, prompt: &mut dyn Prompt) -> Result<()> {
    let name = prompt.ask("Enter the package name: ")?;
    report_outcome(&updater.install_package(&name).await?);
    Ok(())
}

async fn snapshot_menu(snapshots: &SnapshotManager, prompt: &mut dyn Prompt) -> Result<()> {
    const ENTRIES: &[&str] = &[
        "Create system snapshot (default description)",
        "Create snapshot with custom description",
        "List existing snapshots",
        "Open Timeshift GUI (timeshift-gtk)",
        "Back to main menu",
    ];

    loop {
        header(prompt, "System Snapshot Manager", ENTRIES);
        let result = match ask_choice(prompt, ENTRIES.len())?.as_str() {
            "1" => create_snapshot(snapshots, None).await,
            "2" => match prompt.ask("Enter snapshot description: ") {
                Ok(description) => create_snapshot(snapshots, Some(&description)).await,
                Err(e) => Err(e),
            },
            "3" => {
                let outcome = snapshots.list_snapshots().await;
                if !outcome.is_success() {
                    report_outcome(&outcome);
                }
                Ok(())
            }
            "4" => {
                report_outcome(&snapshots.open_gui().await);
                Ok(())
            }
            "5" => return Ok(()),
            _ => invalid_choice(),
        };
        settle(result, prompt)?;
    }
}

async fn create_snapshot(snapshots: &SnapshotManager, description: Option<&str>) -> Result<()> {
    let outcome = snapshots.create_snapshot(description).await?;
    report_outcome(&outcome);
    if !outcome.is_success() {
        println!("Snapshot creation failed or was incomplete.");
        println!("You can check the Timeshift settings with: sudo timeshift-gtk");
    }
    Ok(())
}

async fn firewall_menu(firewall: &FirewallManager, prompt: &mut dyn Prompt) -> Result<()> {
    const ENTRIES: &[&str] = &[
        "Show Firewall Status",
        "Enable Firewall",
        "Disable Firewall",
        "Manage Ports",
        "Apply Common Configurations",
        "Show Network Statistics",
        "Back to main menu",
    ];

    loop {
        header(prompt, "UFW Firewall Management", ENTRIES);
        let result = match ask_choice(prompt, ENTRIES.len())?.as_str() {
            "1" => {
                print_firewall_status(&firewall.status().await);
                Ok(())
            }
            "2" => {
                report_outcome(&firewall.enable().await);
                Ok(())
            }
            "3" => {
                report_outcome(&firewall.disable().await);
                Ok(())
            }
            "4" => {
                port_menu(firewall, prompt).await?;
                continue;
            }
            "5" => match choose_preset(prompt) {
                Ok(None) => continue,
                Ok(Some(preset)) => {
                    report_outcome(&firewall.apply_preset(preset).await);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            "6" => {
                print_stat_sections(&firewall.network_stats().await);
                Ok(())
            }
            "7" => return Ok(()),
            _ => invalid_choice(),
        };
        settle(result, prompt)?;
    }
}

/// `None` when the operator goes back
fn choose_preset(prompt: &mut dyn Prompt) -> Result<Option<Preset>> {
    let mut entries: Vec<&str> = Preset::ALL.iter().map(Preset::label).collect();
    entries.push("Back to previous menu");
    header(prompt, "Common Configurations", &entries);

    let choice = ask_choice(prompt, entries.len())?;
    match choice.parse::<usize>() {
        Ok(n) if (1..=Preset::ALL.len()).contains(&n) => Ok(Some(Preset::ALL[n - 1])),
        Ok(n) if n == entries.len() => Ok(None),
        _ => Err(AdminError::validation(format!(
            "Invalid configuration choice: '{}'",
            choice
        ))),
    }
}

async fn port_menu(firewall: &FirewallManager, prompt: &mut dyn Prompt) -> Result<()> {
    const ENTRIES: &[&str] = &[
        "Open port for service",
        "Open custom port",
        "Close port",
        "Back to previous menu",
    ];

    loop {
        header(prompt, "Port Management", ENTRIES);
        let result = match ask_choice(prompt, ENTRIES.len())?.as_str() {
            "1" => open_service_port(firewall, prompt).await,
            "2" => open_custom_port(firewall, prompt).await,
            "3" => close_port(firewall, prompt).await,
            "4" => return Ok(()),
            _ => invalid_choice(),
        };
        settle(result, prompt)?;
    }
}

fn ask_port_rule(prompt: &mut dyn Prompt, question: &str) -> Result<PortRule> {
    let port = parse_port(&prompt.ask(question)?)?;
    let protocol = Protocol::parse_or_default(&prompt.ask("Enter protocol (tcp/udp) [tcp]: ")?)?;
    Ok(PortRule::allow(port, protocol))
}

async fn open_service_port(firewall: &FirewallManager, prompt: &mut dyn Prompt) -> Result<()> {
    print_services();
    let choice = ask_choice(prompt, COMMON_SERVICES.len())?;
    let service = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| COMMON_SERVICES.get(i))
        .ok_or_else(|| AdminError::validation(format!("Invalid service choice: '{}'", choice)))?;

    report_outcome(&firewall.add_rule(&PortRule::allow(service.port, Protocol::Tcp)).await);
    Ok(())
}

async fn open_custom_port(firewall: &FirewallManager, prompt: &mut dyn Prompt) -> Result<()> {
    let rule = ask_port_rule(prompt, "Enter the port number: ")?;
    report_outcome(&firewall.add_rule(&rule).await);
    Ok(())
}

async fn close_port(firewall: &FirewallManager, prompt: &mut dyn Prompt) -> Result<()> {
    let rule = ask_port_rule(prompt, "Enter the port number to close: ")?;
    let mut confirm = PromptConfirm::new(&mut *prompt);
    if let Guarded::Executed(outcome) = firewall.delete_rule(&rule, &mut confirm).await? {
        report_outcome(&outcome);
    }
    Ok(())
}

async fn ip_menu(ip: &IpManager, prompt: &mut dyn Prompt) -> Result<()> {
    const ENTRIES: &[&str] = &[
        "Allow IP Address",
        "Deny IP Address",
        "Delete IP Rules",
        "Show Current Rules",
        "Back to main menu",
    ];

    loop {
        header(prompt, "IP Address Management", ENTRIES);
        let result = match ask_choice(prompt, ENTRIES.len())?.as_str() {
            "1" => match prompt.ask("Enter IP address to allow: ") {
                Ok(address) => ip.allow_ip(&address).await.map(|o| report_outcome(&o)),
                Err(e) => Err(e),
            },
            "2" => match prompt.ask("Enter IP address to deny: ") {
                Ok(address) => ip.deny_ip(&address).await.map(|o| report_outcome(&o)),
                Err(e) => Err(e),
            },
            "3" => match prompt.ask("Enter IP address to delete rules for: ") {
                Ok(address) => ip.delete_rules(&address).await.map(|o| report_outcome(&o)),
                Err(e) => Err(e),
            },
            "4" => {
                let outcome = ip.show_rules().await;
                if !outcome.is_success() {
                    report_outcome(&outcome);
                }
                Ok(())
            }
            "5" => return Ok(()),
            _ => invalid_choice(),
        };
        settle(result, prompt)?;
    }
}
