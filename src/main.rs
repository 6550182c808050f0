// file: src/main.rs
// version: 2.1.0
// guid: 5d8a6e11-758d-4bb3-8f6d-44e9068f0150

//! Ubuntu System Manager - Main entry point

use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, error, warn};
use ubuntu_system_manager::{
    cli::{
        args::{Cli, Commands, FirewallAction, SnapshotAction},
        commands::*,
        prompt::is_input_closed,
        run_main_menu, TerminalPrompt,
    },
    config::ConfigLoader,
    logging::logger,
    manager::Managers,
    runner::{CommandExecutor, CommandRunner},
    utils::SystemUtils,
    Result,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ConfigLoader::new().load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let level = logger::resolve_level(cli.verbose, cli.quiet, &config.logging.level);
    if let Err(e) = logger::init_logger(&level) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        return ExitCode::FAILURE;
    }
    debug!("Loaded configuration: {:?}", config);

    let needs_root = !matches!(cli.command, Some(Commands::CheckPrereqs));
    if needs_root && !SystemUtils::is_root() {
        eprintln!("This program must be run as root. Please use sudo.");
        return ExitCode::FAILURE;
    }

    let executor: Arc<dyn CommandExecutor> =
        Arc::new(CommandRunner::new().with_timeout(config.timeout()));
    let managers = Managers::new(executor, &config);

    // Prompts block on stdin, so a Ctrl+C listener could never be polled
    // there. SIGINT keeps its default action and ends the process.
    if cli.reads_stdin() {
        return exit_code(dispatch(cli.command, &managers).await);
    }

    let shutdown_signal = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = dispatch(cli.command, &managers) => exit_code(result),
        _ = shutdown_signal => {
            warn!("Application interrupted by user");
            ExitCode::from(130)
        }
    }
}

fn exit_code(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(command: Option<Commands>, managers: &Managers) -> Result<()> {
    match command {
        None | Some(Commands::Menu) => {
            let mut prompt = TerminalPrompt;
            match run_main_menu(managers, &mut prompt).await {
                Err(e) if is_input_closed(&e) => {
                    debug!("Input closed, leaving menu");
                    Ok(())
                }
                other => other,
            }
        }
        Some(Commands::Update) => update_command(managers).await,
        Some(Commands::Install { package }) => install_command(managers, &package).await,
        Some(Commands::Snapshot { action }) => match action {
            SnapshotAction::Create { comment } => {
                snapshot_create_command(managers, comment.as_deref()).await
            }
            SnapshotAction::List => snapshot_list_command(managers).await,
        },
        Some(Commands::Firewall { action }) => match action {
            FirewallAction::Status => firewall_status_command(managers).await,
            FirewallAction::Enable => firewall_enable_command(managers).await,
            FirewallAction::Disable => firewall_disable_command(managers).await,
            FirewallAction::Allow { port, protocol } => {
                firewall_allow_command(managers, port, protocol.into()).await
            }
            FirewallAction::Close { port, protocol } => {
                firewall_close_command(managers, port, protocol.into()).await
            }
        },
        Some(Commands::NetworkStats) => network_stats_command(managers).await,
        Some(Commands::CheckPrereqs) => check_prerequisites_command().await,
    }
}
