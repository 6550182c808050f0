// file: src/cli/args.rs
// version: 2.1.0
// guid: f61a4c2e-8d3b-4a97-b5e0-2c7d9e13f846

//! Command line argument definitions

use crate::manager::Protocol;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ubuntu-system-manager")]
#[command(about = "Menu-driven Ubuntu administration: updates, snapshots, firewall and IP rules")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Run a single action; without one the interactive menu starts
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true, env = "USM_CONFIG", help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Whether this invocation may block reading answers from stdin
    pub fn reads_stdin(&self) -> bool {
        matches!(
            self.command,
            None | Some(Commands::Menu)
                | Some(Commands::Firewall {
                    action: FirewallAction::Close { .. }
                })
        )
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive menu
    Menu,

    /// Refresh package lists and upgrade all packages
    Update,

    /// Install a single package with apt-get
    Install {
        package: String,
    },

    /// Timeshift snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// ufw firewall
    Firewall {
        #[command(subcommand)]
        action: FirewallAction,
    },

    /// Show interfaces, addresses, routes and listening sockets
    NetworkStats,

    /// Check that the external tools this program drives are installed
    CheckPrereqs,
}

#[derive(Subcommand)]
pub enum SnapshotAction {
    /// Create a snapshot
    Create {
        #[arg(short, long, help = "Snapshot description; a timestamped one is generated if omitted")]
        comment: Option<String>,
    },

    /// List existing snapshots
    List,
}

#[derive(Subcommand)]
pub enum FirewallAction {
    /// Show ufw status
    Status,

    /// Enable the firewall
    Enable,

    /// Disable the firewall
    Disable,

    /// Open a port
    Allow {
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,

        #[arg(short, long, value_enum, default_value = "tcp")]
        protocol: ProtocolArg,
    },

    /// Close a previously opened port
    Close {
        #[arg(value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,

        #[arg(short, long, value_enum, default_value = "tcp")]
        protocol: ProtocolArg,
    },
}

/// Protocol argument for CLI
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum ProtocolArg {
    Tcp,
    Udp,
}

impl From<ProtocolArg> for Protocol {
    fn from(protocol: ProtocolArg) -> Self {
        match protocol {
            ProtocolArg::Tcp => Protocol::Tcp,
            ProtocolArg::Udp => Protocol::Udp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["ubuntu-system-manager", "-v"]).unwrap();

        assert!(cli.command.is_none());
        assert!(cli.verbose);
        assert!(cli.reads_stdin());
    }

    #[test]
    fn test_only_prompting_invocations_read_stdin() {
        let parse = |args: &[&str]| {
            let mut argv = vec!["ubuntu-system-manager"];
            argv.extend_from_slice(args);
            Cli::try_parse_from(argv).unwrap()
        };

        assert!(parse(&["menu"]).reads_stdin());
        assert!(parse(&["firewall", "close", "22"]).reads_stdin());
        assert!(!parse(&["update"]).reads_stdin());
        assert!(!parse(&["firewall", "allow", "80"]).reads_stdin());
    }

    #[test]
    fn test_snapshot_create_with_comment() {
        let cli = Cli::try_parse_from([
            "ubuntu-system-manager",
            "snapshot",
            "create",
            "--comment",
            "before upgrade",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Snapshot {
                action: SnapshotAction::Create { comment },
            }) => assert_eq!(comment.as_deref(), Some("before upgrade")),
            _ => panic!("expected snapshot create"),
        }
    }

    #[test]
    fn test_firewall_close_defaults_to_tcp() {
        let cli = Cli::try_parse_from(["ubuntu-system-manager", "firewall", "close", "22"]).unwrap();

        match cli.command {
            Some(Commands::Firewall {
                action: FirewallAction::Close { port, protocol },
            }) => {
                assert_eq!(port, 22);
                assert_eq!(Protocol::from(protocol), Protocol::Tcp);
            }
            _ => panic!("expected firewall close"),
        }
    }

    #[test]
    fn test_port_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["ubuntu-system-manager", "firewall", "allow", "70000"]).is_err());
        assert!(Cli::try_parse_from(["ubuntu-system-manager", "firewall", "allow", "0"]).is_err());
    }
}
