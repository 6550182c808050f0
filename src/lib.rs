// file: src/lib.rs
// version: 3.0.0
// guid: d82472d1-7f0f-4eb4-b0a3-6e1547103eb4

//! # Ubuntu System Manager
//!
//! Menu-driven administration of a single Ubuntu host: package updates,
//! timeshift snapshots, ufw firewall and per-address rules.
//!
//! All external tools run through [`runner::CommandRunner`], which drains
//! stdout and stderr concurrently and hands back a
//! [`runner::CommandResult`]. Results are turned into a three-level
//! [`runner::Outcome`] by marker rules, since some tools report failure
//! in their output while exiting 0.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod runner;
pub mod security;
pub mod utils;

pub use error::{AdminError, Result};

/// Version information for the manager
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
