// file: src/cli/mod.rs
// version: 2.0.0
// guid: 8d41b6e0-93c7-4f25-a1d8-6b0e27c4f913

//! Command line interface for Ubuntu System Manager

pub mod args;
pub mod commands;
pub mod menu;
pub mod output;
pub mod prompt;

pub use args::Cli;
pub use commands::*;
pub use menu::run_main_menu;
pub use prompt::{Prompt, TerminalPrompt};
