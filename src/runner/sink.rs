// file: src/runner/sink.rs
// version: 1.0.0
// guid: b73f6e8a-33d0-4450-9717-2579bcc22722

//! Destinations for lines echoed while a command is running

use super::StreamKind;
use colored::Colorize;
use std::io::Write;

/// Receives each output line as soon as the runner reads it.
///
/// Called concurrently from the stdout and stderr drain tasks, so
/// implementations must be `Send + Sync`. Lines of a single stream arrive in
/// the order the child wrote them.
pub trait LineSink: Send + Sync {
    fn emit(&self, stream: StreamKind, line: &str);
}

/// Writes lines to the operator's terminal, marking stderr lines
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl LineSink for ConsoleSink {
    fn emit(&self, stream: StreamKind, line: &str) {
        // Both streams go to stdout so the operator sees one ordered view.
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = match stream {
            StreamKind::Stdout => writeln!(handle, "{}", line),
            StreamKind::Stderr => writeln!(handle, "{} {}", "Error:".red(), line),
        };
    }
}

/// Discards every line
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LineSink for NullSink {
    fn emit(&self, _stream: StreamKind, _line: &str) {}
}
