// file: src/utils/validation.rs
// version: 2.0.0
// guid: c29dafe2-a1d7-4719-84d7-8877111284af

//! Operator input validation.
//!
//! Everything typed at a prompt passes through here before it can become an
//! argument to an external command. Rejections are
//! [`AdminError::Validation`] errors and never reach the runner.

use crate::error::{AdminError, Result};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Parse a dotted-quad IPv4 address such as `192.168.1.100`
pub fn parse_ipv4(input: &str) -> Result<Ipv4Addr> {
    let trimmed = input.trim();
    Ipv4Addr::from_str(trimmed)
        .map_err(|_| AdminError::validation(format!("Invalid IP address format: {}", trimmed)))
}

/// Parse a TCP/UDP port number in `1..=65535`
pub fn parse_port(input: &str) -> Result<u16> {
    let trimmed = input.trim();
    match trimmed.parse::<u16>() {
        Ok(0) | Err(_) => Err(AdminError::validation(format!(
            "Invalid port number: '{}' (expected 1-65535)",
            trimmed
        ))),
        Ok(port) => Ok(port),
    }
}

/// Check a Debian package name: lowercase alphanumerics plus `+ - .`,
/// starting with an alphanumeric, at least two characters
pub fn validate_package_name(input: &str) -> Result<String> {
    let name = input.trim();
    let mut chars = name.chars();
    let first_ok = chars
        .next()
        .map(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .unwrap_or(false);
    let rest_ok = chars.all(|c| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '-' | '.')
    });

    if name.len() < 2 || !first_ok || !rest_ok {
        return Err(AdminError::validation(format!(
            "Invalid package name: '{}'",
            name
        )));
    }
    Ok(name.to_string())
}

/// Snapshot comments go straight to timeshift as one argument; only reject
/// what would be unreadable in its listing
pub fn validate_comment(input: &str) -> Result<String> {
    let comment = input.trim();
    if comment.chars().any(char::is_control) {
        return Err(AdminError::validation(
            "Snapshot description must not contain control characters",
        ));
    }
    Ok(comment.to_string())
}
