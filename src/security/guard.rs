// file: src/security/guard.rs
// version: 1.0.0
// guid: 167476a7-cd36-4ed0-987c-46ed1d05029e

//! Confirmation gate for actions that can cut off remote access.
//!
//! Deciding whether a request is destructive is a pure predicate. Asking the
//! operator is a separate step done by the caller through [`Confirm`], before
//! the mutating command is built. A declined confirmation returns
//! [`Guarded::Declined`] and nothing is executed.

use crate::manager::firewall::{PortRule, Protocol};
use crate::Result;

/// Port of the administrative remote-access protocol
pub const SSH_PORT: u16 = 22;

/// The only answer that counts as consent (compared case-insensitively)
pub const CONFIRM_TOKEN: &str = "yes";

/// Source of explicit operator consent
pub trait Confirm {
    /// Show `warning` and return whether the operator agreed
    fn confirm(&mut self, warning: &str) -> Result<bool>;
}

/// Result of an operation that may have been refused at the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Declined,
    Executed(T),
}

impl<T> Guarded<T> {
    pub fn is_declined(&self) -> bool {
        matches!(self, Guarded::Declined)
    }

    pub fn executed(self) -> Option<T> {
        match self {
            Guarded::Declined => None,
            Guarded::Executed(value) => Some(value),
        }
    }
}

/// Removing this rule could lock the operator out of the host
pub fn is_destructive(rule: &PortRule) -> bool {
    rule.port == SSH_PORT && rule.protocol == Protocol::Tcp
}

/// Whether deleting `rule` needs consent; `confirm_all` extends the gate to
/// every deletion
pub fn requires_confirmation(rule: &PortRule, confirm_all: bool) -> bool {
    confirm_all || is_destructive(rule)
}

/// Exact-match check of a typed answer
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case(CONFIRM_TOKEN)
}

/// Text shown before deleting `rule`
pub fn warning_for(rule: &PortRule) -> String {
    if is_destructive(rule) {
        format!(
            "WARNING: You are about to remove the SSH firewall rule ({}).\n\
             This could lock you out of remote access to this server.",
            rule.target()
        )
    } else {
        format!("About to delete firewall rule: {} {}", rule.action.as_str(), rule.target())
    }
}
