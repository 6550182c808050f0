// file: src/cli/output.rs
// version: 1.0.0
// guid: 3b0e8f71-2c5d-4a6e-9f18-d47a0c5b92e3

//! Colored console rendering of outcomes and reports

use crate::error::AdminError;
use crate::manager::firewall::{FirewallStatus, StatSection, COMMON_SERVICES};
use crate::runner::{Outcome, OutcomeKind};
use colored::Colorize;

/// One-line colored summary of an outcome
pub fn format_outcome(outcome: &Outcome) -> String {
    match outcome.kind() {
        OutcomeKind::Success => format!("{} {}", "✓".green(), outcome.message().green()),
        OutcomeKind::Degraded => format!("{} {}", "⚠".yellow(), outcome.message().yellow()),
        OutcomeKind::Failed => format!("{} {}", "✗".red(), outcome.message().red()),
    }
}

pub fn report_outcome(outcome: &Outcome) {
    println!("\n{}", format_outcome(outcome));
}

pub fn report_error(err: &AdminError) {
    println!("\n{} {}", "Error:".red().bold(), err);
}

pub fn print_firewall_status(status: &FirewallStatus) {
    println!("\n=== Firewall Status ===");
    let state = if status.active {
        "active".green()
    } else {
        "inactive".red()
    };
    println!("Firewall is {}", state);
    println!("{}", status.details);
}

pub fn print_stat_sections(sections: &[StatSection]) {
    for section in sections {
        println!("\n=== {} ===", section.title);
        if section.outcome.is_failed() {
            println!("{}", format_outcome(&section.outcome));
        } else {
            println!("{}", section.output);
        }
    }
}

pub fn print_services() {
    println!("\nCommon Services:");
    for (i, service) in COMMON_SERVICES.iter().enumerate() {
        println!("{:>2}. {:<12} (Port {})", i + 1, service.name, service.port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_outcome_keeps_message() {
        colored::control::set_override(false);

        assert_eq!(format_outcome(&Outcome::success("done")), "✓ done");
        assert_eq!(format_outcome(&Outcome::degraded("partly")), "⚠ partly");
        assert_eq!(format_outcome(&Outcome::failed("broken")), "✗ broken");
    }
}
