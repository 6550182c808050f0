// file: src/manager/ip.rs
// version: 1.0.0
// guid: 42f916fa-5636-4abb-a61c-b5daf4a72317

//! Per-address firewall rules (`ufw allow|deny from <ip>`)

use super::firewall::{rule_change_rules, RuleAction};
use crate::runner::{classify, CommandExecutor, CommandSpec, Outcome};
use crate::utils::validation::parse_ipv4;
use crate::Result;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::info;

pub struct IpManager {
    executor: Arc<dyn CommandExecutor>,
    echo: bool,
}

impl IpManager {
    pub fn new(executor: Arc<dyn CommandExecutor>, echo: bool) -> Self {
        Self { executor, echo }
    }

    fn rule_spec(delete: bool, action: RuleAction, ip: Ipv4Addr) -> CommandSpec {
        let spec = CommandSpec::new("ufw");
        let spec = if delete { spec.arg("delete") } else { spec };
        spec.args([action.as_str().to_string(), "from".to_string(), ip.to_string()])
    }

    async fn apply(&self, delete: bool, action: RuleAction, ip: Ipv4Addr) -> Outcome {
        let spec = Self::rule_spec(delete, action, ip);
        let result = self.executor.execute(&spec, self.echo).await;
        classify(&result, &rule_change_rules())
    }

    pub async fn allow_ip(&self, input: &str) -> Result<Outcome> {
        let ip = parse_ipv4(input)?;
        info!("Allowing traffic from {}", ip);
        let outcome = self.apply(false, RuleAction::Allow, ip).await;
        if outcome.is_success() {
            return Ok(Outcome::success(format!("Successfully allowed {}", ip)));
        }
        Ok(outcome)
    }

    pub async fn deny_ip(&self, input: &str) -> Result<Outcome> {
        let ip = parse_ipv4(input)?;
        info!("Denying traffic from {}", ip);
        let outcome = self.apply(false, RuleAction::Deny, ip).await;
        if outcome.is_success() {
            return Ok(Outcome::success(format!("Successfully denied {}", ip)));
        }
        Ok(outcome)
    }

    /// Remove both the allow and the deny rule for an address.
    /// Stops at the first hard failure.
    pub async fn delete_rules(&self, input: &str) -> Result<Outcome> {
        let ip = parse_ipv4(input)?;
        info!("Deleting rules for {}", ip);

        let mut removed = 0;
        for action in [RuleAction::Allow, RuleAction::Deny] {
            let outcome = self.apply(true, action, ip).await;
            if outcome.is_failed() {
                return Ok(Outcome::failed(format!(
                    "Failed to delete {} rule for {}: {}",
                    action.as_str(),
                    ip,
                    outcome.message()
                )));
            }
            if outcome.is_success() {
                removed += 1;
            }
        }

        if removed == 0 {
            return Ok(Outcome::degraded(format!("No rules found for {}", ip)));
        }
        Ok(Outcome::success(format!("Successfully deleted rules for {}", ip)))
    }

    /// Print the current rule table
    pub async fn show_rules(&self) -> Outcome {
        let result = self
            .executor
            .execute(&CommandSpec::new("ufw").args(["status", "verbose"]), true)
            .await;
        classify(&result, &[])
    }
}
