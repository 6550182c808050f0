// file: src/manager/firewall.rs
// version: 1.1.0
// guid: a3acde30-d57b-41ed-b70f-4cfe6dd84b9b

//! Firewall management through ufw, plus read-only network inspection

use crate::error::AdminError;
use crate::runner::{classify, CommandExecutor, CommandSpec, MarkerRule, Outcome, StreamKind};
use crate::security::guard::{self, Confirm, Guarded};
use crate::Result;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

/// Transport protocol of a port rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }

    /// Parse operator input; an empty answer means tcp
    pub fn parse_or_default(input: &str) -> Result<Self> {
        match input.trim() {
            "" => Ok(Protocol::Tcp),
            other => other.parse(),
        }
    }
}

impl FromStr for Protocol {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            other => Err(AdminError::validation(format!(
                "Unknown protocol: '{}' (expected tcp or udp)",
                other
            ))),
        }
    }
}

/// What a rule does with matching traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Allow,
    Deny,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Allow => "allow",
            RuleAction::Deny => "deny",
        }
    }
}

/// A `ufw <action> <port>/<proto>` rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRule {
    pub port: u16,
    pub protocol: Protocol,
    pub action: RuleAction,
}

impl PortRule {
    pub fn new(port: u16, protocol: Protocol, action: RuleAction) -> Self {
        Self {
            port,
            protocol,
            action,
        }
    }

    pub fn allow(port: u16, protocol: Protocol) -> Self {
        Self::new(port, protocol, RuleAction::Allow)
    }

    /// `22/tcp`
    pub fn target(&self) -> String {
        format!("{}/{}", self.port, self.protocol.as_str())
    }
}

impl fmt::Display for PortRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action.as_str(), self.target())
    }
}

/// A well-known service and its default port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    pub name: &'static str,
    pub port: u16,
}

pub const COMMON_SERVICES: &[Service] = &[
    Service { name: "HTTP", port: 80 },
    Service { name: "HTTPS", port: 443 },
    Service { name: "SSH", port: 22 },
    Service { name: "FTP", port: 21 },
    Service { name: "SMTP", port: 25 },
    Service { name: "SMTP (TLS)", port: 587 },
    Service { name: "POP3", port: 110 },
    Service { name: "POP3 (SSL)", port: 995 },
    Service { name: "IMAP", port: 143 },
    Service { name: "IMAP (SSL)", port: 993 },
    Service { name: "DNS", port: 53 },
    Service { name: "MySQL", port: 3306 },
    Service { name: "PostgreSQL", port: 5432 },
    Service { name: "Redis", port: 6379 },
    Service { name: "MongoDB", port: 27017 },
    Service { name: "RDP", port: 3389 },
];

/// Predefined rule sets for common host roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    WebServer,
    MailServer,
    SecureWorkstation,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::WebServer, Preset::MailServer, Preset::SecureWorkstation];

    pub fn label(&self) -> &'static str {
        match self {
            Preset::WebServer => "Web Server (HTTP, HTTPS, SSH)",
            Preset::MailServer => "Mail Server (SMTP, IMAP, POP3)",
            Preset::SecureWorkstation => "Secure Workstation",
        }
    }

    /// TCP ports opened by the preset, in order
    pub fn ports(&self) -> &'static [u16] {
        match self {
            Preset::WebServer => &[80, 443, 22],
            Preset::MailServer => &[25, 587, 993, 995],
            Preset::SecureWorkstation => &[22],
        }
    }

    /// `ufw default <policy> <direction>` pairs applied after the ports
    pub fn default_policies(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Preset::SecureWorkstation => &[("deny", "incoming"), ("allow", "outgoing")],
            Preset::WebServer | Preset::MailServer => &[],
        }
    }
}

/// ufw exits 0 for these no-op cases
pub fn rule_change_rules() -> Vec<MarkerRule> {
    vec![
        MarkerRule::degraded_on(
            StreamKind::Stdout,
            "Skipping adding existing rule",
            "rule already exists; nothing was changed.",
        ),
        MarkerRule::degraded_on(
            StreamKind::Stdout,
            "Could not delete non-existent rule",
            "no matching rule exists; nothing was changed.",
        ),
    ]
}

/// Parsed `ufw status verbose`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallStatus {
    pub active: bool,
    pub details: String,
}

/// One block of the network statistics report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatSection {
    pub title: &'static str,
    pub outcome: Outcome,
    pub output: String,
}

/// Controls ufw
pub struct FirewallManager {
    executor: Arc<dyn CommandExecutor>,
    echo: bool,
    confirm_all_deletions: bool,
}

impl FirewallManager {
    pub fn new(executor: Arc<dyn CommandExecutor>, echo: bool, confirm_all_deletions: bool) -> Self {
        Self {
            executor,
            echo,
            confirm_all_deletions,
        }
    }

    pub async fn status(&self) -> FirewallStatus {
        let result = self
            .executor
            .execute(&CommandSpec::new("ufw").args(["status", "verbose"]), false)
            .await;

        if !result.success() {
            let outcome = classify(&result, &[]);
            return FirewallStatus {
                active: false,
                details: format!("Error: {}", outcome.message()),
            };
        }

        let details = result.stdout_text();
        FirewallStatus {
            active: details.contains("Status: active"),
            details,
        }
    }

    pub async fn enable(&self) -> Outcome {
        info!("Enabling firewall");
        let spec = CommandSpec::new("ufw").args(["--force", "enable"]);
        let outcome = classify(&self.executor.execute(&spec, self.echo).await, &[]);
        if outcome.is_success() {
            return Outcome::success("Firewall has been enabled successfully.");
        }
        outcome
    }

    pub async fn disable(&self) -> Outcome {
        info!("Disabling firewall");
        let spec = CommandSpec::new("ufw").arg("disable");
        let outcome = classify(&self.executor.execute(&spec, self.echo).await, &[]);
        if outcome.is_success() {
            return Outcome::success("Firewall has been disabled successfully.");
        }
        outcome
    }

    pub async fn add_rule(&self, rule: &PortRule) -> Outcome {
        info!("Adding firewall rule: {}", rule);
        let spec = CommandSpec::new("ufw").args([rule.action.as_str().to_string(), rule.target()]);
        let outcome = classify(&self.executor.execute(&spec, self.echo).await, &rule_change_rules());
        if outcome.is_success() {
            return Outcome::success(match rule.action {
                RuleAction::Allow => format!("Successfully opened port {}", rule.target()),
                RuleAction::Deny => format!("Successfully blocked port {}", rule.target()),
            });
        }
        outcome
    }

    /// Apply a preset, stopping at the first command that fails
    pub async fn apply_preset(&self, preset: Preset) -> Outcome {
        info!("Applying {} configuration", preset.label());
        let mut warnings = Vec::new();

        for &port in preset.ports() {
            let rule = PortRule::allow(port, Protocol::Tcp);
            let outcome = self.add_rule(&rule).await;
            if outcome.is_failed() {
                return Outcome::failed(format!(
                    "{} configuration stopped at {}: {}",
                    preset.label(),
                    rule,
                    outcome.message()
                ));
            }
            if outcome.is_degraded() {
                warnings.push(format!("{}: {}", rule, outcome.message()));
            }
        }

        for &(policy, direction) in preset.default_policies() {
            let spec = CommandSpec::new("ufw").args(["default", policy, direction]);
            let outcome = classify(&self.executor.execute(&spec, self.echo).await, &[]);
            if outcome.is_failed() {
                return Outcome::failed(format!(
                    "{} configuration stopped at default {} {}: {}",
                    preset.label(),
                    policy,
                    direction,
                    outcome.message()
                ));
            }
        }

        if warnings.is_empty() {
            Outcome::success(format!("Applied {} configuration", preset.label()))
        } else {
            Outcome::degraded(format!(
                "Applied {} configuration with warnings: {}",
                preset.label(),
                warnings.join("; ")
            ))
        }
    }

    /// Delete a port rule, asking `confirm` first when the rule is guarded
    pub async fn delete_rule(
        &self,
        rule: &PortRule,
        confirm: &mut dyn Confirm,
    ) -> Result<Guarded<Outcome>> {
        if guard::requires_confirmation(rule, self.confirm_all_deletions)
            && !confirm.confirm(&guard::warning_for(rule))?
        {
            info!("Deletion of {} cancelled by operator", rule);
            return Ok(Guarded::Declined);
        }

        if guard::is_destructive(rule) {
            warn!("Removing SSH firewall rule {} after confirmation", rule);
        }

        let spec = CommandSpec::new("ufw").args([
            "delete".to_string(),
            rule.action.as_str().to_string(),
            rule.target(),
        ]);
        let outcome = classify(&self.executor.execute(&spec, self.echo).await, &rule_change_rules());
        if outcome.is_success() {
            return Ok(Guarded::Executed(Outcome::success(match rule.action {
                RuleAction::Allow => format!("Successfully closed port {}", rule.target()),
                RuleAction::Deny => format!("Successfully removed block on port {}", rule.target()),
            })));
        }
        Ok(Guarded::Executed(outcome))
    }

    /// Interfaces, addresses, routes and listening sockets
    pub async fn network_stats(&self) -> Vec<StatSection> {
        let queries: [(&'static str, CommandSpec); 4] = [
            ("Network Interfaces", CommandSpec::new("ip").args(["link", "show"])),
            ("IP Addresses", CommandSpec::new("ip").args(["addr", "show"])),
            ("Routing Table", CommandSpec::new("ip").arg("route")),
            ("Active Connections", CommandSpec::new("ss").arg("-tuln")),
        ];

        let mut sections = Vec::with_capacity(queries.len());
        for (title, spec) in queries {
            let result = self.executor.execute(&spec, false).await;
            let outcome = classify(&result, &[]);
            if outcome.is_failed() {
                warn!("Error getting network stats from '{}': {}", spec, outcome.message());
            }
            sections.push(StatSection {
                title,
                output: result.stdout_text(),
                outcome,
            });
        }
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::testing::FakeExecutor;
    use crate::runner::CommandResult;

    /// Confirm stub that always gives the same answer and counts prompts
    struct Answer {
        accept: bool,
        asked: usize,
    }

    impl Confirm for Answer {
        fn confirm(&mut self, _warning: &str) -> Result<bool> {
            self.asked += 1;
            Ok(self.accept)
        }
    }

    fn firewall(fake: &Arc<FakeExecutor>) -> FirewallManager {
        FirewallManager::new(fake.clone(), false, false)
    }

    #[test]
    fn test_protocol_parsing() {
        assert_eq!(Protocol::parse_or_default("").unwrap(), Protocol::Tcp);
        assert_eq!(Protocol::parse_or_default("UDP").unwrap(), Protocol::Udp);
        assert!(Protocol::parse_or_default("icmp").unwrap_err().is_validation());
    }

    #[test]
    fn test_rule_display() {
        let rule = PortRule::new(443, Protocol::Tcp, RuleAction::Deny);
        assert_eq!(rule.to_string(), "deny 443/tcp");
    }

    #[test]
    fn test_services_table_has_ssh() {
        assert!(COMMON_SERVICES.iter().any(|s| s.name == "SSH" && s.port == 22));
        assert_eq!(COMMON_SERVICES.len(), 16);
    }

    #[tokio::test]
    async fn test_declined_ssh_delete_never_runs_ufw() {
        // Arrange
        let fake = Arc::new(FakeExecutor::new());
        let mut answer = Answer { accept: false, asked: 0 };
        let rule = PortRule::allow(22, Protocol::Tcp);

        // Act
        let outcome = firewall(&fake).delete_rule(&rule, &mut answer).await.unwrap();

        // Assert
        assert!(outcome.is_declined());
        assert_eq!(answer.asked, 1);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_ssh_delete_runs_ufw() {
        let fake = Arc::new(FakeExecutor::new());
        let mut answer = Answer { accept: true, asked: 0 };
        let rule = PortRule::allow(22, Protocol::Tcp);

        let outcome = firewall(&fake).delete_rule(&rule, &mut answer).await.unwrap();

        assert!(outcome.executed().unwrap().is_success());
        assert_eq!(fake.calls(), vec!["ufw delete allow 22/tcp"]);
    }

    #[tokio::test]
    async fn test_ordinary_delete_does_not_prompt() {
        let fake = Arc::new(FakeExecutor::new());
        let mut answer = Answer { accept: false, asked: 0 };
        let rule = PortRule::allow(8080, Protocol::Tcp);

        let outcome = firewall(&fake).delete_rule(&rule, &mut answer).await.unwrap();

        assert_eq!(answer.asked, 0);
        assert!(!outcome.is_declined());
        assert_eq!(fake.calls(), vec!["ufw delete allow 8080/tcp"]);
    }

    #[tokio::test]
    async fn test_confirm_all_deletions_prompts_for_every_rule() {
        let fake = Arc::new(FakeExecutor::new());
        let manager = FirewallManager::new(fake.clone(), false, true);
        let mut answer = Answer { accept: false, asked: 0 };

        let outcome = manager
            .delete_rule(&PortRule::allow(80, Protocol::Tcp), &mut answer)
            .await
            .unwrap();

        assert!(outcome.is_declined());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_missing_rule_is_degraded() {
        let fake = Arc::new(FakeExecutor::with_responses(vec![CommandResult::from_text(
            0,
            "Could not delete non-existent rule",
            "",
        )]));
        let mut answer = Answer { accept: true, asked: 0 };

        let outcome = firewall(&fake)
            .delete_rule(&PortRule::allow(9000, Protocol::Udp), &mut answer)
            .await
            .unwrap()
            .executed()
            .unwrap();

        assert!(outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_add_rule() {
        let fake = Arc::new(FakeExecutor::new());

        let outcome = firewall(&fake)
            .add_rule(&PortRule::allow(7777, Protocol::Udp))
            .await;

        assert!(outcome.is_success());
        assert_eq!(fake.calls(), vec!["ufw allow 7777/udp"]);
    }

    #[tokio::test]
    async fn test_deny_rule_wording_follows_action() {
        let fake = Arc::new(FakeExecutor::new());
        let rule = PortRule::new(23, Protocol::Tcp, RuleAction::Deny);

        let outcome = firewall(&fake).add_rule(&rule).await;

        assert_eq!(outcome.message(), "Successfully blocked port 23/tcp");
        assert_eq!(fake.calls(), vec!["ufw deny 23/tcp"]);
    }

    #[tokio::test]
    async fn test_web_server_preset_commands() {
        let fake = Arc::new(FakeExecutor::new());

        let outcome = firewall(&fake).apply_preset(Preset::WebServer).await;

        assert!(outcome.is_success());
        assert_eq!(
            fake.calls(),
            vec!["ufw allow 80/tcp", "ufw allow 443/tcp", "ufw allow 22/tcp"]
        );
    }

    #[tokio::test]
    async fn test_mail_server_preset_commands() {
        let fake = Arc::new(FakeExecutor::new());

        firewall(&fake).apply_preset(Preset::MailServer).await;

        assert_eq!(
            fake.calls(),
            vec![
                "ufw allow 25/tcp",
                "ufw allow 587/tcp",
                "ufw allow 993/tcp",
                "ufw allow 995/tcp"
            ]
        );
    }

    #[tokio::test]
    async fn test_secure_workstation_sets_default_policies() {
        let fake = Arc::new(FakeExecutor::new());

        let outcome = firewall(&fake).apply_preset(Preset::SecureWorkstation).await;

        assert!(outcome.is_success());
        assert_eq!(
            fake.calls(),
            vec![
                "ufw allow 22/tcp",
                "ufw default deny incoming",
                "ufw default allow outgoing"
            ]
        );
    }

    #[tokio::test]
    async fn test_preset_stops_at_first_failure() {
        // Arrange: the second port fails
        let fake = Arc::new(FakeExecutor::with_responses(vec![
            CommandResult::from_text(0, "Rule added", ""),
            CommandResult::from_text(1, "", "ERROR: Could not load logging rules"),
        ]));

        // Act
        let outcome = firewall(&fake).apply_preset(Preset::WebServer).await;

        // Assert
        assert!(outcome.is_failed());
        assert!(outcome.message().contains("allow 443/tcp"));
        assert_eq!(fake.calls(), vec!["ufw allow 80/tcp", "ufw allow 443/tcp"]);
    }

    #[tokio::test]
    async fn test_failed_default_policy_stops_preset() {
        let fake = Arc::new(FakeExecutor::with_responses(vec![
            CommandResult::from_text(0, "Rule added", ""),
            CommandResult::from_text(1, "", "ERROR: problem running ufw-init"),
        ]));

        let outcome = firewall(&fake).apply_preset(Preset::SecureWorkstation).await;

        assert!(outcome.is_failed());
        assert!(outcome.message().contains("default deny incoming"));
        assert_eq!(fake.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_existing_rule_degrades_preset() {
        let fake = Arc::new(FakeExecutor::with_responses(vec![
            CommandResult::from_text(0, "Skipping adding existing rule", ""),
        ]));

        let outcome = firewall(&fake).apply_preset(Preset::WebServer).await;

        assert!(outcome.is_degraded());
        assert_eq!(fake.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_status_parsing() {
        let fake = Arc::new(FakeExecutor::with_responses(vec![
            CommandResult::from_text(0, "Status: active\nLogging: on (low)", ""),
            CommandResult::from_text(0, "Status: inactive", ""),
            CommandResult::from_text(1, "", "ERROR: You need to be root to run this script"),
        ]));
        let manager = firewall(&fake);

        assert!(manager.status().await.active);
        assert!(!manager.status().await.active);
        let failed = manager.status().await;
        assert!(!failed.active);
        assert!(failed.details.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_enable_and_disable_commands() {
        let fake = Arc::new(FakeExecutor::new());
        let manager = firewall(&fake);

        assert!(manager.enable().await.is_success());
        assert!(manager.disable().await.is_success());
        assert_eq!(fake.calls(), vec!["ufw --force enable", "ufw disable"]);
    }

    #[tokio::test]
    async fn test_network_stats_sections() {
        let fake = Arc::new(FakeExecutor::with_responses(vec![
            CommandResult::from_text(0, "1: lo: <LOOPBACK,UP>", ""),
            CommandResult::from_text(0, "inet 127.0.0.1/8", ""),
            CommandResult::from_text(0, "default via 10.0.0.1", ""),
            CommandResult::from_text(-1, "", "failed to start 'ss': No such file or directory"),
        ]));

        let sections = firewall(&fake).network_stats().await;

        assert_eq!(sections.len(), 4);
        assert_eq!(sections[2].title, "Routing Table");
        assert_eq!(sections[2].output, "default via 10.0.0.1");
        assert!(sections[3].outcome.is_failed());
        assert_eq!(
            fake.calls(),
            vec!["ip link show", "ip addr show", "ip route", "ss -tuln"]
        );
    }
}
