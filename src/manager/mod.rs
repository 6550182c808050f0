// file: src/manager/mod.rs
// version: 1.0.0
// guid: ae9ac58a-9e08-4edb-b30b-80af22888b5a

//! Host administration workflows
//!
//! Each manager builds command lines for one external tool, runs them through
//! a shared [`CommandExecutor`](crate::runner::CommandExecutor) and classifies
//! the results. Managers never print or prompt; the CLI layer does.

pub mod firewall;
pub mod ip;
pub mod snapshot;
pub mod update;

pub use firewall::{FirewallManager, FirewallStatus, PortRule, Preset, Protocol, RuleAction};
pub use ip::IpManager;
pub use snapshot::SnapshotManager;
pub use update::SystemUpdater;

use crate::config::Config;
use crate::runner::CommandExecutor;
use std::sync::Arc;

/// All managers, sharing one executor
pub struct Managers {
    pub updater: SystemUpdater,
    pub snapshots: SnapshotManager,
    pub firewall: FirewallManager,
    pub ip: IpManager,
}

impl Managers {
    pub fn new(executor: Arc<dyn CommandExecutor>, config: &Config) -> Self {
        let echo = config.execution.echo;
        Self {
            updater: SystemUpdater::new(executor.clone(), echo),
            snapshots: SnapshotManager::new(executor.clone(), echo, config.snapshot.clone()),
            firewall: FirewallManager::new(
                executor.clone(),
                echo,
                config.safety.confirm_all_deletions,
            ),
            ip: IpManager::new(executor, echo),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::runner::{CommandExecutor, CommandResult, CommandSpec};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Executor that records every command and replays scripted results.
    /// Once the script runs out it answers with a clean exit.
    #[derive(Default)]
    pub(crate) struct FakeExecutor {
        calls: Mutex<Vec<CommandSpec>>,
        responses: Mutex<VecDeque<CommandResult>>,
    }

    impl FakeExecutor {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_responses(responses: Vec<CommandResult>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                responses: Mutex::new(responses.into()),
            }
        }

        /// Every executed command line, in order
        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(ToString::to_string)
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl CommandExecutor for FakeExecutor {
        async fn execute(&self, spec: &CommandSpec, _echo: bool) -> CommandResult {
            self.calls.lock().unwrap().push(spec.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| CommandResult::new(0, Vec::new(), Vec::new()))
        }
    }
}
